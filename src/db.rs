pub mod store;
pub use store::CrmStore;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod memory;
pub use memory::InMemoryCrmStore;
