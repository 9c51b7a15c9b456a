pub mod clients;
pub mod leads;
pub mod metrics;
