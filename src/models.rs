pub mod auth;
pub mod client;
pub mod lead;
pub mod pipeline;
