pub mod auth;
pub mod client_service;
pub mod gateway;
pub mod lead_service;
pub mod metrics_service;
