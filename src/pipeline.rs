// src/pipeline.rs

// Regras puras do funil de leads: nada aqui faz I/O.
pub mod conversion;
pub mod kanban;
pub mod metrics;
pub mod scoring;
pub mod stage;
