pub mod alignment_service;
pub mod chart_registry;
pub mod chart_service;
