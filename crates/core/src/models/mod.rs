pub mod change;
pub mod chart;
pub mod event;
pub mod price;
pub mod query;
pub mod settings;
