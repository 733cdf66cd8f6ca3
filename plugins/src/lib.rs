pub mod api;
pub mod factory;
