pub mod api;
pub mod assemble;
pub mod compile;
pub mod config;
pub mod driver;
pub mod error;
pub mod publish;
pub mod render;
pub mod runner;
pub mod spec;
