pub mod cli;
pub mod compile;
pub mod publish;
pub mod run;
pub mod validate;
