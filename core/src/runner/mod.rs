pub mod io_pump;
mod local;

pub use io_pump::{LineStream, LineTap};
pub use local::{LocalRunOutcome, LocalRunner};
