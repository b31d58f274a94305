pub mod cli;
pub mod config;
pub mod contrasts;
pub mod ctx;
pub mod decode;
pub mod error;
pub mod io;
pub mod math;
pub mod matrix;
pub mod pipeline;
pub mod runner;
pub mod signif;
