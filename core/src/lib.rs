pub mod catalog;
pub mod config;
pub mod engine;
pub mod problem;
pub mod str_interp;
pub mod style;
pub mod testing;

pub use crate::config::Config;
pub use crate::engine::{judge, Submission};
