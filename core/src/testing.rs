pub mod reducer;
pub mod result;
pub mod runner;
pub mod testcase;

pub use reducer::*;
pub use result::*;
pub use runner::*;
pub use testcase::*;
