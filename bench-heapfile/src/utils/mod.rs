pub mod file_utils;
pub mod logging;

pub use file_utils::*;
pub use logging::*;
