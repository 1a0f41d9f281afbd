//! Terminal formatting helpers: cursor control, display width, unit conversion
pub mod ansi;

mod convert;
pub use convert::*;
mod term_size;
pub use term_size::*;
