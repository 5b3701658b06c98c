//! Models Module - Data Structures, Errors & Scan Events

pub mod errors;
pub mod events;
pub mod result;
pub mod types;

pub use errors::*;
pub use events::*;
pub use result::*;
pub use types::*;
