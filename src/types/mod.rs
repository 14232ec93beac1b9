//! Type definitions for countrypop

mod country;
mod error;

pub use country::*;
pub use error::*;
