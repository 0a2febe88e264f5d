//! Core types for dirsearch

mod record;
mod request;

pub use record::*;
pub use request::*;
