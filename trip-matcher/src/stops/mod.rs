//! Bus stop directory client and lookup.
//!
//! Provides stop code → location and description, fetched for the day's
//! bounding box from the stop directory API and cached on disk. Codes
//! outside the area are looked up one at a time.

mod cache;
mod client;
mod directory;
mod error;
mod table;

pub use cache::{StopCache, StopCacheConfig};
pub use client::{StopClient, StopClientConfig};
pub use directory::{DirectoryConfig, StopDirectory};
pub use error::StopError;
pub use table::{StopRecord, StopTable};

#[cfg(test)]
pub(crate) use table::fixtures;
