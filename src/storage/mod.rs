//! In-process snapshot storage.
//!
//! The service keeps exactly one hot snapshot in memory and refreshes it
//! lazily on read (stale-while-revalidate). Nothing is written to disk;
//! a restart simply re-fetches on the first request.

mod cache;

pub use cache::{CacheRead, CacheState, ItemCache};
