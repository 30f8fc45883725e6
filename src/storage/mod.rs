/// Line codec for the store file
pub mod format;
/// Lock-protected store handle for concurrent callers
pub mod shared;
mod store;

use crate::digest::Fingerprint;

pub use shared::SharedStore;
pub use store::{LoadReport, RecordStore};

/// A tracked path and the fingerprint recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Path exactly as the caller supplied it; the unique key
    pub path: String,
    /// Recorded digest of the file content
    pub fingerprint: Fingerprint,
}
