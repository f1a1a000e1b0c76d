//! The live document, history and location, plus parsed incoming pages.
//!
//! The controller only ever reads the document URL, swaps one region, sets
//! the title, scrolls, pushes a history entry, or falls back to a full load.

mod host;
mod snapshot;

pub use host::{Document, History, Location};
pub use snapshot::{apply_snapshot, DocumentSnapshot, SwapTarget};
