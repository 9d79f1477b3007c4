//! CSV batch uploads for the tax engine.

mod loader;

pub use loader::{CsvBatchProcessor, MSG_EMPTY_UPLOAD};
