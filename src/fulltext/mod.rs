//! Keeps the fulltext side table eventually consistent with the notes.

mod extract;
pub mod index;
mod queue;
mod worker;

#[cfg(test)]
mod tests;

pub use extract::{extract_text, strip_html};
pub use index::{FulltextRecord, IndexAction, ReindexStats, reindex_all, search, update_index};
pub use queue::FulltextQueue;
pub use worker::{DEFAULT_FULLTEXT_INTERVAL, FulltextWorker};
