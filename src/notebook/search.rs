//! Fulltext search and maintenance.

use chrono::{DateTime, Utc};

use super::Notebook;
use crate::domain::{EntityKind, LabelName, NoteId};
use crate::error::Result;
use crate::fulltext::{self, ReindexStats, extract_text};
use crate::store::{branches, labels, notes, revisions};

impl Notebook {
    /// Queues a note for reindexing.
    pub fn enqueue_fulltext(&self, id: &NoteId) {
        self.fulltext.enqueue(id.clone());
    }

    /// Applies all queued fulltext work now. Returns how many jobs ran.
    pub fn flush_fulltext(&self) -> usize {
        self.fulltext.process_pending(&self.store)
    }

    /// Notes matching `query`.
    ///
    /// Hits come from the index. While the session is unlocked, protected
    /// notes are also decrypted and matched in memory; their text is never
    /// written anywhere. Both paths ignore case for ASCII letters only and
    /// skip archived notes.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<NoteId>> {
        self.read(|conn| {
            let mut hits = fulltext::search(conn, query, limit)?;
            if hits.len() >= limit || !self.session.is_unlocked() {
                return Ok(hits);
            }

            let needle = query.trim().to_ascii_lowercase();
            if needle.is_empty() {
                return Ok(hits);
            }
            for id in notes::protected_live_ids(conn)? {
                if hits.len() >= limit {
                    break;
                }
                if labels::has(conn, &id, &LabelName::archived())? {
                    continue;
                }
                let Some(row) = notes::get(conn, &id)? else {
                    continue;
                };
                let (note_type, mime) = (row.note_type, row.mime.clone());
                let fields =
                    self.codec
                        .decode_lenient(EntityKind::Note, id.as_str(), row.is_protected, row.stored);
                if !fields.is_available() {
                    continue;
                }
                let text = extract_text(note_type, &mime, fields.content());
                if fields.title().to_ascii_lowercase().contains(&needle)
                    || text.to_ascii_lowercase().contains(&needle)
                {
                    hits.push(id);
                }
            }
            Ok(hits)
        })
    }

    /// Rebuilds the fulltext index from scratch.
    pub fn reindex_all(&self) -> Result<ReindexStats> {
        self.with_tx(|conn| Ok(fulltext::reindex_all(conn)?))
    }

    /// Permanently removes soft-deleted notes last modified before `before`,
    /// with their branches, revisions, labels and index rows.
    pub fn erase_deleted(&self, before: DateTime<Utc>) -> Result<Vec<NoteId>> {
        let erased = self.with_tx(|conn| {
            let ids = notes::deleted_before(conn, before)?;
            for id in &ids {
                branches::erase_touching(conn, id)?;
                revisions::erase_for_note(conn, id)?;
                labels::erase_for_note(conn, id)?;
                fulltext::index::remove(conn, id)?;
            }
            for id in &ids {
                notes::erase(conn, id)?;
            }
            Ok(ids)
        })?;
        if !erased.is_empty() {
            log::info!("erased {} deleted note(s)", erased.len());
        }
        Ok(erased)
    }
}
