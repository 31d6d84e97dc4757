/// `IndexLogger` — a thin, timestamped-event front-end over a [`RAGStore`],
/// for callers that only want to append retrieval events and query them back
/// by time range or question content.
use std::path::Path;

use crate::chunk::Chunk;
use crate::error::Result;
use crate::rag_store::RAGStore;
use crate::testcase::Testcase;

/// One recorded retrieval event, flattened out of a [`RAGStore`]'s
/// testcase log and tagged with the index it was recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub index_id: String,
    pub question: String,
    pub timestamp: String,
    pub returned_answer: Option<String>,
}

/// Lazily-constructed logging front-end. Construction is cheap; the backing
/// [`RAGStore`] (and its files) only loads on first `log`/`get_logs` call.
pub struct IndexLogger {
    store: RAGStore,
}

impl IndexLogger {
    /// Builds a logger backed by the dataset/testcase file pair derived from
    /// `path`: `path`'s parent directory becomes the cache directory, and its
    /// file-name stem becomes the dataset name (spec §4.8 — the logger owns
    /// a single path, not a separate name/directory pair).
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let cache_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index-log".to_string());
        Self {
            store: RAGStore::new(name, cache_dir),
        }
    }

    /// Records `chunks` as a retrieved index paired with `question`,
    /// returning the resulting fingerprint. The case's `timestamp` is always
    /// the current instant (spec §4.8 — `log` takes no timestamp parameter;
    /// injection happens in [`RAGStore::append`]). `answer`, if given, is
    /// recorded as the case's `returned_answer` — what the caller's system
    /// actually answered, as distinct from a known-correct `answer` a later
    /// caller might attach via [`RAGStore::update_last_case`]. A no-op
    /// (returns `Ok(None)`) if `chunks` is empty — there is nothing to index.
    pub async fn log(
        &self,
        chunks: Vec<Chunk>,
        question: impl Into<String>,
        answer: Option<String>,
    ) -> Result<Option<String>> {
        if chunks.is_empty() {
            return Ok(None);
        }

        let mut case = Testcase::new(question, String::new());
        case.returned_answer = answer;
        let id = self.store.append(chunks, case).await?;
        Ok(Some(id))
    }

    /// Returns every logged entry within `[start, end]` (either bound
    /// optional, inclusive, compared lexicographically — callers are
    /// expected to use a sortable timestamp format such as RFC 3339) whose
    /// question contains `question_contains`, if given. Entries are sorted
    /// by timestamp ascending.
    pub async fn get_logs(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        question_contains: Option<&str>,
    ) -> Result<Vec<LogEntry>> {
        let mut entries: Vec<LogEntry> = self
            .store
            .all_testcases()
            .await?
            .into_iter()
            .filter(|(_, case)| start.is_none_or(|s| case.timestamp.as_str() >= s))
            .filter(|(_, case)| end.is_none_or(|e| case.timestamp.as_str() <= e))
            .filter(|(_, case)| {
                question_contains.is_none_or(|needle| case.question.contains(needle))
            })
            .map(|(index_id, case)| LogEntry {
                index_id,
                question: case.question,
                timestamp: case.timestamp,
                returned_answer: case.returned_answer,
            })
            .collect();

        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }
}
