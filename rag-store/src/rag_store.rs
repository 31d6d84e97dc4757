/// `RAGStore` — the façade combining a [`DatasetStore`] and [`TestcaseStore`]
/// backed by a single pair of files under one cache directory, with async
/// lazy loading and a lock serializing access across both sub-stores.
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::chunk::Chunk;
use crate::compression::CompressionStrategy;
use crate::config::RagStoreConfig;
use crate::dataset_store::DatasetStore;
use crate::error::Result;
use crate::testcase::{Testcase, TestcaseStore};

/// Current wall-clock time rendered as a fixed-width, lexicographically
/// sortable decimal string (milliseconds since the Unix epoch, zero-padded).
///
/// Grounded on `features/ai/src/spi/logging.rs`'s `epoch_ms` helper — same
/// `SystemTime::now().duration_since(UNIX_EPOCH)` idiom, used here instead of
/// an RFC 3339 string since this crate carries no date-formatting
/// dependency; zero-padding keeps it `str`-comparable the same way an
/// RFC 3339 timestamp would be.
fn now_timestamp() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{millis:020}")
}

enum LoadState {
    NotLoaded,
    Loaded(Inner),
}

struct Inner {
    datasets: DatasetStore,
    testcases: TestcaseStore,
}

/// Persistent, content-addressed, cross-collection-deduplicating store for
/// one dataset's indices and associated test cases.
///
/// `new` is cheap and never touches disk; the backing files are read lazily
/// on first access under `inner`, which also serializes every operation so a
/// dataset append and its paired testcase append land together.
pub struct RAGStore {
    dataset_path: PathBuf,
    testcase_path: PathBuf,
    default_strategy: CompressionStrategy,
    inner: Mutex<LoadState>,
}

impl RAGStore {
    /// Creates a façade for the dataset named `name` under `cache_dir`. Does
    /// not touch disk; the backing files load on first operation.
    pub fn new(name: impl AsRef<str>, cache_dir: impl AsRef<Path>) -> Self {
        let cache_dir = cache_dir.as_ref();
        Self {
            dataset_path: cache_dir.join(format!("{}_dataset.json", name.as_ref())),
            testcase_path: cache_dir.join(format!("{}_testcase.json", name.as_ref())),
            default_strategy: CompressionStrategy::default(),
            inner: Mutex::new(LoadState::NotLoaded),
        }
    }

    /// Overrides the compression strategy used for newly created stores (has
    /// no effect once the dataset file already exists on disk, since the
    /// recorded strategy then wins).
    pub fn with_strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Builds a façade from a [`RagStoreConfig`] (spec §4.11 — the config
    /// layer carries `cache_dir`, `name`, and the default `strategy`).
    pub fn from_config(config: &RagStoreConfig) -> Self {
        Self::new(&config.name, &config.cache_dir).with_strategy(config.strategy)
    }

    /// Appends `sequence` to the dataset and `case` to the testcase log for
    /// the resulting fingerprint, saving both files. If `case.timestamp` is
    /// empty, injects the current instant (spec §4.7); callers that already
    /// stamped a timestamp keep it unchanged.
    ///
    /// Suppresses a duplicate: if any already-recorded case for this id has
    /// the same `question`, the new case is skipped rather than appended a
    /// second time.
    pub async fn append(&self, sequence: Vec<Chunk>, mut case: Testcase) -> Result<String> {
        if case.timestamp.is_empty() {
            case.timestamp = now_timestamp();
        }

        let mut guard = self.inner.lock().await;
        let inner = self.load_if_needed(&mut guard).await?;

        let id = inner.datasets.append(sequence).await?;

        let already_recorded = inner
            .testcases
            .get(&id)
            .iter()
            .any(|existing| existing.question == case.question);
        if already_recorded {
            tracing::debug!(id = %id, question = %case.question, "skipped duplicate question");
        } else {
            inner.testcases.append(&id, case).await?;
        }

        Ok(id)
    }

    /// Decompresses and returns the chunk sequence stored under `id`.
    pub async fn get_index(&self, id: &str) -> Result<Vec<Chunk>> {
        let mut guard = self.inner.lock().await;
        let inner = self.load_if_needed(&mut guard).await?;
        inner.datasets.get(id)
    }

    /// Returns all recorded test cases for `id`, or an empty list if none.
    pub async fn get_questions(&self, id: &str) -> Result<Vec<Testcase>> {
        let mut guard = self.inner.lock().await;
        let inner = self.load_if_needed(&mut guard).await?;
        Ok(inner.testcases.get(id))
    }

    /// Replaces the most recently recorded test case for `id`. A no-op if
    /// `id` has no recorded cases.
    pub async fn update_last_case(&self, id: &str, case: Testcase) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let inner = self.load_if_needed(&mut guard).await?;
        inner.testcases.update_last(id, case).await
    }

    /// Every recorded test case across every id, paired with the id it was
    /// recorded under.
    pub async fn all_testcases(&self) -> Result<Vec<(String, Testcase)>> {
        let mut guard = self.inner.lock().await;
        let inner = self.load_if_needed(&mut guard).await?;
        Ok(inner.testcases.all())
    }

    /// Forces the backing files to load without performing a read or write,
    /// useful for pre-warming before latency-sensitive calls.
    pub async fn ensure_loaded(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        self.load_if_needed(&mut guard).await?;
        Ok(())
    }

    async fn load_if_needed<'a>(&self, guard: &'a mut LoadState) -> Result<&'a mut Inner> {
        if matches!(guard, LoadState::NotLoaded) {
            let datasets = DatasetStore::load(self.dataset_path.clone(), self.default_strategy).await?;
            let testcases = TestcaseStore::load(self.testcase_path.clone()).await?;
            tracing::debug!(path = %self.dataset_path.display(), "loaded rag store");
            *guard = LoadState::Loaded(Inner { datasets, testcases });
        }
        match guard {
            LoadState::Loaded(inner) => Ok(inner),
            LoadState::NotLoaded => unreachable!("just loaded above"),
        }
    }
}
