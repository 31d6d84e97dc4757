/// The test-case record model and `TestcaseStore`: a mapping
/// `index fingerprint → list of test-case records` accumulated over time.
use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::persistence;

/// A single question/answer record associated with one stored index.
///
/// `question` and `timestamp` are the only fields every record carries;
/// everything else a caller submits is preserved verbatim in `extra` and
/// round-trips through persistence unexamined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testcase {
    pub question: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_answers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_answers: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Testcase {
    pub fn new(question: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            timestamp: timestamp.into(),
            answer: None,
            returned_answer: None,
            true_answers: None,
            wrong_answers: None,
            extra: Map::new(),
        }
    }
}

type Cases = Vec<Testcase>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TestcaseFile {
    #[serde(alias = "questions")]
    index_to_cases: HashMap<String, Cases>,
}

/// A mapping `index fingerprint → list of test-case records`.
///
/// Lookups on an unknown id never fail (spec §4.5): `get` returns an empty
/// list rather than an error, since "no questions recorded yet" is a normal
/// state, not a corruption.
pub struct TestcaseStore {
    path: PathBuf,
    entries: HashMap<String, Cases>,
}

impl TestcaseStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: HashMap::new(),
        }
    }

    pub async fn load(path: PathBuf) -> Result<Self> {
        match persistence::load::<TestcaseFile>(&path).await? {
            Some(file) => Ok(Self {
                path,
                entries: file.index_to_cases,
            }),
            None => Ok(Self::new(path)),
        }
    }

    /// Appends `case` to the list recorded under `id`, creating the list if
    /// absent, and saves the testcase file.
    pub async fn append(&mut self, id: &str, case: Testcase) -> Result<()> {
        self.entries.entry(id.to_string()).or_default().push(case);
        self.save().await
    }

    /// All cases recorded under `id`, in append order. Never fails; an
    /// unknown id yields an empty list.
    pub fn get(&self, id: &str) -> Cases {
        self.entries.get(id).cloned().unwrap_or_default()
    }

    /// Every recorded case across every id, paired with the id it was
    /// recorded under. Order is unspecified; callers that care about
    /// chronology sort by `Testcase::timestamp` themselves.
    pub fn all(&self) -> Vec<(String, Testcase)> {
        self.entries
            .iter()
            .flat_map(|(id, cases)| cases.iter().map(move |case| (id.clone(), case.clone())))
            .collect()
    }

    /// Replaces the most recently appended case under `id` with `case`. A
    /// no-op if `id` has no recorded cases.
    pub async fn update_last(&mut self, id: &str, case: Testcase) -> Result<()> {
        if let Some(cases) = self.entries.get_mut(id) {
            if let Some(last) = cases.last_mut() {
                *last = case;
                self.save().await?;
            }
        }
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        let file = TestcaseFile {
            index_to_cases: self.entries.clone(),
        };
        persistence::save(&self.path, &file).await
    }
}
