use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally supplied question record. Content generation and scoring live
/// outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    /// Multiple-choice options; `None` for free-text questions
    pub options: Option<Vec<String>>,
}

/// How a question slot was resolved. `TimeoutSkipped` (grace-timer expiry) is
/// kept distinct from a plain `Skipped` (answering window elapsed with no
/// answer) so downstream scoring can tell an integrity timeout from an
/// ordinary blank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QuestionOutcome {
    Answered,
    Skipped,
    TimeoutSkipped,
}

/// The frozen end-of-exam payload handed to the result sink exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSubmission {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub answers: BTreeMap<String, String>,
    pub outcomes: BTreeMap<String, QuestionOutcome>,
}

/// External collaborator that receives the final answer set. Network or disk
/// persistence is its problem, not this crate's.
pub trait ResultSink: Send + Sync {
    fn submit(&self, submission: ExamSubmission) -> Result<()>;
}

/// Owns the ordered question list, the answer map, and the cursor. The answer
/// map is append-only until `freeze` is called, after which the timeline is
/// inert: `freeze` returns a payload at most once, which is the submission
/// idempotence guard.
#[derive(Debug)]
pub struct SessionTimeline {
    session_id: String,
    questions: Vec<Question>,
    answers: BTreeMap<String, String>,
    outcomes: BTreeMap<String, QuestionOutcome>,
    index: usize,
    started_at: DateTime<Utc>,
    submitted: bool,
}

impl SessionTimeline {
    pub fn new(session_id: String, questions: Vec<Question>, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id,
            questions,
            answers: BTreeMap::new(),
            outcomes: BTreeMap::new(),
            index: 0,
            started_at,
            submitted: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn answer_for_current(&self) -> Option<&String> {
        self.current().and_then(|q| self.answers.get(&q.id))
    }

    /// Record an answer for the current question. Phase gating (answering
    /// window only, verification complete) is the controller's job; the
    /// timeline only refuses writes once frozen or exhausted. The last write
    /// before the window closes wins.
    pub fn record_answer(&mut self, answer: String) -> bool {
        if self.submitted {
            return false;
        }
        let Some(question) = self.questions.get(self.index) else {
            return false;
        };
        self.answers.insert(question.id.clone(), answer);
        true
    }

    /// Close out the current question with the given outcome and move the
    /// cursor forward. Returns the new index while questions remain.
    pub fn advance(&mut self, outcome: QuestionOutcome) -> Option<usize> {
        if let Some(question) = self.questions.get(self.index) {
            self.outcomes.insert(question.id.clone(), outcome);
        }
        self.index += 1;
        if self.index < self.questions.len() {
            Some(self.index)
        } else {
            None
        }
    }

    /// Freeze the answer map and build the submission payload. Returns `None`
    /// on every call after the first, regardless of which trigger fired.
    pub fn freeze(&mut self, now: DateTime<Utc>) -> Option<ExamSubmission> {
        if self.submitted {
            return None;
        }
        self.submitted = true;

        // Questions never reached get an explicit Skipped outcome so the
        // report covers the whole set
        for question in &self.questions {
            self.outcomes
                .entry(question.id.clone())
                .or_insert(QuestionOutcome::Skipped);
        }

        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0) as u64;
        Some(ExamSubmission {
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            submitted_at: now,
            elapsed_ms,
            answers: self.answers.clone(),
            outcomes: self.outcomes.clone(),
        })
    }
}
