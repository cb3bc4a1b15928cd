//! Core data model types for examkit.
//!
//! These are the wire types consumed from the exam API: exam metadata,
//! question groups, standalone questions, and the per-question results
//! returned after a submitted attempt.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Server-assigned question identifier.
pub type QuestionId = u64;

/// The complete in-progress record of a user's answers, keyed by question id.
///
/// Absence of a key means "unanswered"; the map never stores a sentinel
/// for a skipped question.
pub type AnswerMap = HashMap<QuestionId, String>;

/// Exam metadata as listed in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    /// Server-assigned exam identifier.
    pub exam_id: u64,
    /// Exam title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Time limit for an attempt.
    pub duration_minutes: u32,
    /// Declared question count (the loaded structure is authoritative).
    pub total_questions: u32,
    /// Exam format tag.
    #[serde(default, rename = "type")]
    pub exam_type: Option<ExamType>,
}

/// Supported exam formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    /// Combined reading + listening (multi-part TOEIC style).
    #[serde(rename = "readlis")]
    ReadingListening,
    #[serde(rename = "speaking")]
    Speaking,
    #[serde(rename = "writing")]
    Writing,
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::ReadingListening => write!(f, "readlis"),
            ExamType::Speaking => write!(f, "speaking"),
            ExamType::Writing => write!(f, "writing"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "readlis" => Ok(ExamType::ReadingListening),
            "speaking" => Ok(ExamType::Speaking),
            "writing" => Ok(ExamType::Writing),
            other => Err(format!("unknown exam type: {other}")),
        }
    }
}

/// Full exam structure: metadata plus every question-bearing entity.
///
/// Immutable for the lifetime of a session once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamDetail {
    #[serde(flatten)]
    pub exam: Exam,
    /// Question groups sharing context (a passage, image, or audio clip).
    #[serde(default)]
    pub groups: Vec<QuestionGroup>,
    /// Questions with no shared group context.
    #[serde(default)]
    pub standalone_questions: Vec<Question>,
    /// Exam-wide audio track, if any.
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl ExamDetail {
    /// Total number of questions across groups and standalone items.
    pub fn question_count(&self) -> usize {
        self.groups.iter().map(|g| g.questions.len()).sum::<usize>()
            + self.standalone_questions.len()
    }

    /// All question ids present in the loaded structure.
    pub fn question_ids(&self) -> HashSet<QuestionId> {
        self.questions().map(|q| q.question_id).collect()
    }

    /// Iterate over every question, grouped first, then standalone.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.groups
            .iter()
            .flat_map(|g| g.questions.iter())
            .chain(self.standalone_questions.iter())
    }
}

/// A set of questions sharing common context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGroup {
    pub group_id: u64,
    pub part_number: u32,
    /// Shared passage or dialogue text.
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Audio transcript, shown only when reviewing a submitted attempt.
    #[serde(default)]
    pub transcript: Option<String>,
    /// Owned questions, in display order.
    pub questions: Vec<Question>,
}

/// A single exam question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub part_number: u32,
    /// Global ordering key, unique within an exam.
    pub question_number: u32,
    #[serde(default)]
    pub question_text: Option<String>,
    /// Answer options; empty for free-response items.
    #[serde(default)]
    pub options: Vec<String>,
    /// Format tag (e.g. "Opinion Essay", "Read Aloud").
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub audio_urls: Vec<String>,
}

impl Question {
    /// Whether this question takes free text rather than an option choice.
    ///
    /// A typed question without options is free-response; an untyped
    /// question without options is treated as malformed rather than as an
    /// input field, matching the source UI.
    pub fn is_free_response(&self) -> bool {
        self.options.is_empty() && self.question_type.is_some()
    }
}

/// A scored, submitted attempt. Scores are server-computed; the client
/// never derives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub attempt_id: u64,
    pub score_listening: i32,
    pub score_reading: i32,
    pub total_score: i32,
}

/// A question enriched with the server's grading outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    #[serde(flatten)]
    pub question: Question,
    /// The answer the user submitted, if any.
    #[serde(default)]
    pub user_selected: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    /// Authoritative from the server.
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionResult {
    /// A question the user never answered.
    pub fn is_unanswered(&self) -> bool {
        self.user_selected.is_none()
    }
}

/// The server's full response for a submitted attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub attempt: Attempt,
    #[serde(default)]
    pub questions: Vec<QuestionResult>,
    #[serde(default)]
    pub groups: Vec<QuestionGroup>,
}
