//! Answer progress derivation.
//!
//! Progress is a view over the answer map, recomputed on demand. It is
//! never stored as an independent field that could drift from the map.

use crate::model::AnswerMap;

/// Answered/total counts and completion percentage for a live attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub percent: u32,
}

impl Progress {
    /// Derive progress from the answer map and the exam's question count.
    ///
    /// An exam with no questions reports 0%, not an error.
    pub fn compute(answers: &AnswerMap, total: usize) -> Self {
        let answered = answers.len();
        let percent = if total == 0 {
            0
        } else {
            ((answered as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            answered,
            total,
            percent,
        }
    }
}
