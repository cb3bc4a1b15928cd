//! Part organization: bucketing question-bearing entities by part number
//! and ordering them by first question number.
//!
//! The same algorithm orders both the exam-taking view and the review view,
//! so both screens present questions identically. It is deterministic and
//! idempotent: question numbers are globally unique, so the sort key never
//! ties, and re-running on the same input yields identical output.

use std::collections::BTreeMap;

use crate::model::{ExamDetail, Question, QuestionGroup};

/// An entity that can be placed into a part bucket and ordered within it.
pub trait PartItem {
    fn part_number(&self) -> u32;

    /// The smallest question number the entity contains. `None` for an
    /// empty group, which sorts first (the source UI treats a missing
    /// number as 0).
    fn first_question_number(&self) -> Option<u32>;
}

/// A question-bearing entry within a part: a group or a standalone question.
#[derive(Debug, Clone)]
pub enum PartEntry {
    Group(QuestionGroup),
    Standalone(Question),
}

impl PartEntry {
    /// The questions this entry contributes, in display order.
    pub fn questions(&self) -> Vec<&Question> {
        match self {
            PartEntry::Group(g) => g.questions.iter().collect(),
            PartEntry::Standalone(q) => vec![q],
        }
    }
}

impl PartItem for PartEntry {
    fn part_number(&self) -> u32 {
        match self {
            PartEntry::Group(g) => g.part_number,
            PartEntry::Standalone(q) => q.part_number,
        }
    }

    fn first_question_number(&self) -> Option<u32> {
        match self {
            PartEntry::Group(g) => g.questions.first().map(|q| q.question_number),
            PartEntry::Standalone(q) => Some(q.question_number),
        }
    }
}

/// Bucket items by part number and sort each bucket by first question number.
pub fn organize_by_part<T: PartItem>(items: Vec<T>) -> BTreeMap<u32, Vec<T>> {
    let mut parts: BTreeMap<u32, Vec<T>> = BTreeMap::new();
    for item in items {
        parts.entry(item.part_number()).or_default().push(item);
    }
    for entries in parts.values_mut() {
        entries.sort_by_key(|e| e.first_question_number().unwrap_or(0));
    }
    parts
}

/// Organize a loaded exam structure into per-part display order.
pub fn organize_detail(detail: &ExamDetail) -> BTreeMap<u32, Vec<PartEntry>> {
    let entries = detail
        .groups
        .iter()
        .cloned()
        .map(PartEntry::Group)
        .chain(
            detail
                .standalone_questions
                .iter()
                .cloned()
                .map(PartEntry::Standalone),
        )
        .collect();
    organize_by_part(entries)
}
