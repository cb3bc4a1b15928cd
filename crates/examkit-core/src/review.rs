//! Review of a submitted attempt: aggregate statistics, tri-state
//! filtering, and per-question explanation visibility.
//!
//! Statistics and filtered subsets are pure functions of the result
//! collection; nothing here is cached, so the displayed numbers can never
//! drift from the data they summarize.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::model::{Attempt, ExamResult, QuestionGroup, QuestionId, QuestionResult};
use crate::organizer::{organize_by_part, PartItem};

/// Aggregate counts over a graded result collection.
///
/// `incorrect` is `total - correct`, so an unanswered question counts as
/// incorrect in the top-line ratio while still being reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewStatistics {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub percentage: u32,
}

impl ReviewStatistics {
    /// Derive statistics from the result collection. Empty input yields
    /// all-zero statistics, not an error.
    pub fn compute(results: &[QuestionResult]) -> Self {
        let total = results.len();
        let correct = results.iter().filter(|r| r.is_correct).count();
        let incorrect = total - correct;
        let unanswered = results.iter().filter(|r| r.is_unanswered()).count();
        let percentage = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            total,
            correct,
            incorrect,
            unanswered,
            percentage,
        }
    }
}

/// Which subset of results to display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultFilter {
    #[default]
    All,
    Correct,
    Incorrect,
}

impl ResultFilter {
    /// Pure predicate over one result; filtering never mutates the
    /// underlying collection.
    pub fn matches(&self, result: &QuestionResult) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Correct => result.is_correct,
            ResultFilter::Incorrect => !result.is_correct,
        }
    }
}

impl fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultFilter::All => write!(f, "all"),
            ResultFilter::Correct => write!(f, "correct"),
            ResultFilter::Incorrect => write!(f, "incorrect"),
        }
    }
}

impl FromStr for ResultFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ResultFilter::All),
            "correct" => Ok(ResultFilter::Correct),
            "incorrect" => Ok(ResultFilter::Incorrect),
            other => Err(format!("unknown filter: {other} (expected all, correct, incorrect)")),
        }
    }
}

/// A result-bearing entry within a part, mirroring the exam-taking layout.
#[derive(Debug, Clone)]
pub enum ReviewEntry {
    /// A group together with the graded results of its questions.
    Group {
        group: QuestionGroup,
        results: Vec<QuestionResult>,
    },
    /// A graded question with no owning group.
    Standalone(QuestionResult),
}

impl ReviewEntry {
    pub fn results(&self) -> Vec<&QuestionResult> {
        match self {
            ReviewEntry::Group { results, .. } => results.iter().collect(),
            ReviewEntry::Standalone(r) => vec![r],
        }
    }
}

impl PartItem for ReviewEntry {
    fn part_number(&self) -> u32 {
        match self {
            ReviewEntry::Group { group, .. } => group.part_number,
            ReviewEntry::Standalone(r) => r.question.part_number,
        }
    }

    fn first_question_number(&self) -> Option<u32> {
        match self {
            ReviewEntry::Group { results, .. } => {
                results.first().map(|r| r.question.question_number)
            }
            ReviewEntry::Standalone(r) => Some(r.question.question_number),
        }
    }
}

/// Assign each result to its owning group (else standalone) and organize
/// by part with the same ordering rules as the exam-taking view.
pub fn organize_review(
    results: &[QuestionResult],
    groups: &[QuestionGroup],
) -> BTreeMap<u32, Vec<ReviewEntry>> {
    let owner_of: HashMap<QuestionId, u64> = groups
        .iter()
        .flat_map(|g| g.questions.iter().map(|q| (q.question_id, g.group_id)))
        .collect();

    let mut grouped: HashMap<u64, Vec<QuestionResult>> = HashMap::new();
    let mut standalone = Vec::new();
    for result in results {
        match owner_of.get(&result.question.question_id) {
            Some(group_id) => grouped.entry(*group_id).or_default().push(result.clone()),
            None => standalone.push(ReviewEntry::Standalone(result.clone())),
        }
    }

    let mut entries = standalone;
    for group in groups {
        if let Some(mut owned) = grouped.remove(&group.group_id) {
            owned.sort_by_key(|r| r.question.question_number);
            entries.push(ReviewEntry::Group {
                group: group.clone(),
                results: owned,
            });
        }
    }

    organize_by_part(entries)
}

/// Which explanations are currently expanded, tracked per question over a
/// fixed id universe.
///
/// The "expand all / collapse all" label is derived from set sizes on every
/// read, never stored, so collapsing one question immediately flips
/// the global state back to "not all expanded".
#[derive(Debug, Clone)]
pub struct ExplanationState {
    expanded: HashSet<QuestionId>,
    universe: HashSet<QuestionId>,
}

impl ExplanationState {
    /// Track explanations for the given question ids, all collapsed.
    pub fn new(question_ids: impl IntoIterator<Item = QuestionId>) -> Self {
        Self {
            expanded: HashSet::new(),
            universe: question_ids.into_iter().collect(),
        }
    }

    pub fn is_expanded(&self, question_id: QuestionId) -> bool {
        self.expanded.contains(&question_id)
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// Flip one question's visibility; other questions are unaffected.
    /// Unknown ids are ignored. Returns the new visibility.
    pub fn toggle(&mut self, question_id: QuestionId) -> bool {
        if !self.universe.contains(&question_id) {
            return false;
        }
        if self.expanded.remove(&question_id) {
            false
        } else {
            self.expanded.insert(question_id);
            true
        }
    }

    pub fn expand_all(&mut self) {
        self.expanded = self.universe.clone();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Derived, never stored: every tracked question is expanded.
    pub fn all_expanded(&self) -> bool {
        !self.universe.is_empty() && self.expanded.len() == self.universe.len()
    }

    /// The global toggle: collapse everything when everything is expanded,
    /// otherwise expand everything. No intermediate state.
    pub fn toggle_all(&mut self) {
        if self.all_expanded() {
            self.collapse_all();
        } else {
            self.expand_all();
        }
    }
}

/// A loaded, graded attempt ready for display.
pub struct Review {
    attempt: Attempt,
    results: Vec<QuestionResult>,
    groups: Vec<QuestionGroup>,
}

impl Review {
    pub fn new(result: ExamResult) -> Self {
        Self {
            attempt: result.attempt,
            results: result.questions,
            groups: result.groups,
        }
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    /// Statistics derived on demand from the result collection.
    pub fn statistics(&self) -> ReviewStatistics {
        ReviewStatistics::compute(&self.results)
    }

    /// Results matching the filter, in server order.
    pub fn filtered(&self, filter: ResultFilter) -> Vec<&QuestionResult> {
        self.results.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Per-part entries ordered identically to the exam-taking view.
    pub fn parts(&self) -> BTreeMap<u32, Vec<ReviewEntry>> {
        organize_review(&self.results, &self.groups)
    }

    /// Explanation visibility tracker covering every result.
    pub fn explanation_state(&self) -> ExplanationState {
        ExplanationState::new(self.results.iter().map(|r| r.question.question_id))
    }
}
