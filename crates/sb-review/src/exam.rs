//! Multiple-choice exams: questions, the user's selections, and grading.
//!
//! Every question is "select all that apply". A question counts as correct
//! only when the selected options are exactly the correct options.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ParseError,
    score::Score,
    shuffle::{RandomSource, sample, shuffle},
};

/// Minimum number of options a question may have.
pub const MIN_OPTIONS: usize = 2;

/// Maximum number of options a question may have.
pub const MAX_OPTIONS: usize = 5;

/// Which series an exam belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    /// Lecture exams 1 to 3.
    Lecture,
    /// Lab exams 1 to 5.
    Lab,
}

impl ExamType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::Lab => "lab",
        }
    }

    /// Highest exam number available in this series.
    pub const fn max_exam_number(self) -> i32 {
        match self {
            Self::Lecture => 3,
            Self::Lab => 5,
        }
    }

    /// Whether `number` names an exam of this series.
    pub const fn accepts(self, number: i32) -> bool {
        number >= 1 && number <= self.max_exam_number()
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lecture" => Ok(Self::Lecture),
            "lab" => Ok(Self::Lab),
            _ => Err(ParseError::ExamType(s.to_string())),
        }
    }
}

/// One answer choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamOption {
    /// Text shown to the user.
    pub text: String,
    /// Whether selecting this option is required for a correct answer.
    pub correct: bool,
}

/// A multiple-choice question. Any number of options may be correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stored question id.
    pub id: Uuid,
    /// Question text.
    pub text: String,
    /// Options in display order.
    pub options: Vec<ExamOption>,
}

impl Question {
    /// Indices of the options marked correct.
    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(idx, option)| option.correct.then_some(idx))
            .collect()
    }
}

static NO_SELECTION: BTreeSet<usize> = BTreeSet::new();

/// Options selected by the user, per question index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamAttempt {
    selections: BTreeMap<usize, BTreeSet<usize>>,
}

impl ExamAttempt {
    /// An attempt with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the option if it was not selected, deselect it otherwise.
    ///
    /// Returns whether the option is selected afterwards.
    pub fn toggle(&mut self, question: usize, option: usize) -> bool {
        let selected = self.selections.entry(question).or_default();
        if selected.remove(&option) {
            if selected.is_empty() {
                self.selections.remove(&question);
            }
            false
        } else {
            selected.insert(option);
            true
        }
    }

    /// Options selected for a question; empty when nothing was selected.
    pub fn selected(&self, question: usize) -> &BTreeSet<usize> {
        self.selections.get(&question).unwrap_or(&NO_SELECTION)
    }

    /// Number of questions with at least one selected option.
    pub fn answered_count(&self) -> usize {
        self.selections.values().filter(|s| !s.is_empty()).count()
    }

    /// Every question in `0..question_count` has at least one selection.
    pub fn is_complete(&self, question_count: usize) -> bool {
        (0..question_count).all(|idx| !self.selected(idx).is_empty())
    }
}

impl FromIterator<(usize, usize)> for ExamAttempt {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut attempt = Self::new();
        for (question, option) in iter {
            attempt.selections.entry(question).or_default().insert(option);
        }
        attempt
    }
}

/// Build the question list of one exam session.
///
/// Samples up to `count` questions and shuffles the options of each one,
/// both with Fisher–Yates over the same random source.
pub fn prepare_exam<R>(questions: Vec<Question>, count: usize, rng: &mut R) -> Vec<Question>
where
    R: RandomSource + ?Sized,
{
    let mut picked = sample(questions, count, rng);
    for question in &mut picked {
        shuffle(&mut question.options, rng);
    }
    picked
}

/// Exact-set comparison between a selection and the correct options.
///
/// A question without any correct option is only passed by selecting nothing.
pub fn is_correct(question: &Question, selection: &BTreeSet<usize>) -> bool {
    question.correct_indices() == *selection
}

/// Grade an attempt. No partial credit; an empty exam scores `0/0`.
pub fn grade_exam(questions: &[Question], attempt: &ExamAttempt) -> Score {
    let correct_answers = questions
        .iter()
        .enumerate()
        .filter(|(idx, question)| is_correct(question, attempt.selected(*idx)))
        .count();

    Score::new(saturating_count(correct_answers), saturating_count(questions.len()))
}

fn saturating_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// How an option is shown once the exam is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    /// Selected and correct.
    Hit,
    /// Correct but not selected.
    Missed,
    /// Selected but not correct.
    Wrong,
    /// Neither selected nor correct.
    Unmarked,
}

/// Per-question feedback after grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// Question the feedback belongs to.
    pub question_id: Uuid,
    /// Whether the selection matched exactly.
    pub correct: bool,
    /// One mark per option, in display order.
    pub marks: Vec<OptionMark>,
}

/// Mark every option of every question against the user's selection.
pub fn review_exam(questions: &[Question], attempt: &ExamAttempt) -> Vec<QuestionReview> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let selected = attempt.selected(idx);
            let marks = question
                .options
                .iter()
                .enumerate()
                .map(|(option_idx, option)| {
                    match (selected.contains(&option_idx), option.correct) {
                        (true, true) => OptionMark::Hit,
                        (false, true) => OptionMark::Missed,
                        (true, false) => OptionMark::Wrong,
                        (false, false) => OptionMark::Unmarked,
                    }
                })
                .collect();

            QuestionReview {
                question_id: question.id,
                correct: is_correct(question, selected),
                marks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::ScriptedSource;

    fn question(correct: &[bool]) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "Which apply?".to_string(),
            options: correct
                .iter()
                .enumerate()
                .map(|(idx, &correct)| ExamOption {
                    text: format!("option {idx}"),
                    correct,
                })
                .collect(),
        }
    }

    fn selection(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_exact_match_semantics() {
        let q = question(&[true, false, true]);
        assert_eq!(q.correct_indices(), selection(&[0, 2]));

        assert!(is_correct(&q, &selection(&[0, 2])));
        assert!(!is_correct(&q, &selection(&[0])), "subset is wrong");
        assert!(!is_correct(&q, &selection(&[0, 1, 2])), "superset is wrong");
        assert!(!is_correct(&q, &selection(&[1])));
        assert!(!is_correct(&q, &selection(&[])));
    }

    #[test]
    fn test_question_without_correct_option() {
        let q = question(&[false, false]);
        assert!(is_correct(&q, &selection(&[])));
        assert!(!is_correct(&q, &selection(&[0])));
    }

    #[test]
    fn test_grade_counts_correct_questions() {
        let questions = vec![question(&[true, false]), question(&[false, true, true])];
        let attempt: ExamAttempt = [(0, 0), (1, 1)].into_iter().collect();

        assert_eq!(grade_exam(&questions, &attempt), Score::new(1, 2));
    }

    #[test]
    fn test_counts_saturate_instead_of_wrapping() {
        assert_eq!(saturating_count(30), 30);
        assert_eq!(saturating_count(i32::MAX as usize + 1), i32::MAX);
        assert_eq!(saturating_count(usize::MAX), i32::MAX);
    }

    #[test]
    fn test_grade_empty_exam() {
        assert_eq!(grade_exam(&[], &ExamAttempt::new()), Score::new(0, 0));
    }

    #[test]
    fn test_missing_selection_is_wrong() {
        let questions = vec![question(&[true, false]), question(&[false, true])];
        let attempt: ExamAttempt = [(0, 0)].into_iter().collect();

        assert_eq!(grade_exam(&questions, &attempt), Score::new(1, 2));
    }

    #[test]
    fn test_toggle() {
        let mut attempt = ExamAttempt::new();
        assert!(attempt.toggle(0, 2));
        assert!(attempt.toggle(0, 1));
        assert_eq!(attempt.selected(0), &selection(&[1, 2]));

        assert!(!attempt.toggle(0, 2));
        assert_eq!(attempt.selected(0), &selection(&[1]));

        assert!(!attempt.toggle(0, 1));
        assert!(attempt.selected(0).is_empty());
        assert_eq!(attempt.answered_count(), 0);
    }

    #[test]
    fn test_is_complete() {
        let mut attempt = ExamAttempt::new();
        assert!(attempt.is_complete(0));
        assert!(!attempt.is_complete(2));

        attempt.toggle(0, 0);
        assert!(!attempt.is_complete(2));
        attempt.toggle(1, 3);
        assert!(attempt.is_complete(2));
        assert_eq!(attempt.answered_count(), 2);
    }

    #[test]
    fn test_review_marks() {
        let questions = vec![question(&[true, false, true, false])];
        let attempt: ExamAttempt = [(0, 0), (0, 1)].into_iter().collect();

        let review = review_exam(&questions, &attempt);
        assert_eq!(review.len(), 1);
        assert!(!review[0].correct);
        assert_eq!(
            review[0].marks,
            vec![
                OptionMark::Hit,
                OptionMark::Wrong,
                OptionMark::Missed,
                OptionMark::Unmarked
            ]
        );
    }

    #[test]
    fn test_prepare_exam_samples_and_shuffles_options() {
        let questions: Vec<Question> = (0..4).map(|_| question(&[true, false, false])).collect();
        let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let mut rng = ScriptedSource::new(vec![0.0]);

        let prepared = prepare_exam(questions, 2, &mut rng);

        // All-zero source rotates [q0, q1, q2, q3] into [q1, q2, q3, q0]
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].id, ids[1]);
        assert_eq!(prepared[1].id, ids[2]);

        // Options [correct, wrong, wrong] rotate so the correct one moves last
        for q in &prepared {
            assert_eq!(q.correct_indices(), selection(&[2]));
            assert_eq!(q.options.len(), 3);
        }
    }

    #[test]
    fn test_exam_type() {
        assert_eq!("Lab".parse::<ExamType>(), Ok(ExamType::Lab));
        assert!("quiz".parse::<ExamType>().is_err());
        assert!(ExamType::Lecture.accepts(3));
        assert!(!ExamType::Lecture.accepts(4));
        assert!(ExamType::Lab.accepts(5));
        assert!(!ExamType::Lab.accepts(0));
    }
}
