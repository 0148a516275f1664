//! Date-ordered exam lookups shared by the assignment passes and the
//! evening carry-over.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::schedule::{Block, Exam};

/// Exams sorted by date with (date, block) and subject lookups.
#[derive(Debug, Clone)]
pub struct ExamIndex {
    sorted: Vec<Exam>,
    exam_slots: HashSet<(NaiveDate, Block)>,
    deadlines: HashMap<String, (NaiveDate, Block)>,
}

impl ExamIndex {
    /// Build the index. Exams on the same date keep their input order.
    pub fn new(exams: &[Exam]) -> Self {
        let mut sorted = exams.to_vec();
        sorted.sort_by_key(|exam| exam.exam_date);

        let exam_slots: HashSet<(NaiveDate, Block)> = sorted.iter().map(Exam::position).collect();
        let mut deadlines: HashMap<String, (NaiveDate, Block)> = HashMap::new();

        for exam in &sorted {
            deadlines
                .entry(exam.subject.clone())
                .and_modify(|d| *d = (*d).min(exam.position()))
                .or_insert_with(|| exam.position());
        }

        Self {
            sorted,
            exam_slots,
            deadlines,
        }
    }

    /// Exams in ascending date order.
    pub fn sorted(&self) -> &[Exam] {
        &self.sorted
    }

    /// Whether any exam is sat in exactly this (date, block).
    pub fn has_exam_in_slot(&self, date: NaiveDate, block: Block) -> bool {
        self.exam_slots.contains(&(date, block))
    }

    /// Earliest (date, block) at which `subject` is examined.
    pub fn deadline(&self, subject: &str) -> Option<(NaiveDate, Block)> {
        self.deadlines.get(subject).copied()
    }

    /// Whether `subject` may still be studied at (date, block).
    ///
    /// False for subjects with no exam at all.
    pub fn allows(&self, subject: &str, date: NaiveDate, block: Block) -> bool {
        self.deadline(subject)
            .is_some_and(|deadline| (date, block) < deadline)
    }

    /// Subjects whose first exam falls on a date strictly after `date`,
    /// sorted by name.
    pub fn subjects_after(&self, date: NaiveDate) -> Vec<&str> {
        let mut subjects: Vec<&str> = self
            .deadlines
            .iter()
            .filter(|(_, (exam_date, _))| *exam_date > date)
            .map(|(subject, _)| subject.as_str())
            .collect();
        subjects.sort_unstable();
        subjects
    }
}
