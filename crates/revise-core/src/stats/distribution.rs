//! Per-subject distribution of a timetable, for display.
//!
//! The proximity weight says how much attention a subject "deserves" given
//! how close its exam is. It is advisory only; the generator never reads it.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scheduler::ExamIndex;
use crate::schedule::{Exam, Session};

/// Distribution figures for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDistribution {
    pub subject: String,
    /// First exam date for the subject
    pub exam_date: NaiveDate,
    /// Days from `today` to the first exam; negative once it has passed
    pub days_until: i64,
    pub sessions: usize,
    pub forced_sessions: usize,
    /// Fraction of all sessions spent on this subject (0.0-1.0)
    pub share: f64,
    /// Normalised proximity weight (0.0-1.0, sums to 1 over upcoming subjects)
    pub proximity_weight: f64,
}

/// Compute the distribution for every examined subject, ordered by first
/// exam date then name.
pub fn subject_distribution(
    sessions: &[Session],
    exams: &[Exam],
    today: NaiveDate,
) -> Vec<SubjectDistribution> {
    let index = ExamIndex::new(exams);

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for session in sessions {
        let entry = counts.entry(session.subject.as_str()).or_default();
        entry.0 += 1;
        if session.forced_subject.is_some() {
            entry.1 += 1;
        }
    }
    let total = sessions.len();

    let mut rows: Vec<SubjectDistribution> = Vec::new();
    for exam in index.sorted() {
        if rows.iter().any(|row| row.subject == exam.subject) {
            continue;
        }
        let Some((exam_date, _)) = index.deadline(&exam.subject) else {
            continue;
        };
        let (count, forced) = counts.get(exam.subject.as_str()).copied().unwrap_or_default();
        rows.push(SubjectDistribution {
            subject: exam.subject.clone(),
            exam_date,
            days_until: (exam_date - today).num_days(),
            sessions: count,
            forced_sessions: forced,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
            proximity_weight: 0.0,
        });
    }

    let raw: Vec<f64> = rows
        .iter()
        .map(|row| {
            if row.days_until < 0 {
                0.0
            } else {
                1.0 / (row.days_until as f64 + 1.0)
            }
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum > 0.0 {
        for (row, weight) in rows.iter_mut().zip(raw) {
            row.proximity_weight = weight / sum;
        }
    }

    rows.sort_by(|a, b| {
        a.exam_date
            .cmp(&b.exam_date)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    rows
}
