//! Evening carry-over: the night before each exam is spent on that exam.
//!
//! Runs on finished sessions. For an exam on day D the Evening session on
//! D-1 is pinned to the exam's subject, unless
//! - D-1 has no Evening session,
//! - an exam is itself sat on D-1 Evening,
//! - the session is already pinned to a different subject, or
//! - the subject's first paper is already over by D-1 Evening.
//!
//! Pinning sets both `subject` and `forced_subject`, so re-running is a no-op.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::exam_index::ExamIndex;
use crate::schedule::{Block, Session};

/// Apply the carry-over rule in place. Returns how many sessions were pinned
/// or re-confirmed.
pub fn apply_evening_carry_over(sessions: &mut [Session], index: &ExamIndex) -> usize {
    let mut by_date: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
    for (i, session) in sessions.iter().enumerate() {
        by_date.entry(session.date).or_default().push(i);
    }
    for indices in by_date.values_mut() {
        indices.sort_by_key(|&i| sessions[i].block);
    }

    let mut pinned = 0;
    for exam in index.sorted() {
        // Calendar arithmetic, so month and year boundaries roll over.
        let Some(eve) = exam.exam_date.pred_opt() else {
            continue;
        };
        let Some(evening) = by_date
            .get(&eve)
            .and_then(|indices| indices.iter().copied().find(|&i| sessions[i].block == Block::Evening))
        else {
            continue;
        };

        if index.has_exam_in_slot(eve, Block::Evening) {
            tracing::debug!(date = %eve, subject = %exam.subject, "evening exam blocks carry-over");
            continue;
        }

        let session = &mut sessions[evening];
        if let Some(forced) = &session.forced_subject {
            if forced != &exam.subject {
                continue;
            }
        }
        if !index.allows(&exam.subject, eve, Block::Evening) {
            continue;
        }

        if session.subject != exam.subject {
            tracing::debug!(
                session = %session.id,
                from = %session.subject,
                to = %exam.subject,
                "pinning evening before exam"
            );
        }
        session.subject = exam.subject.clone();
        session.forced_subject = Some(exam.subject.clone());
        pinned += 1;
    }
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Exam;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exam(subject: &str, date: NaiveDate, block: Block) -> Exam {
        Exam {
            id: format!("exam-{subject}-{date}"),
            subject: subject.to_string(),
            exam_date: date,
            time_of_day: block,
            board: None,
            teacher: None,
        }
    }

    fn session(id: &str, date: NaiveDate, block: Block, subject: &str) -> Session {
        Session {
            id: id.to_string(),
            date,
            block,
            subject: subject.to_string(),
            start_time: "18:00".to_string(),
            end_time: "20:00".to_string(),
            forced_subject: None,
        }
    }

    #[test]
    fn evening_before_exam_is_forced() {
        let eve = ymd(2024, 3, 9);
        let mut sessions = vec![
            session("s1", eve, Block::Morning, "History"),
            session("s2", eve, Block::Evening, "History"),
        ];
        let index = ExamIndex::new(&[
            exam("Maths", ymd(2024, 3, 10), Block::Morning),
            exam("History", ymd(2024, 3, 20), Block::Morning),
        ]);

        let pinned = apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(pinned, 1);
        assert_eq!(sessions[1].subject, "Maths");
        assert_eq!(sessions[1].forced_subject.as_deref(), Some("Maths"));
        assert_eq!(sessions[0].subject, "History");
        assert_eq!(sessions[0].forced_subject, None);
    }

    #[test]
    fn competing_evening_exam_blocks_forcing() {
        let eve = ymd(2024, 3, 9);
        let mut sessions = vec![session("s1", eve, Block::Evening, "History")];
        let index = ExamIndex::new(&[
            exam("Maths", ymd(2024, 3, 10), Block::Morning),
            exam("Physics", eve, Block::Evening),
            exam("History", ymd(2024, 3, 20), Block::Morning),
        ]);

        apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(sessions[0].subject, "History");
        assert_eq!(sessions[0].forced_subject, None);
    }

    #[test]
    fn morning_exam_on_previous_day_does_not_block() {
        let eve = ymd(2024, 3, 9);
        let mut sessions = vec![session("s1", eve, Block::Evening, "History")];
        let index = ExamIndex::new(&[
            exam("Physics", eve, Block::Morning),
            exam("Maths", ymd(2024, 3, 10), Block::Morning),
            exam("History", ymd(2024, 3, 20), Block::Morning),
        ]);

        apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(sessions[0].subject, "Maths");
    }

    #[test]
    fn first_pin_is_kept_for_same_day_exams() {
        let eve = ymd(2024, 3, 9);
        let mut sessions = vec![session("s1", eve, Block::Evening, "History")];
        let index = ExamIndex::new(&[
            exam("Maths", ymd(2024, 3, 10), Block::Morning),
            exam("Physics", ymd(2024, 3, 10), Block::Afternoon),
        ]);

        apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(sessions[0].subject, "Maths");
        assert_eq!(sessions[0].forced_subject.as_deref(), Some("Maths"));
    }

    #[test]
    fn reapplying_is_idempotent() {
        let eve = ymd(2024, 3, 9);
        let mut sessions = vec![
            session("s1", eve, Block::Evening, "History"),
            session("s2", ymd(2024, 3, 14), Block::Evening, "Maths"),
        ];
        let index = ExamIndex::new(&[
            exam("Maths", ymd(2024, 3, 10), Block::Morning),
            exam("Physics", ymd(2024, 3, 10), Block::Evening),
            exam("History", ymd(2024, 3, 15), Block::Afternoon),
        ]);

        apply_evening_carry_over(&mut sessions, &index);
        let once = sessions.clone();
        apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(sessions, once);
        assert_eq!(sessions[1].subject, "History");
    }

    #[test]
    fn previous_day_rolls_over_month_and_year() {
        let mut sessions = vec![
            session("s1", ymd(2024, 2, 29), Block::Evening, "History"),
            session("s2", ymd(2023, 12, 31), Block::Evening, "History"),
        ];
        let index = ExamIndex::new(&[
            exam("Maths", ymd(2024, 3, 1), Block::Morning),
            exam("Art", ymd(2024, 1, 1), Block::Afternoon),
            exam("History", ymd(2024, 6, 1), Block::Morning),
        ]);

        apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(sessions[0].subject, "Maths");
        assert_eq!(sessions[1].subject, "Art");
    }

    #[test]
    fn subject_already_examined_is_not_forced_again() {
        // Maths paper 1 on the 5th, paper 2 on the 10th: no Maths on the 9th
        let mut sessions = vec![session("s1", ymd(2024, 3, 9), Block::Evening, "History")];
        let index = ExamIndex::new(&[
            exam("Maths", ymd(2024, 3, 5), Block::Morning),
            exam("Maths", ymd(2024, 3, 10), Block::Morning),
            exam("History", ymd(2024, 3, 20), Block::Morning),
        ]);

        apply_evening_carry_over(&mut sessions, &index);

        assert_eq!(sessions[0].subject, "History");
    }
}
