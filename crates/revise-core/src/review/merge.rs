//! Id-keyed merge of review updates into a local schedule.

use std::collections::HashMap;

use super::response::SessionUpdate;
use crate::schedule::Session;

/// Replace the subject of every session named in `updates`.
///
/// Only `subject` changes. Ids that match nothing are ignored, sessions not
/// named are untouched, and the result keeps the local order. When an id is
/// listed twice the later entry wins.
pub fn merge_updates(local: &[Session], updates: &[SessionUpdate]) -> Vec<Session> {
    let by_id: HashMap<&str, &str> = updates
        .iter()
        .map(|update| (update.id.as_str(), update.subject.as_str()))
        .collect();

    local
        .iter()
        .map(|session| {
            let mut merged = session.clone();
            if let Some(subject) = by_id.get(session.id.as_str()) {
                merged.subject = (*subject).to_string();
            }
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Block;
    use chrono::NaiveDate;

    fn local_schedule() -> Vec<Session> {
        let subjects = ["Maths", "Physics", "Biology", "Maths", "History"];
        subjects
            .iter()
            .enumerate()
            .map(|(i, subject)| Session {
                id: format!("s{}", i + 1),
                date: NaiveDate::from_ymd_opt(2024, 3, 1 + i as u32).unwrap(),
                block: Block::ORDER[i % 3],
                subject: subject.to_string(),
                start_time: "09:00".to_string(),
                end_time: "12:00".to_string(),
                forced_subject: (i == 4).then(|| "History".to_string()),
            })
            .collect()
    }

    fn update(id: &str, subject: &str) -> SessionUpdate {
        SessionUpdate {
            id: id.to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn only_named_session_subject_changes() {
        let local = local_schedule();
        let merged = merge_updates(&local, &[update("s3", "Chemistry")]);

        assert_eq!(merged.len(), local.len());
        for (before, after) in local.iter().zip(&merged) {
            if before.id == "s3" {
                assert_eq!(after.subject, "Chemistry");
                let mut expected = before.clone();
                expected.subject = "Chemistry".to_string();
                assert_eq!(after, &expected);
            } else {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let local = local_schedule();
        let merged = merge_updates(&local, &[update("s99", "Chemistry")]);
        assert_eq!(merged, local);
    }

    #[test]
    fn order_follows_local_schedule() {
        let local = local_schedule();
        let merged = merge_updates(&local, &[update("s5", "Art"), update("s1", "Drama")]);
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4", "s5"]);
        assert_eq!(merged[0].subject, "Drama");
        assert_eq!(merged[4].subject, "Art");
        assert_eq!(merged[4].forced_subject.as_deref(), Some("History"));
    }

    #[test]
    fn later_duplicate_wins() {
        let local = local_schedule();
        let merged = merge_updates(&local, &[update("s2", "Art"), update("s2", "Drama")]);
        assert_eq!(merged[1].subject, "Drama");
    }
}
