//! Expands weekly availability into concrete (date, block) slots.

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, ValidationError};
use crate::schedule::{Exam, Preferences, Slot};

/// Produce one unassigned slot per enabled (date, block) from the start date
/// to the last exam date inclusive.
///
/// Slots come out in date order, and in block order within a date. Ids are
/// `s1`, `s2`, ... in that order.
///
/// # Errors
/// `InvalidInput` when the start date does not parse or `exams` is empty.
pub fn expand_slots(preferences: &Preferences, exams: &[Exam]) -> Result<Vec<Slot>> {
    let start = preferences
        .parsed_start_date()
        .ok_or_else(|| ValidationError::InvalidStartDate(preferences.start_date.clone()))?;
    let end = exams
        .iter()
        .map(|exam| exam.exam_date)
        .max()
        .ok_or(ValidationError::NoExams)?;

    let availability = preferences.availability();
    let mut slots = Vec::new();

    for date in days_inclusive(start, end) {
        for block in availability.blocks_on(date.weekday()) {
            let id = format!("s{}", slots.len() + 1);
            slots.push(Slot::new(id, date, block));
        }
    }

    tracing::debug!(%start, %end, slots = slots.len(), "expanded availability into slots");
    Ok(slots)
}

/// Calendar days from `start` to `end`, both inclusive. Empty when start > end.
fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::schedule::Block;
    use chrono::Weekday;

    fn exam_on(y: i32, m: u32, d: u32) -> Exam {
        Exam::new("Maths", NaiveDate::from_ymd_opt(y, m, d).unwrap(), Block::Morning)
    }

    fn prefs(start: &str, days: &[(&str, &[&str])]) -> Preferences {
        let mut prefs = Preferences {
            start_date: start.to_string(),
            ..Default::default()
        };
        for (day, blocks) in days {
            prefs.revision_times.insert(
                day.to_string(),
                blocks.iter().map(|b| b.to_string()).collect(),
            );
        }
        prefs
    }

    const EVERY_DAY: &[(&str, &[&str])] = &[
        ("Monday", &["Morning", "Afternoon", "Evening"]),
        ("Tuesday", &["Morning", "Afternoon", "Evening"]),
        ("Wednesday", &["Morning", "Afternoon", "Evening"]),
        ("Thursday", &["Morning", "Afternoon", "Evening"]),
        ("Friday", &["Morning", "Afternoon", "Evening"]),
        ("Saturday", &["Morning", "Afternoon", "Evening"]),
        ("Sunday", &["Morning", "Afternoon", "Evening"]),
    ];

    #[test]
    fn slots_are_ordered_by_date_then_block() {
        // Evening listed first on purpose
        let p = prefs("2024-03-04", &[("Monday", &["Evening", "Morning"]), ("Tuesday", &["Afternoon"])]);
        let slots = expand_slots(&p, &[exam_on(2024, 3, 12)]).unwrap();

        let got: Vec<_> = slots.iter().map(|s| (s.date.day(), s.block)).collect();
        assert_eq!(
            got,
            vec![
                (4, Block::Morning),
                (4, Block::Evening),
                (5, Block::Afternoon),
                (11, Block::Morning),
                (11, Block::Evening),
                (12, Block::Afternoon),
            ]
        );
        assert!(slots.iter().all(|s| !s.assigned && s.subject.is_none()));
    }

    #[test]
    fn slot_ids_are_unique_and_sequential() {
        let p = prefs("2024-03-01", EVERY_DAY);
        let slots = expand_slots(&p, &[exam_on(2024, 3, 3)]).unwrap();
        assert_eq!(slots.len(), 9);
        let ids: Vec<_> = slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"s1"));
        assert_eq!(ids.last(), Some(&"s9"));
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn only_enabled_weekday_and_block_are_produced() {
        let p = prefs("2024-01-01", &[("Monday", &["Morning"])]);
        let slots = expand_slots(&p, &[exam_on(2024, 3, 31)]).unwrap();
        assert!(!slots.is_empty());
        for slot in &slots {
            assert_eq!(slot.date.weekday(), Weekday::Mon);
            assert_eq!(slot.block, Block::Morning);
        }
    }

    #[test]
    fn range_crosses_month_and_year_boundaries() {
        let p = prefs("2023-12-30", EVERY_DAY);
        let slots = expand_slots(&p, &[exam_on(2024, 1, 2)]).unwrap();
        let dates: Vec<_> = slots.iter().map(|s| s.date).collect();
        assert_eq!(dates.len(), 4 * 3);
        assert_eq!(dates.first(), NaiveDate::from_ymd_opt(2023, 12, 30).as_ref());
        assert_eq!(dates.last(), NaiveDate::from_ymd_opt(2024, 1, 2).as_ref());
    }

    #[test]
    fn start_after_last_exam_is_empty_not_error() {
        let p = prefs("2024-04-01", EVERY_DAY);
        let slots = expand_slots(&p, &[exam_on(2024, 3, 31)]).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn bad_start_date_is_invalid_input() {
        let p = prefs("31/03/2024", EVERY_DAY);
        let err = expand_slots(&p, &[exam_on(2024, 3, 31)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidInput(ValidationError::InvalidStartDate(_))
        ));
    }

    #[test]
    fn no_exams_is_invalid_input() {
        let p = prefs("2024-03-01", EVERY_DAY);
        let err = expand_slots(&p, &[]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ValidationError::NoExams)));
    }
}
