//! Revision timetable generator.
//!
//! Turns exams plus weekly availability into study sessions:
//! - Expands availability into (date, block) slots up to the last exam
//! - Reinforces each exam with one slot of every block before it
//! - Fills leftover slots with a random subject that is still ahead
//! - Pins the evening before each exam to that exam's subject
//!
//! Every step runs in sequence on an arena owned by one call.

pub mod assignment;
pub mod carry_over;
pub mod exam_index;
pub mod expander;

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::Serialize;

use crate::error::Result;
use crate::schedule::{Block, BlockWindow, Exam, Preferences, Session, Slot};

pub use assignment::AssignmentStats;
pub use carry_over::apply_evening_carry_over;
pub use exam_index::ExamIndex;
pub use expander::expand_slots;

/// Generator configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Windows used when preferences leave a block's times out
    pub default_windows: BTreeMap<Block, BlockWindow>,
    /// Random seed for reproducible fills (None = entropy)
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_windows: BTreeMap::from([
                (Block::Morning, BlockWindow::new("09:00", "12:00")),
                (Block::Afternoon, BlockWindow::new("13:00", "17:00")),
                (Block::Evening, BlockWindow::new("18:00", "21:00")),
            ]),
            seed: None,
        }
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct Timetable {
    pub sessions: Vec<Session>,
    pub stats: AssignmentStats,
    /// Evening sessions pinned by the carry-over
    pub pinned: usize,
}

/// Timetable generator
pub struct TimetableGenerator {
    config: SchedulerConfig,
}

impl TimetableGenerator {
    /// Create a generator with default config
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Generate using the configured seed, or entropy when unset.
    ///
    /// # Errors
    /// `InvalidInput` when the start date is malformed or no exams are given.
    pub fn generate(&self, preferences: &Preferences, exams: &[Exam]) -> Result<Timetable> {
        let mut rng = match self.config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        self.generate_with_rng(preferences, exams, &mut rng)
    }

    /// Generate with a caller-supplied randomness source.
    ///
    /// # Errors
    /// `InvalidInput` when the start date is malformed or no exams are given.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        preferences: &Preferences,
        exams: &[Exam],
        rng: &mut R,
    ) -> Result<Timetable> {
        let mut slots = expand_slots(preferences, exams)?;
        let index = ExamIndex::new(exams);
        let mut stats = AssignmentStats::default();

        assignment::reinforce_before_exams(&mut slots, &index, &mut stats);
        assignment::fill_remaining(&mut slots, &index, rng, &mut stats);

        let windows = self.windows_for(preferences);
        let mut sessions = into_sessions(slots, &windows);
        let pinned = apply_evening_carry_over(&mut sessions, &index);

        tracing::info!(
            exams = exams.len(),
            sessions = sessions.len(),
            reinforced = stats.reinforced,
            filled = stats.filled,
            unfilled = stats.unfilled,
            pinned,
            "generated revision timetable"
        );

        Ok(Timetable {
            sessions,
            stats,
            pinned,
        })
    }

    /// Preference windows layered over the configured defaults.
    fn windows_for(&self, preferences: &Preferences) -> BTreeMap<Block, BlockWindow> {
        let mut windows = self.config.default_windows.clone();
        windows.extend(preferences.availability().windows);
        windows
    }
}

impl Default for TimetableGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep assigned slots, attaching wall-clock times. Slot ids carry over.
fn into_sessions(slots: Vec<Slot>, windows: &BTreeMap<Block, BlockWindow>) -> Vec<Session> {
    slots
        .into_iter()
        .filter(|slot| slot.assigned)
        .filter_map(|slot| {
            let subject = slot.subject?;
            let (start_time, end_time) = windows
                .get(&slot.block)
                .map(|w| (w.start_time.clone(), w.end_time.clone()))
                .unwrap_or_default();
            Some(Session {
                id: slot.id,
                date: slot.date,
                block: slot.block,
                subject,
                start_time,
                end_time,
                forced_subject: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn every_day_prefs(start: &str) -> Preferences {
        let mut prefs = Preferences {
            start_date: start.to_string(),
            ..Default::default()
        };
        for day in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"] {
            prefs.revision_times.insert(
                day.to_string(),
                vec!["Morning".into(), "Afternoon".into(), "Evening".into()],
            );
        }
        prefs
    }

    fn seeded() -> TimetableGenerator {
        TimetableGenerator::with_config(SchedulerConfig {
            seed: Some(11),
            ..Default::default()
        })
    }

    #[test]
    fn generates_sessions_before_each_exam() {
        let exams = vec![
            Exam::new("Maths", date(6), Block::Morning),
            Exam::new("Physics", date(8), Block::Afternoon),
        ];
        let timetable = seeded().generate(&every_day_prefs("2024-03-01"), &exams).unwrap();

        assert!(!timetable.sessions.is_empty());
        for session in &timetable.sessions {
            let exam = exams.iter().find(|e| e.subject == session.subject).unwrap();
            assert!(session.position() < exam.position());
        }
        // 5th evening belongs to Maths, 7th evening to Physics
        let eve = |d| {
            timetable
                .sessions
                .iter()
                .find(|s| s.date == date(d) && s.block == Block::Evening)
                .unwrap()
        };
        assert_eq!(eve(5).subject, "Maths");
        assert_eq!(eve(7).subject, "Physics");
        assert_eq!(eve(7).forced_subject.as_deref(), Some("Physics"));
    }

    #[test]
    fn windows_prefer_preferences_over_defaults() {
        let mut prefs = every_day_prefs("2024-03-01");
        prefs
            .block_times
            .insert("Evening".into(), BlockWindow::new("19:30", "21:30"));
        let exams = vec![Exam::new("Maths", date(3), Block::Morning)];

        let timetable = seeded().generate(&prefs, &exams).unwrap();

        for session in &timetable.sessions {
            match session.block {
                Block::Evening => assert_eq!(session.start_time, "19:30"),
                Block::Morning => assert_eq!(session.start_time, "09:00"),
                Block::Afternoon => assert_eq!(session.end_time, "17:00"),
            }
        }
    }

    #[test]
    fn start_on_last_exam_day_is_empty() {
        let exams = vec![Exam::new("Maths", date(6), Block::Evening)];
        let timetable = seeded().generate(&every_day_prefs("2024-03-06"), &exams).unwrap();
        assert!(timetable.sessions.is_empty());
        assert_eq!(timetable.stats.reinforced, 0);
        assert_eq!(timetable.pinned, 0);
    }

    #[test]
    fn same_seed_same_timetable() {
        let exams = vec![
            Exam::new("Maths", date(20), Block::Morning),
            Exam::new("Physics", date(22), Block::Afternoon),
            Exam::new("French", date(25), Block::Evening),
        ];
        let prefs = every_day_prefs("2024-03-01");
        let a = seeded().generate(&prefs, &exams).unwrap();
        let b = seeded().generate(&prefs, &exams).unwrap();
        assert_eq!(a.sessions, b.sessions);
    }
}
