//! Schedule types: exams, blocks, availability preferences, slots and sessions.
//!
//! `Preferences` is kept in the raw shape the caller stores it in (weekday and
//! block names as text). [`Preferences::availability`] turns it into the typed
//! [`Availability`] the engine works with, dropping anything it does not
//! recognise.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Time-of-day bucket. Ordered by how late in the day it is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Block {
    #[serde(alias = "morning")]
    Morning,
    #[serde(alias = "afternoon")]
    Afternoon,
    #[serde(alias = "evening")]
    Evening,
}

impl Block {
    /// All blocks in day order.
    pub const ORDER: [Block; 3] = [Block::Morning, Block::Afternoon, Block::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Block::Morning => "Morning",
            Block::Afternoon => "Afternoon",
            Block::Evening => "Evening",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Block {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Block::Morning),
            "afternoon" => Ok(Block::Afternoon),
            "evening" => Ok(Block::Evening),
            other => Err(format!("unknown block: {other}")),
        }
    }
}

/// An upcoming exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exam {
    pub id: String,
    pub subject: String,
    pub exam_date: NaiveDate,
    pub time_of_day: Block,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
}

impl Exam {
    /// Create an exam with a fresh id. The subject is trimmed.
    pub fn new(subject: &str, exam_date: NaiveDate, time_of_day: Block) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject: subject.trim().to_string(),
            exam_date,
            time_of_day,
            board: None,
            teacher: None,
        }
    }

    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }

    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    /// (date, block) position of the exam sitting.
    pub fn position(&self) -> (NaiveDate, Block) {
        (self.exam_date, self.time_of_day)
    }
}

/// Wall-clock window a block occupies, as `HH:MM` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockWindow {
    pub start_time: String, // HH:MM
    pub end_time: String,   // HH:MM
}

impl BlockWindow {
    pub fn new(start_time: &str, end_time: &str) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

/// Revision availability as stored by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// Weekday name -> enabled block names.
    #[serde(default)]
    pub revision_times: BTreeMap<String, Vec<String>>,
    /// Block name -> wall-clock window.
    #[serde(default)]
    pub block_times: BTreeMap<String, BlockWindow>,
}

/// Typed availability derived from [`Preferences`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub by_weekday: HashMap<Weekday, BTreeSet<Block>>,
    pub windows: BTreeMap<Block, BlockWindow>,
}

impl Availability {
    /// Blocks enabled on `weekday`, in day order.
    pub fn blocks_on(&self, weekday: Weekday) -> impl Iterator<Item = Block> + '_ {
        self.by_weekday
            .get(&weekday)
            .into_iter()
            .flat_map(|blocks| blocks.iter().copied())
    }
}

impl Preferences {
    /// Parse the raw maps into typed availability.
    ///
    /// Weekday names are anything chrono accepts ("Monday", "mon").
    /// Unknown weekday or block names are dropped.
    pub fn availability(&self) -> Availability {
        let mut by_weekday: HashMap<Weekday, BTreeSet<Block>> = HashMap::new();
        for (day, blocks) in &self.revision_times {
            let Ok(weekday) = day.trim().parse::<Weekday>() else {
                tracing::debug!(weekday = %day, "ignoring unknown weekday in revision times");
                continue;
            };
            let entry = by_weekday.entry(weekday).or_default();
            entry.extend(blocks.iter().filter_map(|b| b.parse::<Block>().ok()));
        }
        by_weekday.retain(|_, blocks| !blocks.is_empty());

        let windows = self
            .block_times
            .iter()
            .filter_map(|(name, window)| Some((name.parse::<Block>().ok()?, window.clone())))
            .collect();

        Availability {
            by_weekday,
            windows,
        }
    }

    pub fn parsed_start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").ok()
    }
}

/// Candidate study opportunity inside one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: String,
    pub date: NaiveDate,
    pub block: Block,
    pub assigned: bool,
    pub subject: Option<String>,
}

impl Slot {
    pub fn new(id: String, date: NaiveDate, block: Block) -> Self {
        Self {
            id,
            date,
            block,
            assigned: false,
            subject: None,
        }
    }

    pub fn assign(&mut self, subject: &str) {
        self.assigned = true;
        self.subject = Some(subject.to_string());
    }
}

/// A committed, subject-assigned study slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    pub block: Block,
    pub subject: String,
    pub start_time: String, // HH:MM
    pub end_time: String,   // HH:MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_subject: Option<String>,
}

impl Session {
    pub fn position(&self) -> (NaiveDate, Block) {
        (self.date, self.block)
    }
}
