//! # Revise Core Library
//!
//! This library turns a learner's upcoming exams and weekly availability into
//! a day-by-day revision timetable, and optionally reconciles that timetable
//! with suggestions from an external review service.
//!
//! ## Architecture
//!
//! - **Scheduler**: slot expansion, exam indexing, two-pass subject
//!   assignment and the evening carry-over
//! - **Review**: prompt construction, reply validation and id-keyed merge
//!   against an LLM-backed review service
//! - **Storage**: SQLite timetable store and TOML configuration
//! - **Stats**: per-subject distribution for display
//!
//! ## Key Components
//!
//! - [`TimetableGenerator`]: runs the local generation pipeline
//! - [`ReviewBridge`]: best-effort external review
//! - [`TimetableDb`]: exam, preference and timetable persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod review;
pub mod schedule;
pub mod scheduler;
pub mod stats;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, ReviewError, ValidationError};
pub use review::{ReviewBridge, ReviewOutcome, ReviewService, ReviewStatus};
pub use schedule::{Block, BlockWindow, Exam, Preferences, Session, Slot};
pub use scheduler::{SchedulerConfig, Timetable, TimetableGenerator};
pub use stats::{subject_distribution, SubjectDistribution};
pub use storage::{Config, TimetableDb};
