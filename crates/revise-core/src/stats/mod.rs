//! Statistics over generated timetables.

mod distribution;

pub use distribution::{subject_distribution, SubjectDistribution};
