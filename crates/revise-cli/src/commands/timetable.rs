use chrono::Local;
use clap::Subcommand;
use revise_core::{subject_distribution, TimetableDb};

#[derive(Subcommand)]
pub enum TimetableAction {
    /// Show the stored timetable
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-subject session counts and exam proximity
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TimetableAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TimetableDb::open()?;
    let sessions = db.list_sessions()?;

    match action {
        TimetableAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No timetable. Run `revise generate` first.");
            } else {
                super::print_sessions(&sessions);
            }
        }
        TimetableAction::Stats { json } => {
            let exams = db.list_exams()?;
            let rows = subject_distribution(&sessions, &exams, Local::now().date_naive());
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            println!(
                "{:<16} {:<10} {:>5} {:>8} {:>6} {:>6} {:>7}",
                "subject", "exam", "days", "sessions", "pinned", "share", "weight"
            );
            for row in &rows {
                println!(
                    "{:<16} {:<10} {:>5} {:>8} {:>6} {:>5.0}% {:>7.2}",
                    row.subject,
                    row.exam_date,
                    row.days_until,
                    row.sessions,
                    row.forced_sessions,
                    row.share * 100.0,
                    row.proximity_weight
                );
            }
        }
    }
    Ok(())
}
