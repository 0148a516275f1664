pub mod config;
pub mod exam;
pub mod generate;
pub mod prefs;
pub mod timetable;

use revise_core::Session;

/// One line per session, blank line between days.
pub(crate) fn print_sessions(sessions: &[Session]) {
    let mut last_date = None;
    for session in sessions {
        if last_date.is_some_and(|d| d != session.date) {
            println!();
        }
        last_date = Some(session.date);

        let pinned = if session.forced_subject.is_some() {
            "  (pinned)"
        } else {
            ""
        };
        println!(
            "{}  {:<9}  {}-{}  {}{}",
            session.date.format("%a %Y-%m-%d"),
            session.block,
            session.start_time,
            session.end_time,
            session.subject,
            pinned
        );
    }
}
