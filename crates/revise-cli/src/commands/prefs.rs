use chrono::Weekday;
use clap::Subcommand;
use revise_core::{Preferences, TimetableDb, ValidationError};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Replace preferences from a JSON document
    ///
    /// Example: '{"start_date":"2024-03-01","revision_times":{"Monday":["Morning"]}}'
    Set {
        /// Preferences JSON
        json: String,
    },
    /// Show stored preferences
    Show,
}

pub fn run(action: PrefsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TimetableDb::open()?;

    match action {
        PrefsAction::Set { json } => {
            let preferences: Preferences = serde_json::from_str(&json)?;
            if preferences.parsed_start_date().is_none() {
                return Err(ValidationError::InvalidStartDate(preferences.start_date).into());
            }

            let availability = preferences.availability();
            let days = WEEK
                .iter()
                .filter(|day| availability.blocks_on(**day).next().is_some())
                .count();
            if days == 0 {
                tracing::warn!("preferences have no recognised revision days");
            }

            db.save_preferences(&preferences)?;
            println!("Preferences saved ({days} revision days per week).");
        }
        PrefsAction::Show => match db.load_preferences()? {
            Some(preferences) => println!("{}", serde_json::to_string_pretty(&preferences)?),
            None => println!("No preferences set."),
        },
    }
    Ok(())
}
