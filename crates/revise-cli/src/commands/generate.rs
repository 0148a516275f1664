use clap::Args;
use revise_core::scheduler::AssignmentStats;
use revise_core::{
    Config, ReviewBridge, ReviewStatus, Session, TimetableDb, TimetableGenerator,
};
use serde::Serialize;

#[derive(Args)]
pub struct GenerateArgs {
    /// Seed for the random fill (overrides config)
    #[arg(long)]
    seed: Option<u64>,
    /// Skip the external review even if a credential is configured
    #[arg(long)]
    no_review: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GenerateReport<'a> {
    sessions: &'a [Session],
    stats: &'a AssignmentStats,
    pinned: usize,
    review: &'a ReviewStatus,
}

pub fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut db = TimetableDb::open()?;

    let preferences = db
        .load_preferences()?
        .ok_or("no preferences set; run `revise prefs set` first")?;
    let exams = db.list_exams()?;

    let mut scheduler_config = config.scheduler_config();
    if args.seed.is_some() {
        scheduler_config.seed = args.seed;
    }
    let timetable =
        TimetableGenerator::with_config(scheduler_config).generate(&preferences, &exams)?;

    let bridge = if args.no_review {
        ReviewBridge::disabled()
    } else {
        ReviewBridge::from_config(&config.review)
    };
    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(bridge.review(timetable.sessions, &exams));

    db.replace_sessions(&outcome.sessions)?;

    if args.json {
        let report = GenerateReport {
            sessions: &outcome.sessions,
            stats: &timetable.stats,
            pinned: timetable.pinned,
            review: &outcome.status,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    super::print_sessions(&outcome.sessions);
    println!();
    println!(
        "{} sessions ({} reinforced, {} filled, {} pinned evenings, {} slots left free)",
        outcome.sessions.len(),
        timetable.stats.reinforced,
        timetable.stats.filled,
        timetable.pinned,
        timetable.stats.unfilled
    );
    match &outcome.status {
        ReviewStatus::Skipped => println!("Review: skipped"),
        ReviewStatus::Failed { reason } => println!("Review: failed, local timetable kept ({reason})"),
        ReviewStatus::Applied {
            applied,
            rejected,
            feedback,
        } => {
            println!("Review: {applied} change(s) applied, {rejected} rejected");
            if let Some(feedback) = feedback {
                println!("  {feedback}");
            }
        }
    }
    Ok(())
}
