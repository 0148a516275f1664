use chrono::NaiveDate;
use clap::Subcommand;
use revise_core::{Block, Exam, TimetableDb, ValidationError};

#[derive(Subcommand)]
pub enum ExamAction {
    /// Add an exam
    Add {
        /// Subject name
        subject: String,
        /// Exam date (YYYY-MM-DD)
        date: NaiveDate,
        /// Block the exam is sat in (morning, afternoon, evening)
        block: Block,
        /// Exam board
        #[arg(long)]
        board: Option<String>,
        /// Subject teacher
        #[arg(long)]
        teacher: Option<String>,
    },
    /// List exams, earliest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an exam by id
    Remove {
        /// Exam id
        id: String,
    },
}

pub fn run(action: ExamAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TimetableDb::open()?;

    match action {
        ExamAction::Add {
            subject,
            date,
            block,
            board,
            teacher,
        } => {
            if subject.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "subject".to_string(),
                    message: "must not be empty".to_string(),
                }
                .into());
            }
            let mut exam = Exam::new(&subject, date, block);
            exam.board = board;
            exam.teacher = teacher;
            db.add_exam(&exam)?;
            println!("Exam added: {}", exam.id);
            println!("  {} on {} ({})", exam.subject, exam.exam_date, exam.time_of_day);
        }
        ExamAction::List { json } => {
            let exams = db.list_exams()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exams)?);
            } else if exams.is_empty() {
                println!("No exams.");
            } else {
                for exam in &exams {
                    let extra: Vec<&str> = [exam.board.as_deref(), exam.teacher.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect();
                    let extra = if extra.is_empty() {
                        String::new()
                    } else {
                        format!("  [{}]", extra.join(", "))
                    };
                    println!(
                        "{}  {}  {:<9}  {}{}",
                        exam.id, exam.exam_date, exam.time_of_day, exam.subject, extra
                    );
                }
            }
        }
        ExamAction::Remove { id } => {
            if db.remove_exam(&id)? {
                println!("Exam removed: {id}");
            } else {
                return Err(format!("exam not found: {id}").into());
            }
        }
    }
    Ok(())
}
