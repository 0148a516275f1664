//! Review request construction.

use chrono::NaiveDate;
use serde::Serialize;

use crate::schedule::{Block, Exam, Session};

/// System prompt sent with every review request.
pub const REVIEW_SYSTEM_PROMPT: &str = "You review student revision timetables. \
    Reply with a single JSON object and nothing else.";

/// What the service sees of a session. Times and pins stay local.
#[derive(Debug, Serialize)]
struct SessionDigest<'a> {
    id: &'a str,
    date: NaiveDate,
    block: Block,
    subject: &'a str,
}

#[derive(Debug, Serialize)]
struct ExamDigest<'a> {
    subject: &'a str,
    date: NaiveDate,
    block: Block,
}

/// Build the user prompt asking for per-session subject changes only.
pub fn build_review_prompt(sessions: &[Session], exams: &[Exam]) -> String {
    let sessions: Vec<_> = sessions
        .iter()
        .map(|s| SessionDigest {
            id: &s.id,
            date: s.date,
            block: s.block,
            subject: &s.subject,
        })
        .collect();
    let exams: Vec<_> = exams
        .iter()
        .map(|e| ExamDigest {
            subject: &e.subject,
            date: e.exam_date,
            block: e.time_of_day,
        })
        .collect();

    // Vecs of plain structs always serialize
    let sessions_json = serde_json::to_string_pretty(&sessions).unwrap_or_else(|_| "[]".into());
    let exams_json = serde_json::to_string_pretty(&exams).unwrap_or_else(|_| "[]".into());

    indoc::formatdoc! {r#"
            A student has these exams:
            {exams}

            This is their generated revision timetable. Each session has an id, a date,
            a block (Morning, Afternoon or Evening) and the subject to revise:
            {sessions}

            Check the balance of subjects and suggest improvements. A subject must never
            be revised on or after its own exam.

            Return ONLY the sessions you would change, each as {{"id", "subject"}}, in
            exactly this shape:
            {{"updated_sessions": [{{"id": "<session id>", "subject": "<new subject>"}}], "feedback": "<one short paragraph>"}}

            Use an empty "updated_sessions" list when nothing should change. Do not return
            the full timetable and do not invent new session ids.
        "#,
        exams = exams_json,
        sessions = sessions_json,
    }
}
