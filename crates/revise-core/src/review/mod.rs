//! Optional external review of a generated timetable.
//!
//! The bridge sends the local schedule to a [`ReviewService`], takes back
//! only per-session subject changes and merges them by id. Review is always
//! best effort: no credential, a failed call or a malformed reply all leave
//! the local schedule exactly as it was.

pub mod client;
pub mod merge;
pub mod prompt;
pub mod response;

use std::time::Duration;

use serde::Serialize;

use crate::error::ReviewError;
use crate::scheduler::ExamIndex;
use crate::schedule::{Exam, Session};
use crate::storage::config::ReviewConfig;

pub use client::{LlmReviewClient, ReviewService};
pub use merge::merge_updates;
pub use prompt::build_review_prompt;
pub use response::{parse_review_reply, ReviewReply, SessionUpdate};

/// What happened to the schedule during review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReviewStatus {
    /// No service configured; nothing was sent
    Skipped,
    /// Call or parse failed; local schedule kept
    Failed { reason: String },
    /// Reply merged
    Applied {
        applied: usize,
        rejected: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        feedback: Option<String>,
    },
}

/// Reviewed schedule plus what the review did.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub sessions: Vec<Session>,
    pub status: ReviewStatus,
}

/// Boundary between the local engine and the review service.
pub struct ReviewBridge<S = LlmReviewClient> {
    service: Option<S>,
}

impl ReviewBridge<LlmReviewClient> {
    /// Build from config. Without a credential the bridge is disabled.
    pub fn from_config(config: &ReviewConfig) -> Self {
        let Some(api_key) = config.api_key() else {
            tracing::debug!("no review credential configured; review disabled");
            return Self::disabled();
        };
        if !config.enabled {
            return Self::disabled();
        }

        let client = LlmReviewClient::new(&config.endpoint, &config.model, &api_key)
            .with_sampling(config.temperature, config.max_tokens);
        match client.with_timeout(Duration::from_secs(config.timeout_secs)) {
            Ok(client) => Self::new(client),
            Err(e) => {
                tracing::warn!(error = %e, "could not build review client; review disabled");
                Self::disabled()
            }
        }
    }
}

impl<S: ReviewService> ReviewBridge<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Some(service),
        }
    }

    pub fn disabled() -> Self {
        Self { service: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Review `sessions` against `exams`. Never fails.
    pub async fn review(&self, sessions: Vec<Session>, exams: &[Exam]) -> ReviewOutcome {
        let Some(service) = &self.service else {
            return ReviewOutcome {
                sessions,
                status: ReviewStatus::Skipped,
            };
        };

        let prompt = build_review_prompt(&sessions, exams);
        let reply = service
            .complete(&prompt)
            .await
            .and_then(|raw| parse_review_reply(&raw));

        match reply {
            Ok(reply) => {
                let index = ExamIndex::new(exams);
                let (accepted, rejected) = admissible_updates(&sessions, &reply.updated_sessions, &index);
                tracing::info!(
                    service = service.name(),
                    applied = accepted.len(),
                    rejected,
                    "merged review suggestions"
                );
                ReviewOutcome {
                    sessions: merge_updates(&sessions, &accepted),
                    status: ReviewStatus::Applied {
                        applied: accepted.len(),
                        rejected,
                        feedback: reply.feedback,
                    },
                }
            }
            Err(e) => {
                log_review_failure(service.name(), &e);
                ReviewOutcome {
                    sessions,
                    status: ReviewStatus::Failed {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}

fn log_review_failure(service: &str, err: &ReviewError) {
    match err {
        ReviewError::Unavailable(_) => {
            tracing::warn!(service, error = %err, "review service unavailable; keeping local schedule")
        }
        ReviewError::MalformedResponse(_) => {
            tracing::warn!(service, error = %err, "discarding malformed review reply")
        }
    }
}

/// Drop updates that would override a pin with another subject or put a
/// subject at or after its own exam. Subjects with no exam are accepted.
/// Ids matching no session pass through; the merge ignores them.
fn admissible_updates(
    sessions: &[Session],
    updates: &[SessionUpdate],
    index: &ExamIndex,
) -> (Vec<SessionUpdate>, usize) {
    let mut rejected = 0;
    let accepted = updates
        .iter()
        .filter(|update| {
            let Some(session) = sessions.iter().find(|s| s.id == update.id) else {
                return true;
            };
            let pinned_elsewhere = session
                .forced_subject
                .as_ref()
                .is_some_and(|forced| forced != &update.subject);
            let too_late = index
                .deadline(&update.subject)
                .is_some_and(|deadline| session.position() >= deadline);
            if pinned_elsewhere || too_late {
                tracing::debug!(
                    session = %session.id,
                    subject = %update.subject,
                    pinned_elsewhere,
                    too_late,
                    "rejecting review suggestion"
                );
                rejected += 1;
                return false;
            }
            true
        })
        .cloned()
        .collect();
    (accepted, rejected)
}
