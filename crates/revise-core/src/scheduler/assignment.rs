//! Two-pass subject assignment over an expanded slot arena.
//!
//! Pass 1 gives every exam one slot of each block before its exam date,
//! claiming the earliest free slot, exams taken in date order. Pass 2 fills
//! whatever is left with a random subject that is still ahead of the slot.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::exam_index::ExamIndex;
use crate::schedule::{Block, Slot};

/// Counters reported after both passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentStats {
    /// Slots claimed by pass 1
    pub reinforced: usize,
    /// Slots filled by pass 2
    pub filled: usize,
    /// Slots left without a subject
    pub unfilled: usize,
    /// (exam, block) pairs pass 1 could not place
    pub missed_claims: usize,
}

/// Pass 1: immediate pre-exam reinforcement.
///
/// Ties between exams go to whichever exam comes first in date order, so the
/// index must already be sorted.
pub fn reinforce_before_exams(slots: &mut [Slot], index: &ExamIndex, stats: &mut AssignmentStats) {
    for exam in index.sorted() {
        for block in Block::ORDER {
            let claim = slots.iter_mut().find(|slot| {
                !slot.assigned
                    && slot.block == block
                    && slot.date < exam.exam_date
                    && index.allows(&exam.subject, slot.date, slot.block)
            });

            match claim {
                Some(slot) => {
                    slot.assign(&exam.subject);
                    stats.reinforced += 1;
                }
                None => {
                    stats.missed_claims += 1;
                    tracing::debug!(
                        subject = %exam.subject,
                        exam_date = %exam.exam_date,
                        %block,
                        "no free slot left for pre-exam reinforcement"
                    );
                }
            }
        }
    }
}

/// Pass 2: fill the remaining slots with a uniformly chosen upcoming subject.
pub fn fill_remaining<R: Rng + ?Sized>(
    slots: &mut [Slot],
    index: &ExamIndex,
    rng: &mut R,
    stats: &mut AssignmentStats,
) {
    for slot in slots.iter_mut().filter(|slot| !slot.assigned) {
        let candidates = index.subjects_after(slot.date);
        match candidates.choose(rng) {
            Some(subject) => {
                slot.assign(subject);
                stats.filled += 1;
            }
            None => stats.unfilled += 1,
        }
    }
}
