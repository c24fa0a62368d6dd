//! Bracket Planning
//!
//! Pure layout of a single-elimination bracket. Planning works on participant
//! indices; the generator maps them to stored participant ids.

use std::collections::HashSet;

use crate::shared::error::SharedError;

/// Explicit stage-0 pairing: two participant indices, `None` for a bye
pub type Lineup = [Option<usize>; 2];

/// Largest field whose first stage still fits an `i16` match number
pub const MAX_PARTICIPANTS: usize = 2 * i16::MAX as usize;

/// One planned match, slots hold participant indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMatch {
    pub match_number: i16,
    pub participant_1: Option<usize>,
    pub participant_2: Option<usize>,
}

/// All matches of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub stage_number: i16,
    pub matches: Vec<PlannedMatch>,
}

/// Number of matches in each stage for `participant_count` participants
///
/// Stage 0 holds `ceil(P / 2)` matches and every later stage holds the ceiling
/// of half the previous one, down to and including the single-match final.
pub fn stage_sizes(participant_count: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut current = participant_count.div_ceil(2);
    if current == 0 {
        return sizes;
    }
    sizes.push(current);
    while current > 1 {
        current = current.div_ceil(2);
        sizes.push(current);
    }
    sizes
}

/// Check explicit lineups against the participant count
///
/// There must be exactly one lineup per stage-0 match, every index must point
/// at a participant and no participant may appear twice.
pub fn validate_lineups(participant_count: usize, lineups: &[Lineup]) -> Result<(), SharedError> {
    let expected = participant_count.div_ceil(2);
    if lineups.len() != expected {
        return Err(SharedError::validation(
            "lineups",
            format!("Expected {} lineups for {} participants, got {}", expected, participant_count, lineups.len()),
        ));
    }

    let mut seen = HashSet::new();
    for index in lineups.iter().flatten().flatten().copied() {
        if index >= participant_count {
            return Err(SharedError::validation(
                "lineups",
                format!("Participant index {} is out of range", index),
            ));
        }
        if !seen.insert(index) {
            return Err(SharedError::validation(
                "lineups",
                format!("Participant index {} is used more than once", index),
            ));
        }
    }

    Ok(())
}

/// Lay out every stage of the bracket
///
/// Without lineups, stage-0 match `k` pairs participants `2k` and `2k + 1`,
/// leaving the second slot empty when the count is odd. Later stages start
/// with both slots empty.
pub fn plan_bracket(participant_count: usize, lineups: Option<&[Lineup]>) -> Result<Vec<StagePlan>, SharedError> {
    if participant_count < 2 {
        return Err(SharedError::validation(
            "participants",
            "At least two participants are required",
        ));
    }
    if participant_count > MAX_PARTICIPANTS {
        return Err(SharedError::validation(
            "participants",
            format!("At most {} participants are supported", MAX_PARTICIPANTS),
        ));
    }
    if let Some(lineups) = lineups {
        validate_lineups(participant_count, lineups)?;
    }

    let stages = stage_sizes(participant_count)
        .into_iter()
        .enumerate()
        .map(|(stage_number, size)| {
            let matches = (0..size)
                .map(|k| {
                    let (participant_1, participant_2) = match (stage_number, lineups) {
                        (0, Some(lineups)) => (lineups[k][0], lineups[k][1]),
                        (0, None) => {
                            let second = 2 * k + 1;
                            (Some(2 * k), (second < participant_count).then_some(second))
                        }
                        _ => (None, None),
                    };
                    PlannedMatch {
                        match_number: k as i16,
                        participant_1,
                        participant_2,
                    }
                })
                .collect();
            StagePlan {
                stage_number: stage_number as i16,
                matches,
            }
        })
        .collect();

    Ok(stages)
}
