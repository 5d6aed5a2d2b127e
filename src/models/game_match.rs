//! Match, per-map results, format, and the match status state machine.

use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match (slot 1 or slot 2).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Best-of format for a match series.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFormat {
    Bo1,
    Bo3,
}

impl MatchFormat {
    /// How many maps are scheduled for this format.
    pub fn maps_needed(self) -> usize {
        match self {
            MatchFormat::Bo1 => 1,
            MatchFormat::Bo3 => 3,
        }
    }

    /// Map wins required to take the series.
    pub fn wins_needed(self) -> u32 {
        match self {
            MatchFormat::Bo1 => 1,
            MatchFormat::Bo3 => 2,
        }
    }
}

/// Phase a match belongs to: a numbered Swiss round or the playoff bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MatchStage {
    Swiss { round: u32 },
    Playoff { round: u32 },
}

impl MatchStage {
    /// Swiss round number, or None for playoff matches.
    pub fn swiss_round(self) -> Option<u32> {
        match self {
            MatchStage::Swiss { round } => Some(round),
            MatchStage::Playoff { .. } => None,
        }
    }
}

/// Lifecycle status of a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    /// Completed and cancelled are terminal; no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

/// Result of a single map: the two sides' scores. The map winner is derived
/// from score comparison; equal scores mean no winner can be derived.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MapResult {
    pub map: String,
    pub score_1: u32,
    pub score_2: u32,
}

impl MapResult {
    pub fn new(map: impl Into<String>, score_1: u32, score_2: u32) -> Self {
        Self {
            map: map.into(),
            score_1,
            score_2,
        }
    }

    /// Side that won this map, or None if the scores are tied.
    pub fn winner(&self) -> Option<Side> {
        match self.score_1.cmp(&self.score_2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A single match between two participants of the same kind.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// Sequential number within the bracket (unique across rounds).
    pub match_number: u32,
    pub stage: MatchStage,
    pub side_1: ParticipantId,
    pub side_2: ParticipantId,
    pub format: MatchFormat,
    /// Maps drawn for this match: 1 for bo1, 3 for bo3.
    pub maps: Vec<String>,
    pub status: MatchStatus,
    /// Per-map results, set only when an approved report completes the match.
    pub results: Vec<MapResult>,
    /// Winning participant; set iff status is Completed.
    pub winner: Option<ParticipantId>,
    pub scheduled_time: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

impl GameMatch {
    pub fn new(
        match_number: u32,
        stage: MatchStage,
        side_1: ParticipantId,
        side_2: ParticipantId,
        format: MatchFormat,
        maps: Vec<String>,
        scheduled_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_number,
            stage,
            side_1,
            side_2,
            format,
            maps,
            status: MatchStatus::Scheduled,
            results: Vec::new(),
            winner: None,
            scheduled_time,
            started_at: None,
            completed_at: None,
            cancel_reason: None,
        }
    }

    /// The participant on the given side.
    pub fn participant(&self, side: Side) -> &ParticipantId {
        match side {
            Side::One => &self.side_1,
            Side::Two => &self.side_2,
        }
    }

    /// The opponent of `id`, or None if `id` is not in this match.
    pub fn opponent_of(&self, id: &ParticipantId) -> Option<&ParticipantId> {
        if &self.side_1 == id {
            Some(&self.side_2)
        } else if &self.side_2 == id {
            Some(&self.side_1)
        } else {
            None
        }
    }

    pub fn involves(&self, id: &ParticipantId) -> bool {
        &self.side_1 == id || &self.side_2 == id
    }
}
