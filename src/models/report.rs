//! Match reports and disputes. A report is a proposed result; only approval
//! commits it to the match. Disputes are independent of reports.

use crate::models::game_match::{MapResult, MatchId};
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReportId = Uuid;
pub type DisputeId = Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Approved,
    Disputed,
}

/// A result proposed by a participant. Never mutates the match directly.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub id: ReportId,
    pub match_id: MatchId,
    pub reported_by: ParticipantId,
    pub results: Vec<MapResult>,
    /// Screenshot URLs attached as evidence.
    pub screenshots: Vec<String>,
    pub status: ReportStatus,
    pub submitted_at: DateTime<Utc>,
}

impl MatchReport {
    pub fn new(
        match_id: MatchId,
        reported_by: ParticipantId,
        results: Vec<MapResult>,
        screenshots: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            reported_by,
            results,
            screenshots,
            status: ReportStatus::Pending,
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Pending,
    Resolved,
    Rejected,
}

/// A dispute raised against a match. May reference a match whose report is
/// still pending or already approved; it does not alter match state by itself.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchDispute {
    pub id: DisputeId,
    pub match_id: MatchId,
    pub reported_by: ParticipantId,
    pub reason: String,
    pub description: String,
    /// Evidence URLs (screenshots, VODs).
    pub evidence: Vec<String>,
    pub status: DisputeStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MatchDispute {
    pub fn new(
        match_id: MatchId,
        reported_by: ParticipantId,
        reason: impl Into<String>,
        description: impl Into<String>,
        evidence: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            reported_by,
            reason: reason.into(),
            description: description.into(),
            evidence,
            status: DisputeStatus::Pending,
            admin_response: None,
            created_at: Utc::now(),
        }
    }
}
