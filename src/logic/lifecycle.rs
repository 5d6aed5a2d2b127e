//! Match lifecycle: status transitions, result reports, approval, disputes.
//!
//! `scheduled -> in_progress -> completed`, with cancellation as an alternate
//! exit from either non-terminal state. A raw report never mutates the match;
//! only approval completes it, and approval is also the only path into the
//! standings tracker.

use crate::logic::{qualification, standings};
use crate::models::{
    BracketError, DisputeId, DisputeStatus, MapResult, MatchDispute, MatchFormat, MatchId,
    MatchReport, MatchStatus, ParticipantId, ReportId, ReportStatus, Side, TournamentBracket,
};
use chrono::Utc;

/// Derive the series winner from per-map results. Each map's winner comes from
/// score comparison; a tied map means no winner can be derived. The series
/// winner is the side that reaches the format's required map wins; if neither
/// side gets there the report is incomplete, and every map is validated, so a
/// report carrying results past the deciding map is rejected rather than
/// stored half-checked.
pub fn series_winner(results: &[MapResult], format: MatchFormat) -> Result<Side, BracketError> {
    let mut wins_1 = 0;
    let mut wins_2 = 0;
    let mut decided = None;
    for r in results {
        if decided.is_some() {
            return Err(BracketError::TrailingResults);
        }
        match r.winner() {
            Some(Side::One) => wins_1 += 1,
            Some(Side::Two) => wins_2 += 1,
            None => return Err(BracketError::TiedMap { map: r.map.clone() }),
        }
        if wins_1 >= format.wins_needed() {
            decided = Some(Side::One);
        } else if wins_2 >= format.wins_needed() {
            decided = Some(Side::Two);
        }
    }
    decided.ok_or(BracketError::SeriesIncomplete)
}

/// Mark a scheduled match as started. Purely informational.
pub fn start_match(bracket: &mut TournamentBracket, match_id: MatchId) -> Result<(), BracketError> {
    let m = bracket
        .get_match_mut(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if m.status != MatchStatus::Scheduled {
        return Err(BracketError::InvalidMatchState { status: m.status });
    }
    m.status = MatchStatus::InProgress;
    m.started_at = Some(Utc::now());
    Ok(())
}

/// Cancel a non-terminal match. A cancelled match never touches standings or
/// match history; it is as if it never happened.
pub fn cancel_match(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
    reason: impl Into<String>,
) -> Result<(), BracketError> {
    let m = bracket
        .get_match_mut(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(BracketError::InvalidMatchState { status: m.status });
    }
    m.status = MatchStatus::Cancelled;
    m.cancel_reason = Some(reason.into());
    log::info!("Match {} cancelled", match_id);
    Ok(())
}

/// Submit a proposed result for a match. Always creates a pending report and
/// never mutates the match; malformed reports (tied map, incomplete series,
/// too many maps) are rejected here, before they can ever be approved.
pub fn submit_match_result(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
    reported_by: ParticipantId,
    results: Vec<MapResult>,
    screenshots: Vec<String>,
) -> Result<ReportId, BracketError> {
    let m = bracket
        .get_match(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(BracketError::InvalidMatchState { status: m.status });
    }
    if !m.involves(&reported_by) {
        return Err(BracketError::ReporterNotInMatch(reported_by));
    }
    if results.len() > m.maps.len() {
        return Err(BracketError::TooManyResults {
            scheduled: m.maps.len(),
            reported: results.len(),
        });
    }
    series_winner(&results, m.format)?;

    let report = MatchReport::new(match_id, reported_by, results, screenshots);
    let report_id = report.id;
    bracket.reports.push(report);
    log::info!("Report {} submitted for match {}", report_id, match_id);
    Ok(report_id)
}

/// Approve a pending report: the only transition into Completed. Validates
/// everything before the first mutation, then completes the match and, for a
/// Swiss match, folds the result into standings and re-runs the evaluator as
/// one atomic unit.
///
/// Approving against an already-terminal match is an error, not a no-op: it
/// signals a duplicate-approval bug upstream.
pub fn approve_match_result(
    bracket: &mut TournamentBracket,
    report_id: ReportId,
) -> Result<(), BracketError> {
    let report = bracket
        .get_report(report_id)
        .ok_or(BracketError::ReportNotFound(report_id))?;
    if report.status != ReportStatus::Pending {
        return Err(BracketError::ReportNotPending);
    }
    let match_id = report.match_id;
    let results = report.results.clone();

    let m = bracket
        .get_match(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(BracketError::InvalidMatchState { status: m.status });
    }
    if bracket.applied_matches.contains(&match_id) {
        return Err(BracketError::DuplicateApplication(match_id));
    }
    let winning_side = series_winner(&results, m.format)?;
    let winner_id = m.participant(winning_side).clone();
    let is_swiss = m.stage.swiss_round().is_some();

    // All checks passed; mutate.
    let m = bracket
        .get_match_mut(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    m.status = MatchStatus::Completed;
    m.completed_at = Some(Utc::now());
    m.winner = Some(winner_id.clone());
    m.results = results;
    if let Some(r) = bracket.get_report_mut(report_id) {
        r.status = ReportStatus::Approved;
    }

    // Standings track the Swiss phase only; a playoff result completes the
    // match and stops there.
    if is_swiss {
        standings::apply_result(bracket, match_id)?;
        qualification::evaluate(bracket);
    }
    log::info!(
        "Report {} approved: match {} won by {}",
        report_id,
        match_id,
        winner_id
    );
    Ok(())
}

/// File a dispute against a match. Independent of any report; it does not
/// alter match state by itself.
pub fn create_match_dispute(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
    reported_by: ParticipantId,
    reason: impl Into<String>,
    description: impl Into<String>,
    evidence: Vec<String>,
) -> Result<DisputeId, BracketError> {
    let m = bracket
        .get_match(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if !m.involves(&reported_by) {
        return Err(BracketError::ReporterNotInMatch(reported_by));
    }
    let dispute = MatchDispute::new(match_id, reported_by, reason, description, evidence);
    let dispute_id = dispute.id;
    bracket.disputes.push(dispute);
    log::warn!("Dispute {} filed against match {}", dispute_id, match_id);
    Ok(dispute_id)
}

/// Record an administrative ruling on a pending dispute. The ruling never
/// reverts a completed match or its standings; any correction is a separate
/// administrative override outside this engine.
pub fn resolve_dispute(
    bracket: &mut TournamentBracket,
    dispute_id: DisputeId,
    upheld: bool,
    admin_response: impl Into<String>,
) -> Result<(), BracketError> {
    let d = bracket
        .get_dispute_mut(dispute_id)
        .ok_or(BracketError::DisputeNotFound(dispute_id))?;
    if d.status != DisputeStatus::Pending {
        return Err(BracketError::DisputeNotPending);
    }
    d.status = if upheld {
        DisputeStatus::Resolved
    } else {
        DisputeStatus::Rejected
    };
    d.admin_response = Some(admin_response.into());
    log::info!("Dispute {} {:?}", dispute_id, d.status);
    Ok(())
}
