//! Standings tracker: win/loss application and Buchholz recomputation.

use crate::models::{
    BracketError, MatchId, MatchStatus, ParticipantId, SwissStanding, TournamentBracket,
};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ranking order for standings: higher wins first, Buchholz as tie-break,
/// participant id as the final (deterministic) tie-break.
pub fn compare_rank(a: &SwissStanding, b: &SwissStanding) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.buchholz.total_cmp(&a.buchholz))
        .then_with(|| a.participant_id.cmp(&b.participant_id))
}

/// Fold a completed Swiss match into the standings. Called exactly once per
/// match transition into Completed; a second application of the same match is
/// rejected loudly rather than double-counted. Playoff matches never touch
/// Swiss standings.
pub fn apply_result(bracket: &mut TournamentBracket, match_id: MatchId) -> Result<(), BracketError> {
    if bracket.applied_matches.contains(&match_id) {
        return Err(BracketError::DuplicateApplication(match_id));
    }
    let m = bracket
        .get_match(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if m.stage.swiss_round().is_none() {
        return Err(BracketError::NotASwissMatch(match_id));
    }
    if m.status != MatchStatus::Completed {
        return Err(BracketError::MatchNotCompleted(match_id));
    }
    let winner_id = m
        .winner
        .clone()
        .ok_or(BracketError::MatchNotCompleted(match_id))?;
    let loser_id = m
        .opponent_of(&winner_id)
        .ok_or_else(|| BracketError::ParticipantNotFound(winner_id.clone()))?
        .clone();

    // Validate both standings exist before mutating either.
    if !bracket.standings.contains_key(&winner_id) {
        return Err(BracketError::ParticipantNotFound(winner_id));
    }
    if !bracket.standings.contains_key(&loser_id) {
        return Err(BracketError::ParticipantNotFound(loser_id));
    }

    {
        let w = bracket.standings.get_mut(&winner_id).unwrap();
        w.wins += 1;
        w.match_history.push(loser_id.clone());
    }
    {
        let l = bracket.standings.get_mut(&loser_id).unwrap();
        l.losses += 1;
        l.match_history.push(winner_id.clone());
    }
    bracket.applied_matches.insert(match_id);

    recompute_buchholz(bracket);
    log::info!(
        "Applied match {} to standings: {} beat {}",
        match_id,
        winner_id,
        loser_id
    );
    Ok(())
}

/// Recompute Buchholz for the full pool from scratch: each standing's value is
/// the sum of the current win counts of every opponent in its match history.
/// Full recomputation keeps the metric consistent even if wins are corrected
/// retroactively.
pub fn recompute_buchholz(bracket: &mut TournamentBracket) {
    let wins_by_id: HashMap<ParticipantId, u32> = bracket
        .standings
        .values()
        .map(|s| (s.participant_id.clone(), s.wins))
        .collect();
    for standing in bracket.standings.values_mut() {
        standing.buchholz = standing
            .match_history
            .iter()
            .map(|opp| f64::from(wins_by_id.get(opp).copied().unwrap_or(0)))
            .sum();
    }
}
