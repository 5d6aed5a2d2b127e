//! Qualification/elimination evaluator: threshold rules over the standings.

use crate::logic::standings::compare_rank;
use crate::models::{ParticipantId, SwissStanding, TournamentBracket};

/// Wins at which a participant can no longer be caught by the cutoff and is
/// promoted early: one more than half the planned rounds.
pub fn qualification_wins_needed(swiss_rounds: u32) -> u32 {
    swiss_rounds / 2 + 1
}

/// Re-tag standings after a standings update. Runs after every applied result,
/// not only at round boundaries, so early qualification/elimination shrinks
/// the active pool mid-phase.
///
/// Both flags are one-way: this evaluator never clears them. Promotion never
/// exceeds the configured spot count, whatever the win thresholds say.
pub fn evaluate(bracket: &mut TournamentBracket) {
    let wins_needed = qualification_wins_needed(bracket.swiss_rounds);
    let threshold = bracket.config.elimination_threshold;
    let spots = bracket.config.qualification_spots;

    // Eliminate first; an eliminated participant can never take a spot.
    let mut eliminated: Vec<ParticipantId> = Vec::new();
    for standing in bracket.standings.values_mut() {
        if standing.is_active() && standing.losses >= threshold {
            standing.is_eliminated = true;
            eliminated.push(standing.participant_id.clone());
        }
    }
    for id in &eliminated {
        log::info!("{} eliminated from the bracket", id);
    }

    // Early promotion by wins, best record first, capped at the open spots.
    let remaining = spots.saturating_sub(bracket.qualified_count());
    let mut candidates: Vec<SwissStanding> = bracket
        .standings
        .values()
        .filter(|s| s.is_active() && s.wins >= wins_needed)
        .cloned()
        .collect();
    candidates.sort_by(compare_rank);
    for candidate in candidates.into_iter().take(remaining) {
        let Some(s) = bracket.standings.get_mut(&candidate.participant_id) else {
            continue;
        };
        s.is_qualified = true;
        log::info!("{} qualified for playoffs (early, by wins)", s.participant_id);
    }

    // Once the final Swiss round is fully complete, the top of the remaining
    // pool fills whatever spots are still open.
    let remaining = spots.saturating_sub(bracket.qualified_count());
    if remaining > 0 && final_round_complete(bracket) {
        let mut ranked: Vec<SwissStanding> = bracket
            .standings
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect();
        ranked.sort_by(compare_rank);
        for standing in ranked.into_iter().take(remaining) {
            let Some(s) = bracket.standings.get_mut(&standing.participant_id) else {
                continue;
            };
            s.is_qualified = true;
            log::info!(
                "{} qualified for playoffs (final standings, {}-{})",
                s.participant_id,
                s.wins,
                s.losses
            );
        }
    }
}

/// True when the last planned Swiss round has been generated and every one of
/// its matches is terminal.
fn final_round_complete(bracket: &TournamentBracket) -> bool {
    bracket.current_swiss_round >= bracket.swiss_rounds
        && bracket.round_matches(bracket.swiss_rounds).next().is_some()
        && bracket.round_finished(bracket.swiss_rounds)
}
