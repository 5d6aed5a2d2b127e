//! Bracket orchestrator: bracket creation, round sequencing, playoff transition.

use crate::logic::catalog::{swiss_round_count, MapCatalog};
use crate::logic::pairing::generate_round;
use crate::logic::standings::compare_rank;
use crate::models::{
    BracketError, GameMatch, MatchFormat, MatchId, MatchStage, ParticipantKind, SwissConfig,
    SwissStanding, TournamentBracket, TournamentId,
};
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};

/// Create the bracket aggregate from the initial participant list and generate
/// round 1. The round count is fixed here and never recomputed mid-tournament.
pub fn create_bracket(
    tournament_id: TournamentId,
    game: impl Into<String>,
    participants: Vec<ParticipantKind>,
    config: SwissConfig,
    catalog: &MapCatalog,
) -> Result<TournamentBracket, BracketError> {
    if participants.len() < 2 {
        return Err(BracketError::NotEnoughParticipants {
            needed: 2,
            got: participants.len(),
        });
    }
    let all_teams = participants.iter().all(ParticipantKind::is_team);
    let all_players = participants.iter().all(|p| !p.is_team());
    if !all_teams && !all_players {
        return Err(BracketError::MixedParticipantKinds);
    }
    let mut seen = HashSet::new();
    for p in &participants {
        if !seen.insert(p.id().clone()) {
            return Err(BracketError::DuplicateParticipant(p.id().clone()));
        }
    }

    let standings: HashMap<_, _> = participants
        .iter()
        .map(|p| (p.id().clone(), SwissStanding::new(p.id().clone())))
        .collect();
    let swiss_rounds = swiss_round_count(participants.len());
    let mut bracket = TournamentBracket {
        tournament_id,
        game: game.into(),
        participants,
        swiss_rounds,
        current_swiss_round: 1,
        standings,
        matches: Vec::new(),
        playoff_matches: Vec::new(),
        playoff_started: false,
        config,
        applied_matches: HashSet::new(),
        reports: Vec::new(),
        disputes: Vec::new(),
        next_match_number: 1,
    };
    generate_round(&mut bracket, catalog, 1)?;
    log::info!(
        "Created bracket {} for {} participants, {} Swiss rounds",
        tournament_id,
        bracket.participants.len(),
        swiss_rounds
    );
    Ok(bracket)
}

/// Generate the next Swiss round. Fails while the current round still has
/// unfinished matches, or once all planned rounds exist.
pub fn generate_next_round(
    bracket: &mut TournamentBracket,
    catalog: &MapCatalog,
) -> Result<Vec<MatchId>, BracketError> {
    if !bracket.round_finished(bracket.current_swiss_round) {
        return Err(BracketError::RoundInProgress {
            round: bracket.current_swiss_round,
        });
    }
    if bracket.current_swiss_round >= bracket.swiss_rounds {
        return Err(BracketError::SwissPhaseOver {
            total: bracket.swiss_rounds,
        });
    }
    bracket.current_swiss_round += 1;
    generate_round(bracket, catalog, bracket.current_swiss_round)
}

/// Transition to the playoff phase: seed the qualified standings by
/// (wins, buchholz) into a single-elimination first round (seed 1 vs seed N,
/// 2 vs N-1, ...), all bo3. One-way; can only happen once, after the final
/// Swiss round, with the qualification spots filled.
pub fn start_playoffs(
    bracket: &mut TournamentBracket,
    catalog: &MapCatalog,
) -> Result<Vec<MatchId>, BracketError> {
    if bracket.playoff_started {
        return Err(BracketError::PlayoffsAlreadyStarted);
    }
    if bracket.current_swiss_round < bracket.swiss_rounds {
        return Err(BracketError::SwissNotFinished {
            current: bracket.current_swiss_round,
            total: bracket.swiss_rounds,
        });
    }
    let spots = bracket.config.qualification_spots;
    let mut qualified: Vec<SwissStanding> = bracket
        .standings
        .values()
        .filter(|s| s.is_qualified)
        .cloned()
        .collect();
    if qualified.len() < spots {
        return Err(BracketError::NotEnoughQualified {
            needed: spots,
            qualified: qualified.len(),
        });
    }
    qualified.sort_by(compare_rank);
    let seeds: Vec<_> = qualified.into_iter().take(spots).collect();

    let scheduled_time = Utc::now() + Duration::minutes(15);
    let mut created = Vec::with_capacity(seeds.len() / 2);
    for i in 0..seeds.len() / 2 {
        let high = &seeds[i];
        let low = &seeds[seeds.len() - 1 - i];
        let maps = catalog.draw_maps(&bracket.game, MatchFormat::Bo3.maps_needed());
        let m = GameMatch::new(
            bracket.next_match_number,
            MatchStage::Playoff { round: 1 },
            high.participant_id.clone(),
            low.participant_id.clone(),
            MatchFormat::Bo3,
            maps,
            scheduled_time,
        );
        bracket.next_match_number += 1;
        created.push(m.id);
        bracket.playoff_matches.push(m);
    }
    bracket.playoff_started = true;
    log::info!(
        "Playoffs started for bracket {}: {} first-round matches",
        bracket.tournament_id,
        created.len()
    );
    Ok(created)
}
