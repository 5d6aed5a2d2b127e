//! Swiss pairing: deterministic greedy pairing of the active pool.

use crate::logic::catalog::{format_for, MapCatalog};
use crate::logic::qualification;
use crate::logic::standings::{compare_rank, recompute_buchholz};
use crate::models::{
    BracketError, ByePolicy, GameMatch, MatchId, MatchStage, SwissStanding, TournamentBracket,
};
use chrono::{Duration, Utc};

/// How far in the future generated matches are scheduled. The exact policy is
/// a scheduling concern; the engine only requires "some time after generation".
const SCHEDULE_LEAD_MINUTES: i64 = 15;

/// Generate one Swiss round's matches for the active pool (neither eliminated
/// nor qualified). Appends the matches to the bracket and returns their ids.
///
/// 1. Sort the pool descending by (wins, buchholz), participant id last so the
///    pairing is a pure function of standings + round.
/// 2. Walk the sorted list; pair each participant with the first later
///    candidate they have not already played.
/// 3. A participant with no legal opponent this pass receives no match
///    (or a free win, per the configured bye policy).
pub fn generate_round(
    bracket: &mut TournamentBracket,
    catalog: &MapCatalog,
    round: u32,
) -> Result<Vec<MatchId>, BracketError> {
    let mut pool: Vec<SwissStanding> = bracket.active_standings().cloned().collect();
    if pool.len() < 2 && round == 1 {
        return Err(BracketError::NotEnoughParticipants {
            needed: 2,
            got: pool.len(),
        });
    }
    pool.sort_by(compare_rank);

    let mut paired = vec![false; pool.len()];
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for i in 0..pool.len() {
        if paired[i] {
            continue;
        }
        for j in (i + 1)..pool.len() {
            if paired[j] || pool[i].has_played(&pool[j].participant_id) {
                continue;
            }
            paired[i] = true;
            paired[j] = true;
            pairs.push((i, j));
            break;
        }
    }

    let format = format_for(round, bracket.swiss_rounds);
    let scheduled_time = Utc::now() + Duration::minutes(SCHEDULE_LEAD_MINUTES);
    let mut created = Vec::with_capacity(pairs.len());
    for (i, j) in pairs {
        let maps = catalog.draw_maps(&bracket.game, format.maps_needed());
        let m = GameMatch::new(
            bracket.next_match_number,
            MatchStage::Swiss { round },
            pool[i].participant_id.clone(),
            pool[j].participant_id.clone(),
            format,
            maps,
            scheduled_time,
        );
        bracket.next_match_number += 1;
        created.push(m.id);
        bracket.matches.push(m);
    }

    // Left-over participants: odd pool size or no legal opponent remaining.
    let mut awarded_bye = false;
    for (idx, standing) in pool.iter().enumerate() {
        if paired[idx] {
            continue;
        }
        match bracket.config.bye_policy {
            ByePolicy::SitOut => {
                log::info!(
                    "Round {}: {} sits out (no legal opponent)",
                    round,
                    standing.participant_id
                );
            }
            ByePolicy::FreeWin => {
                if let Some(s) = bracket.standings.get_mut(&standing.participant_id) {
                    // A bye win has no opponent and adds nothing to the
                    // recipient's match history.
                    s.wins += 1;
                    awarded_bye = true;
                }
                log::info!(
                    "Round {}: {} receives a bye win",
                    round,
                    standing.participant_id
                );
            }
        }
    }
    // A bye win changes win counts like any other result: opponents who
    // already faced the recipient see their Buchholz move, and the recipient
    // may cross the qualification threshold.
    if awarded_bye {
        recompute_buchholz(bracket);
        qualification::evaluate(bracket);
    }

    log::info!(
        "Generated round {} with {} matches ({:?})",
        round,
        created.len(),
        format
    );
    Ok(created)
}
