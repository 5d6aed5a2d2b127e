//! Integration tests for the match lifecycle: report intake, approval,
//! cancellation, and disputes.

use swiss_bracket_web::{
    approve_match_result, cancel_match, create_bracket, create_match_dispute,
    generate_next_round, resolve_dispute, series_winner, start_match, submit_match_result,
    BracketError, DisputeStatus, MapCatalog, MapResult, MatchFormat, MatchId, MatchStatus,
    ParticipantKind, Player, ReportStatus, Side, SwissConfig, TournamentBracket,
};
use uuid::Uuid;

fn players(n: usize) -> Vec<ParticipantKind> {
    (1..=n)
        .map(|i| ParticipantKind::Player(Player::new(format!("p{i}"), format!("Player {i}"))))
        .collect()
}

fn bracket_with(n: usize) -> TournamentBracket {
    create_bracket(
        Uuid::new_v4(),
        "cs2",
        players(n),
        SwissConfig::default(),
        &MapCatalog::with_defaults(),
    )
    .unwrap()
}

fn first_match(b: &TournamentBracket) -> MatchId {
    b.matches[0].id
}

/// Side 1 wins every map of the given match, via report + approval.
fn complete_match(b: &mut TournamentBracket, match_id: MatchId) {
    let m = b.get_match(match_id).unwrap().clone();
    let results: Vec<MapResult> = m
        .maps
        .iter()
        .take(m.format.wins_needed() as usize)
        .map(|map| MapResult::new(map.clone(), 13, 7))
        .collect();
    let reporter = m.side_1.clone();
    let report_id = submit_match_result(b, match_id, reporter, results, Vec::new()).unwrap();
    approve_match_result(b, report_id).unwrap();
}

fn complete_round(b: &mut TournamentBracket, round: u32) {
    let ids: Vec<MatchId> = b.round_matches(round).map(|m| m.id).collect();
    for id in ids {
        complete_match(b, id);
    }
}

/// Drive a 4-player bracket to its final (bo3) round and return one of its matches.
fn bo3_match(b: &mut TournamentBracket) -> MatchId {
    let catalog = MapCatalog::with_defaults();
    complete_round(b, 1);
    generate_next_round(b, &catalog).unwrap();
    complete_round(b, 2);
    generate_next_round(b, &catalog).unwrap();
    let m = b.round_matches(3).next().unwrap();
    assert_eq!(m.format, MatchFormat::Bo3);
    m.id
}

#[test]
fn series_winner_follows_map_scores() {
    let r = |a, b| MapResult::new("Mirage", a, b);
    assert_eq!(series_winner(&[r(13, 7)], MatchFormat::Bo1), Ok(Side::One));
    assert_eq!(series_winner(&[r(7, 13)], MatchFormat::Bo1), Ok(Side::Two));
    assert_eq!(
        series_winner(&[r(13, 7), r(10, 13), r(13, 2)], MatchFormat::Bo3),
        Ok(Side::One)
    );
    // A 2-0 sweep is a complete bo3 series.
    assert_eq!(
        series_winner(&[r(13, 7), r(13, 11)], MatchFormat::Bo3),
        Ok(Side::One)
    );
}

#[test]
fn results_past_the_deciding_map_are_rejected() {
    let r = |a, b| MapResult::new("Mirage", a, b);
    // The series is decided 2-0; a third map must not slip through unchecked.
    assert_eq!(
        series_winner(&[r(13, 7), r(13, 11), r(7, 13)], MatchFormat::Bo3),
        Err(BracketError::TrailingResults)
    );
    // A tied trailing map is rejected for being trailing, too.
    assert_eq!(
        series_winner(&[r(13, 7), r(13, 11), r(7, 7)], MatchFormat::Bo3),
        Err(BracketError::TrailingResults)
    );
    assert_eq!(
        series_winner(&[r(13, 7), r(7, 13)], MatchFormat::Bo1),
        Err(BracketError::TrailingResults)
    );

    // The same rule holds at report intake.
    let mut b = bracket_with(4);
    let match_id = bo3_match(&mut b);
    let m = b.get_match(match_id).unwrap().clone();
    let results = vec![
        MapResult::new(m.maps[0].clone(), 13, 7),
        MapResult::new(m.maps[1].clone(), 13, 11),
        MapResult::new(m.maps[2].clone(), 2, 13),
    ];
    let err = submit_match_result(&mut b, match_id, m.side_1.clone(), results, Vec::new());
    assert_eq!(err, Err(BracketError::TrailingResults));
    assert!(b.reports.iter().all(|rep| rep.match_id != match_id));
}

#[test]
fn submitting_a_report_does_not_mutate_the_match() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();

    let report_id = submit_match_result(
        &mut b,
        match_id,
        m.side_1.clone(),
        vec![MapResult::new(m.maps[0].clone(), 16, 14)],
        vec!["https://example.com/shot.png".to_string()],
    )
    .unwrap();

    let report = b.get_report(report_id).unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
    let m_after = b.get_match(match_id).unwrap();
    assert_eq!(m_after.status, MatchStatus::Scheduled);
    assert!(m_after.winner.is_none());
    assert!(m_after.results.is_empty());
}

#[test]
fn incomplete_bo3_series_is_rejected_and_match_stays_in_progress() {
    let mut b = bracket_with(4);
    let match_id = bo3_match(&mut b);
    start_match(&mut b, match_id).unwrap();

    let m = b.get_match(match_id).unwrap().clone();
    // Only 2 of 3 maps reported, split 1-1: neither side reached 2 wins.
    let results = vec![
        MapResult::new(m.maps[0].clone(), 13, 7),
        MapResult::new(m.maps[1].clone(), 7, 13),
    ];
    let err = submit_match_result(&mut b, match_id, m.side_1.clone(), results, Vec::new());
    assert_eq!(err, Err(BracketError::SeriesIncomplete));
    assert_eq!(b.get_match(match_id).unwrap().status, MatchStatus::InProgress);
}

#[test]
fn tied_map_score_is_rejected() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();
    let err = submit_match_result(
        &mut b,
        match_id,
        m.side_1.clone(),
        vec![MapResult::new(m.maps[0].clone(), 13, 13)],
        Vec::new(),
    );
    assert!(matches!(err, Err(BracketError::TiedMap { .. })));
}

#[test]
fn report_from_a_non_participant_is_rejected() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();
    let err = submit_match_result(
        &mut b,
        match_id,
        "intruder".to_string(),
        vec![MapResult::new(m.maps[0].clone(), 13, 7)],
        Vec::new(),
    );
    assert_eq!(err, Err(BracketError::ReporterNotInMatch("intruder".to_string())));
}

#[test]
fn approval_completes_the_match_and_updates_standings() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();

    let report_id = submit_match_result(
        &mut b,
        match_id,
        m.side_2.clone(),
        vec![MapResult::new(m.maps[0].clone(), 9, 16)],
        Vec::new(),
    )
    .unwrap();
    approve_match_result(&mut b, report_id).unwrap();

    let m_after = b.get_match(match_id).unwrap();
    assert_eq!(m_after.status, MatchStatus::Completed);
    assert_eq!(m_after.winner.as_ref(), Some(&m.side_2));
    assert!(m_after.completed_at.is_some());
    assert_eq!(b.get_report(report_id).unwrap().status, ReportStatus::Approved);

    let winner = b.standing(&m.side_2).unwrap();
    assert_eq!((winner.wins, winner.losses), (1, 0));
    assert_eq!(winner.match_history, vec![m.side_1.clone()]);
    let loser = b.standing(&m.side_1).unwrap();
    assert_eq!((loser.wins, loser.losses), (0, 1));
    // Loser faced a 1-win opponent.
    assert_eq!(loser.buchholz, 1.0);
}

#[test]
fn approving_the_same_report_twice_is_an_error_with_unchanged_standings() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    complete_match(&mut b, match_id);
    let report_id = b.reports[0].id;
    let standings_before = b.standings.clone();

    let err = approve_match_result(&mut b, report_id);
    assert_eq!(err, Err(BracketError::ReportNotPending));
    assert_eq!(b.standings, standings_before);
}

#[test]
fn approving_a_second_report_against_a_completed_match_is_an_error() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();

    let losing_report = submit_match_result(
        &mut b,
        match_id,
        m.side_2.clone(),
        vec![MapResult::new(m.maps[0].clone(), 8, 16)],
        Vec::new(),
    )
    .unwrap();
    complete_match(&mut b, match_id);

    let standings_before = b.standings.clone();
    let err = approve_match_result(&mut b, losing_report);
    assert_eq!(
        err,
        Err(BracketError::InvalidMatchState {
            status: MatchStatus::Completed
        })
    );
    assert_eq!(b.standings, standings_before);
}

#[test]
fn cancelled_match_never_reaches_standings() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();

    let report_id = submit_match_result(
        &mut b,
        match_id,
        m.side_1.clone(),
        vec![MapResult::new(m.maps[0].clone(), 13, 7)],
        Vec::new(),
    )
    .unwrap();
    cancel_match(&mut b, match_id, "server outage").unwrap();

    let m_after = b.get_match(match_id).unwrap();
    assert_eq!(m_after.status, MatchStatus::Cancelled);
    assert_eq!(m_after.cancel_reason.as_deref(), Some("server outage"));

    // Approving the stale report against the cancelled match must fail.
    let err = approve_match_result(&mut b, report_id);
    assert_eq!(
        err,
        Err(BracketError::InvalidMatchState {
            status: MatchStatus::Cancelled
        })
    );
    for s in b.standings.values() {
        assert_eq!((s.wins, s.losses), (0, 0));
        assert!(s.match_history.is_empty());
    }
}

#[test]
fn cancelling_a_terminal_match_is_an_error() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    complete_match(&mut b, match_id);
    let err = cancel_match(&mut b, match_id, "too late");
    assert_eq!(
        err,
        Err(BracketError::InvalidMatchState {
            status: MatchStatus::Completed
        })
    );
}

#[test]
fn start_match_transitions_scheduled_to_in_progress() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    start_match(&mut b, match_id).unwrap();
    let m = b.get_match(match_id).unwrap();
    assert_eq!(m.status, MatchStatus::InProgress);
    assert!(m.started_at.is_some());

    // Starting twice is a state error.
    assert_eq!(
        start_match(&mut b, match_id),
        Err(BracketError::InvalidMatchState {
            status: MatchStatus::InProgress
        })
    );
}

#[test]
fn disputes_are_independent_of_match_state() {
    let mut b = bracket_with(4);
    let match_id = first_match(&b);
    let m = b.get_match(match_id).unwrap().clone();
    complete_match(&mut b, match_id);
    let standings_before = b.standings.clone();

    let dispute_id = create_match_dispute(
        &mut b,
        match_id,
        m.side_2.clone(),
        "wrong score",
        "Map 1 ended 13-9, not 13-7",
        vec!["https://example.com/vod".to_string()],
    )
    .unwrap();
    assert_eq!(b.disputes.len(), 1);
    assert_eq!(b.disputes[0].status, DisputeStatus::Pending);
    // Filing a dispute changes neither the match nor the standings.
    assert_eq!(b.get_match(match_id).unwrap().status, MatchStatus::Completed);
    assert_eq!(b.standings, standings_before);

    resolve_dispute(&mut b, dispute_id, false, "Screenshot confirms 13-7").unwrap();
    assert_eq!(b.disputes[0].status, DisputeStatus::Rejected);
    assert_eq!(
        b.disputes[0].admin_response.as_deref(),
        Some("Screenshot confirms 13-7")
    );
    // The ruling never reverts a completed match.
    assert_eq!(b.standings, standings_before);

    let err = resolve_dispute(&mut b, dispute_id, true, "changed my mind");
    assert_eq!(err, Err(BracketError::DisputeNotPending));
}
