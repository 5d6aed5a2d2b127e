//! Swiss-system tournament bracket engine: library with models and business logic.

pub mod logic;
pub mod models;

pub use logic::{
    apply_result, approve_match_result, cancel_match, create_bracket, create_match_dispute,
    evaluate, format_for, generate_next_round, generate_round, qualification_wins_needed, resolve_dispute,
    series_winner, start_match, start_playoffs, submit_match_result, swiss_round_count, MapCatalog,
};
pub use models::{
    BracketError, ByePolicy, DisputeStatus, GameMatch, MapResult, MatchDispute, MatchFormat,
    MatchId, MatchReport, MatchStage, MatchStatus, ParticipantId, ParticipantKind, Player,
    ReportStatus, Side, SwissConfig, SwissStanding, Team, TournamentBracket, TournamentId,
};
