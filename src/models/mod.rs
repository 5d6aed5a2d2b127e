//! Data structures for the bracket engine: participants, matches, reports, standings.

mod bracket;
mod game_match;
mod participant;
mod report;

pub use bracket::{
    BracketError, ByePolicy, SwissConfig, SwissStanding, TournamentBracket, TournamentId,
};
pub use game_match::{GameMatch, MapResult, MatchFormat, MatchId, MatchStage, MatchStatus, Side};
pub use participant::{ParticipantId, ParticipantKind, Player, Team};
pub use report::{
    DisputeId, DisputeStatus, MatchDispute, MatchReport, ReportId, ReportStatus,
};
