//! TournamentBracket aggregate, Swiss standings, and engine errors.

use crate::models::game_match::{GameMatch, MatchId, MatchStage, MatchStatus};
use crate::models::participant::{ParticipantId, ParticipantKind};
use crate::models::report::{DisputeId, MatchDispute, MatchReport, ReportId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tournament (one bracket per tournament).
pub type TournamentId = Uuid;

/// Errors that can occur during bracket operations. All are recoverable;
/// a rejected operation leaves the bracket unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BracketError {
    /// Precondition: the current round still has unfinished matches.
    #[error("Round {round} still has matches that are not completed or cancelled")]
    RoundInProgress { round: u32 },
    /// Precondition: all Swiss rounds have already been generated.
    #[error("Swiss phase is over: all {total} rounds have been generated")]
    SwissPhaseOver { total: u32 },
    /// Precondition: playoffs can only be started once.
    #[error("Playoffs have already been started")]
    PlayoffsAlreadyStarted,
    /// Precondition: the Swiss phase must finish before playoffs.
    #[error("Swiss phase not finished: round {current} of {total}")]
    SwissNotFinished { current: u32, total: u32 },
    /// Precondition: not enough qualified participants for the playoff bracket.
    #[error("Not enough qualified participants: need {needed}, have {qualified}")]
    NotEnoughQualified { needed: usize, qualified: usize },
    /// Precondition: the match is not in a state that allows this transition.
    #[error("Match is {status:?}; this action requires a non-terminal match")]
    InvalidMatchState { status: MatchStatus },
    /// Validation: a bo3 report where neither side reached 2 map wins, or a
    /// bo1 report with no decisive map.
    #[error("Series incomplete: no side reached the required map wins")]
    SeriesIncomplete,
    /// Validation: a map score with no derivable winner.
    #[error("Tied score on map {map}: cannot derive a map winner")]
    TiedMap { map: String },
    /// Validation: more map results than maps scheduled.
    #[error("Too many map results: match has {scheduled} maps, report has {reported}")]
    TooManyResults { scheduled: usize, reported: usize },
    /// Validation: map results recorded after the series was already decided.
    #[error("Extra map results after the series was decided")]
    TrailingResults,
    /// Validation: the reporter is not one of the match participants.
    #[error("Participant {0} is not in this match")]
    ReporterNotInMatch(ParticipantId),
    /// Validation: the report has already been approved or disputed.
    #[error("Report is not pending")]
    ReportNotPending,
    /// Validation: the dispute has already been resolved or rejected.
    #[error("Dispute is not pending")]
    DisputeNotPending,
    /// Integrity: this match has already been folded into standings.
    #[error("Match {0} has already been applied to standings")]
    DuplicateApplication(MatchId),
    /// Integrity: standings can only absorb completed matches.
    #[error("Match {0} is not completed; cannot apply to standings")]
    MatchNotCompleted(MatchId),
    /// Integrity: standings track the Swiss phase only.
    #[error("Match {0} is a playoff match; it does not affect Swiss standings")]
    NotASwissMatch(MatchId),
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),
    #[error("Report not found: {0}")]
    ReportNotFound(ReportId),
    #[error("Dispute not found: {0}")]
    DisputeNotFound(DisputeId),
    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),
    /// Setup: brackets are team-vs-team or player-vs-player, never mixed.
    #[error("Participants must be all teams or all solo players")]
    MixedParticipantKinds,
    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(ParticipantId),
    /// Setup: need at least two participants to pair a round.
    #[error("Need at least {needed} participants (got {got})")]
    NotEnoughParticipants { needed: usize, got: usize },
}

impl BracketError {
    /// Not-found errors are a distinct kind from validation/precondition
    /// failures (the API layer maps them to 404 rather than 400).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BracketError::MatchNotFound(_)
                | BracketError::ReportNotFound(_)
                | BracketError::DisputeNotFound(_)
                | BracketError::ParticipantNotFound(_)
        )
    }
}

/// What happens to the odd participant out when the active pool cannot be
/// fully paired. The source system left this open; it is a deployment choice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByePolicy {
    /// The participant sits out the round scoreless.
    #[default]
    SitOut,
    /// The participant receives a free win (no opponent added to history).
    FreeWin,
}

/// Per-deployment Swiss configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissConfig {
    /// Playoff spots awarded to the top of the final standings.
    pub qualification_spots: usize,
    /// Losses at which a participant is eliminated.
    pub elimination_threshold: u32,
    pub bye_policy: ByePolicy,
}

impl Default for SwissConfig {
    fn default() -> Self {
        Self {
            qualification_spots: 8,
            elimination_threshold: 3,
            bye_policy: ByePolicy::SitOut,
        }
    }
}

/// Running Swiss record for one participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwissStanding {
    pub participant_id: ParticipantId,
    pub wins: u32,
    pub losses: u32,
    /// Sum of the win counts of every opponent already faced (tie-break metric).
    pub buchholz: f64,
    /// Opponents already played, in order. Used to forbid rematches.
    pub match_history: Vec<ParticipantId>,
    pub is_eliminated: bool,
    pub is_qualified: bool,
}

impl SwissStanding {
    pub fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            wins: 0,
            losses: 0,
            buchholz: 0.0,
            match_history: Vec::new(),
            is_eliminated: false,
            is_qualified: false,
        }
    }

    /// Still in the Swiss pool: neither qualified nor eliminated.
    pub fn is_active(&self) -> bool {
        !self.is_eliminated && !self.is_qualified
    }

    pub fn has_played(&self, opponent: &ParticipantId) -> bool {
        self.match_history.contains(opponent)
    }
}

/// Aggregate root: one bracket per tournament. All mutation goes through the
/// logic functions; writes to one bracket must be serialized by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentBracket {
    pub tournament_id: TournamentId,
    /// Game the bracket is played on (selects the map catalog entry).
    pub game: String,
    pub participants: Vec<ParticipantKind>,
    /// Total planned Swiss rounds; fixed at creation, never recomputed.
    pub swiss_rounds: u32,
    pub current_swiss_round: u32,
    /// Standings keyed by participant id.
    pub standings: HashMap<ParticipantId, SwissStanding>,
    /// All Swiss-phase matches ever generated.
    pub matches: Vec<GameMatch>,
    pub playoff_matches: Vec<GameMatch>,
    /// One-way flag: set when the playoff bracket is built.
    pub playoff_started: bool,
    pub config: SwissConfig,
    /// Matches already folded into standings. Guards against double-counting.
    pub applied_matches: HashSet<MatchId>,
    pub reports: Vec<MatchReport>,
    pub disputes: Vec<MatchDispute>,
    /// Next sequential match number.
    pub next_match_number: u32,
}

impl TournamentBracket {
    /// Look up a match in either phase.
    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches
            .iter()
            .chain(self.playoff_matches.iter())
            .find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches
            .iter_mut()
            .chain(self.playoff_matches.iter_mut())
            .find(|m| m.id == id)
    }

    pub fn get_report(&self, id: ReportId) -> Option<&MatchReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn get_report_mut(&mut self, id: ReportId) -> Option<&mut MatchReport> {
        self.reports.iter_mut().find(|r| r.id == id)
    }

    pub fn get_dispute_mut(&mut self, id: DisputeId) -> Option<&mut MatchDispute> {
        self.disputes.iter_mut().find(|d| d.id == id)
    }

    pub fn standing(&self, id: &ParticipantId) -> Option<&SwissStanding> {
        self.standings.get(id)
    }

    /// Matches belonging to the given Swiss round.
    pub fn round_matches(&self, round: u32) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .iter()
            .filter(move |m| m.stage == MatchStage::Swiss { round })
    }

    /// True when every match of the given round is completed or cancelled.
    /// A round with no matches counts as finished.
    pub fn round_finished(&self, round: u32) -> bool {
        self.round_matches(round).all(|m| m.status.is_terminal())
    }

    /// Standings still in the Swiss pool, in an unspecified order.
    pub fn active_standings(&self) -> impl Iterator<Item = &SwissStanding> {
        self.standings.values().filter(|s| s.is_active())
    }

    pub fn qualified_count(&self) -> usize {
        self.standings.values().filter(|s| s.is_qualified).count()
    }
}
