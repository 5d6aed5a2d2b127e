//! Participants: teams and solo players.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a participant (team or player). Assigned by the caller.
pub type ParticipantId = String;

/// A solo player entering a bracket on their own.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Player {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A team entering a bracket. Roster changes are outside the engine's scope.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: ParticipantId,
    pub name: String,
    /// Player names on the roster (informational; matches are team-vs-team).
    pub players: Vec<String>,
}

impl Team {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>, players: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            players,
        }
    }
}

/// Tagged participant variant: a bracket is either all teams or all solo players,
/// never mixed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantKind {
    Team(Team),
    Player(Player),
}

impl ParticipantKind {
    pub fn id(&self) -> &ParticipantId {
        match self {
            ParticipantKind::Team(t) => &t.id,
            ParticipantKind::Player(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ParticipantKind::Team(t) => &t.name,
            ParticipantKind::Player(p) => &p.display_name,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, ParticipantKind::Team(_))
    }
}
