//! Map/format catalog: per-game map pools and best-of rules.
//!
//! The catalog is injected configuration (a loaded table), not a compiled-in
//! global, so map pools can be swapped per deployment without recompilation.

use crate::models::MatchFormat;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Per-game map pools plus a default pool for unknown games.
#[derive(Clone, Debug)]
pub struct MapCatalog {
    games: HashMap<String, Vec<String>>,
    default_maps: Vec<String>,
}

impl MapCatalog {
    pub fn new(games: HashMap<String, Vec<String>>, default_maps: Vec<String>) -> Self {
        Self {
            games,
            default_maps,
        }
    }

    /// Built-in catalog used when no deployment table is provided.
    pub fn with_defaults() -> Self {
        let mut games = HashMap::new();
        games.insert(
            "cs2".to_string(),
            ["Mirage", "Inferno", "Nuke", "Ancient", "Anubis", "Dust2", "Vertigo"]
                .map(String::from)
                .to_vec(),
        );
        games.insert(
            "valorant".to_string(),
            ["Ascent", "Bind", "Haven", "Split", "Lotus", "Sunset", "Icebox"]
                .map(String::from)
                .to_vec(),
        );
        games.insert(
            "rocket_league".to_string(),
            ["DFH Stadium", "Mannfield", "Champions Field", "Urban Central", "Beckwith Park"]
                .map(String::from)
                .to_vec(),
        );
        let default_maps = games["cs2"].clone();
        Self {
            games,
            default_maps,
        }
    }

    /// Ordered map pool for a game. An unknown game falls back to the default
    /// pool rather than failing.
    pub fn maps_for(&self, game: &str) -> &[String] {
        self.games
            .get(game)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_maps)
    }

    /// Draw `count` maps for a match without repetition. The draw may be
    /// randomized; if the pool is smaller than `count`, it cycles from the top.
    pub fn draw_maps(&self, game: &str, count: usize) -> Vec<String> {
        let pool = self.maps_for(game);
        let mut rng = rand::thread_rng();
        let mut drawn: Vec<String> = pool
            .choose_multiple(&mut rng, count.min(pool.len()))
            .cloned()
            .collect();
        // Pool smaller than the series length: reuse maps in catalog order.
        let mut i = 0;
        while drawn.len() < count && !pool.is_empty() {
            drawn.push(pool[i % pool.len()].clone());
            i += 1;
        }
        drawn
    }
}

impl Default for MapCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Total Swiss rounds for a participant count. Fixed at bracket creation.
pub fn swiss_round_count(participant_count: usize) -> u32 {
    match participant_count {
        0..=8 => 3,
        9..=16 => 4,
        17..=32 => 5,
        33..=64 => 6,
        _ => 7,
    }
}

/// Format for a Swiss round: bo1 until the final round, which is bo3.
/// Playoff matches are always bo3.
pub fn format_for(round: u32, total_swiss_rounds: u32) -> MatchFormat {
    if round >= total_swiss_rounds {
        MatchFormat::Bo3
    } else {
        MatchFormat::Bo1
    }
}
