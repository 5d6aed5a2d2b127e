//! Bracket engine logic: catalog, pairing, standings, qualification,
//! match lifecycle, and the orchestrator.

mod catalog;
mod lifecycle;
mod orchestrator;
mod pairing;
mod qualification;
mod standings;

pub use catalog::{format_for, swiss_round_count, MapCatalog};
pub use lifecycle::{
    approve_match_result, cancel_match, create_match_dispute, resolve_dispute, series_winner,
    start_match, submit_match_result,
};
pub use orchestrator::{create_bracket, generate_next_round, start_playoffs};
pub use pairing::generate_round;
pub use qualification::{evaluate, qualification_wins_needed};
pub use standings::{apply_result, compare_rank, recompute_buchholz};
