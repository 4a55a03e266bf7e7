//! Drawing winners
//!
//! Shuffling, winner selection, and the records kept of each draw.

pub mod record;
pub mod shuffle;
pub mod storage;

pub use record::{DrawFile, DrawInfo, DrawRecord};
pub use shuffle::{
    clamp_winner_count, draw, draw_with_rng, shuffle_candidates, shuffle_rounds, shuffle_with_rng,
};
pub use storage::DrawStorage;
