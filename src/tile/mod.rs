//! Tiled matrix storage.
//!
//! A [`TileDesc`] maps the logical tile grid of a matrix onto the offsets of independent tiles in
//! a single arena, for general, triangular and band layouts. A [`TileMatrix`] pairs a descriptor
//! with its arena, shared by reference counting with every task that operates on it.

mod desc;
mod matrix;

pub use desc::{Layout, TileAddr, TileDesc};
pub use matrix::{ArenaId, TileMatrix};
