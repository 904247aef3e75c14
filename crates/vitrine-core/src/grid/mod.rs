//! Infinite pannable grid: cell indexing, viewport enumeration and pan state.

pub mod index;
pub mod pan;
pub mod viewport;
