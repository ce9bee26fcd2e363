//! Bastion Map - grid map, placement and terrain editing engine

pub mod core;
pub mod generation;
pub mod persistence;
pub mod placement;
pub mod session;
pub mod spatial;
pub mod terrain;
pub mod tools;
