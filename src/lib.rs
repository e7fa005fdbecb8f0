//! Dungeon Procedural Core Library
//!
//! Deterministic dungeon layout generation for the game client:
//! - Quad-tree partitioning of the dungeon footprint
//! - One random room per partition leaf
//! - Straight and L-bend corridors between sibling regions
//! - Tile grid with derived walls, corners and pillars
//! - Multi-seed generation survey
//! - FFI bridge for the engine-side tile placer

pub mod bridge;
pub mod config;
pub mod constants;
pub mod generation;
pub mod logging;
pub mod survey;
pub mod visualization;

pub use config::{ConfigError, DungeonConfig};
pub use generation::{DungeonLayout, DungeonSeed, GenerationError};
