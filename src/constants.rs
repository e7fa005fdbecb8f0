//! Centralized generation defaults.
//!
//! `DungeonConfig::default()`, the FFI bridge and the CLI all read their
//! fallback parameters from here.

// =====================================================
// Layout
// =====================================================

/// Default dungeon extent in tiles (width, height)
pub const DEFAULT_DUNGEON_SIZE: (i32, i32) = (64, 64);

/// Default smallest room extent, walls included
pub const DEFAULT_MINIMUM_ROOM_SIZE: (i32, i32) = (6, 6);

/// Default corridor width in tiles
pub const DEFAULT_PATH_WIDTH: i32 = 2;

/// Default number of quad-tree levels below the root
pub const DEFAULT_PARTITION_DEPTH: u32 = 2;

/// Default root seed
pub const DEFAULT_SEED: u64 = 42;

/// Largest dungeon extent accepted by config validation, per axis
pub const MAX_DUNGEON_EXTENT: i32 = 4096;

/// Deepest partition accepted by config validation (4^8 leaves)
pub const MAX_PARTITION_DEPTH: u32 = 8;

// =====================================================
// Failure policy
// =====================================================

/// Random edge points tried per sibling connection before giving up on it
pub const DEFAULT_CONNECTION_ATTEMPTS: u32 = 4;

/// Whole-layout attempts (re-seeded deterministically) before reporting failure
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Largest `connection_attempts` accepted by config validation
pub const MAX_CONNECTION_ATTEMPTS: u32 = 64;

/// Largest `max_attempts` accepted by config validation
pub const MAX_GENERATION_ATTEMPTS: u32 = 64;

// =====================================================
// Survey
// =====================================================

/// Layouts generated by a default survey run
pub const DEFAULT_SURVEY_COUNT: u64 = 256;
