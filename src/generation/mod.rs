//! Procedural dungeon layout generation.
//!
//! Pipeline: slice the dungeon into a quad-tree, drop one room into every
//! leaf, connect sibling subtrees with corridors, then rasterize rooms and
//! corridors into a [`tiles::TileGrid`] and derive walls, corners and pillars.

pub mod connectivity;
pub mod layout;
pub mod paths;
pub mod quad;
pub mod quadtree;
pub mod rng;
pub mod tiles;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::config::ConfigError;

pub use layout::{Connection, DungeonLayout, RoomId};
pub use paths::{ConnectionShape, PathPlanner};
pub use quad::{Axis, Point, Quad};
pub use quadtree::{NodeId, QuadTree, QuadTreeNode, Quadrant};
pub use rng::{RandomStream, SeededStream};
pub use tiles::{Rotation, TileData, TileGrid, TileType};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("cannot slice {quad} with {depth} level(s) left: extent below the minimum room size")]
    DegenerateSplit { quad: Quad, depth: u32 },
    #[error("sibling group in {quad} stays disconnected: edge {edge} has no corridor")]
    Disconnected { quad: Quad, edge: usize },
    #[error("rooms are not all reachable after connecting {connections} pair(s)")]
    Unreachable { connections: usize },
    #[error("gave up after {attempts} attempt(s): {last}")]
    AttemptsExhausted {
        attempts: u32,
        #[source]
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Stable short name, used to group failures in surveys and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
            Self::DegenerateSplit { .. } => "degenerate_split",
            Self::Disconnected { .. } => "disconnected",
            Self::Unreachable { .. } => "unreachable",
            Self::AttemptsExhausted { last, .. } => last.kind(),
        }
    }
}

/// Root seed of a dungeon; derives retry and per-level seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonSeed {
    pub seed: u64,
}

impl Default for DungeonSeed {
    fn default() -> Self {
        Self {
            seed: crate::constants::DEFAULT_SEED,
        }
    }
}

impl DungeonSeed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed used by whole-layout attempt `attempt` (attempt 0 is the seed itself)
    pub fn attempt_seed(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return self.seed;
        }
        self.derive(b"attempt", u64::from(attempt))
    }

    /// Independent seed for one level of a multi-level campaign
    pub fn level_seed(&self, level: u32) -> u64 {
        self.derive(b"level", u64::from(level))
    }

    /// Seed of layout `index` in a survey rooted at this seed
    pub fn survey_seed(&self, index: u64) -> u64 {
        self.derive(b"survey", index)
    }

    fn derive(&self, domain: &[u8], index: u64) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(domain);
        hasher.update(self.seed.to_le_bytes());
        hasher.update(index.to_le_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        u64::from_le_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_zero_is_root_seed() {
        let seed = DungeonSeed::new(12345);
        assert_eq!(seed.attempt_seed(0), 12345);
        assert_ne!(seed.attempt_seed(1), 12345);
        assert_ne!(seed.attempt_seed(1), seed.attempt_seed(2));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = DungeonSeed::new(99);
        let b = DungeonSeed::new(99);
        assert_eq!(a.level_seed(3), b.level_seed(3));
        assert_eq!(a.attempt_seed(5), b.attempt_seed(5));
    }

    #[test]
    fn test_level_and_attempt_domains_differ() {
        let seed = DungeonSeed::new(7);
        assert_ne!(seed.level_seed(1), seed.attempt_seed(1));
        assert_ne!(seed.level_seed(1), seed.level_seed(2));
        assert_ne!(seed.survey_seed(1), seed.level_seed(1));
        assert_ne!(seed.survey_seed(1), seed.attempt_seed(1));
    }

    #[test]
    fn test_error_kind_sees_through_exhaustion() {
        let err = GenerationError::AttemptsExhausted {
            attempts: 3,
            last: Box::new(GenerationError::Unreachable { connections: 2 }),
        };
        assert_eq!(err.kind(), "unreachable");
        assert!(err.to_string().contains("3 attempt"));
    }
}
