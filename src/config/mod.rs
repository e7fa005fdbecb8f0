//! Generation parameters and their validation.
//!
//! Configs load from RON or JSON (picked by file extension) and are checked by
//! [`DungeonConfig::validate`] before the first random draw, so an impossible
//! partition is rejected up front instead of producing an inverted range.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::generation::quad::{Axis, Point};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
    #[error("dungeon {axis:?} extent {size} exceeds the maximum of {max}")]
    TooLarge { axis: Axis, size: i32, max: i32 },
    #[error("{field} {value} exceeds the maximum of {max}")]
    TooManyAttempts {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("partition depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: u32, max: u32 },
    #[error("dungeon {axis:?} extent {size} is below {required} required for the partition depth")]
    TooSmallForDepth { axis: Axis, size: i32, required: i64 },
    #[error("path width {path_width} is wider than the minimum room side {room_side}")]
    PathWiderThanRoom { path_width: i32, room_side: i32 },
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON encode error: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Width and height of the tile grid
    pub dungeon_size: Point,
    /// Smallest room extent, walls included
    pub minimum_room_size: Point,
    pub path_width: i32,
    pub partition_depth: u32,
    pub seed: u64,
    /// Edge points tried per sibling connection
    pub connection_attempts: u32,
    /// Whole-layout attempts before giving up
    pub max_attempts: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            dungeon_size: Point::new(DEFAULT_DUNGEON_SIZE.0, DEFAULT_DUNGEON_SIZE.1),
            minimum_room_size: Point::new(DEFAULT_MINIMUM_ROOM_SIZE.0, DEFAULT_MINIMUM_ROOM_SIZE.1),
            path_width: DEFAULT_PATH_WIDTH,
            partition_depth: DEFAULT_PARTITION_DEPTH,
            seed: DEFAULT_SEED,
            connection_attempts: DEFAULT_CONNECTION_ATTEMPTS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl DungeonConfig {
    pub fn new(
        dungeon_size: Point,
        minimum_room_size: Point,
        path_width: i32,
        partition_depth: u32,
        seed: u64,
    ) -> Self {
        Self {
            dungeon_size,
            minimum_room_size,
            path_width,
            partition_depth,
            seed,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Smallest extent a quad needs so that `depth` further levels of slicing
    /// still leave every leaf at least `minimum_room_size`.
    pub fn required_extent(minimum: i32, depth: u32) -> i64 {
        i64::from(minimum) << depth.min(MAX_PARTITION_DEPTH)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("dungeon_size.x", self.dungeon_size.x),
            ("dungeon_size.y", self.dungeon_size.y),
            ("minimum_room_size.x", self.minimum_room_size.x),
            ("minimum_room_size.y", self.minimum_room_size.y),
            ("path_width", self.path_width),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.connection_attempts == 0 {
            return Err(ConfigError::NonPositive {
                field: "connection_attempts",
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_attempts",
            });
        }
        let attempts = [
            ("connection_attempts", self.connection_attempts, MAX_CONNECTION_ATTEMPTS),
            ("max_attempts", self.max_attempts, MAX_GENERATION_ATTEMPTS),
        ];
        for (field, value, max) in attempts {
            if value > max {
                return Err(ConfigError::TooManyAttempts { field, value, max });
            }
        }

        if self.partition_depth > MAX_PARTITION_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                depth: self.partition_depth,
                max: MAX_PARTITION_DEPTH,
            });
        }

        for axis in [Axis::X, Axis::Y] {
            let size = self.dungeon_size.along(axis);
            if size > MAX_DUNGEON_EXTENT {
                return Err(ConfigError::TooLarge {
                    axis,
                    size,
                    max: MAX_DUNGEON_EXTENT,
                });
            }
            let required =
                Self::required_extent(self.minimum_room_size.along(axis), self.partition_depth);
            if i64::from(size) < required {
                return Err(ConfigError::TooSmallForDepth {
                    axis,
                    size,
                    required,
                });
            }
        }

        let room_side = self.minimum_room_size.x.min(self.minimum_room_size.y);
        if self.path_width > room_side {
            return Err(ConfigError::PathWiderThanRoom {
                path_width: self.path_width,
                room_side,
            });
        }

        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load from a `.ron` or `.json` file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), seed = config.seed, "loaded dungeon config");
        Ok(config)
    }
}
