//! FFI Bridge Layer: dungeon core <-> game engine tile placer
//!
//! This module exposes C-ABI functions the engine calls via DLL loading.
//! Data is serialized as JSON across the boundary.
//! Every function returning `*mut c_char` hands over a heap string that the
//! caller must release with `free_string`.

use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::config::DungeonConfig;
use crate::generation::{
    ConnectionShape, DungeonLayout, DungeonSeed, GenerationError, Point, Quad, TileGrid,
};
use crate::logging;
use crate::visualization;

// ========================
// Data transfer types
// ========================

/// Generated dungeon, ready for tile instantiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayoutResponse {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub attempts: u32,
    pub tiles: Vec<Vec<u8>>, // TileType as u8, indexed [y][x]
    pub rotations: Vec<Vec<u16>>, // degrees, indexed [y][x]
    pub rooms: Vec<RoomInfo>,
    pub paths: Vec<RectInfo>,
    pub connections: Vec<ConnectionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub center: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectInfo {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<&Quad> for RectInfo {
    fn from(quad: &Quad) -> Self {
        Self {
            x: quad.position.x,
            y: quad.position.y,
            width: quad.width(),
            height: quad.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub from: usize,
    pub to: usize,
    pub shape: String, // "straight_x", "straight_y" or "l_bend"
    pub path_indices: Vec<usize>,
}

fn shape_name(shape: ConnectionShape) -> &'static str {
    match shape {
        ConnectionShape::Straight(crate::generation::Axis::X) => "straight_x",
        ConnectionShape::Straight(crate::generation::Axis::Y) => "straight_y",
        ConnectionShape::LBend => "l_bend",
    }
}

fn tile_codes(grid: &TileGrid) -> (Vec<Vec<u8>>, Vec<Vec<u16>>) {
    let tiles = grid
        .rows()
        .iter()
        .map(|row| row.iter().map(|tile| tile.tile_type.to_u8()).collect())
        .collect();
    let rotations = grid
        .rows()
        .iter()
        .map(|row| row.iter().map(|tile| tile.rotation.degrees()).collect())
        .collect();
    (tiles, rotations)
}

impl From<&DungeonLayout> for DungeonLayoutResponse {
    fn from(layout: &DungeonLayout) -> Self {
        let (tiles, rotations) = tile_codes(layout.tiles());

        let rooms = layout
            .rooms()
            .iter()
            .enumerate()
            .map(|(id, room)| {
                let Point { x, y } = room.center();
                RoomInfo {
                    id,
                    x: room.position.x,
                    y: room.position.y,
                    width: room.width(),
                    height: room.height(),
                    center: (x, y),
                }
            })
            .collect();

        let connections = layout
            .connections()
            .iter()
            .map(|c| ConnectionInfo {
                from: c.from.0,
                to: c.to.0,
                shape: shape_name(c.shape).to_string(),
                path_indices: c.paths.clone().collect(),
            })
            .collect();

        Self {
            width: layout.tiles().width(),
            height: layout.tiles().height(),
            seed: layout.seed().unwrap_or(layout.config().seed),
            attempts: layout.attempts(),
            tiles,
            rotations,
            rooms,
            paths: layout.paths().iter().map(RectInfo::from).collect(),
            connections,
        }
    }
}

/// Generate a layout for `config` and convert it for the boundary
pub fn generate_response(config: &DungeonConfig) -> Result<DungeonLayoutResponse, GenerationError> {
    let mut layout = DungeonLayout::new(config.clone());
    layout.generate_dungeon_layout()?;
    Ok(DungeonLayoutResponse::from(&layout))
}

/// Outcome of `dungeon_validate_config`
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub error: Option<String>,
}

// ========================
// Helper: safe JSON return
// ========================

fn json_to_cstring<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn parse_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_owned()) }
}

fn parse_config(ptr: *const c_char) -> Option<DungeonConfig> {
    let json = parse_cstr(ptr)?;
    match DungeonConfig::from_json_str(&json) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(error = %err, "rejected dungeon config JSON");
            None
        }
    }
}

fn generate_to_cstring(config: &DungeonConfig) -> *mut c_char {
    match generate_response(config) {
        Ok(response) => json_to_cstring(&response),
        Err(err) => {
            tracing::warn!(seed = config.seed, kind = err.kind(), error = %err, "dungeon generation failed");
            std::ptr::null_mut()
        }
    }
}

// ========================
// C-ABI: Core
// ========================

/// Version string
#[no_mangle]
pub extern "C" fn get_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .unwrap_or_default()
        .into_raw()
}

/// Free a string allocated by Rust.
/// ptr must come from a prior Rust FFI allocation or be null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

// ========================
// C-ABI: Dungeon Generation
// ========================

/// Default generation config as JSON
#[no_mangle]
pub extern "C" fn dungeon_default_config() -> *mut c_char {
    json_to_cstring(&DungeonConfig::default())
}

/// Validate a JSON config: 0 = valid, 1 = invalid parameters, -1 = unreadable
#[no_mangle]
pub extern "C" fn dungeon_validate_config(config_json: *const c_char) -> i32 {
    let Some(config) = parse_config(config_json) else {
        return -1;
    };
    match config.validate() {
        Ok(()) => 0,
        Err(err) => {
            tracing::debug!(error = %err, "config failed validation");
            1
        }
    }
}

/// Validation details as JSON (`{"valid": bool, "error": string|null}`); null if unreadable
#[no_mangle]
pub extern "C" fn dungeon_validate_config_json(config_json: *const c_char) -> *mut c_char {
    let Some(config) = parse_config(config_json) else {
        return std::ptr::null_mut();
    };
    let response = match config.validate() {
        Ok(()) => ValidationResponse {
            valid: true,
            error: None,
        },
        Err(err) => ValidationResponse {
            valid: false,
            error: Some(err.to_string()),
        },
    };
    json_to_cstring(&response)
}

/// Generate a dungeon from a JSON config; null on bad input or failed generation
#[no_mangle]
pub extern "C" fn dungeon_generate(config_json: *const c_char) -> *mut c_char {
    match parse_config(config_json) {
        Some(config) => generate_to_cstring(&config),
        None => std::ptr::null_mut(),
    }
}

/// Generate a dungeon from plain parameters (defaults for the retry policy)
#[no_mangle]
pub extern "C" fn dungeon_generate_simple(
    seed: u64,
    width: i32,
    height: i32,
    min_room_width: i32,
    min_room_height: i32,
    path_width: i32,
    depth: u32,
) -> *mut c_char {
    let config = DungeonConfig::new(
        Point::new(width, height),
        Point::new(min_room_width, min_room_height),
        path_width,
        depth,
        seed,
    );
    generate_to_cstring(&config)
}

/// Independent seed for `level` of a campaign started from `seed`
#[no_mangle]
pub extern "C" fn dungeon_level_seed(seed: u64, level: u32) -> u64 {
    DungeonSeed::new(seed).level_seed(level)
}

/// ASCII map of the dungeon for a JSON config, north at the top; null on failure
#[no_mangle]
pub extern "C" fn dungeon_render_ascii(config_json: *const c_char) -> *mut c_char {
    let Some(config) = parse_config(config_json) else {
        return std::ptr::null_mut();
    };
    let mut layout = DungeonLayout::new(config);
    match layout.generate_dungeon_layout() {
        Ok(()) => CString::new(visualization::render_ascii(layout.tiles()))
            .unwrap_or_default()
            .into_raw(),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "dungeon generation failed");
            std::ptr::null_mut()
        }
    }
}

// ========================
// C-ABI: Logging
// ========================

/// Default logging config as JSON
#[no_mangle]
pub extern "C" fn logging_get_default_config() -> *mut c_char {
    let config = logging::TracingConfig::default();
    json_to_cstring(&config)
}

/// Initialize logging with JSON config
#[no_mangle]
pub extern "C" fn logging_init(config_json: *const c_char) {
    if let Some(json_str) = parse_cstr(config_json) {
        if let Some(config) = logging::TracingConfig::from_json(&json_str) {
            logging::init_tracing(&config);
        }
    }
}

/// Get current logging snapshot as JSON
#[no_mangle]
pub extern "C" fn logging_get_snapshot() -> *mut c_char {
    let config = logging::TracingConfig::default();
    let snapshot = logging::LoggingSnapshot::capture(&config);
    json_to_cstring(&snapshot)
}

/// Log a message at the specified level (0=Trace, 1=Debug, 2=Info, 3=Warn, 4=Error)
#[no_mangle]
pub extern "C" fn logging_log_message(level: u32, target: *const c_char, message: *const c_char) {
    let target_str = match parse_cstr(target) {
        Some(s) => s,
        None => return,
    };
    let msg_str = match parse_cstr(message) {
        Some(s) => s,
        None => return,
    };

    match logging::LogLevel::from_id(level) {
        logging::LogLevel::Trace | logging::LogLevel::Debug => {
            logging::log_debug(&target_str, &msg_str)
        }
        logging::LogLevel::Info => logging::log_info(&target_str, &msg_str),
        logging::LogLevel::Warn => logging::log_warn(&target_str, &msg_str),
        logging::LogLevel::Error => logging::log_error(&target_str, &msg_str),
    }
}
