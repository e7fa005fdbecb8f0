//! Text rendering of tile grids.
//!
//! Each tile type gets a distinct glyph; rows are printed north first so the
//! map reads the same way the +y axis points.

use crate::generation::{DungeonLayout, TileGrid, TileType};

pub fn tile_glyph(tile_type: TileType) -> char {
    match tile_type {
        TileType::Empty => ' ',
        TileType::Floor => '.',
        TileType::Wall => '#',
        TileType::InsideCorner => '+',
        TileType::OutsideCorner => '\'',
        TileType::Pillar => 'o',
    }
}

/// One line per row, north at the top, trailing newline after each row
pub fn render_ascii(grid: &TileGrid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for row in grid.rows().iter().rev() {
        out.extend(row.iter().map(|tile| tile_glyph(tile.tile_type)));
        out.push('\n');
    }
    out
}

/// Map followed by a one-line summary of rooms, paths and tile counts
pub fn render_layout(layout: &DungeonLayout) -> String {
    let tiles = layout.tiles();
    let mut out = render_ascii(tiles);
    let counts: Vec<String> = TileType::all()
        .iter()
        .filter(|t| **t != TileType::Empty)
        .map(|t| format!("{:?}={}", t, tiles.count(*t)))
        .collect();
    out.push_str(&format!(
        "seed={} rooms={} paths={} connections={} {}\n",
        layout.seed().unwrap_or(layout.config().seed),
        layout.rooms().len(),
        layout.paths().len(),
        layout.connections().len(),
        counts.join(" ")
    ));
    out
}
