//! Shared mesh fixtures for tests.
//!
//! All fixtures use 1x1 ground cells, so polygon centers sit at
//! `(cx + 0.5, 0, cz + 0.5)` and cell `(cx, cz)` within a grid tile maps to
//! polygon index `cz * cells + cx`. Tiles are registered under salt 1.

use glam::Vec3;

use crate::tile_data::EXT_LINK;
use crate::{
    NavMesh, NavMeshParams, PolyFlags, PolyRef, Result, TileBuilder, TileRef, AREA_GROUND,
};

/// Fixture salt used for every registered tile.
pub const TEST_SALT: u16 = 1;

/// Mesh parameters for fixtures built from `cells` x `cells` grid tiles.
pub fn grid_params(cells: usize) -> NavMeshParams {
    NavMeshParams {
        origin: Vec3::ZERO,
        tile_width: cells as f32,
        tile_height: cells as f32,
        max_tiles: 16,
        max_polys_per_tile: 64,
    }
}

/// Reference to a fixture polygon.
pub fn poly_ref(tile_index: u32, poly_index: u32) -> PolyRef {
    PolyRef::encode(TEST_SALT, tile_index, poly_index)
}

/// Reference a fixture tile is registered under.
pub fn tile_ref(tile_index: u32) -> TileRef {
    TileRef::encode(TEST_SALT, tile_index)
}

/// A `cells` x `cells` grid tile at grid position `(tx, ty)` with uniform
/// flags. Tile-boundary edges carry the side encoding, so adjacent fixture
/// tiles stitch together.
pub fn grid_tile(tx: i32, ty: i32, cells: usize) -> Result<Vec<u8>> {
    grid_tile_with(tx, ty, cells, |_, _| (PolyFlags::WALK, AREA_GROUND))
}

/// Like [`grid_tile`], with flags and area chosen per cell `(cx, cz)`.
pub fn grid_tile_with(
    tx: i32,
    ty: i32,
    cells: usize,
    cell_attrs: impl Fn(usize, usize) -> (PolyFlags, u8),
) -> Result<Vec<u8>> {
    let mut builder = TileBuilder::new(tx, ty, 0);
    let ox = tx as f32 * cells as f32;
    let oz = ty as f32 * cells as f32;

    let stride = cells + 1;
    for z in 0..stride {
        for x in 0..stride {
            builder.add_vertex(Vec3::new(ox + x as f32, 0.0, oz + z as f32));
        }
    }

    let idx = |cx: usize, cz: usize| (cz * cells + cx + 1) as u16;
    for cz in 0..cells {
        for cx in 0..cells {
            let v0 = (cz * stride + cx) as u16;
            let v1 = v0 + 1;
            let v2 = v1 + stride as u16;
            let v3 = v0 + stride as u16;
            // Edges follow the vertex order: 0 faces -z, 1 faces +x,
            // 2 faces +z, 3 faces -x.
            let neis = [
                if cz > 0 { idx(cx, cz - 1) } else { EXT_LINK | 3 },
                if cx + 1 < cells { idx(cx + 1, cz) } else { EXT_LINK },
                if cz + 1 < cells { idx(cx, cz + 1) } else { EXT_LINK | 1 },
                if cx > 0 { idx(cx - 1, cz) } else { EXT_LINK | 2 },
            ];
            let (flags, area) = cell_attrs(cx, cz);
            builder.add_poly(&[v0, v1, v2, v3], &neis, flags.bits(), area)?;
        }
    }
    builder.build()
}

/// A 3x3 grid tile with a bidirectional off-mesh connection from the corner
/// cell (0, 0) to the opposite corner (2, 2).
pub fn off_mesh_grid_tile() -> Result<Vec<u8>> {
    let mut builder = TileBuilder::new(0, 0, 0);
    let cells = 3usize;
    let stride = cells + 1;
    for z in 0..stride {
        for x in 0..stride {
            builder.add_vertex(Vec3::new(x as f32, 0.0, z as f32));
        }
    }
    let idx = |cx: usize, cz: usize| (cz * cells + cx + 1) as u16;
    for cz in 0..cells {
        for cx in 0..cells {
            let v0 = (cz * stride + cx) as u16;
            let v1 = v0 + 1;
            let v2 = v1 + stride as u16;
            let v3 = v0 + stride as u16;
            let neis = [
                if cz > 0 { idx(cx, cz - 1) } else { 0 },
                if cx + 1 < cells { idx(cx + 1, cz) } else { 0 },
                if cz + 1 < cells { idx(cx, cz + 1) } else { 0 },
                if cx > 0 { idx(cx - 1, cz) } else { 0 },
            ];
            builder.add_poly(&[v0, v1, v2, v3], &neis, PolyFlags::WALK.bits(), AREA_GROUND)?;
        }
    }
    builder.add_off_mesh_connection(
        Vec3::new(0.5, 0.0, 0.5),
        Vec3::new(2.5, 0.0, 2.5),
        0.6,
        PolyFlags::WALK.bits(),
        AREA_GROUND,
        true,
    );
    builder.build()
}

/// A mesh holding one `cells` x `cells` grid tile at the origin.
pub fn grid_mesh(cells: usize) -> Result<NavMesh> {
    let mut mesh = NavMesh::new(grid_params(cells))?;
    mesh.add_tile(grid_tile(0, 0, cells)?, tile_ref(0))?;
    Ok(mesh)
}

/// A mesh of `tiles_x` x `tiles_y` stitched grid tiles, registered row by
/// row so tile `(x, y)` lands in slot `y * tiles_x + x`.
pub fn multi_tile_mesh(tiles_x: i32, tiles_y: i32, cells: usize) -> Result<NavMesh> {
    let mut mesh = NavMesh::new(grid_params(cells))?;
    for y in 0..tiles_y {
        for x in 0..tiles_x {
            let slot = (y * tiles_x + x) as u32;
            mesh.add_tile(grid_tile(x, y, cells)?, tile_ref(slot))?;
        }
    }
    Ok(mesh)
}
