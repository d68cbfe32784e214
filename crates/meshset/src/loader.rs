//! Mesh-set (`MSET`) file reading and writing.
//!
//! A mesh-set bundles the mesh parameters with a stream of engine tile
//! blobs, each stored under the tile reference it must be registered with so
//! polygon references baked into other offline data stay valid. Layout,
//! little-endian throughout:
//!
//! ```text
//! magic: i32   version: i32   tile_count: i32   params: 28 bytes
//! repeated up to tile_count times:
//!   tile_ref: u64   data_size: i32   payload: data_size bytes
//! ```
//!
//! A tile header with a zero reference or size terminates the stream early;
//! the declared count may overstate the tiles actually present.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::Vec3;
use log::{debug, warn};

use tilenav::{NavMesh, NavMeshParams, TileRef};

use crate::error::{Error, Result};

/// Magic tag opening a mesh-set file: 'M','S','E','T' packed big-endian.
pub const MSET_MAGIC: i32 = (b'M' as i32) << 24 | (b'S' as i32) << 16 | (b'E' as i32) << 8 | b'T' as i32;

/// Mesh-set format version this build reads and writes.
pub const MSET_VERSION: i32 = 1;

fn read_params(reader: &mut impl Read) -> std::io::Result<NavMeshParams> {
    let mut f = || reader.read_f32::<LittleEndian>();
    let origin = Vec3::new(f()?, f()?, f()?);
    let tile_width = reader.read_f32::<LittleEndian>()?;
    let tile_height = reader.read_f32::<LittleEndian>()?;
    let max_tiles = reader.read_i32::<LittleEndian>()?;
    let max_polys_per_tile = reader.read_i32::<LittleEndian>()?;
    Ok(NavMeshParams {
        origin,
        tile_width,
        tile_height,
        max_tiles,
        max_polys_per_tile,
    })
}

/// Loads a mesh-set file into a freshly initialized mesh.
///
/// Never yields a partially initialized mesh: header-level failures abort,
/// and only the early-terminator case may register fewer tiles than the
/// header declares. Individual tiles the engine rejects are skipped with a
/// warning; the rest of the stream still loads.
pub fn load_mesh_file(path: impl AsRef<Path>) -> Result<NavMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| Error::FileNotFound)?;
    let mut reader = BufReader::new(file);

    let magic = reader
        .read_i32::<LittleEndian>()
        .map_err(|_| Error::TruncatedHeader)?;
    let version = reader
        .read_i32::<LittleEndian>()
        .map_err(|_| Error::TruncatedHeader)?;
    let tile_count = reader
        .read_i32::<LittleEndian>()
        .map_err(|_| Error::TruncatedHeader)?;
    if magic != MSET_MAGIC || version != MSET_VERSION {
        return Err(Error::UnsupportedFormat);
    }
    let params = read_params(&mut reader).map_err(|_| Error::TruncatedHeader)?;

    let mut mesh = NavMesh::new(params).map_err(|_| Error::MeshInitFailed)?;

    let mut registered = 0usize;
    for _ in 0..tile_count.max(0) {
        let tile_ref = reader
            .read_u64::<LittleEndian>()
            .map_err(|_| Error::TruncatedTileHeader)?;
        let data_size = reader
            .read_i32::<LittleEndian>()
            .map_err(|_| Error::TruncatedTileHeader)?;
        if tile_ref == 0 || data_size <= 0 {
            // Intentional terminator; the declared count overstates the
            // tiles present.
            break;
        }

        let mut data = vec![0u8; data_size as usize];
        reader
            .read_exact(&mut data)
            .map_err(|_| Error::TruncatedTileData)?;

        match mesh.add_tile(data, TileRef::new(tile_ref)) {
            Ok(_) => registered += 1,
            Err(err) => {
                warn!(
                    "skipping tile {tile_ref:#018x} from {}: {err}",
                    path.display()
                );
            }
        }
    }

    debug!("loaded {registered} tiles from {}", path.display());
    Ok(mesh)
}

/// Writes a mesh-set file holding the given tile blobs.
pub fn save_mesh_set(
    path: impl AsRef<Path>,
    params: &NavMeshParams,
    tiles: &[(TileRef, Vec<u8>)],
) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_i32::<LittleEndian>(MSET_MAGIC)?;
    writer.write_i32::<LittleEndian>(MSET_VERSION)?;
    writer.write_i32::<LittleEndian>(tiles.len() as i32)?;
    for c in [params.origin.x, params.origin.y, params.origin.z] {
        writer.write_f32::<LittleEndian>(c)?;
    }
    writer.write_f32::<LittleEndian>(params.tile_width)?;
    writer.write_f32::<LittleEndian>(params.tile_height)?;
    writer.write_i32::<LittleEndian>(params.max_tiles)?;
    writer.write_i32::<LittleEndian>(params.max_polys_per_tile)?;

    for (tile_ref, data) in tiles {
        writer.write_u64::<LittleEndian>(tile_ref.id())?;
        writer.write_i32::<LittleEndian>(data.len() as i32)?;
        writer.write_all(data)?;
    }
    writer.flush()
}
