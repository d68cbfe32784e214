//! On-wire layout of a single tile blob.
//!
//! A tile blob is self-contained: header, vertex pool, polygon records, and
//! off-mesh connection records, all little-endian. The mesh takes ownership
//! of the blob on registration and keeps only the parsed form.

use byteorder::{LittleEndian, ReadBytesExt};
use glam::Vec3;
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::MAX_VERTS_PER_POLY;

/// Magic value opening every tile blob ('TNAV', little-endian).
pub const TILE_DATA_MAGIC: u32 = 0x5641_4E54;

/// Current tile blob version.
pub const TILE_DATA_VERSION: u32 = 1;

/// Neighbor value marking an edge that crosses the tile boundary. The low
/// bits carry the side: 0 = +x, 1 = +z, 2 = -x, 3 = -z.
pub(crate) const EXT_LINK: u16 = 0x8000;

/// A polygon record as stored in the blob.
#[derive(Debug, Clone)]
pub(crate) struct RawPoly {
    pub verts: [u16; MAX_VERTS_PER_POLY],
    /// Per-edge neighbor: 0 = wall, `EXT_LINK | side` = tile boundary,
    /// otherwise internal polygon index + 1.
    pub neis: [u16; MAX_VERTS_PER_POLY],
    pub flags: u16,
    pub area: u8,
    pub vert_count: u8,
}

/// An off-mesh connection record as stored in the blob.
#[derive(Debug, Clone)]
pub(crate) struct RawOffMeshCon {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub flags: u16,
    pub area: u8,
    pub bidirectional: bool,
}

/// Decoded tile blob.
#[derive(Debug)]
pub(crate) struct TileData {
    pub x: i32,
    pub y: i32,
    pub layer: i32,
    pub bmin: Vec3,
    pub bmax: Vec3,
    pub verts: Vec<Vec3>,
    pub polys: Vec<RawPoly>,
    pub off_cons: Vec<RawOffMeshCon>,
}

fn read_vec3(cur: &mut Cursor<&[u8]>) -> Result<Vec3> {
    let x = cur.read_f32::<LittleEndian>()?;
    let y = cur.read_f32::<LittleEndian>()?;
    let z = cur.read_f32::<LittleEndian>()?;
    Ok(Vec3::new(x, y, z))
}

impl From<std::io::Error> for Error {
    fn from(_: std::io::Error) -> Self {
        Error::MalformedTile("unexpected end of tile data")
    }
}

/// Parses a tile blob, validating structure and index ranges.
pub(crate) fn parse(data: &[u8]) -> Result<TileData> {
    let mut cur = Cursor::new(data);

    let magic = cur.read_u32::<LittleEndian>()?;
    if magic != TILE_DATA_MAGIC {
        return Err(Error::WrongMagic);
    }
    let version = cur.read_u32::<LittleEndian>()?;
    if version != TILE_DATA_VERSION {
        return Err(Error::WrongVersion(version));
    }

    let x = cur.read_i32::<LittleEndian>()?;
    let y = cur.read_i32::<LittleEndian>()?;
    let layer = cur.read_i32::<LittleEndian>()?;
    let poly_count = cur.read_u32::<LittleEndian>()? as usize;
    let vert_count = cur.read_u32::<LittleEndian>()? as usize;
    let offcon_count = cur.read_u32::<LittleEndian>()? as usize;
    let bmin = read_vec3(&mut cur)?;
    let bmax = read_vec3(&mut cur)?;

    if poly_count == 0 || vert_count < 3 {
        return Err(Error::MalformedTile("empty tile"));
    }

    let mut verts = Vec::with_capacity(vert_count);
    for _ in 0..vert_count {
        verts.push(read_vec3(&mut cur)?);
    }

    let mut polys = Vec::with_capacity(poly_count);
    for _ in 0..poly_count {
        let mut pverts = [0u16; MAX_VERTS_PER_POLY];
        let mut neis = [0u16; MAX_VERTS_PER_POLY];
        for v in pverts.iter_mut() {
            *v = cur.read_u16::<LittleEndian>()?;
        }
        for n in neis.iter_mut() {
            *n = cur.read_u16::<LittleEndian>()?;
        }
        let flags = cur.read_u16::<LittleEndian>()?;
        let area = cur.read_u8()?;
        let nverts = cur.read_u8()?;

        if nverts < 3 || nverts as usize > MAX_VERTS_PER_POLY {
            return Err(Error::MalformedTile("bad polygon vertex count"));
        }
        for i in 0..nverts as usize {
            if pverts[i] as usize >= vert_count {
                return Err(Error::MalformedTile("vertex index out of range"));
            }
            let nei = neis[i];
            if nei != 0 && nei & EXT_LINK == 0 && nei as usize > poly_count {
                return Err(Error::MalformedTile("neighbor index out of range"));
            }
        }

        polys.push(RawPoly {
            verts: pverts,
            neis,
            flags,
            area,
            vert_count: nverts,
        });
    }

    let mut off_cons = Vec::with_capacity(offcon_count);
    for _ in 0..offcon_count {
        let start = read_vec3(&mut cur)?;
        let end = read_vec3(&mut cur)?;
        let radius = cur.read_f32::<LittleEndian>()?;
        let flags = cur.read_u16::<LittleEndian>()?;
        let area = cur.read_u8()?;
        let bidirectional = cur.read_u8()? != 0;
        if radius <= 0.0 {
            return Err(Error::MalformedTile("bad off-mesh connection radius"));
        }
        off_cons.push(RawOffMeshCon {
            start,
            end,
            radius,
            flags,
            area,
            bidirectional,
        });
    }

    Ok(TileData {
        x,
        y,
        layer,
        bmin,
        bmax,
        verts,
        polys,
        off_cons,
    })
}
