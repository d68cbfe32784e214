//! Assembles tile blobs in the on-wire `TNAV` format.
//!
//! This is the producing side of [`crate::tile_data`]: offline tooling and
//! tests use it to bake tiles that [`crate::NavMesh::add_tile`] accepts.

use byteorder::{LittleEndian, WriteBytesExt};
use glam::Vec3;

use crate::error::{Error, Result};
use crate::tile_data::{TILE_DATA_MAGIC, TILE_DATA_VERSION};
use crate::MAX_VERTS_PER_POLY;

#[derive(Debug, Clone)]
struct BuilderPoly {
    verts: Vec<u16>,
    neis: Vec<u16>,
    flags: u16,
    area: u8,
}

#[derive(Debug, Clone)]
struct BuilderOffCon {
    start: Vec3,
    end: Vec3,
    radius: f32,
    flags: u16,
    area: u8,
    bidirectional: bool,
}

/// Builder for a single tile blob.
#[derive(Debug)]
pub struct TileBuilder {
    x: i32,
    y: i32,
    layer: i32,
    verts: Vec<Vec3>,
    polys: Vec<BuilderPoly>,
    off_cons: Vec<BuilderOffCon>,
}

impl TileBuilder {
    /// Starts a tile at the given grid location.
    pub fn new(x: i32, y: i32, layer: i32) -> Self {
        Self {
            x,
            y,
            layer,
            verts: Vec::new(),
            polys: Vec::new(),
            off_cons: Vec::new(),
        }
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, v: Vec3) -> u16 {
        self.verts.push(v);
        (self.verts.len() - 1) as u16
    }

    /// Adds a convex polygon. `neis` uses the wire encoding: 0 for a wall,
    /// `0x8000 | side` for a tile-boundary edge, internal index + 1 otherwise.
    /// Edge `i` runs from vertex `i` to vertex `i + 1`.
    pub fn add_poly(&mut self, verts: &[u16], neis: &[u16], flags: u16, area: u8) -> Result<u16> {
        if verts.len() < 3 || verts.len() > MAX_VERTS_PER_POLY || verts.len() != neis.len() {
            return Err(Error::InvalidParam);
        }
        self.polys.push(BuilderPoly {
            verts: verts.to_vec(),
            neis: neis.to_vec(),
            flags,
            area,
        });
        Ok((self.polys.len() - 1) as u16)
    }

    /// Adds an off-mesh connection anchored at two world points.
    pub fn add_off_mesh_connection(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        flags: u16,
        area: u8,
        bidirectional: bool,
    ) {
        self.off_cons.push(BuilderOffCon {
            start,
            end,
            radius,
            flags,
            area,
            bidirectional,
        });
    }

    /// Serializes the tile. Bounds are derived from the vertex pool.
    pub fn build(&self) -> Result<Vec<u8>> {
        if self.polys.is_empty() || self.verts.len() < 3 {
            return Err(Error::InvalidParam);
        }

        let mut bmin = self.verts[0];
        let mut bmax = self.verts[0];
        for v in &self.verts {
            bmin = bmin.min(*v);
            bmax = bmax.max(*v);
        }
        for c in &self.off_cons {
            bmin = bmin.min(c.start).min(c.end);
            bmax = bmax.max(c.start).max(c.end);
        }

        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(TILE_DATA_MAGIC)?;
        out.write_u32::<LittleEndian>(TILE_DATA_VERSION)?;
        out.write_i32::<LittleEndian>(self.x)?;
        out.write_i32::<LittleEndian>(self.y)?;
        out.write_i32::<LittleEndian>(self.layer)?;
        out.write_u32::<LittleEndian>(self.polys.len() as u32)?;
        out.write_u32::<LittleEndian>(self.verts.len() as u32)?;
        out.write_u32::<LittleEndian>(self.off_cons.len() as u32)?;
        for v in [bmin, bmax] {
            out.write_f32::<LittleEndian>(v.x)?;
            out.write_f32::<LittleEndian>(v.y)?;
            out.write_f32::<LittleEndian>(v.z)?;
        }

        for v in &self.verts {
            out.write_f32::<LittleEndian>(v.x)?;
            out.write_f32::<LittleEndian>(v.y)?;
            out.write_f32::<LittleEndian>(v.z)?;
        }

        for p in &self.polys {
            for i in 0..MAX_VERTS_PER_POLY {
                out.write_u16::<LittleEndian>(p.verts.get(i).copied().unwrap_or(0))?;
            }
            for i in 0..MAX_VERTS_PER_POLY {
                out.write_u16::<LittleEndian>(p.neis.get(i).copied().unwrap_or(0))?;
            }
            out.write_u16::<LittleEndian>(p.flags)?;
            out.write_u8(p.area)?;
            out.write_u8(p.verts.len() as u8)?;
        }

        for c in &self.off_cons {
            for v in [c.start, c.end] {
                out.write_f32::<LittleEndian>(v.x)?;
                out.write_f32::<LittleEndian>(v.y)?;
                out.write_f32::<LittleEndian>(v.z)?;
            }
            out.write_f32::<LittleEndian>(c.radius)?;
            out.write_u16::<LittleEndian>(c.flags)?;
            out.write_u8(c.area)?;
            out.write_u8(c.bidirectional as u8)?;
        }

        Ok(out)
    }
}
