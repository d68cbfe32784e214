//! Tiled navigation-mesh container.
//!
//! The mesh owns a fixed grid of tile slots. Tiles are registered from
//! opaque blobs (see [`crate::tile_data`]), identified by stable 64-bit
//! references, and stitched to already-present neighbors along their
//! boundary edges.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{Error, Result};
use crate::math;
use crate::tile_data::{self, EXT_LINK};
use crate::{PolyFlags, MAX_VERTS_PER_POLY};

/// Number of bits reserved for the polygon index.
const POLY_BITS: u32 = 20;
/// Number of bits reserved for the tile index.
const TILE_BITS: u32 = 28;
/// Number of bits reserved for the salt.
const SALT_BITS: u32 = 16;

const POLY_MASK: u64 = (1 << POLY_BITS) - 1;
const TILE_MASK: u64 = (1 << TILE_BITS) - 1;
const SALT_MASK: u64 = (1 << SALT_BITS) - 1;

/// Link slot value marking "not an edge crossing" (off-mesh base links).
pub(crate) const NO_EDGE: u8 = 0xff;

/// Tolerance when matching boundary edges of adjacent tiles.
const STITCH_EPS_XZ: f32 = 0.05;
const STITCH_EPS_Y: f32 = 0.5;

/// Opaque reference to one polygon in the mesh. Zero is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PolyRef(u64);

impl PolyRef {
    /// The invalid reference.
    pub const NONE: PolyRef = PolyRef(0);

    /// Wraps a raw reference value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Packs salt, tile index and polygon index into a reference.
    pub const fn encode(salt: u16, tile_index: u32, poly_index: u32) -> Self {
        Self(
            ((salt as u64 & SALT_MASK) << (TILE_BITS + POLY_BITS))
                | ((tile_index as u64 & TILE_MASK) << POLY_BITS)
                | (poly_index as u64 & POLY_MASK),
        )
    }

    /// The raw reference value.
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Whether this reference can possibly resolve.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Unpacks into (salt, tile index, polygon index).
    pub const fn decode(self) -> (u16, u32, u32) {
        (
            ((self.0 >> (TILE_BITS + POLY_BITS)) & SALT_MASK) as u16,
            ((self.0 >> POLY_BITS) & TILE_MASK) as u32,
            (self.0 & POLY_MASK) as u32,
        )
    }
}

/// Opaque reference to one registered tile. Shares the [`PolyRef`] bit
/// layout with a zero polygon index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileRef(u64);

impl TileRef {
    /// The invalid reference.
    pub const NONE: TileRef = TileRef(0);

    /// Wraps a raw reference value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Packs salt and tile index into a reference.
    pub const fn encode(salt: u16, tile_index: u32) -> Self {
        Self(PolyRef::encode(salt, tile_index, 0).id())
    }

    /// The raw reference value.
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Whether this reference can possibly resolve.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Unpacks into (salt, tile index).
    pub const fn decode(self) -> (u16, u32) {
        let (salt, tile, _) = PolyRef::new(self.0).decode();
        (salt, tile)
    }
}

/// Parameters the mesh is initialized with. This is the exact block embedded
/// in a mesh-set file header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavMeshParams {
    /// World-space origin of the tile grid.
    pub origin: Vec3,
    /// Width of each tile along x.
    pub tile_width: f32,
    /// Height of each tile along z.
    pub tile_height: f32,
    /// Maximum number of tiles the mesh can hold.
    pub max_tiles: i32,
    /// Maximum polygons per tile.
    pub max_polys_per_tile: i32,
}

/// Polygon classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyType {
    /// A regular walkable polygon.
    Ground,
    /// A two-vertex off-mesh connection.
    OffMeshConnection,
}

/// One polygon within a tile.
#[derive(Debug, Clone)]
pub struct Poly {
    /// Indices into the owning tile's vertex pool.
    pub verts: [u16; MAX_VERTS_PER_POLY],
    /// Wire-format neighbor encoding, kept for boundary stitching.
    pub(crate) neis: [u16; MAX_VERTS_PER_POLY],
    /// Number of vertices in use.
    pub vert_count: u8,
    /// Area id, indexing the query filter's cost table.
    pub area: u8,
    /// Traversal flags.
    pub flags: PolyFlags,
    /// Polygon classification.
    pub poly_type: PolyType,
    /// Head of this polygon's link list in the tile's link arena.
    pub first_link: Option<u32>,
}

impl Poly {
    /// World-space vertices of this polygon.
    pub fn world_verts<'t>(&self, tile: &'t MeshTile) -> impl Iterator<Item = Vec3> + 't {
        let verts = self.verts;
        let n = self.vert_count as usize;
        (0..n).map(move |i| tile.verts[verts[i] as usize])
    }
}

/// Link from one polygon to another.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    /// The polygon reached through this link.
    pub reference: PolyRef,
    /// Edge index the link crosses, or [`NO_EDGE`] for off-mesh base links.
    pub(crate) edge: u8,
    /// Next link of the same polygon.
    pub(crate) next: Option<u32>,
}

/// An off-mesh connection registered with its tile.
#[derive(Debug, Clone)]
pub struct OffMeshConnection {
    /// Start anchor in world space.
    pub start: Vec3,
    /// End anchor in world space.
    pub end: Vec3,
    /// Snap radius around each anchor.
    pub radius: f32,
    /// Whether the connection can be traversed end-to-start as well.
    pub bidirectional: bool,
    /// Index of the materialized connection polygon within the tile.
    pub poly_index: u16,
}

/// Location and bounds of a tile.
#[derive(Debug, Clone, Copy)]
pub struct TileHeader {
    /// Tile x coordinate in the grid.
    pub x: i32,
    /// Tile y coordinate in the grid.
    pub y: i32,
    /// Layer for vertically stacked tiles.
    pub layer: i32,
    /// Minimum world-space bound.
    pub bmin: Vec3,
    /// Maximum world-space bound.
    pub bmax: Vec3,
}

/// One registered tile.
#[derive(Debug)]
pub struct MeshTile {
    /// Salt of the reference this tile was registered under.
    pub salt: u16,
    /// Location and bounds.
    pub header: TileHeader,
    /// Vertex pool (off-mesh connection anchors appended at the end).
    pub verts: Vec<Vec3>,
    /// Polygons (off-mesh connection polygons appended at the end).
    pub polys: Vec<Poly>,
    /// Link arena, threaded through `Poly::first_link`.
    pub(crate) links: Vec<Link>,
    /// Off-mesh connections owned by this tile.
    pub off_mesh_cons: Vec<OffMeshConnection>,
}

impl MeshTile {
    /// Iterates over the polygons linked to `poly`.
    pub fn links_of<'t>(&'t self, poly: &Poly) -> impl Iterator<Item = &'t Link> {
        let mut next = poly.first_link;
        std::iter::from_fn(move || {
            let idx = next?;
            let link = &self.links[idx as usize];
            next = link.next;
            Some(link)
        })
    }

    fn push_link(&mut self, poly_index: usize, link: Link) {
        let head = self.polys[poly_index].first_link;
        let idx = self.links.len() as u32;
        self.links.push(Link {
            next: head,
            ..link
        });
        self.polys[poly_index].first_link = Some(idx);
    }
}

/// Tiled navigation mesh.
#[derive(Debug)]
pub struct NavMesh {
    params: NavMeshParams,
    tiles: Vec<Option<MeshTile>>,
    pos_lookup: HashMap<(i32, i32, i32), usize>,
}

impl NavMesh {
    /// Creates an empty mesh for the given parameters.
    pub fn new(params: NavMeshParams) -> Result<Self> {
        if !params.origin.is_finite() {
            return Err(Error::InvalidParam);
        }
        if params.tile_width <= 0.0 || params.tile_height <= 0.0 {
            return Err(Error::InvalidParam);
        }
        if params.max_tiles <= 0 || params.max_tiles as u64 > TILE_MASK {
            return Err(Error::InvalidParam);
        }
        if params.max_polys_per_tile <= 0 || params.max_polys_per_tile as u64 > POLY_MASK {
            return Err(Error::InvalidParam);
        }

        let mut tiles = Vec::new();
        tiles.resize_with(params.max_tiles as usize, || None);

        Ok(Self {
            params,
            tiles,
            pos_lookup: HashMap::new(),
        })
    }

    /// The parameters this mesh was created with.
    pub fn params(&self) -> &NavMeshParams {
        &self.params
    }

    /// Number of registered tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Registers a tile from its serialized blob, taking ownership of the
    /// data. The tile is stored under `tile_ref`, so references baked into
    /// offline data stay valid. Fails without touching the mesh if the blob
    /// is malformed or the slot is taken.
    pub fn add_tile(&mut self, data: Vec<u8>, tile_ref: TileRef) -> Result<TileRef> {
        if !tile_ref.is_valid() {
            return Err(Error::InvalidParam);
        }
        let (salt, tile_index) = tile_ref.decode();
        let tile_index = tile_index as usize;
        if tile_index >= self.tiles.len() {
            return Err(Error::InvalidParam);
        }
        if self.tiles[tile_index].is_some() {
            return Err(Error::AlreadyOccupied);
        }

        let parsed = tile_data::parse(&data)?;
        if parsed.polys.len() + parsed.off_cons.len() > self.params.max_polys_per_tile as usize {
            return Err(Error::MalformedTile("too many polygons for this mesh"));
        }
        drop(data);

        let tile = build_tile(salt, parsed);
        let key = (tile.header.x, tile.header.y, tile.header.layer);
        if self.pos_lookup.contains_key(&key) {
            return Err(Error::AlreadyOccupied);
        }

        self.pos_lookup.insert(key, tile_index);
        self.tiles[tile_index] = Some(tile);

        self.connect_internal_links(tile_index);
        self.connect_off_mesh_links(tile_index);
        self.connect_boundary_links(tile_index);

        Ok(tile_ref)
    }

    /// Resolves a polygon reference, checking the salt.
    pub fn get_tile_and_poly(&self, reference: PolyRef) -> Result<(&MeshTile, &Poly)> {
        let (salt, tile_index, poly_index) = reference.decode();
        let tile = self
            .tiles
            .get(tile_index as usize)
            .and_then(|t| t.as_ref())
            .ok_or(Error::InvalidParam)?;
        if tile.salt != salt {
            return Err(Error::InvalidParam);
        }
        let poly = tile.polys.get(poly_index as usize).ok_or(Error::InvalidParam)?;
        Ok((tile, poly))
    }

    /// Whether a reference resolves to a live polygon.
    pub fn is_valid_poly_ref(&self, reference: PolyRef) -> bool {
        reference.is_valid() && self.get_tile_and_poly(reference).is_ok()
    }

    /// Traversal flags of the referenced polygon.
    pub fn poly_flags(&self, reference: PolyRef) -> Result<PolyFlags> {
        let (_, poly) = self.get_tile_and_poly(reference)?;
        Ok(poly.flags)
    }

    /// Polygons directly link-connected to `reference`, up to `max`.
    pub fn linked_polys(&self, reference: PolyRef, max: usize) -> Result<Vec<PolyRef>> {
        let (tile, poly) = self.get_tile_and_poly(reference)?;
        let mut out = Vec::new();
        for link in tile.links_of(poly) {
            if link.reference.is_valid() {
                if out.len() >= max {
                    break;
                }
                out.push(link.reference);
            }
        }
        Ok(out)
    }

    /// Collects polygons whose bounds overlap the query box and that pass
    /// the filter, up to `max` results.
    pub fn query_polygons(
        &self,
        bmin: Vec3,
        bmax: Vec3,
        filter: &crate::QueryFilter,
        max: usize,
    ) -> Vec<PolyRef> {
        let mut out = Vec::new();
        for (tile_index, slot) in self.tiles.iter().enumerate() {
            let Some(tile) = slot else { continue };
            if !math::overlap_bounds(bmin, bmax, tile.header.bmin, tile.header.bmax) {
                continue;
            }
            for (poly_index, poly) in tile.polys.iter().enumerate() {
                if poly.poly_type != PolyType::Ground || !filter.pass_filter(poly) {
                    continue;
                }
                let mut pmin = Vec3::splat(f32::MAX);
                let mut pmax = Vec3::splat(f32::MIN);
                for v in poly.world_verts(tile) {
                    pmin = pmin.min(v);
                    pmax = pmax.max(v);
                }
                if math::overlap_bounds(bmin, bmax, pmin, pmax) {
                    if out.len() >= max {
                        return out;
                    }
                    out.push(PolyRef::encode(tile.salt, tile_index as u32, poly_index as u32));
                }
            }
        }
        out
    }

    /// Closest point on the referenced polygon, and whether the query point
    /// projects inside it.
    pub fn closest_point_on_poly(&self, reference: PolyRef, pos: Vec3) -> Result<(Vec3, bool)> {
        let (tile, poly) = self.get_tile_and_poly(reference)?;

        if poly.poly_type == PolyType::OffMeshConnection {
            // Clamp onto the connection segment.
            let a = tile.verts[poly.verts[0] as usize];
            let b = tile.verts[poly.verts[1] as usize];
            let (_, t) = math::dist_pt_seg_sqr_2d(pos, a, b);
            return Ok((a + (b - a) * t, false));
        }

        let verts: Vec<Vec3> = poly.world_verts(tile).collect();
        if let Some(h) = poly_height(&verts, pos) {
            return Ok((Vec3::new(pos.x, h, pos.z), true));
        }

        // Outside: clamp to the nearest boundary edge.
        let mut best = verts[0];
        let mut best_d = f32::MAX;
        for i in 0..verts.len() {
            let j = (i + 1) % verts.len();
            let (d, t) = math::dist_pt_seg_sqr_2d(pos, verts[i], verts[j]);
            if d < best_d {
                best_d = d;
                best = verts[i] + (verts[j] - verts[i]) * t;
            }
        }
        Ok((best, false))
    }

    /// Floor height of the referenced polygon under `pos`, if `pos`
    /// projects inside it.
    pub fn poly_height(&self, reference: PolyRef, pos: Vec3) -> Result<Option<f32>> {
        let (tile, poly) = self.get_tile_and_poly(reference)?;
        if poly.poly_type == PolyType::OffMeshConnection {
            return Ok(None);
        }
        let verts: Vec<Vec3> = poly.world_verts(tile).collect();
        Ok(poly_height(&verts, pos))
    }

    fn connect_internal_links(&mut self, tile_index: usize) {
        let Some(tile) = self.tiles[tile_index].as_ref() else {
            return;
        };
        let salt = tile.salt;
        let mut additions: Vec<(usize, Link)> = Vec::new();
        for (poly_index, poly) in tile.polys.iter().enumerate() {
            if poly.poly_type != PolyType::Ground {
                continue;
            }
            for edge in 0..poly.vert_count as usize {
                let nei = poly.neis[edge];
                if nei == 0 || nei & EXT_LINK != 0 {
                    continue;
                }
                let target = nei as usize - 1;
                additions.push((
                    poly_index,
                    Link {
                        reference: PolyRef::encode(salt, tile_index as u32, target as u32),
                        edge: edge as u8,
                        next: None,
                    },
                ));
            }
        }
        if let Some(tile) = self.tiles[tile_index].as_mut() {
            for (poly_index, link) in additions {
                tile.push_link(poly_index, link);
            }
        }
    }

    fn connect_off_mesh_links(&mut self, tile_index: usize) {
        let Some(tile) = self.tiles[tile_index].as_ref() else {
            return;
        };
        let salt = tile.salt;

        // (connection poly, anchor index, base poly) triples to wire up.
        let mut anchors: Vec<(u16, u8, u16, bool)> = Vec::new();
        for con in &tile.off_mesh_cons {
            let start_base = find_base_poly(tile, con.start, con.radius);
            let end_base = find_base_poly(tile, con.end, con.radius);
            if let (Some(s), Some(e)) = (start_base, end_base) {
                anchors.push((con.poly_index, 0, s, true));
                anchors.push((con.poly_index, 1, e, con.bidirectional));
            }
        }

        if let Some(tile) = self.tiles[tile_index].as_mut() {
            for (con_poly, anchor, base_poly, enterable) in anchors {
                // Connection polygon reaches the base through its anchor vertex.
                tile.push_link(
                    con_poly as usize,
                    Link {
                        reference: PolyRef::encode(salt, tile_index as u32, base_poly as u32),
                        edge: anchor,
                        next: None,
                    },
                );
                if enterable {
                    tile.push_link(
                        base_poly as usize,
                        Link {
                            reference: PolyRef::encode(salt, tile_index as u32, con_poly as u32),
                            edge: NO_EDGE,
                            next: None,
                        },
                    );
                }
            }
        }
    }

    fn connect_boundary_links(&mut self, tile_index: usize) {
        let (tx, ty, layer) = {
            let Some(tile) = self.tiles[tile_index].as_ref() else {
                return;
            };
            (tile.header.x, tile.header.y, tile.header.layer)
        };

        // side: 0 = +x, 1 = +z, 2 = -x, 3 = -z; the neighbor sees us on the
        // opposite side.
        const OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
        for side in 0u16..4 {
            let (dx, dy) = OFFSETS[side as usize];
            let Some(&nei_index) = self.pos_lookup.get(&(tx + dx, ty + dy, layer)) else {
                continue;
            };
            let opposite = (side + 2) % 4;

            let mut additions: Vec<(usize, usize, Link)> = Vec::new();
            {
                let (Some(tile), Some(nei_tile)) = (
                    self.tiles[tile_index].as_ref(),
                    self.tiles[nei_index].as_ref(),
                ) else {
                    continue;
                };
                let tile_ref = TileRef::encode(tile.salt, tile_index as u32);
                let nei_ref = TileRef::encode(nei_tile.salt, nei_index as u32);

                for (pi, poly) in tile.polys.iter().enumerate() {
                    for edge in 0..poly.vert_count as usize {
                        if poly.neis[edge] != EXT_LINK | side {
                            continue;
                        }
                        let a = tile.verts[poly.verts[edge] as usize];
                        let b = tile.verts[poly.verts[(edge + 1) % poly.vert_count as usize] as usize];

                        for (qi, qpoly) in nei_tile.polys.iter().enumerate() {
                            for qedge in 0..qpoly.vert_count as usize {
                                if qpoly.neis[qedge] != EXT_LINK | opposite {
                                    continue;
                                }
                                let c = nei_tile.verts[qpoly.verts[qedge] as usize];
                                let d = nei_tile.verts
                                    [qpoly.verts[(qedge + 1) % qpoly.vert_count as usize] as usize];
                                if !segments_coincide(a, b, c, d) {
                                    continue;
                                }
                                let (nei_salt, nei_tidx) = nei_ref.decode();
                                let (salt, tidx) = tile_ref.decode();
                                additions.push((
                                    tile_index,
                                    pi,
                                    Link {
                                        reference: PolyRef::encode(nei_salt, nei_tidx, qi as u32),
                                        edge: edge as u8,
                                        next: None,
                                    },
                                ));
                                additions.push((
                                    nei_index,
                                    qi,
                                    Link {
                                        reference: PolyRef::encode(salt, tidx, pi as u32),
                                        edge: qedge as u8,
                                        next: None,
                                    },
                                ));
                            }
                        }
                    }
                }
            }

            for (t_index, poly_index, link) in additions {
                if let Some(tile) = self.tiles[t_index].as_mut() {
                    tile.push_link(poly_index, link);
                }
            }
        }
    }
}

/// Interpolated height over a convex polygon's triangle fan.
fn poly_height(verts: &[Vec3], pos: Vec3) -> Option<f32> {
    for i in 1..verts.len() - 1 {
        if let Some(h) = math::height_on_triangle(pos, verts[0], verts[i], verts[i + 1]) {
            return Some(h);
        }
    }
    None
}

/// Ground polygon whose surface lies within `radius` of `pos`, preferring
/// the closest.
fn find_base_poly(tile: &MeshTile, pos: Vec3, radius: f32) -> Option<u16> {
    let mut best: Option<(u16, f32)> = None;
    for (i, poly) in tile.polys.iter().enumerate() {
        if poly.poly_type != PolyType::Ground {
            continue;
        }
        let verts: Vec<Vec3> = poly.world_verts(tile).collect();
        let cand = if let Some(h) = poly_height(&verts, pos) {
            Vec3::new(pos.x, h, pos.z)
        } else {
            continue;
        };
        let d = pos.distance_squared(cand);
        if d <= radius * radius && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i as u16, d));
        }
    }
    best.map(|(i, _)| i)
}

fn segments_coincide(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> bool {
    let close = |p: Vec3, q: Vec3| {
        let dx = p.x - q.x;
        let dz = p.z - q.z;
        dx * dx + dz * dz <= STITCH_EPS_XZ * STITCH_EPS_XZ && (p.y - q.y).abs() <= STITCH_EPS_Y
    };
    (close(a, c) && close(b, d)) || (close(a, d) && close(b, c))
}

/// Materializes a parsed blob as a tile: off-mesh connections become
/// two-vertex polygons appended after the ground polygons.
fn build_tile(salt: u16, parsed: tile_data::TileData) -> MeshTile {
    let mut verts = parsed.verts;
    let mut polys: Vec<Poly> = parsed
        .polys
        .iter()
        .map(|p| Poly {
            verts: p.verts,
            neis: p.neis,
            vert_count: p.vert_count,
            area: p.area,
            flags: PolyFlags::from_bits_retain(p.flags),
            poly_type: PolyType::Ground,
            first_link: None,
        })
        .collect();

    let mut off_mesh_cons = Vec::with_capacity(parsed.off_cons.len());
    for con in &parsed.off_cons {
        let vs = verts.len() as u16;
        verts.push(con.start);
        verts.push(con.end);
        let mut pverts = [0u16; MAX_VERTS_PER_POLY];
        pverts[0] = vs;
        pverts[1] = vs + 1;
        let poly_index = polys.len() as u16;
        polys.push(Poly {
            verts: pverts,
            neis: [0; MAX_VERTS_PER_POLY],
            vert_count: 2,
            area: con.area,
            flags: PolyFlags::from_bits_retain(con.flags),
            poly_type: PolyType::OffMeshConnection,
            first_link: None,
        });
        off_mesh_cons.push(OffMeshConnection {
            start: con.start,
            end: con.end,
            radius: con.radius,
            bidirectional: con.bidirectional,
            poly_index,
        });
    }

    MeshTile {
        salt,
        header: TileHeader {
            x: parsed.x,
            y: parsed.y,
            layer: parsed.layer,
            bmin: parsed.bmin,
            bmax: parsed.bmax,
        },
        verts,
        polys,
        links: Vec::new(),
        off_mesh_cons,
    }
}
