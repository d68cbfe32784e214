//! Tiled navigation-mesh container and query engine.
//!
//! A navigation mesh is assembled from independently registered tiles, each
//! an opaque binary blob in the `TNAV` format (see [`TileBuilder`] for the
//! producing side). Queries run through [`NavMeshQuery`], a lightweight
//! handle bound to one mesh:
//!
//! - nearest-polygon lookup within a search box
//! - A* pathfinding over the polygon graph
//! - straight-path construction (funnel) across a polygon corridor
//! - constrained movement along the walkable surface
//! - floor-height sampling, raycast visibility, random point sampling
//!
//! Polygon and tile references are opaque 64-bit values that stay stable for
//! the lifetime of the mesh, including across serialization, as long as tiles
//! are registered under the same references.

mod error;
mod math;
mod nav_mesh;
mod query;
mod tile_builder;
mod tile_data;

pub mod test_meshes;

mod nav_mesh_tests;

pub use error::{Error, Result};
pub use nav_mesh::{
    Link, MeshTile, NavMesh, NavMeshParams, OffMeshConnection, Poly, PolyRef, PolyType,
    TileHeader, TileRef,
};
pub use query::{NavMeshQuery, QueryFilter, RaycastHit, StraightPathPoint};
pub use tile_builder::TileBuilder;
pub use tile_data::{TILE_DATA_MAGIC, TILE_DATA_VERSION};

/// Maximum number of vertices per polygon.
pub const MAX_VERTS_PER_POLY: usize = 6;

/// Number of distinct area ids a query filter carries costs for.
pub const MAX_AREAS: usize = 64;

bitflags::bitflags! {
    /// Per-polygon traversal flags baked into tile data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolyFlags: u16 {
        /// Normal walkable ground.
        const WALK = 0x01;
        /// Generic swim surface.
        const SWIM = 0x02;
        /// Water: low traversal cost.
        const WATER = 0x04;
        /// Mud: medium traversal cost.
        const MUD = 0x08;
        /// Lava: effectively avoided.
        const LAVA = 0x10;
        /// All bits, including ones this build does not name.
        const ALL = 0xffff;
    }
}

bitflags::bitflags! {
    /// Classification of a straight-path vertex.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StraightPathFlags: u8 {
        /// The vertex is the path start.
        const START = 0x01;
        /// The vertex is the path end.
        const END = 0x02;
        /// The vertex enters an off-mesh connection.
        const OFFMESH_CONNECTION = 0x04;
    }
}

/// Ground area id.
pub const AREA_GROUND: u8 = 0;
/// Water area id.
pub const AREA_WATER: u8 = 1;
/// Mud area id.
pub const AREA_MUD: u8 = 2;
/// Lava area id.
pub const AREA_LAVA: u8 = 3;
