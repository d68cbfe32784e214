//! Steering-target selection along a corridor.

use glam::Vec3;

use tilenav::{NavMeshQuery, PolyRef, StraightPathFlags};

/// Straight-path points examined per steering request.
const MAX_STEER_POINTS: usize = 3;

/// Vertical tolerance when deciding whether a point is too close to steer
/// toward. Steering is horizontal; height differences are mostly noise.
const VERTICAL_RANGE: f32 = 1000.0;

/// The next point worth steering toward.
#[derive(Debug, Clone, Copy)]
pub struct SteerTarget {
    /// Target position, with height pinned to the querying position.
    pub pos: Vec3,
    /// Straight-path classification of the target point.
    pub flags: StraightPathFlags,
    /// Polygon the target lies on.
    pub poly: PolyRef,
}

impl SteerTarget {
    /// Whether the target is the end of the path.
    pub fn at_end(&self) -> bool {
        self.flags.contains(StraightPathFlags::END)
    }

    /// Whether the target enters an off-mesh connection.
    pub fn off_mesh(&self) -> bool {
        self.flags.contains(StraightPathFlags::OFFMESH_CONNECTION)
    }
}

fn in_range(a: Vec3, b: Vec3, radius: f32, height: f32) -> bool {
    let d = b - a;
    d.x * d.x + d.z * d.z < radius * radius && d.y.abs() < height
}

/// Picks the next steering target along `corridor` between `start` and
/// `end`, or `None` when no produced point is far enough away
/// (`min_target_dist` horizontally) and none enters an off-mesh connection.
pub fn steer_target(
    query: &NavMeshQuery,
    start: Vec3,
    end: Vec3,
    min_target_dist: f32,
    corridor: &[PolyRef],
) -> Option<SteerTarget> {
    let points = query
        .find_straight_path(start, end, corridor, MAX_STEER_POINTS)
        .ok()?;

    // First point that is an off-mesh waypoint or beyond slop range.
    let target = points.iter().find(|p| {
        p.flags.contains(StraightPathFlags::OFFMESH_CONNECTION)
            || !in_range(p.pos, start, min_target_dist, VERTICAL_RANGE)
    })?;

    Some(SteerTarget {
        pos: Vec3::new(target.pos.x, start.y, target.pos.z),
        flags: target.flags,
        poly: target.poly,
    })
}
