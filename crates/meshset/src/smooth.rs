//! Smooth-path generation.
//!
//! Converts a coarse polygon corridor into a walkable sequence of points by
//! repeatedly steering toward the next straight-path vertex, stepping along
//! the surface, and re-splicing the corridor with the polygons actually
//! crossed. Heights are re-sampled from the mesh each step so the path hugs
//! the floor instead of drifting along the raw step vector.

use glam::Vec3;

use tilenav::{NavMesh, NavMeshQuery, QueryFilter};

use crate::corridor::{PathCorridor, MAX_CORRIDOR};
use crate::error::{Error, Result};
use crate::steering::steer_target;

/// Output point cap for one smoothing run.
pub const MAX_SMOOTH: usize = 2048;

/// Horizontal step length per iteration.
const STEP_SIZE: f32 = 2.0;

/// Minimum distance a steering target must exceed.
const SLOP: f32 = 0.01;

/// Half-extents of the nearest-polygon search around the endpoints.
pub(crate) const PATH_EXTENTS: Vec3 = Vec3::new(2.0, 50.0, 2.0);

/// Generates a smooth path from `start` to `end`.
///
/// Endpoints are snapped to their nearest polygons within [`PATH_EXTENTS`].
/// A failed steering request terminates the loop cleanly; the points
/// produced so far are a valid partial result. A result of zero or one
/// points means the route could not be meaningfully smoothed and the caller
/// should fall back to the coarse path.
pub fn find_smooth_path(
    mesh: &NavMesh,
    start: Vec3,
    end: Vec3,
    filter: &QueryFilter,
) -> Result<Vec<Vec3>> {
    let query = NavMeshQuery::new(mesh);

    let (start_ref, start_pt) = query
        .find_nearest_poly(start, PATH_EXTENTS, filter)
        .map_err(|_| Error::PolyNotFound)?;
    let (end_ref, end_pt) = query
        .find_nearest_poly(end, PATH_EXTENTS, filter)
        .map_err(|_| Error::PolyNotFound)?;

    let path = query
        .find_path(start_ref, end_ref, start_pt, end_pt, filter, MAX_CORRIDOR)
        .map_err(|_| Error::NoPath)?;
    if path.is_empty() {
        return Err(Error::NoPath);
    }
    let mut corridor = PathCorridor::from_path(path);

    let mut iter_pos = query
        .closest_point_on_poly(start_ref, start_pt)
        .map_err(|_| Error::QueryFailed)?;
    let target_pos = match corridor.last() {
        Some(goal) => query
            .closest_point_on_poly(goal, end_pt)
            .map_err(|_| Error::QueryFailed)?,
        None => return Err(Error::NoPath),
    };

    let mut smooth = Vec::with_capacity(64);
    smooth.push(iter_pos);

    while !corridor.is_empty() && smooth.len() < MAX_SMOOTH {
        let Some(steer) = steer_target(&query, iter_pos, target_pos, SLOP, corridor.polys())
        else {
            // Nothing left worth steering toward; partial output is valid.
            break;
        };

        // Full steps, except directly onto the end point or an off-mesh
        // link when it is closer than one step.
        let delta = steer.pos - iter_pos;
        let len = delta.length();
        let scale = if (steer.at_end() || steer.off_mesh()) && len < STEP_SIZE {
            1.0
        } else {
            STEP_SIZE / len
        };
        let move_target = iter_pos + delta * scale;

        let Some(cur_ref) = corridor.first() else {
            break;
        };
        let Ok((result_pos, visited)) =
            query.move_along_surface(cur_ref, iter_pos, move_target, filter)
        else {
            break;
        };

        corridor.fixup_corridor(&visited);
        corridor.fixup_shortcuts(mesh);

        iter_pos = result_pos;
        if let Some(head) = corridor.first() {
            if let Ok(Some(h)) = query.get_poly_height(head, result_pos) {
                iter_pos.y = h;
            }
        }
        smooth.push(iter_pos);
    }

    Ok(smooth)
}
