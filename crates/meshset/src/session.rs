//! Session facade owning one navigation mesh.

use std::path::Path;

use glam::Vec3;
use log::debug;

use tilenav::{
    NavMesh, NavMeshQuery, PolyFlags, QueryFilter, AREA_GROUND, AREA_LAVA, AREA_MUD, AREA_WATER,
};

use crate::corridor::MAX_CORRIDOR;
use crate::error::{Error, Result};
use crate::loader::load_mesh_file;
use crate::smooth::{find_smooth_path, PATH_EXTENTS};

/// Half-extents of the nearest-polygon search for line-of-sight checks.
const LOS_EXTENTS: Vec3 = Vec3::new(2.0, 4.0, 2.0);

/// Half-extents of the nearest-polygon search for flag lookup. Tight in the
/// horizontal plane so the flags come from the polygon underfoot.
const FLAG_EXTENTS: Vec3 = Vec3::new(0.1, 30.0, 0.1);

/// Outcome of a line-of-sight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LosStatus {
    /// The target is farther away than the supplied range; no raycast ran.
    OutOfRange,
    /// The ray hit a wall before reaching the target.
    Blocked,
    /// The check could not run (no mesh, or no polygon under the start).
    Failed,
    /// The target is visible along the mesh surface.
    Visible,
}

/// A mesh session: one navigation mesh and the query operations over it.
///
/// `&mut self` receivers on load/unload and `&self` on queries give each
/// session single-writer semantics; separate sessions are fully independent.
#[derive(Debug, Default)]
pub struct MeshSession {
    mesh: Option<NavMesh>,
}

impl MeshSession {
    /// Creates a session with no mesh loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a mesh-set file, replacing the current mesh only on success.
    /// A failed load leaves a previously loaded mesh untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let mesh = load_mesh_file(&path)?;
        debug!(
            "session loaded {} ({} tiles)",
            path.as_ref().display(),
            mesh.tile_count()
        );
        self.mesh = Some(mesh);
        Ok(())
    }

    /// Releases the current mesh, if any.
    pub fn unload(&mut self) {
        self.mesh = None;
    }

    /// Whether a mesh is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.mesh.is_some()
    }

    /// The loaded mesh.
    pub fn mesh(&self) -> Option<&NavMesh> {
        self.mesh.as_ref()
    }

    fn mesh_or_fail(&self) -> Result<&NavMesh> {
        self.mesh.as_ref().ok_or(Error::QueryFailed)
    }

    /// Query filter with the caller's masks and the standard area costs.
    fn filter(include: PolyFlags, exclude: PolyFlags) -> QueryFilter {
        let mut filter = QueryFilter::new(include, exclude);
        filter.set_area_cost(AREA_GROUND, 1.0);
        filter.set_area_cost(AREA_WATER, 1.5);
        filter.set_area_cost(AREA_MUD, 3.0);
        // Traversable in principle, avoided in practice.
        filter.set_area_cost(AREA_LAVA, 100.0);
        filter
    }

    /// Coarse path: snaps both endpoints to their nearest polygons, runs the
    /// graph search, and returns the straight path across the corridor.
    pub fn find_path(
        &self,
        start: Vec3,
        end: Vec3,
        include: PolyFlags,
        exclude: PolyFlags,
    ) -> Result<Vec<Vec3>> {
        let mesh = self.mesh_or_fail()?;
        let query = NavMeshQuery::new(mesh);
        let filter = Self::filter(include, exclude);

        let (start_ref, start_pt) = query
            .find_nearest_poly(start, PATH_EXTENTS, &filter)
            .map_err(|_| Error::PolyNotFound)?;
        let (end_ref, end_pt) = query
            .find_nearest_poly(end, PATH_EXTENTS, &filter)
            .map_err(|_| Error::PolyNotFound)?;

        let corridor = query
            .find_path(start_ref, end_ref, start_pt, end_pt, &filter, MAX_CORRIDOR)
            .map_err(|_| Error::NoPath)?;
        if corridor.is_empty() {
            return Err(Error::NoPath);
        }

        let points = query
            .find_straight_path(start_pt, end_pt, &corridor, MAX_CORRIDOR)
            .map_err(|_| Error::QueryFailed)?;
        Ok(points.into_iter().map(|p| p.pos).collect())
    }

    /// Smooth path between two points; see [`find_smooth_path`].
    pub fn find_smooth_path(
        &self,
        start: Vec3,
        end: Vec3,
        include: PolyFlags,
        exclude: PolyFlags,
    ) -> Result<Vec<Vec3>> {
        let mesh = self.mesh_or_fail()?;
        find_smooth_path(mesh, start, end, &Self::filter(include, exclude))
    }

    /// Uniformly distributed reachable point within `radius` of `center`.
    /// Randomness comes from the injected `frand` source in [0, 1).
    pub fn random_point(
        &self,
        center: Vec3,
        radius: f32,
        include: PolyFlags,
        exclude: PolyFlags,
        frand: &mut dyn FnMut() -> f32,
    ) -> Result<Vec3> {
        let mesh = self.mesh_or_fail()?;
        let query = NavMeshQuery::new(mesh);
        let filter = Self::filter(include, exclude);

        let (center_ref, center_pt) = query
            .find_nearest_poly(center, PATH_EXTENTS, &filter)
            .map_err(|_| Error::PolyNotFound)?;
        let (_, point) = query
            .find_random_point_around_circle(center_ref, center_pt, radius, &filter, frand)
            .map_err(|_| Error::QueryFailed)?;
        Ok(point)
    }

    /// Line-of-sight along the mesh surface. Targets beyond `max_range`
    /// short-circuit to [`LosStatus::OutOfRange`] without a raycast.
    pub fn check_line_of_sight(&self, start: Vec3, target: Vec3, max_range: f32) -> LosStatus {
        if start.distance(target) > max_range {
            return LosStatus::OutOfRange;
        }
        let Some(mesh) = self.mesh.as_ref() else {
            return LosStatus::Failed;
        };
        let query = NavMeshQuery::new(mesh);
        let filter = Self::filter(PolyFlags::ALL, PolyFlags::empty());

        let Ok((start_ref, start_pt)) = query.find_nearest_poly(start, LOS_EXTENTS, &filter)
        else {
            return LosStatus::Failed;
        };
        let Ok(hit) = query.raycast(start_ref, start_pt, target, &filter) else {
            return LosStatus::Failed;
        };
        if hit.is_clear() {
            LosStatus::Visible
        } else {
            LosStatus::Blocked
        }
    }

    /// Flags of the polygon under `pos`, or `None` when no qualifying
    /// polygon is close enough.
    pub fn poly_flags(&self, pos: Vec3, include: PolyFlags, exclude: PolyFlags) -> Option<PolyFlags> {
        let mesh = self.mesh.as_ref()?;
        let query = NavMeshQuery::new(mesh);
        let filter = Self::filter(include, exclude);
        let (reference, _) = query.find_nearest_poly(pos, FLAG_EXTENTS, &filter).ok()?;
        mesh.poly_flags(reference).ok()
    }
}
