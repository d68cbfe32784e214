//! Queries against a navigation mesh.
//!
//! [`NavMeshQuery`] is a cheap handle bound to one mesh; callers construct a
//! fresh one per operation. Search state is local to each call, so a query
//! handle has no identity worth preserving between operations.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use glam::Vec3;

use crate::error::{Error, Result};
use crate::math;
use crate::nav_mesh::{NavMesh, Poly, PolyRef, PolyType, NO_EDGE};
use crate::{PolyFlags, StraightPathFlags, MAX_AREAS};

/// Upper bound on polygons considered by a box query.
const MAX_QUERY_POLYS: usize = 128;

/// Upper bound on nodes expanded by a graph search.
const MAX_SEARCH_NODES: usize = 4096;

/// Upper bound on polygons touched by a constrained surface move.
const MAX_SURFACE_VISITED: usize = 16;

/// Upper bound on polygons crossed by one raycast.
const MAX_RAYCAST_POLYS: usize = 256;

/// Polygon inclusion/exclusion masks and per-area traversal costs.
#[derive(Debug, Clone)]
pub struct QueryFilter {
    /// A polygon must share at least one flag with this mask.
    pub include_flags: PolyFlags,
    /// A polygon sharing any flag with this mask is rejected.
    pub exclude_flags: PolyFlags,
    area_cost: [f32; MAX_AREAS],
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            include_flags: PolyFlags::ALL,
            exclude_flags: PolyFlags::empty(),
            area_cost: [1.0; MAX_AREAS],
        }
    }
}

impl QueryFilter {
    /// Filter with the given masks and unit cost for every area.
    pub fn new(include_flags: PolyFlags, exclude_flags: PolyFlags) -> Self {
        Self {
            include_flags,
            exclude_flags,
            ..Self::default()
        }
    }

    /// Sets the traversal cost multiplier for an area id.
    pub fn set_area_cost(&mut self, area: u8, cost: f32) {
        if (area as usize) < MAX_AREAS {
            self.area_cost[area as usize] = cost;
        }
    }

    /// Traversal cost multiplier of an area id.
    pub fn area_cost(&self, area: u8) -> f32 {
        self.area_cost.get(area as usize).copied().unwrap_or(1.0)
    }

    /// Whether a polygon qualifies under the masks.
    pub fn pass_filter(&self, poly: &Poly) -> bool {
        poly.flags.intersects(self.include_flags) && !poly.flags.intersects(self.exclude_flags)
    }
}

/// One vertex of a straight path.
#[derive(Debug, Clone, Copy)]
pub struct StraightPathPoint {
    /// World-space position.
    pub pos: Vec3,
    /// Classification of this vertex.
    pub flags: StraightPathFlags,
    /// Polygon the path enters at this vertex.
    pub poly: PolyRef,
}

/// Outcome of a raycast along the mesh surface.
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// Hit parameter along the segment; `f32::MAX` when nothing was hit.
    pub t: f32,
    /// Polygons crossed, starting at the source polygon.
    pub path: Vec<PolyRef>,
}

impl RaycastHit {
    /// Whether the ray reached its end unobstructed.
    pub fn is_clear(&self) -> bool {
        self.t == f32::MAX
    }
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    parent: Option<PolyRef>,
    pos: Vec3,
    g: f32,
    closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    poly: PolyRef,
    f: f32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; NaN sorts last.
        other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal)
    }
}

/// Query handle bound to one navigation mesh.
#[derive(Debug)]
pub struct NavMeshQuery<'a> {
    nav_mesh: &'a NavMesh,
}

impl<'a> NavMeshQuery<'a> {
    /// Binds a query handle to a mesh.
    pub fn new(nav_mesh: &'a NavMesh) -> Self {
        Self { nav_mesh }
    }

    /// The bound mesh.
    pub fn nav_mesh(&self) -> &NavMesh {
        self.nav_mesh
    }

    /// Finds the polygon nearest to `center` within the search box, along
    /// with the closest point on it.
    pub fn find_nearest_poly(
        &self,
        center: Vec3,
        half_extents: Vec3,
        filter: &QueryFilter,
    ) -> Result<(PolyRef, Vec3)> {
        let polys = self.nav_mesh.query_polygons(
            center - half_extents,
            center + half_extents,
            filter,
            MAX_QUERY_POLYS,
        );

        let mut nearest = PolyRef::NONE;
        let mut nearest_pt = center;
        let mut nearest_d = f32::MAX;
        for reference in polys {
            let (pt, over) = self.nav_mesh.closest_point_on_poly(reference, center)?;
            // Directly overhead beats a slightly closer lateral candidate.
            let d = if over {
                (center.y - pt.y).abs()
            } else {
                center.distance(pt)
            };
            if d < nearest_d {
                nearest = reference;
                nearest_pt = pt;
                nearest_d = d;
            }
        }

        if !nearest.is_valid() {
            return Err(Error::NotFound);
        }
        Ok((nearest, nearest_pt))
    }

    /// Closest point on the referenced polygon.
    pub fn closest_point_on_poly(&self, reference: PolyRef, pos: Vec3) -> Result<Vec3> {
        let (pt, _) = self.nav_mesh.closest_point_on_poly(reference, pos)?;
        Ok(pt)
    }

    /// Floor height of the referenced polygon under `pos`.
    pub fn get_poly_height(&self, reference: PolyRef, pos: Vec3) -> Result<Option<f32>> {
        self.nav_mesh.poly_height(reference, pos)
    }

    /// A* search over the polygon graph. Returns the corridor from
    /// `start_ref` toward `end_ref`, truncated to `max_path` entries. When
    /// the goal is unreachable the corridor leads to the closest reachable
    /// polygon instead.
    pub fn find_path(
        &self,
        start_ref: PolyRef,
        end_ref: PolyRef,
        start_pos: Vec3,
        end_pos: Vec3,
        filter: &QueryFilter,
        max_path: usize,
    ) -> Result<Vec<PolyRef>> {
        if !self.nav_mesh.is_valid_poly_ref(start_ref)
            || !self.nav_mesh.is_valid_poly_ref(end_ref)
            || max_path == 0
        {
            return Err(Error::InvalidParam);
        }
        if start_ref == end_ref {
            return Ok(vec![start_ref]);
        }

        let mut nodes: HashMap<PolyRef, SearchNode> = HashMap::new();
        let mut open = BinaryHeap::new();

        nodes.insert(
            start_ref,
            SearchNode {
                parent: None,
                pos: start_pos,
                g: 0.0,
                closed: false,
            },
        );
        open.push(HeapEntry {
            poly: start_ref,
            f: start_pos.distance(end_pos),
        });

        let mut best = start_ref;
        let mut best_h = start_pos.distance(end_pos);

        while let Some(HeapEntry { poly: cur_ref, .. }) = open.pop() {
            let cur = match nodes.get_mut(&cur_ref) {
                Some(n) if !n.closed => {
                    n.closed = true;
                    *n
                }
                _ => continue,
            };

            if cur_ref == end_ref {
                best = cur_ref;
                break;
            }
            let h = cur.pos.distance(end_pos);
            if h < best_h {
                best_h = h;
                best = cur_ref;
            }
            if nodes.len() >= MAX_SEARCH_NODES {
                break;
            }

            let (tile, poly) = self.nav_mesh.get_tile_and_poly(cur_ref)?;
            let area = poly.area;
            let neighbors: Vec<(PolyRef, Vec3)> = tile
                .links_of(poly)
                .filter_map(|link| {
                    let (ntile, npoly) = self.nav_mesh.get_tile_and_poly(link.reference).ok()?;
                    if !filter.pass_filter(npoly) {
                        return None;
                    }
                    let crossing = if link.edge == NO_EDGE {
                        // Entering an off-mesh connection: its nearest anchor.
                        let a = ntile.verts[npoly.verts[0] as usize];
                        let b = ntile.verts[npoly.verts[1] as usize];
                        if cur.pos.distance_squared(a) < cur.pos.distance_squared(b) {
                            a
                        } else {
                            b
                        }
                    } else if poly.poly_type == PolyType::OffMeshConnection {
                        // Leaving through an anchor vertex.
                        tile.verts[poly.verts[link.edge as usize] as usize]
                    } else {
                        let i = link.edge as usize;
                        let j = (i + 1) % poly.vert_count as usize;
                        let a = tile.verts[poly.verts[i] as usize];
                        let b = tile.verts[poly.verts[j] as usize];
                        (a + b) * 0.5
                    };
                    Some((link.reference, crossing))
                })
                .collect();

            for (nei_ref, crossing) in neighbors {
                let g = cur.g + cur.pos.distance(crossing) * filter.area_cost(area);
                let update = match nodes.get(&nei_ref) {
                    Some(existing) => !existing.closed && g < existing.g,
                    None => true,
                };
                if update {
                    nodes.insert(
                        nei_ref,
                        SearchNode {
                            parent: Some(cur_ref),
                            pos: crossing,
                            g,
                            closed: false,
                        },
                    );
                    open.push(HeapEntry {
                        poly: nei_ref,
                        f: g + crossing.distance(end_pos),
                    });
                }
            }
        }

        // Walk back from the best node.
        let mut path = Vec::new();
        let mut cur = Some(best);
        while let Some(reference) = cur {
            path.push(reference);
            cur = nodes.get(&reference).and_then(|n| n.parent);
        }
        path.reverse();
        path.truncate(max_path);
        Ok(path)
    }

    /// Funnel algorithm across a polygon corridor. Produces at most
    /// `max_points` vertices; the first is flagged as the start, the last
    /// (when the end was reached) as the end.
    pub fn find_straight_path(
        &self,
        start_pos: Vec3,
        end_pos: Vec3,
        path: &[PolyRef],
        max_points: usize,
    ) -> Result<Vec<StraightPathPoint>> {
        if path.is_empty() || max_points == 0 {
            return Err(Error::InvalidParam);
        }

        let mut points: Vec<StraightPathPoint> = Vec::new();
        append_point(
            &mut points,
            start_pos,
            StraightPathFlags::START,
            path[0],
            max_points,
        );

        if path.len() > 1 {
            let mut portal_apex = start_pos;
            let mut portal_left = start_pos;
            let mut portal_right = start_pos;
            let mut left_index = 0usize;
            let mut right_index = 0usize;

            let mut i = 0;
            while i < path.len() {
                let (left, right) = if i + 1 < path.len() {
                    match self.get_portal_points(path[i], path[i + 1]) {
                        Ok(p) => p,
                        Err(_) => {
                            // Corridor is stale past this point; clamp to
                            // the last reachable polygon.
                            let clamped = self.closest_point_on_poly(path[i], end_pos)?;
                            append_point(
                                &mut points,
                                clamped,
                                StraightPathFlags::empty(),
                                path[i],
                                max_points,
                            );
                            return Ok(points);
                        }
                    }
                } else {
                    (end_pos, end_pos)
                };

                // Right side of the funnel.
                if math::tri_area_2d(portal_apex, portal_right, right) <= 0.0 {
                    if math::v_equal_2d(portal_apex, portal_right)
                        || math::tri_area_2d(portal_apex, portal_left, right) > 0.0
                    {
                        portal_right = right;
                        right_index = i;
                    } else {
                        if !append_funnel_corner(
                            self.nav_mesh,
                            &mut points,
                            portal_left,
                            path[left_index],
                            max_points,
                        ) {
                            return Ok(points);
                        }
                        portal_apex = portal_left;
                        portal_right = portal_apex;
                        right_index = left_index;
                        i = left_index + 1;
                        continue;
                    }
                }

                // Left side of the funnel.
                if math::tri_area_2d(portal_apex, portal_left, left) >= 0.0 {
                    if math::v_equal_2d(portal_apex, portal_left)
                        || math::tri_area_2d(portal_apex, portal_right, left) < 0.0
                    {
                        portal_left = left;
                        left_index = i;
                    } else {
                        if !append_funnel_corner(
                            self.nav_mesh,
                            &mut points,
                            portal_right,
                            path[right_index],
                            max_points,
                        ) {
                            return Ok(points);
                        }
                        portal_apex = portal_right;
                        portal_left = portal_apex;
                        left_index = right_index;
                        i = right_index + 1;
                        continue;
                    }
                }

                i += 1;
            }
        }

        append_point(
            &mut points,
            end_pos,
            StraightPathFlags::END,
            path[path.len() - 1],
            max_points,
        );
        Ok(points)
    }

    /// Left/right portal vertices crossed when moving between two adjacent
    /// polygons. Off-mesh connections pinch the portal to their anchor.
    pub fn get_portal_points(&self, from: PolyRef, to: PolyRef) -> Result<(Vec3, Vec3)> {
        let (from_tile, from_poly) = self.nav_mesh.get_tile_and_poly(from)?;
        let (to_tile, to_poly) = self.nav_mesh.get_tile_and_poly(to)?;

        if from_poly.poly_type == PolyType::OffMeshConnection {
            for link in from_tile.links_of(from_poly) {
                if link.reference == to {
                    let v = from_tile.verts[from_poly.verts[link.edge as usize] as usize];
                    return Ok((v, v));
                }
            }
            return Err(Error::InvalidParam);
        }

        if to_poly.poly_type == PolyType::OffMeshConnection {
            for link in to_tile.links_of(to_poly) {
                if link.reference == from {
                    let v = to_tile.verts[to_poly.verts[link.edge as usize] as usize];
                    return Ok((v, v));
                }
            }
            return Err(Error::InvalidParam);
        }

        for link in from_tile.links_of(from_poly) {
            if link.reference != to || link.edge == NO_EDGE {
                continue;
            }
            let i = link.edge as usize;
            let j = (i + 1) % from_poly.vert_count as usize;
            let left = from_tile.verts[from_poly.verts[i] as usize];
            let right = from_tile.verts[from_poly.verts[j] as usize];
            return Ok((left, right));
        }
        Err(Error::InvalidParam)
    }

    /// Moves from `start_pos` toward `end_pos` constrained to the walkable
    /// surface, sliding along walls. Returns the resulting position and the
    /// polygons traversed, most recent last.
    pub fn move_along_surface(
        &self,
        start_ref: PolyRef,
        start_pos: Vec3,
        end_pos: Vec3,
        filter: &QueryFilter,
    ) -> Result<(Vec3, Vec<PolyRef>)> {
        if !self.nav_mesh.is_valid_poly_ref(start_ref) {
            return Err(Error::InvalidParam);
        }

        struct SurfaceNode {
            reference: PolyRef,
            parent: Option<usize>,
        }

        let mut nodes = vec![SurfaceNode {
            reference: start_ref,
            parent: None,
        }];
        let mut queue = VecDeque::from([0usize]);

        let mut best_pos = start_pos;
        let mut best_dist = f32::MAX;
        let mut best_node = 0usize;

        // Constrain the walk to the neighborhood of the move segment.
        let search_pos = (start_pos + end_pos) * 0.5;
        let search_rad_sqr = start_pos.distance_squared(end_pos) * 0.25 + 0.001;

        while let Some(cur_idx) = queue.pop_front() {
            let cur_ref = nodes[cur_idx].reference;
            let (tile, poly) = self.nav_mesh.get_tile_and_poly(cur_ref)?;
            let verts: Vec<Vec3> = poly.world_verts(tile).collect();

            if math::point_in_poly_2d(end_pos, &verts) {
                best_node = cur_idx;
                best_pos = end_pos;
                break;
            }

            for edge in 0..poly.vert_count as usize {
                let a = verts[edge];
                let b = verts[(edge + 1) % verts.len()];

                let passable: Vec<PolyRef> = tile
                    .links_of(poly)
                    .filter(|l| l.edge == edge as u8)
                    .filter_map(|l| {
                        let (_, npoly) = self.nav_mesh.get_tile_and_poly(l.reference).ok()?;
                        (npoly.poly_type == PolyType::Ground && filter.pass_filter(npoly))
                            .then_some(l.reference)
                    })
                    .collect();

                if passable.is_empty() {
                    // Wall: remember the closest sliding position.
                    let (d, t) = math::dist_pt_seg_sqr_2d(end_pos, a, b);
                    if d < best_dist {
                        best_dist = d;
                        best_pos = a + (b - a) * t;
                        best_node = cur_idx;
                    }
                } else {
                    for nei_ref in passable {
                        if nodes.iter().any(|n| n.reference == nei_ref) {
                            continue;
                        }
                        let (d, _) = math::dist_pt_seg_sqr_2d(search_pos, a, b);
                        if d > search_rad_sqr {
                            continue;
                        }
                        if nodes.len() < MAX_SURFACE_VISITED {
                            nodes.push(SurfaceNode {
                                reference: nei_ref,
                                parent: Some(cur_idx),
                            });
                            queue.push_back(nodes.len() - 1);
                        }
                    }
                }
            }
        }

        let mut visited = Vec::new();
        let mut cur = Some(best_node);
        while let Some(idx) = cur {
            visited.push(nodes[idx].reference);
            cur = nodes[idx].parent;
        }
        visited.reverse();
        Ok((best_pos, visited))
    }

    /// Casts a ray from `start_pos` toward `end_pos` along the mesh
    /// surface. A hit parameter of `f32::MAX` means the end was reached.
    pub fn raycast(
        &self,
        start_ref: PolyRef,
        start_pos: Vec3,
        end_pos: Vec3,
        filter: &QueryFilter,
    ) -> Result<RaycastHit> {
        if !self.nav_mesh.is_valid_poly_ref(start_ref) {
            return Err(Error::InvalidParam);
        }

        let mut cur_ref = start_ref;
        let mut cur_pos = start_pos;
        let mut path = vec![start_ref];

        for _ in 0..MAX_RAYCAST_POLYS {
            let dx = end_pos.x - cur_pos.x;
            let dz = end_pos.z - cur_pos.z;
            if dx * dx + dz * dz < 1e-6 {
                return Ok(RaycastHit { t: f32::MAX, path });
            }

            let (tile, poly) = self.nav_mesh.get_tile_and_poly(cur_ref)?;
            let verts: Vec<Vec3> = poly.world_verts(tile).collect();

            // Exit edge of the segment within this polygon.
            let mut exit: Option<(usize, f32)> = None;
            for edge in 0..verts.len() {
                let a = verts[edge];
                let b = verts[(edge + 1) % verts.len()];
                if let Some((ray_t, seg_t)) = math::intersect_seg_seg_2d(cur_pos, end_pos, a, b) {
                    if ray_t > 1e-4 && (0.0..=1.0).contains(&seg_t) {
                        match exit {
                            Some((_, best_t)) if ray_t >= best_t => {}
                            _ => exit = Some((edge, ray_t)),
                        }
                    }
                }
            }

            let Some((edge, ray_t)) = exit else {
                // Segment ends inside this polygon.
                return Ok(RaycastHit { t: f32::MAX, path });
            };
            if ray_t >= 1.0 {
                return Ok(RaycastHit { t: f32::MAX, path });
            }

            let next = tile
                .links_of(poly)
                .filter(|l| l.edge == edge as u8)
                .filter_map(|l| {
                    let (_, npoly) = self.nav_mesh.get_tile_and_poly(l.reference).ok()?;
                    (npoly.poly_type == PolyType::Ground && filter.pass_filter(npoly))
                        .then_some(l.reference)
                })
                .next();

            match next {
                Some(nei_ref) => {
                    cur_pos += (end_pos - cur_pos) * ray_t;
                    cur_ref = nei_ref;
                    if path.len() < MAX_RAYCAST_POLYS {
                        path.push(nei_ref);
                    }
                }
                None => {
                    // Wall hit. Scale the parameter back to the full segment.
                    let total = start_pos.distance(end_pos);
                    let hit = if total > 0.0 {
                        (start_pos.distance(cur_pos) + cur_pos.distance(end_pos) * ray_t) / total
                    } else {
                        0.0
                    };
                    return Ok(RaycastHit {
                        t: hit.min(1.0),
                        path,
                    });
                }
            }
        }

        Ok(RaycastHit { t: f32::MAX, path })
    }

    /// Picks a uniformly distributed point on the mesh within `radius` of
    /// `center_pos`, reachable from `center_ref`. Randomness comes from the
    /// injected `frand` source returning values in [0, 1).
    pub fn find_random_point_around_circle(
        &self,
        center_ref: PolyRef,
        center_pos: Vec3,
        radius: f32,
        filter: &QueryFilter,
        frand: &mut dyn FnMut() -> f32,
    ) -> Result<(PolyRef, Vec3)> {
        if !self.nav_mesh.is_valid_poly_ref(center_ref) || radius < 0.0 {
            return Err(Error::InvalidParam);
        }

        // Flood the reachable neighborhood, keeping polygons that touch the
        // circle; pick one weighted by surface area as we go.
        let mut seen: Vec<PolyRef> = vec![center_ref];
        let mut queue: VecDeque<PolyRef> = VecDeque::from([center_ref]);
        let radius_sqr = radius * radius;

        let mut chosen: Option<PolyRef> = None;
        let mut area_sum = 0.0f32;

        while let Some(cur_ref) = queue.pop_front() {
            let (tile, poly) = self.nav_mesh.get_tile_and_poly(cur_ref)?;

            if poly.poly_type == PolyType::Ground && filter.pass_filter(poly) {
                let verts: Vec<Vec3> = poly.world_verts(tile).collect();
                let mut area = 0.0;
                for i in 1..verts.len() - 1 {
                    area += math::tri_area_2d(verts[0], verts[i], verts[i + 1]).abs() * 0.5;
                }
                if area > 0.0 {
                    area_sum += area;
                    if frand() * area_sum <= area {
                        chosen = Some(cur_ref);
                    }
                }
            }

            if seen.len() >= MAX_QUERY_POLYS {
                continue;
            }
            for link in tile.links_of(poly) {
                let nei_ref = link.reference;
                if seen.contains(&nei_ref) {
                    continue;
                }
                let Ok((ntile, npoly)) = self.nav_mesh.get_tile_and_poly(nei_ref) else {
                    continue;
                };
                if npoly.poly_type != PolyType::Ground || !filter.pass_filter(npoly) {
                    continue;
                }
                // Reject polygons entirely outside the circle.
                let mut min_d = f32::MAX;
                let nverts: Vec<Vec3> = npoly.world_verts(ntile).collect();
                for i in 0..nverts.len() {
                    let j = (i + 1) % nverts.len();
                    let (d, _) = math::dist_pt_seg_sqr_2d(center_pos, nverts[i], nverts[j]);
                    min_d = min_d.min(d);
                }
                if math::point_in_poly_2d(center_pos, &nverts) {
                    min_d = 0.0;
                }
                if min_d > radius_sqr {
                    continue;
                }
                seen.push(nei_ref);
                queue.push_back(nei_ref);
            }
        }

        let chosen = chosen.ok_or(Error::NotFound)?;
        let (tile, poly) = self.nav_mesh.get_tile_and_poly(chosen)?;
        let verts: Vec<Vec3> = poly.world_verts(tile).collect();
        let pt = random_point_in_poly(&verts, frand);
        let pt = match self.nav_mesh.poly_height(chosen, pt)? {
            Some(h) => Vec3::new(pt.x, h, pt.z),
            None => pt,
        };
        Ok((chosen, pt))
    }
}

fn append_point(
    points: &mut Vec<StraightPathPoint>,
    pos: Vec3,
    flags: StraightPathFlags,
    poly: PolyRef,
    max_points: usize,
) -> bool {
    if let Some(last) = points.last_mut() {
        if math::v_equal_2d(last.pos, pos) {
            // Same corner reported again: keep the newer classification.
            last.flags = flags;
            last.poly = poly;
            return true;
        }
    }
    if points.len() >= max_points {
        return false;
    }
    points.push(StraightPathPoint { pos, flags, poly });
    points.len() < max_points
}

fn append_funnel_corner(
    mesh: &NavMesh,
    points: &mut Vec<StraightPathPoint>,
    pos: Vec3,
    poly: PolyRef,
    max_points: usize,
) -> bool {
    let flags = match mesh.get_tile_and_poly(poly) {
        Ok((_, p)) if p.poly_type == PolyType::OffMeshConnection => {
            StraightPathFlags::OFFMESH_CONNECTION
        }
        _ => StraightPathFlags::empty(),
    };
    append_point(points, pos, flags, poly, max_points)
}

/// Uniform sample inside a convex polygon via its triangle fan.
fn random_point_in_poly(verts: &[Vec3], frand: &mut dyn FnMut() -> f32) -> Vec3 {
    let mut areas = Vec::with_capacity(verts.len().saturating_sub(2));
    let mut total = 0.0f32;
    for i in 1..verts.len() - 1 {
        let a = math::tri_area_2d(verts[0], verts[i], verts[i + 1]).abs() * 0.5;
        total += a;
        areas.push(a);
    }

    let mut pick = frand() * total;
    let mut tri = 1usize;
    for (i, a) in areas.iter().enumerate() {
        if pick <= *a {
            tri = i + 1;
            break;
        }
        pick -= a;
    }

    let (a, b, c) = (verts[0], verts[tri], verts[tri + 1]);
    let u = frand().sqrt();
    let v = frand();
    a + (b - a) * (u * (1.0 - v)) + (c - a) * (u * v)
}
