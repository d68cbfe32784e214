//! Polygon corridor maintenance during smoothing.
//!
//! The corridor is the coarse polygon chain the smoothing loop walks along.
//! After each constrained surface move it is spliced against the polygons
//! actually traversed, and checked for the small U-turns that tile-boundary
//! vertex choices can produce.

use tilenav::{NavMesh, PolyRef};

/// Maximum corridor length; trailing polygons beyond this are dropped.
pub const MAX_CORRIDOR: usize = 256;

/// Neighbor list bound when probing for shortcuts.
const MAX_NEIS: usize = 16;

/// How far into the corridor the shortcut probe looks.
const MAX_LOOK_AHEAD: usize = 6;

/// An ordered polygon chain from the current position to the goal.
#[derive(Debug, Clone)]
pub struct PathCorridor {
    polys: Vec<PolyRef>,
}

impl PathCorridor {
    /// Wraps a coarse path, truncating the tail to the corridor bound.
    pub fn from_path(mut path: Vec<PolyRef>) -> Self {
        path.truncate(MAX_CORRIDOR);
        Self { polys: path }
    }

    pub fn len(&self) -> usize {
        self.polys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// The polygon the corridor currently starts on.
    pub fn first(&self) -> Option<PolyRef> {
        self.polys.first().copied()
    }

    /// The goal polygon.
    pub fn last(&self) -> Option<PolyRef> {
        self.polys.last().copied()
    }

    pub fn polys(&self) -> &[PolyRef] {
        &self.polys
    }

    /// Splices the corridor against the polygons traversed during a surface
    /// move (`visited`, most-recent-last).
    ///
    /// The splice point is the furthest-back polygon present in both lists:
    /// the corridor is scanned tail-to-head, and for that corridor position
    /// the visited list is scanned tail-to-head with later matches winning.
    /// The result starts with the reversed visited suffix and reconnects to
    /// the remainder of the old corridor; when the bound is exceeded the
    /// tail is truncated, never the current-position head. Without a common
    /// polygon the corridor is left unchanged.
    pub fn fixup_corridor(&mut self, visited: &[PolyRef]) {
        let mut furthest: Option<(usize, usize)> = None;
        'corridor: for i in (0..self.polys.len()).rev() {
            for j in (0..visited.len()).rev() {
                if self.polys[i] == visited[j] {
                    furthest = Some((i, j));
                }
            }
            if furthest.is_some() {
                break 'corridor;
            }
        }
        let Some((furthest_path, furthest_visited)) = furthest else {
            return;
        };

        let mut next: Vec<PolyRef> = visited[furthest_visited..].iter().rev().copied().collect();
        let keep = MAX_CORRIDOR.saturating_sub(next.len());
        next.extend(self.polys[furthest_path + 1..].iter().take(keep));
        self.polys = next;
    }

    /// Collapses a small U-turn at the corridor head.
    ///
    /// When the target sits at a tile boundary and the move runs parallel to
    /// the tile edge, the arbitrary vertex choice can route the corridor
    /// through a polygon that is directly adjacent to the head. If one of
    /// the head's neighbors reappears within the look-ahead window past
    /// index 1, the loop between them is cut out.
    pub fn fixup_shortcuts(&mut self, mesh: &NavMesh) {
        if self.polys.len() < 3 {
            return;
        }
        let Ok(neis) = mesh.linked_polys(self.polys[0], MAX_NEIS) else {
            return;
        };

        let mut cut = 0usize;
        let mut i = MAX_LOOK_AHEAD.min(self.polys.len()) - 1;
        while i > 1 && cut == 0 {
            if neis.contains(&self.polys[i]) {
                cut = i;
            }
            i -= 1;
        }
        if cut > 1 {
            self.polys.drain(1..cut);
        }
    }
}
