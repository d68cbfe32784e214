//! Tests for corridor splicing and shortcut collapsing.

#[cfg(test)]
mod tests {
    use crate::corridor::{PathCorridor, MAX_CORRIDOR};
    use tilenav::test_meshes::{grid_mesh, poly_ref};
    use tilenav::PolyRef;

    fn refs(ids: &[u64]) -> Vec<PolyRef> {
        ids.iter().map(|&id| PolyRef::new(id)).collect()
    }

    #[test]
    fn from_path_truncates_tail() {
        let long: Vec<PolyRef> = (1..=300u64).map(PolyRef::new).collect();
        let corridor = PathCorridor::from_path(long);
        assert_eq!(corridor.len(), MAX_CORRIDOR);
        assert_eq!(corridor.first(), Some(PolyRef::new(1)));
        assert_eq!(corridor.last(), Some(PolyRef::new(MAX_CORRIDOR as u64)));
    }

    #[test]
    fn fixup_without_overlap_is_identity() {
        let mut corridor = PathCorridor::from_path(refs(&[1, 2, 3, 4]));
        corridor.fixup_corridor(&refs(&[10, 11, 12]));
        assert_eq!(corridor.polys(), refs(&[1, 2, 3, 4]).as_slice());
    }

    #[test]
    fn fixup_splices_visited_suffix() {
        // Moved off through polygon 60 while the corridor still points
        // through 2; the result starts at the actual position.
        let mut corridor = PathCorridor::from_path(refs(&[1, 2, 3, 4, 5]));
        corridor.fixup_corridor(&refs(&[1, 2, 60]));
        assert_eq!(corridor.polys(), refs(&[60, 2, 3, 4, 5]).as_slice());
    }

    #[test]
    fn fixup_tie_break_uses_deepest_visited_match() {
        // Polygon 2 appears twice in the visited list; the splice keeps the
        // whole suffix starting at its earliest occurrence.
        let mut corridor = PathCorridor::from_path(refs(&[1, 2]));
        corridor.fixup_corridor(&refs(&[2, 1, 2]));
        assert_eq!(corridor.polys(), refs(&[2, 1, 2]).as_slice());
    }

    #[test]
    fn fixup_truncates_tail_never_head() {
        let full: Vec<PolyRef> = (1..=MAX_CORRIDOR as u64).map(PolyRef::new).collect();
        let mut corridor = PathCorridor::from_path(full);
        // Wandered onto two new polygons before rejoining at the head.
        corridor.fixup_corridor(&refs(&[1, 900, 901]));
        assert_eq!(corridor.len(), MAX_CORRIDOR);
        assert_eq!(corridor.first(), Some(PolyRef::new(901)));
        assert_eq!(corridor.polys()[1], PolyRef::new(900));
        assert_eq!(corridor.polys()[2], PolyRef::new(1));
        // Two tail entries were dropped to make room.
        assert_eq!(corridor.last(), Some(PolyRef::new(MAX_CORRIDOR as u64 - 2)));
    }

    #[test]
    fn shortcuts_skip_short_corridors() {
        let mesh = grid_mesh(3).unwrap();
        let mut corridor = PathCorridor::from_path(vec![poly_ref(0, 0), poly_ref(0, 1)]);
        corridor.fixup_shortcuts(&mesh);
        assert_eq!(corridor.polys(), &[poly_ref(0, 0), poly_ref(0, 1)]);
    }

    #[test]
    fn shortcuts_collapse_u_turn() {
        // The fifth corridor entry is adjacent to the head; the loop
        // through cells 1, 4 and 7 is an artifact and gets cut.
        let mesh = grid_mesh(3).unwrap();
        let mut corridor = PathCorridor::from_path(vec![
            poly_ref(0, 0),
            poly_ref(0, 1),
            poly_ref(0, 4),
            poly_ref(0, 7),
            poly_ref(0, 3),
        ]);
        corridor.fixup_shortcuts(&mesh);
        assert_eq!(corridor.polys(), &[poly_ref(0, 0), poly_ref(0, 3)]);
    }

    #[test]
    fn shortcuts_leave_clean_corridor_alone() {
        let mesh = grid_mesh(3).unwrap();
        let path = vec![poly_ref(0, 0), poly_ref(0, 1), poly_ref(0, 2)];
        let mut corridor = PathCorridor::from_path(path.clone());
        corridor.fixup_shortcuts(&mesh);
        assert_eq!(corridor.polys(), path.as_slice());
    }
}
