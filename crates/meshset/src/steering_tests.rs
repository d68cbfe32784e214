//! Tests for steering-target selection.

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use tilenav::test_meshes::{grid_mesh, grid_params, off_mesh_grid_tile, poly_ref, tile_ref};
    use tilenav::{NavMesh, NavMeshQuery};

    use crate::steering::steer_target;

    #[test]
    fn no_target_when_everything_is_within_slop() {
        let mesh = grid_mesh(3).unwrap();
        let query = NavMeshQuery::new(&mesh);
        let pos = Vec3::new(1.5, 0.0, 1.5);
        let target = steer_target(&query, pos, pos, 0.5, &[poly_ref(0, 4)]);
        assert!(target.is_none());
    }

    #[test]
    fn steers_to_path_end() {
        let mesh = grid_mesh(3).unwrap();
        let query = NavMeshQuery::new(&mesh);
        let corridor = [poly_ref(0, 0), poly_ref(0, 1), poly_ref(0, 2)];
        let start = Vec3::new(0.5, 0.0, 0.5);
        let end = Vec3::new(2.5, 0.0, 0.5);

        let target = steer_target(&query, start, end, 0.01, &corridor).unwrap();
        assert!(target.at_end());
        assert!((target.pos - end).length() < 1e-5);
    }

    #[test]
    fn target_height_is_pinned_to_start() {
        let mesh = grid_mesh(3).unwrap();
        let query = NavMeshQuery::new(&mesh);
        let corridor = [poly_ref(0, 0), poly_ref(0, 1), poly_ref(0, 2)];
        let start = Vec3::new(0.5, 7.5, 0.5);

        let target = steer_target(&query, start, Vec3::new(2.5, 0.0, 0.5), 0.01, &corridor)
            .unwrap();
        assert_eq!(target.pos.y, 7.5);
    }

    #[test]
    fn off_mesh_waypoint_overrides_slop() {
        let mut mesh = NavMesh::new(grid_params(3)).unwrap();
        mesh.add_tile(off_mesh_grid_tile().unwrap(), tile_ref(0)).unwrap();
        let query = NavMeshQuery::new(&mesh);
        let corridor = [poly_ref(0, 0), poly_ref(0, 9), poly_ref(0, 8)];

        // A slop larger than the whole mesh would reject every ordinary
        // point; the off-mesh waypoint must still be offered.
        let target = steer_target(
            &query,
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(2.9, 0.0, 2.1),
            10.0,
            &corridor,
        )
        .unwrap();
        assert!(target.off_mesh());
        assert_eq!(target.poly, poly_ref(0, 9));
    }
}
