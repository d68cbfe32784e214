//! End-to-end session tests: loading, smoothing, line of sight, flags.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use glam::Vec3;

    use tilenav::test_meshes::{grid_params, grid_tile, grid_tile_with, tile_ref};
    use tilenav::{PolyFlags, AREA_GROUND, AREA_WATER};

    use crate::error::Error;
    use crate::loader::save_mesh_set;
    use crate::session::{LosStatus, MeshSession};

    fn fixture_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("meshset_session_{}_{name}.mset", std::process::id()))
    }

    fn flat_grid_fixture(name: &str) -> PathBuf {
        let path = fixture_path(name);
        let tiles = vec![(tile_ref(0), grid_tile(0, 0, 3).unwrap())];
        save_mesh_set(&path, &grid_params(3), &tiles).unwrap();
        path
    }

    fn loaded_session(name: &str) -> (MeshSession, PathBuf) {
        let path = flat_grid_fixture(name);
        let mut session = MeshSession::new();
        session.load(&path).unwrap();
        (session, path)
    }

    #[test]
    fn queries_against_unloaded_session_fail_cleanly() {
        let session = MeshSession::new();
        let start = Vec3::new(0.5, 0.0, 0.5);
        let end = Vec3::new(2.5, 0.0, 2.5);

        assert!(!session.is_loaded());
        assert_eq!(
            session
                .find_path(start, end, PolyFlags::ALL, PolyFlags::empty())
                .unwrap_err(),
            Error::QueryFailed
        );
        assert_eq!(
            session
                .find_smooth_path(start, end, PolyFlags::ALL, PolyFlags::empty())
                .unwrap_err(),
            Error::QueryFailed
        );
        assert_eq!(
            session.check_line_of_sight(start, end, 100.0),
            LosStatus::Failed
        );
        assert_eq!(session.poly_flags(start, PolyFlags::ALL, PolyFlags::empty()), None);
    }

    #[test]
    fn failed_load_preserves_previous_mesh() {
        let (mut session, path) = loaded_session("preserve");
        assert_eq!(session.mesh().unwrap().tile_count(), 1);

        let bad = fixture_path("preserve_bad");
        let mut bytes = fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 10);
        fs::write(&bad, bytes).unwrap();

        assert_eq!(session.load(&bad).unwrap_err(), Error::TruncatedTileData);
        assert!(session.is_loaded());
        assert_eq!(session.mesh().unwrap().tile_count(), 1);

        fs::remove_file(path).ok();
        fs::remove_file(bad).ok();
    }

    #[test]
    fn unload_releases_the_mesh() {
        let (mut session, path) = loaded_session("unload");
        session.unload();
        assert!(!session.is_loaded());
        fs::remove_file(path).ok();
    }

    #[test]
    fn coarse_path_spans_endpoints() {
        let (session, path) = loaded_session("coarse");
        let start = Vec3::new(0.5, 0.0, 0.5);
        let end = Vec3::new(2.5, 0.0, 0.5);

        let points = session
            .find_path(start, end, PolyFlags::ALL, PolyFlags::empty())
            .unwrap();
        assert!(points.len() >= 2);
        assert!((points[0] - start).length() < 1e-4);
        assert!((points[points.len() - 1] - end).length() < 1e-4);
        fs::remove_file(path).ok();
    }

    #[test]
    fn smooth_path_walks_in_bounded_steps() {
        let (session, path) = loaded_session("smooth");
        let start = Vec3::new(0.5, 0.0, 0.5);
        let end = Vec3::new(2.5, 0.0, 2.5);

        let points = session
            .find_smooth_path(start, end, PolyFlags::ALL, PolyFlags::empty())
            .unwrap();
        assert!(points.len() >= 2);
        assert!((points[0] - start).length() < 1e-4);
        assert!((points[points.len() - 1] - end).length() < 0.05);
        for pair in points.windows(2) {
            let d = pair[1] - pair[0];
            let horizontal = (d.x * d.x + d.z * d.z).sqrt();
            assert!(horizontal <= 2.0 + 1e-3);
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn smooth_path_requires_reachable_endpoints() {
        let (session, path) = loaded_session("unreachable");
        let err = session
            .find_smooth_path(
                Vec3::new(500.0, 0.0, 500.0),
                Vec3::new(0.5, 0.0, 0.5),
                PolyFlags::ALL,
                PolyFlags::empty(),
            )
            .unwrap_err();
        assert_eq!(err, Error::PolyNotFound);
        fs::remove_file(path).ok();
    }

    #[test]
    fn line_of_sight_short_circuits_out_of_range() {
        let (session, path) = loaded_session("los_range");
        let status = session.check_line_of_sight(
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(2.5, 0.0, 2.5),
            1.0,
        );
        assert_eq!(status, LosStatus::OutOfRange);

        // The range gate runs before any mesh access.
        let empty = MeshSession::new();
        assert_eq!(
            empty.check_line_of_sight(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0), 1.0),
            LosStatus::OutOfRange
        );
        fs::remove_file(path).ok();
    }

    #[test]
    fn line_of_sight_sees_across_open_ground() {
        let (session, path) = loaded_session("los_open");
        let status = session.check_line_of_sight(
            Vec3::new(0.6, 0.0, 0.5),
            Vec3::new(2.4, 0.0, 2.5),
            100.0,
        );
        assert_eq!(status, LosStatus::Visible);
        fs::remove_file(path).ok();
    }

    #[test]
    fn line_of_sight_blocked_by_mesh_edge() {
        let (session, path) = loaded_session("los_wall");
        let status = session.check_line_of_sight(
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(6.0, 0.0, 0.5),
            100.0,
        );
        assert_eq!(status, LosStatus::Blocked);
        fs::remove_file(path).ok();
    }

    #[test]
    fn poly_flags_resolve_under_point() {
        let path = fixture_path("flags");
        let blob = grid_tile_with(0, 0, 3, |cx, _| {
            if cx == 1 {
                (PolyFlags::SWIM | PolyFlags::WATER, AREA_WATER)
            } else {
                (PolyFlags::WALK, AREA_GROUND)
            }
        })
        .unwrap();
        save_mesh_set(&path, &grid_params(3), &[(tile_ref(0), blob)]).unwrap();

        let mut session = MeshSession::new();
        session.load(&path).unwrap();

        let flags = session
            .poly_flags(Vec3::new(1.5, 0.0, 1.5), PolyFlags::ALL, PolyFlags::empty())
            .unwrap();
        assert_eq!(flags, PolyFlags::SWIM | PolyFlags::WATER);
        assert_eq!(
            session.poly_flags(Vec3::new(50.0, 0.0, 50.0), PolyFlags::ALL, PolyFlags::empty()),
            None
        );
        // Excluding water makes the wet cell unresolvable.
        assert_eq!(
            session.poly_flags(Vec3::new(1.5, 0.0, 1.5), PolyFlags::ALL, PolyFlags::WATER),
            None
        );
        fs::remove_file(path).ok();
    }

    #[test]
    fn random_point_uses_injected_randomness() {
        let (session, path) = loaded_session("random");

        let mut state = 12345u32;
        let mut frand = move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32
        };

        let point = session
            .random_point(
                Vec3::new(1.5, 0.0, 1.5),
                2.0,
                PolyFlags::ALL,
                PolyFlags::empty(),
                &mut frand,
            )
            .unwrap();
        // The sampled point lies on the loaded mesh.
        assert!(session
            .poly_flags(point, PolyFlags::ALL, PolyFlags::empty())
            .is_some());
        fs::remove_file(path).ok();
    }
}
