//! Tests for the tiled mesh container: reference packing, tile
//! registration, and link wiring within and across tiles.

#[cfg(test)]
mod tests {
    use crate::test_meshes::{
        grid_mesh, grid_params, grid_tile, multi_tile_mesh, off_mesh_grid_tile, poly_ref, tile_ref,
    };
    use crate::{
        Error, NavMesh, NavMeshParams, PolyFlags, PolyRef, PolyType, QueryFilter, TileRef,
    };
    use glam::Vec3;

    #[test]
    fn poly_ref_round_trips() {
        let reference = PolyRef::encode(0x1234, 0x0ABCDEF, 0x54321);
        assert_eq!(reference.decode(), (0x1234, 0x0ABCDEF, 0x54321));
        assert!(reference.is_valid());
        assert!(!PolyRef::NONE.is_valid());
    }

    #[test]
    fn tile_ref_shares_poly_ref_layout() {
        let reference = TileRef::encode(7, 42);
        assert_eq!(reference.decode(), (7, 42));
        let (salt, tile, poly) = PolyRef::new(reference.id()).decode();
        assert_eq!((salt, tile, poly), (7, 42, 0));
    }

    #[test]
    fn new_rejects_bad_params() {
        let mut params = grid_params(3);
        params.tile_width = 0.0;
        assert_eq!(NavMesh::new(params).unwrap_err(), Error::InvalidParam);

        let mut params = grid_params(3);
        params.max_tiles = 0;
        assert_eq!(NavMesh::new(params).unwrap_err(), Error::InvalidParam);
    }

    #[test]
    fn add_tile_rejects_bad_blobs() {
        let mut mesh = NavMesh::new(grid_params(3)).unwrap();

        let err = mesh
            .add_tile(vec![0u8; 64], tile_ref(0))
            .unwrap_err();
        assert_eq!(err, Error::WrongMagic);

        let mut blob = grid_tile(0, 0, 3).unwrap();
        blob[4] = 99; // version field
        let err = mesh.add_tile(blob, tile_ref(0)).unwrap_err();
        assert_eq!(err, Error::WrongVersion(99));

        let mut blob = grid_tile(0, 0, 3).unwrap();
        blob.truncate(blob.len() / 2);
        let err = mesh.add_tile(blob, tile_ref(0)).unwrap_err();
        assert_eq!(err, Error::MalformedTile("unexpected end of tile data"));

        assert_eq!(mesh.tile_count(), 0);
    }

    #[test]
    fn add_tile_rejects_occupied_slot() {
        let mut mesh = NavMesh::new(grid_params(3)).unwrap();
        mesh.add_tile(grid_tile(0, 0, 3).unwrap(), tile_ref(0)).unwrap();
        let err = mesh
            .add_tile(grid_tile(1, 0, 3).unwrap(), tile_ref(0))
            .unwrap_err();
        assert_eq!(err, Error::AlreadyOccupied);
        assert_eq!(mesh.tile_count(), 1);
    }

    #[test]
    fn salt_mismatch_invalidates_reference() {
        let mesh = grid_mesh(3).unwrap();
        assert!(mesh.is_valid_poly_ref(poly_ref(0, 4)));
        let stale = PolyRef::encode(2, 0, 4);
        assert!(!mesh.is_valid_poly_ref(stale));
        assert!(mesh.get_tile_and_poly(stale).is_err());
    }

    #[test]
    fn internal_links_connect_grid_neighbors() {
        let mesh = grid_mesh(3).unwrap();

        // Center cell touches all four neighbors.
        let linked = mesh.linked_polys(poly_ref(0, 4), 16).unwrap();
        let expected = [poly_ref(0, 1), poly_ref(0, 3), poly_ref(0, 5), poly_ref(0, 7)];
        assert_eq!(linked.len(), 4);
        for reference in expected {
            assert!(linked.contains(&reference));
        }

        // Corner cell touches two.
        let linked = mesh.linked_polys(poly_ref(0, 0), 16).unwrap();
        assert_eq!(linked.len(), 2);
        assert!(linked.contains(&poly_ref(0, 1)));
        assert!(linked.contains(&poly_ref(0, 3)));
    }

    #[test]
    fn boundary_links_stitch_adjacent_tiles() {
        let mesh = multi_tile_mesh(2, 1, 3).unwrap();
        assert_eq!(mesh.tile_count(), 2);

        // Cell (2, 1) of tile 0 faces cell (0, 1) of tile 1 across x.
        let linked = mesh.linked_polys(poly_ref(0, 5), 16).unwrap();
        assert!(linked.contains(&poly_ref(1, 3)));
        let linked = mesh.linked_polys(poly_ref(1, 3), 16).unwrap();
        assert!(linked.contains(&poly_ref(0, 5)));
    }

    #[test]
    fn off_mesh_connection_becomes_linked_poly() {
        let mut mesh = NavMesh::new(grid_params(3)).unwrap();
        mesh.add_tile(off_mesh_grid_tile().unwrap(), tile_ref(0)).unwrap();

        // The connection polygon is appended after the nine ground cells.
        let con_ref = poly_ref(0, 9);
        let (_, con_poly) = mesh.get_tile_and_poly(con_ref).unwrap();
        assert_eq!(con_poly.poly_type, PolyType::OffMeshConnection);

        // Both anchor cells reach the connection, and it reaches back.
        assert!(mesh.linked_polys(poly_ref(0, 0), 16).unwrap().contains(&con_ref));
        assert!(mesh.linked_polys(poly_ref(0, 8), 16).unwrap().contains(&con_ref));
        let from_con = mesh.linked_polys(con_ref, 16).unwrap();
        assert!(from_con.contains(&poly_ref(0, 0)));
        assert!(from_con.contains(&poly_ref(0, 8)));
    }

    #[test]
    fn query_polygons_honors_filter() {
        let mut mesh = NavMesh::new(grid_params(3)).unwrap();
        let blob = crate::test_meshes::grid_tile_with(0, 0, 3, |cx, _| {
            if cx == 1 {
                (PolyFlags::SWIM | PolyFlags::WATER, crate::AREA_WATER)
            } else {
                (PolyFlags::WALK, crate::AREA_GROUND)
            }
        })
        .unwrap();
        mesh.add_tile(blob, tile_ref(0)).unwrap();

        let filter = QueryFilter::new(PolyFlags::WALK, PolyFlags::empty());
        let found = mesh.query_polygons(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(4.0, 1.0, 4.0),
            &filter,
            32,
        );
        assert_eq!(found.len(), 6);
        assert!(!found.contains(&poly_ref(0, 4)));
    }

    #[test]
    fn closest_point_clamps_to_boundary() {
        let mesh = grid_mesh(3).unwrap();
        let reference = poly_ref(0, 0);

        let (inside, over) = mesh
            .closest_point_on_poly(reference, Vec3::new(0.5, 3.0, 0.5))
            .unwrap();
        assert!(over);
        assert!((inside - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-5);

        let (clamped, over) = mesh
            .closest_point_on_poly(reference, Vec3::new(-2.0, 0.0, 0.5))
            .unwrap();
        assert!(!over);
        assert!((clamped - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn poly_height_interpolates_inside_only() {
        let mesh = grid_mesh(3).unwrap();
        let reference = poly_ref(0, 4);
        let h = mesh
            .poly_height(reference, Vec3::new(1.5, 7.0, 1.5))
            .unwrap();
        assert_eq!(h, Some(0.0));
        let outside = mesh
            .poly_height(reference, Vec3::new(10.0, 0.0, 10.0))
            .unwrap();
        assert_eq!(outside, None);
    }

    #[test]
    fn poly_flags_reports_baked_flags() {
        let mesh = grid_mesh(3).unwrap();
        assert_eq!(mesh.poly_flags(poly_ref(0, 0)).unwrap(), PolyFlags::WALK);
        assert!(mesh.poly_flags(PolyRef::encode(1, 0, 99)).is_err());
    }

    #[test]
    fn params_round_trip() {
        let params = NavMeshParams {
            origin: Vec3::new(-400.0, 0.0, -400.0),
            tile_width: 533.3,
            tile_height: 533.3,
            max_tiles: 128,
            max_polys_per_tile: 1 << 15,
        };
        let mesh = NavMesh::new(params).unwrap();
        assert_eq!(*mesh.params(), params);
    }
}
