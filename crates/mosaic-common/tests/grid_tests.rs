//! Tile grid planning tests: snapping, caps, cell placement.

use mosaic_common::tile::{DEFAULT_ARCHIVE_MAX_TILES, DEFAULT_MAX_TILES, DEFAULT_TILE_SIZE_PX};
use mosaic_common::{MosaicError, PlanarBoundingBox, SnapMode, TileGridPlanner, ZoomLevel};
use test_utils::assert_approx_eq;

fn zoom(z: u32) -> ZoomLevel {
    ZoomLevel::new(z).unwrap()
}

/// A bbox spanning `cols` x `rows` tile extents from the origin, with the
/// maximum corner pulled half a tile inward.
fn bbox_spanning(z: u32, cols: f64, rows: f64) -> PlanarBoundingBox {
    let extent = zoom(z).tile_extent(DEFAULT_TILE_SIZE_PX);
    PlanarBoundingBox::new(
        extent * 0.25,
        extent * 0.25,
        extent * (cols - 0.5),
        extent * (rows - 0.5),
    )
}

// ============================================================================
// Resolution tests
// ============================================================================

#[test]
fn test_zoom_zero_resolution() {
    let z0 = zoom(0);
    assert_approx_eq!(z0.meters_per_pixel(), 156543.03, 1e-9);
    assert_approx_eq!(z0.tile_extent(256), 40075015.68, 1e-6);
}

#[test]
fn test_tile_extent_halves_for_every_zoom() {
    for z in 0..22 {
        let here = zoom(z).tile_extent(DEFAULT_TILE_SIZE_PX);
        let next = zoom(z + 1).tile_extent(DEFAULT_TILE_SIZE_PX);
        assert_approx_eq!(next, here / 2.0, 1e-9);
    }
}

#[test]
fn test_zoom_above_limit_rejected() {
    assert!(matches!(ZoomLevel::new(40), Err(MosaicError::InvalidInput(_))));
}

// ============================================================================
// Snapping tests
// ============================================================================

#[test]
fn test_snapping_is_idempotent() {
    let planners = [TileGridPlanner::mosaic(), TileGridPlanner::archival()];
    let boxes = [
        PlanarBoundingBox::new(7569725.0, 669141.0, 10909310.0, 4300621.0),
        PlanarBoundingBox::new(-1234567.8, -7654321.0, 2345678.9, -12345.6),
        PlanarBoundingBox::new(1.0, 1.0, 2.0, 2.0),
    ];

    for planner in &planners {
        for z in [3, 5, 8] {
            for bbox in &boxes {
                let once = planner.snap(bbox, zoom(z)).unwrap();
                let twice = planner.snap(&once, zoom(z)).unwrap();
                assert_eq!(once, twice, "zoom {} bbox {:?}", z, bbox);
            }
        }
    }
}

#[test]
fn test_snapped_bbox_contains_request() {
    let bbox = PlanarBoundingBox::new(7569725.0, 669141.0, 10909310.0, 4300621.0);
    let snapped = TileGridPlanner::mosaic().snap(&bbox, zoom(5)).unwrap();

    assert!(snapped.min_x <= bbox.min_x);
    assert!(snapped.min_y <= bbox.min_y);
    assert!(snapped.max_x >= bbox.max_x);
    assert!(snapped.max_y >= bbox.max_y);
}

#[test]
fn test_snap_modes_cover_same_extent_for_ordinary_bbox() {
    let bbox = PlanarBoundingBox::new(7569725.0, 669141.0, 10909310.0, 4300621.0);
    let floor = TileGridPlanner::mosaic().plan(&bbox, zoom(6)).unwrap();
    let symmetric = TileGridPlanner::archival().plan(&bbox, zoom(6)).unwrap();

    assert_eq!(floor.cols, symmetric.cols);
    assert_eq!(floor.rows, symmetric.rows);
    assert_eq!(floor.bounds(), symmetric.bounds());
}

#[test]
fn test_planner_modes() {
    assert_eq!(TileGridPlanner::mosaic().snap_mode, SnapMode::FloorOrigin);
    assert_eq!(TileGridPlanner::mosaic().max_tiles, Some(DEFAULT_MAX_TILES));
    assert_eq!(TileGridPlanner::archival().snap_mode, SnapMode::Symmetric);
    assert_eq!(
        TileGridPlanner::archival().max_tiles,
        Some(DEFAULT_ARCHIVE_MAX_TILES)
    );
}

#[test]
fn test_bbox_on_grid_lines_does_not_grow() {
    let extent = zoom(4).tile_extent(DEFAULT_TILE_SIZE_PX);
    let bbox = PlanarBoundingBox::new(extent, extent * 2.0, extent * 3.0, extent * 5.0);

    let grid = TileGridPlanner::mosaic().plan(&bbox, zoom(4)).unwrap();
    assert_eq!((grid.cols, grid.rows), (2, 3));
}

#[test]
fn test_degenerate_bbox_rejected() {
    let bbox = PlanarBoundingBox::new(10.0, 10.0, 10.0, 20.0);
    let err = TileGridPlanner::mosaic().plan(&bbox, zoom(3)).unwrap_err();
    assert!(matches!(err, MosaicError::InvalidInput(_)));
}

// ============================================================================
// Tile cap tests
// ============================================================================

#[test]
fn test_exactly_400_tiles_allowed() {
    let grid = TileGridPlanner::mosaic()
        .plan(&bbox_spanning(5, 20.0, 20.0), zoom(5))
        .unwrap();
    assert_eq!(grid.tile_count(), 400);
    assert_eq!(grid.cells.len(), 400);
}

#[test]
fn test_401_tiles_rejected() {
    let err = TileGridPlanner::mosaic()
        .plan(&bbox_spanning(5, 401.0, 1.0), zoom(5))
        .unwrap_err();

    match err {
        MosaicError::TooManyTiles { requested, limit } => {
            assert_eq!(requested, 401);
            assert_eq!(limit, 400);
        }
        other => panic!("expected TooManyTiles, got {:?}", other),
    }
}

#[test]
fn test_archival_planner_exceeds_mosaic_cap() {
    let grid = TileGridPlanner::archival()
        .plan(&bbox_spanning(5, 30.0, 30.0), zoom(5))
        .unwrap();
    assert_eq!(grid.tile_count(), 900);
}

#[test]
fn test_archival_full_disk_at_high_zoom_rejected() {
    let full_disk = PlanarBoundingBox::new(-21_000_000.0, -21_000_000.0, 21_000_000.0, 21_000_000.0);

    let err = TileGridPlanner::archival()
        .plan(&full_disk, zoom(16))
        .unwrap_err();
    match err {
        MosaicError::TooManyTiles { requested, limit } => {
            assert!(requested > 4_000_000_000);
            assert_eq!(limit, DEFAULT_ARCHIVE_MAX_TILES);
        }
        other => panic!("expected TooManyTiles, got {:?}", other),
    }

    let grid = TileGridPlanner::archival().plan(&full_disk, zoom(5)).unwrap();
    assert_eq!((grid.cols, grid.rows), (34, 34));
}

#[test]
fn test_custom_cap() {
    let planner = TileGridPlanner::mosaic().with_max_tiles(Some(4));
    assert!(planner.plan(&bbox_spanning(5, 2.0, 2.0), zoom(5)).is_ok());
    assert!(planner.plan(&bbox_spanning(5, 3.0, 2.0), zoom(5)).is_err());
}

// ============================================================================
// Cell placement tests
// ============================================================================

#[test]
fn test_cells_are_row_major_from_origin() {
    let grid = TileGridPlanner::mosaic()
        .plan(&bbox_spanning(5, 3.0, 2.0), zoom(5))
        .unwrap();

    let positions: Vec<(u32, u32)> = grid.cells.iter().map(|c| (c.col, c.row)).collect();
    assert_eq!(
        positions,
        vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
    );
}

#[test]
fn test_cell_bbox_offsets() {
    let grid = TileGridPlanner::mosaic()
        .plan(&bbox_spanning(7, 4.0, 3.0), zoom(7))
        .unwrap();

    for cell in &grid.cells {
        let expected_x = grid.origin_x + f64::from(cell.col) * grid.tile_extent;
        let expected_y = grid.origin_y + f64::from(cell.row) * grid.tile_extent;
        assert_approx_eq!(cell.bbox.min_x, expected_x, 1e-6);
        assert_approx_eq!(cell.bbox.min_y, expected_y, 1e-6);
        assert_approx_eq!(cell.bbox.width(), grid.tile_extent, 1e-6);
        assert_approx_eq!(cell.bbox.height(), grid.tile_extent, 1e-6);
    }
}

#[test]
fn test_grid_bounds_match_last_cell() {
    let grid = TileGridPlanner::mosaic()
        .plan(&bbox_spanning(6, 5.0, 4.0), zoom(6))
        .unwrap();
    let last = grid.cells.last().unwrap();
    let bounds = grid.bounds();

    assert_approx_eq!(bounds.max_x, last.bbox.max_x, 1e-6);
    assert_approx_eq!(bounds.max_y, last.bbox.max_y, 1e-6);
}

#[test]
fn test_cell_wms_string_is_comma_joined() {
    let bbox = PlanarBoundingBox::new(-10.5, 0.0, 20.0, 30.25);
    assert_eq!(bbox.to_wms_string(), "-10.5,0,20,30.25");
}
