use gsdview::errors::GeoError;
use gsdview::{
    coordinate_mapper, coordinate_mapper_with_options, BandInfo, CoordinateMapper, CoordinateMapping,
    DatasetInfo, Gcp, GeoTransformEx, MapperOptions, OverviewSource, ProductDescription,
};

fn assert_close(a: f64, b: f64, tolerance: f64) {
    assert!((a - b).abs() < tolerance, "{a} != {b}");
}

/// A rotated geographic grid, GCPs sampled from the same geo-transform.
fn rotated_geo_transform() -> [f64; 6] {
    [12.0, 0.001, 0.0002, 42.0, 0.0003, -0.001]
}

fn gcp_dataset() -> DatasetInfo {
    let geo_transform = rotated_geo_transform();
    let mut gcps = Vec::new();
    for line in (0..=1000).step_by(100) {
        for pixel in (0..=800).step_by(100) {
            let (lon, lat) = geo_transform.apply(pixel as f64, line as f64);
            gcps.push(Gcp::new(line as f64, pixel as f64, lon, lat).with_id(format!("{line}-{pixel}")));
        }
    }
    DatasetInfo::new(800, 1000).with_gcps(gcps, "EPSG:4326")
}

fn affine_dataset() -> DatasetInfo {
    DatasetInfo::new(800, 1000)
        .with_geo_transform(rotated_geo_transform())
        .with_projection("EPSG:4326")
}

#[test]
fn test_affine_and_grid_mappers_agree() {
    let affine = coordinate_mapper(&affine_dataset()).unwrap().unwrap();
    let grid = coordinate_mapper(&gcp_dataset()).unwrap().unwrap();
    assert!(matches!(affine, CoordinateMapper::Affine(_)));
    assert!(matches!(grid, CoordinateMapper::GridSurface(_)));

    let lines = [0.0, 13.5, 499.0, 1000.0];
    let pixels = [0.0, 77.7, 400.0, 800.0];
    let (affine_lats, affine_lons) = affine.img_to_geo_grid(&lines, &pixels).unwrap();
    let (grid_lats, grid_lons) = grid.img_to_geo_grid(&lines, &pixels).unwrap();
    assert_eq!(affine_lats.dim(), (4, 4));
    assert_eq!(grid_lats.dim(), (4, 4));
    for (a, g) in affine_lats.iter().zip(grid_lats.iter()) {
        assert_close(*a, *g, 1e-9);
    }
    for (a, g) in affine_lons.iter().zip(grid_lons.iter()) {
        assert_close(*a, *g, 1e-9);
    }
}

#[test]
fn test_round_trip() {
    let lines = [10.0, 250.0, 990.0];
    let pixels = [5.0, 640.0, 799.0];
    for info in [affine_dataset(), gcp_dataset()] {
        let mapper = coordinate_mapper(&info).unwrap().unwrap();
        let (lats, lons) = mapper.img_to_geo_points(&lines, &pixels).unwrap();
        let (back_lines, back_pixels) = mapper.geo_to_img_points(&lats, &lons).unwrap();
        for k in 0..lines.len() {
            assert_close(back_lines[k], lines[k], 1e-6);
            assert_close(back_pixels[k], pixels[k], 1e-6);
        }
    }
}

#[test]
fn test_geo_to_img_grid_layout() {
    let mapper = coordinate_mapper(&affine_dataset()).unwrap().unwrap();
    let lats = [41.5, 41.8];
    let lons = [12.1, 12.2, 12.3];
    let (lines, pixels) = mapper.geo_to_img_grid(&lats, &lons).unwrap();
    assert_eq!(lines.dim(), (3, 2));
    let (point_lines, point_pixels) = mapper.geo_to_img_points(&[lats[1]], &[lons[2]]).unwrap();
    assert_close(lines[[2, 1]], point_lines[0], 1e-9);
    assert_close(pixels[[2, 1]], point_pixels[0], 1e-9);
}

#[test]
fn test_mappers_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CoordinateMapper>();

    let mapper = coordinate_mapper(&gcp_dataset()).unwrap().unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|k| {
                let mapper = &mapper;
                scope.spawn(move || mapper.img_to_geo_points(&[k as f64 * 100.0], &[0.0]).unwrap())
            })
            .collect();
        for handle in handles {
            let (lats, _) = handle.join().unwrap();
            assert_eq!(lats.len(), 1);
        }
    });
}

#[test]
fn test_unknown_geographic_cs() {
    let info = DatasetInfo::new(10, 10)
        .with_geo_transform([500000.0, 30.0, 0.0, 30000.0, 0.0, -30.0])
        .with_projection("EPSG:32633");
    let options = MapperOptions::default().geog_cs_name("Mars2000");
    assert!(matches!(
        coordinate_mapper_with_options(&info, &options),
        Err(GeoError::InvalidSpatialRef { .. })
    ));
}

#[test]
fn test_preview_overview() {
    let band = BandInfo::new(8000, 6000).with_overview_levels(&[2, 4, 8, 16, 32]);
    // sqrt(8000 * 6000 / 102400) = 21.65
    assert_eq!(band.compute_overview_level(MapperOptions::default().preview_byte_budget()), 22);
    assert_eq!(band.best_overview_index(None).unwrap(), 3);
    assert_eq!(band.preview_overview_index(&MapperOptions::default()).unwrap(), 3);
    // sqrt(8000 * 6000 / 3000000) = 4
    let options = MapperOptions::default().preview_bytes(3_000_000);
    assert_eq!(band.preview_overview_index(&options).unwrap(), 1);
}

#[test]
fn test_product_id() {
    let info = gcp_dataset().with_driver("GTiff", "/archive/2008/ASAR_scene.tif");
    assert_eq!(info.product_id(), "ASAR_scene.tif");
}
