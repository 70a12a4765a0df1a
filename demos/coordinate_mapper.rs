use gsdview::{
    coordinate_mapper, BandInfo, CoordinateMapping, DatasetInfo, Gcp, MapperOptions,
    OverviewSource, ProductDescription,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    // Two slices of a SAR product, GCP line numbers restart in each slice.
    let mut gcps = Vec::new();
    for slice in 0..2 {
        for local_line in [0.0, 500.0, 1000.0, 1500.0] {
            let line = local_line + 2000.0 * slice as f64;
            for pixel in [0.0, 1000.0, 2000.0, 3000.0] {
                let lat = 44.0 - line * 1e-4 + pixel * 2e-5;
                let lon = 11.0 + pixel * 1.2e-4 + line * 3e-5;
                gcps.push(Gcp::new(local_line, pixel, lon, lat));
            }
        }
    }
    let info = DatasetInfo::new(3000, 4000)
        .with_gcps(gcps, "EPSG:4326")
        .with_driver("GTiff", "/data/sar/slices.tif");
    println!("product id: {}", info.product_id());

    let mapper = coordinate_mapper(&info).unwrap().unwrap();
    let lines = [0.0, 2000.0, 3999.0];
    let pixels = [0.0, 1500.0, 2999.0];
    let (lats, lons) = mapper.img_to_geo_grid(&lines, &pixels).unwrap();
    for (i, line) in lines.iter().enumerate() {
        for (j, pixel) in pixels.iter().enumerate() {
            println!(
                "line {line:7.1} pixel {pixel:7.1} -> lat {:.6} lon {:.6}",
                lats[[i, j]],
                lons[[i, j]]
            );
        }
    }

    let band = BandInfo::new(3000, 4000).with_overview_levels(&[2, 4, 8, 16]);
    let options = MapperOptions::default().preview_bytes(512 * 1024);
    match band.preview_overview_index(&options) {
        Ok(index) => println!("preview overview: {index}"),
        Err(err) => println!("preview overview: {err}"),
    }
}
