//! Overview (pyramid level) selection.
//!
//! A level is the integer decimation factor between a full resolution band
//! and one of its reduced resolution overviews.

use crate::errors::{GeoError, Result};
use crate::options::MapperOptions;

/// About 100 KByte, i.e. a 320x320 byte preview.
pub const DEFAULT_PREVIEW_BYTES: u64 = 100 * 1024;

/// Adjust an overview level to the one GDAL would actually produce.
///
/// Same arithmetic as `GDALOvLevelAdjust`: the width of the overview is
/// computed with integer ceil division, and the effective level is derived
/// back from it.
///
/// ```
/// use gsdview::raster::overview::adjust_level;
///
/// assert_eq!(adjust_level(3, 1000), 3);
/// assert_eq!(adjust_level(7, 100), 7);
/// ```
pub fn adjust_level(level: u32, full_width: usize) -> u32 {
    let level = level.max(1) as usize;
    if full_width == 0 {
        return level as u32;
    }
    let overview_width = (full_width + level - 1) / level;
    (full_width as f64 / overview_width as f64).round() as u32
}

/// Overview level whose byte size fits `byte_budget`.
///
/// Previews are always converted to 8 bit, so one byte per pixel is assumed
/// regardless of the band data type.
pub fn compute_level(width: usize, height: usize, byte_budget: u64) -> u32 {
    let bytes_per_pixel = 1.0;
    let dataset_size = width as f64 * height as f64 * bytes_per_pixel;
    let level = (dataset_size / byte_budget.max(1) as f64).sqrt().round().max(1.0);
    adjust_level(level as u32, width)
}

/// Adjusted levels of overviews with the given widths, in overview order.
pub fn available_levels(full_width: usize, overview_widths: &[usize]) -> Vec<u32> {
    overview_widths
        .iter()
        .map(|&width| {
            let level = (full_width as f64 / width.max(1) as f64).round().max(1.0);
            adjust_level(level as u32, full_width)
        })
        .collect()
}

/// Index of the available level closest to `requested`.
///
/// Ties go to the first candidate in `available` order. An empty list is
/// reported as [`GeoError::MissingOverview`] so that callers can decide to
/// build the overview.
pub fn best_level_index(requested: u32, available: &[u32]) -> Result<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, &level) in available.iter().enumerate() {
        let distance = level.abs_diff(requested);
        match best {
            Some((_, min_distance)) if distance >= min_distance => (),
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
        .ok_or(GeoError::MissingOverview { level: requested })
}

/// A raster band with zero or more overviews.
pub trait OverviewSource {
    fn x_size(&self) -> usize;

    fn y_size(&self) -> usize;

    /// Width of every overview, in overview index order.
    fn overview_x_sizes(&self) -> Vec<usize>;

    /// Overview level that fits the `byte_budget` request.
    fn compute_overview_level(&self, byte_budget: u64) -> u32 {
        compute_level(self.x_size(), self.y_size(), byte_budget)
    }

    fn available_overview_levels(&self) -> Vec<u32> {
        available_levels(self.x_size(), &self.overview_x_sizes())
    }

    /// Index of the overview closest to `level`; `None` asks for the level
    /// of a [`DEFAULT_PREVIEW_BYTES`] preview.
    fn best_overview_index(&self, level: Option<u32>) -> Result<usize> {
        let level = level.unwrap_or_else(|| self.compute_overview_level(DEFAULT_PREVIEW_BYTES));
        best_level_index(level, &self.available_overview_levels())
    }

    /// Index of the overview closest to the preview level of `options`.
    fn preview_overview_index(&self, options: &MapperOptions) -> Result<usize> {
        let level = self.compute_overview_level(options.preview_byte_budget());
        log::debug!("preview overview level = {level}");
        best_level_index(level, &self.available_overview_levels())
    }
}

/// Plain-data description of a band and of its overviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandInfo {
    pub width: usize,
    pub height: usize,
    pub overview_widths: Vec<usize>,
}

impl BandInfo {
    pub fn new(width: usize, height: usize) -> Self {
        BandInfo {
            width,
            height,
            overview_widths: Vec::new(),
        }
    }

    /// Add overviews at the given decimation levels, GDAL style.
    pub fn with_overview_levels(mut self, levels: &[usize]) -> Self {
        self.overview_widths.extend(
            levels
                .iter()
                .map(|&level| (self.width + level.max(1) - 1) / level.max(1)),
        );
        self
    }
}

impl OverviewSource for BandInfo {
    fn x_size(&self) -> usize {
        self.width
    }

    fn y_size(&self) -> usize {
        self.height
    }

    fn overview_x_sizes(&self) -> Vec<usize> {
        self.overview_widths.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_level() {
        assert_eq!(adjust_level(3, 1000), 3);
        assert_eq!(adjust_level(7, 100), 7);
        assert_eq!(adjust_level(1, 100), 1);
        // 1000 / ceil(1000 / 300) = 1000 / 4
        assert_eq!(adjust_level(300, 1000), 250);
        assert_eq!(adjust_level(0, 100), 1);
    }

    #[test]
    fn test_compute_level() {
        // sqrt(4096 * 4096 / 102400) = 12.8
        assert_eq!(compute_level(4096, 4096, DEFAULT_PREVIEW_BYTES), 13);
        // smaller than the budget
        assert_eq!(compute_level(100, 100, DEFAULT_PREVIEW_BYTES), 1);
        assert_eq!(compute_level(1000, 1000, 10000), 10);
    }

    #[test]
    fn test_available_levels() {
        assert_eq!(available_levels(1000, &[500, 250, 125]), vec![2, 4, 8]);
        assert_eq!(available_levels(1000, &[334]), vec![3]);
        assert!(available_levels(1000, &[]).is_empty());
    }

    #[test]
    fn test_best_level_index() {
        assert_eq!(best_level_index(5, &[2, 4, 8]).unwrap(), 1);
        assert_eq!(best_level_index(1, &[2, 4, 8]).unwrap(), 0);
        assert_eq!(best_level_index(100, &[2, 4, 8]).unwrap(), 2);
        // tie between 4 and 8: first wins
        assert_eq!(best_level_index(6, &[8, 4]).unwrap(), 0);
        assert_eq!(best_level_index(6, &[4, 8]).unwrap(), 0);
    }

    #[test]
    fn test_missing_overview() {
        match best_level_index(4, &[]) {
            Err(GeoError::MissingOverview { level }) => assert_eq!(level, 4),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_band_overviews() {
        let band = BandInfo::new(4096, 4096).with_overview_levels(&[2, 4, 8, 16]);
        assert_eq!(band.available_overview_levels(), vec![2, 4, 8, 16]);
        // default request is level 13: 16 is closer than 8
        assert_eq!(band.best_overview_index(None).unwrap(), 3);
        assert_eq!(band.best_overview_index(Some(5)).unwrap(), 1);

        let bare = BandInfo::new(4096, 4096);
        assert!(matches!(
            bare.preview_overview_index(&MapperOptions::default()),
            Err(GeoError::MissingOverview { level: 13 })
        ));
        assert!(matches!(
            bare.best_overview_index(None),
            Err(GeoError::MissingOverview { level: 13 })
        ));
    }

    #[test]
    fn test_preview_overview_index() {
        let band = BandInfo::new(4096, 4096).with_overview_levels(&[2, 4, 8, 16]);
        assert_eq!(band.preview_overview_index(&MapperOptions::default()).unwrap(), 3);
        // sqrt(4096 * 4096 / 1048576) = 4
        let options = MapperOptions::default().preview_bytes(1024 * 1024);
        assert_eq!(band.preview_overview_index(&options).unwrap(), 1);
        // budget above the band size: full resolution level, first overview
        let options = MapperOptions::default().preview_bytes(1 << 30);
        assert_eq!(band.preview_overview_index(&options).unwrap(), 0);
    }
}
