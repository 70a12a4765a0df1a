use std::marker::PhantomData;

use gdal_sys::GDALRasterBandH;
use libc::c_int;

use crate::gdal::dataset::GdalDataset;
use crate::raster::OverviewSource;

/// A single band of a [`GdalDataset`].
///
/// The band borrows the dataset so that it cannot outlive it.
#[derive(Debug)]
pub struct GdalBand<'a> {
    c_rasterband: GDALRasterBandH,
    phantom: PhantomData<&'a GdalDataset>,
}

impl<'a> GdalBand<'a> {
    /// Create a band from a wrapped C pointer
    ///
    /// # Safety
    /// `c_rasterband` must be a band of `dataset`.
    pub unsafe fn from_c_rasterband(_dataset: &'a GdalDataset, c_rasterband: GDALRasterBandH) -> Self {
        GdalBand {
            c_rasterband,
            phantom: PhantomData,
        }
    }

    pub fn c_rasterband(&self) -> GDALRasterBandH {
        self.c_rasterband
    }

    pub fn overview_count(&self) -> usize {
        (unsafe { gdal_sys::GDALGetOverviewCount(self.c_rasterband) }).max(0) as usize
    }
}

impl OverviewSource for GdalBand<'_> {
    fn x_size(&self) -> usize {
        (unsafe { gdal_sys::GDALGetRasterBandXSize(self.c_rasterband) }) as usize
    }

    fn y_size(&self) -> usize {
        (unsafe { gdal_sys::GDALGetRasterBandYSize(self.c_rasterband) }) as usize
    }

    /// Inaccessible overviews are reported with width 0, so that indexes
    /// match the GDAL overview indexes.
    fn overview_x_sizes(&self) -> Vec<usize> {
        (0..self.overview_count())
            .map(|index| {
                let c_overview =
                    unsafe { gdal_sys::GDALGetOverview(self.c_rasterband, index as c_int) };
                if c_overview.is_null() {
                    log::warn!("overview {index} is not accessible");
                    return 0;
                }
                (unsafe { gdal_sys::GDALGetRasterBandXSize(c_overview) }) as usize
            })
            .collect()
    }
}
