use std::ffi::CString;
use std::path::Path;
use std::ptr;

use gdal_sys::{CPLErr, GDALDatasetH, GDALMajorObjectH};
use libc::c_int;

use crate::errors::Result;
use crate::gcp::Gcp;
use crate::gdal::band::GdalBand;
use crate::gdal::utils::{
    _last_null_pointer_err, _opt_string, _path_to_c_string, _register_drivers, _string,
    _wkt_to_proj4,
};
use crate::geo_transform::GeoTransform;
use crate::product::ProductDescription;
use crate::source::GeoreferencedSource;

/// A GDAL raster dataset opened read-only.
///
/// Projections are reported as PROJ.4 definitions when OSR can convert the
/// WKT returned by the driver, as raw WKT otherwise.
#[derive(Debug)]
pub struct GdalDataset {
    c_dataset: GDALDatasetH,
}

// GDAL dataset handles can be moved between threads, not shared.
unsafe impl Send for GdalDataset {}

impl GdalDataset {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<GdalDataset> {
        _register_drivers();
        let c_filename = _path_to_c_string(path.as_ref())?;
        let c_open_flags = gdal_sys::GDAL_OF_READONLY | gdal_sys::GDAL_OF_RASTER;
        let c_dataset = unsafe {
            gdal_sys::GDALOpenEx(
                c_filename.as_ptr(),
                c_open_flags,
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        if c_dataset.is_null() {
            return Err(_last_null_pointer_err("GDALOpenEx"));
        }
        log::debug!("opened {}", path.as_ref().display());
        Ok(GdalDataset { c_dataset })
    }

    /// Creates a new dataset by wrapping a C pointer, taking ownership.
    ///
    /// # Safety
    /// `c_dataset` must be a valid dataset handle not owned elsewhere.
    pub unsafe fn from_c_dataset(c_dataset: GDALDatasetH) -> GdalDataset {
        GdalDataset { c_dataset }
    }

    pub fn c_dataset(&self) -> GDALDatasetH {
        self.c_dataset
    }

    pub fn raster_count(&self) -> usize {
        (unsafe { gdal_sys::GDALGetRasterCount(self.c_dataset) }) as usize
    }

    /// Band `band_index`, counting from 1.
    pub fn rasterband(&self, band_index: usize) -> Result<GdalBand<'_>> {
        unsafe {
            let c_band = gdal_sys::GDALGetRasterBand(self.c_dataset, band_index as c_int);
            if c_band.is_null() {
                return Err(_last_null_pointer_err("GDALGetRasterBand"));
            }
            Ok(GdalBand::from_c_rasterband(self, c_band))
        }
    }

    fn major_object(&self) -> GDALMajorObjectH {
        self.c_dataset
    }

    fn spatial_ref_definition(wkt: Option<String>) -> Option<String> {
        let wkt = wkt?;
        match _wkt_to_proj4(&wkt) {
            Some(proj4) => Some(proj4),
            None => {
                log::warn!("unable to convert projection to PROJ.4, keeping WKT");
                Some(wkt)
            }
        }
    }
}

impl Drop for GdalDataset {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALClose(self.c_dataset);
        }
    }
}

impl GeoreferencedSource for GdalDataset {
    fn raster_size(&self) -> (usize, usize) {
        let size_x = unsafe { gdal_sys::GDALGetRasterXSize(self.c_dataset) } as usize;
        let size_y = unsafe { gdal_sys::GDALGetRasterYSize(self.c_dataset) } as usize;
        (size_x, size_y)
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        let mut transformation = GeoTransform::default();
        let rv =
            unsafe { gdal_sys::GDALGetGeoTransform(self.c_dataset, transformation.as_mut_ptr()) };
        if rv != CPLErr::CE_None {
            unsafe { gdal_sys::CPLErrorReset() };
            return None;
        }
        Some(transformation)
    }

    fn projection(&self) -> Option<String> {
        let wkt = _opt_string(unsafe { gdal_sys::GDALGetProjectionRef(self.c_dataset) });
        Self::spatial_ref_definition(wkt)
    }

    fn gcps(&self) -> Vec<Gcp> {
        unsafe {
            let count = self.gcp_count();
            let c_gcps = gdal_sys::GDALGetGCPs(self.c_dataset);
            if c_gcps.is_null() {
                return Vec::new();
            }
            (0..count)
                .map(|i| {
                    let c_gcp = &*c_gcps.add(i);
                    let mut gcp = Gcp::new(c_gcp.dfGCPLine, c_gcp.dfGCPPixel, c_gcp.dfGCPX, c_gcp.dfGCPY)
                        .with_elevation(c_gcp.dfGCPZ);
                    if !c_gcp.pszId.is_null() {
                        gcp.id = _string(c_gcp.pszId);
                    }
                    gcp.info = _opt_string(c_gcp.pszInfo);
                    gcp
                })
                .collect()
        }
    }

    fn gcp_projection(&self) -> Option<String> {
        let wkt = _opt_string(unsafe { gdal_sys::GDALGetGCPProjection(self.c_dataset) });
        Self::spatial_ref_definition(wkt)
    }

    fn gcp_count(&self) -> usize {
        (unsafe { gdal_sys::GDALGetGCPCount(self.c_dataset) }).max(0) as usize
    }
}

impl ProductDescription for GdalDataset {
    fn driver_name(&self) -> String {
        unsafe {
            let c_driver = gdal_sys::GDALGetDatasetDriver(self.c_dataset);
            if c_driver.is_null() {
                return String::new();
            }
            _opt_string(gdal_sys::GDALGetDriverShortName(c_driver)).unwrap_or_default()
        }
    }

    fn description(&self) -> String {
        _opt_string(unsafe { gdal_sys::GDALGetDescription(self.major_object()) }).unwrap_or_default()
    }

    fn metadata_item(&self, key: &str) -> Option<String> {
        let c_key = CString::new(key).ok()?;
        let c_res = unsafe {
            gdal_sys::GDALGetMetadataItem(self.major_object(), c_key.as_ptr(), ptr::null())
        };
        _opt_string(c_res)
    }
}
