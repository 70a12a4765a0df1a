use std::ffi::{CStr, CString};
use std::path::Path;
use std::ptr;
use std::sync::Once;

use libc::c_char;

use crate::errors::{GeoError, Result};

static START: Once = Once::new();

pub fn _register_drivers() {
    START.call_once(|| unsafe {
        gdal_sys::GDALAllRegister();
    });
}

pub fn _string(raw_ptr: *const c_char) -> String {
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

/// Like [`_string`], mapping NULL and empty strings to `None`.
pub fn _opt_string(raw_ptr: *const c_char) -> Option<String> {
    if raw_ptr.is_null() {
        return None;
    }
    Some(_string(raw_ptr)).filter(|s| !s.is_empty())
}

pub fn _last_null_pointer_err(method_name: &'static str) -> GeoError {
    let last_err_msg = _string(unsafe { gdal_sys::CPLGetLastErrorMsg() });
    unsafe { gdal_sys::CPLErrorReset() };
    GeoError::NullPointer {
        method_name,
        msg: last_err_msg,
    }
}

pub fn _path_to_c_string<P: AsRef<Path>>(path: P) -> Result<CString> {
    let path_ref: &Path = path.as_ref();
    let path_str = path_ref.to_string_lossy();
    CString::new(path_str.as_ref()).map_err(Into::into)
}

/// Convert a WKT definition to PROJ.4 through OSR.
///
/// Returns `None` when OSR cannot parse or export the definition.
pub fn _wkt_to_proj4(wkt: &str) -> Option<String> {
    let c_wkt = CString::new(wkt).ok()?;
    unsafe {
        let c_srs = gdal_sys::OSRNewSpatialReference(c_wkt.as_ptr());
        if c_srs.is_null() {
            gdal_sys::CPLErrorReset();
            return None;
        }
        let mut c_proj4: *mut c_char = ptr::null_mut();
        let rv = gdal_sys::OSRExportToProj4(c_srs, &mut c_proj4);
        let proj4 = if rv == gdal_sys::OGRErr::OGRERR_NONE {
            _opt_string(c_proj4)
        } else {
            gdal_sys::CPLErrorReset();
            None
        };
        if !c_proj4.is_null() {
            gdal_sys::VSIFree(c_proj4.cast::<libc::c_void>());
        }
        gdal_sys::OSRDestroySpatialReference(c_srs);
        proj4.map(|s| s.trim().to_string())
    }
}
