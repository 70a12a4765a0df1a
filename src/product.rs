//! Stable product identifiers.
//!
//! The identifier names the per-product cache entries of the viewer, so it
//! must not depend on where the product file is located.

use std::path::Path;

/// Descriptive metadata of an opened product.
pub trait ProductDescription {
    /// Short name of the driver that decoded the product (e.g. `GTiff`).
    fn driver_name(&self) -> String;

    /// Dataset description, usually the path or subdataset name.
    fn description(&self) -> String;

    /// Item of the default metadata domain.
    fn metadata_item(&self, key: &str) -> Option<String>;

    /// Identifier of the product, see [`product_id`].
    fn product_id(&self) -> String {
        product_id(self)
    }
}

/// Compute a unique identifier for a product.
///
/// * `SAR_CEOS`: `<CEOS_SOFTWARE_ID>-<CEOS_ACQUISITION_TIME>`
/// * `ESAT`: the `MPH_PRODUCT` name without extension
/// * `HDF5*`: `<file name>_<hdf5 path>` for subdataset descriptions
///
/// Any other product, and products lacking the metadata above, are
/// identified by the file name of their description.
pub fn product_id<P: ProductDescription + ?Sized>(product: &P) -> String {
    let driver_name = product.driver_name();
    let description = product.description();
    log::debug!("driver_name = {driver_name}");

    let id = match driver_name.as_str() {
        "SAR_CEOS" => {
            let software = product.metadata_item("CEOS_SOFTWARE_ID");
            let acquisition = product.metadata_item("CEOS_ACQUISITION_TIME");
            match (software, acquisition) {
                (Some(software), Some(acquisition)) => {
                    format!("{}-{}", software.trim(), acquisition.trim())
                }
                _ => basename(&description),
            }
        }
        "ESAT" => match product.metadata_item("MPH_PRODUCT") {
            Some(name) => strip_extension(name.trim()),
            None => basename(&description),
        },
        name if name.starts_with("HDF5") => hdf5_id(&description),
        _ => basename(&description),
    };

    log::debug!("prod_id = {id}");
    id
}

/// `HDF5:"file":/path` subdataset names; a Windows drive letter adds one
/// more `:` separated part.
fn hdf5_id(description: &str) -> String {
    let parts: Vec<&str> = description.split(':').collect();
    let (filename, h5path) = match parts.as_slice() {
        [_, drive, file, path] => (format!("{drive}:{file}"), *path),
        [_, file, path] => (file.to_string(), *path),
        _ => return basename(description),
    };
    let filename = basename(filename.trim_matches('"'));
    format!("{}_{}", filename, h5path.replace("//", "/"))
}

fn basename(path: &str) -> String {
    let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    if name.is_empty() {
        path.to_string()
    } else {
        name.to_string()
    }
}

fn strip_extension(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}
