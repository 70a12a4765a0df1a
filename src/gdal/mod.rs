//! GDAL backed implementations of the dataset collaborators.
//!
//! ```no_run
//! # fn main() -> gsdview::errors::Result<()> {
//! use gsdview::gdal::GdalDataset;
//! use gsdview::{coordinate_mapper, OverviewSource, ProductDescription};
//!
//! let dataset = GdalDataset::open("/path/to/product.tif")?;
//! println!("product: {}", dataset.product_id());
//! let mapper = coordinate_mapper(&dataset)?;
//! let overview = dataset.rasterband(1)?.best_overview_index(None);
//! # Ok(())
//! # }
//! ```

mod band;
mod dataset;
mod utils;

pub use band::GdalBand;
pub use dataset::GdalDataset;
