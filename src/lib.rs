//! Batch optimizer for static web image assets
//!
//! Converts a fixed catalog of raster images (backgrounds, logos, icons) to
//! WebP and AVIF, generates responsive width variants, and reports the size
//! savings against the originals.

pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod report;
pub mod summary;

pub use error::{Error, Result};
