//! Image conversion to web-optimized formats
//!
//! Decodes a source raster, optionally shrinks it to a target width and
//! re-encodes it as WebP or AVIF for responsive delivery.

pub mod mock;
pub mod processor;

pub use mock::MockImageConverter;
pub use processor::{scaled_dimensions, CodecConverter};

use crate::models::OutputFormat;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything needed to produce one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub quality: u8,
    pub width: Option<u32>,
}

#[async_trait]
pub trait ImageConverter: Send + Sync {
    /// Write `request.output` and return its size on disk in bytes.
    async fn convert(&self, request: &ConversionRequest) -> Result<u64>;
}
