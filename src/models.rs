//! Data models and structures
//!
//! Defines the conversion catalog (jobs, standard outputs, responsive
//! variants) and the output specs derived from it.

use std::fmt;
use std::path::Path;

/// Target codec for a converted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    WebP,
    Avif,
}

/// Formats produced for every responsive width, in output order.
pub const RESPONSIVE_FORMATS: [OutputFormat; 2] = [OutputFormat::WebP, OutputFormat::Avif];

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    /// Quality used for responsive variants, independent of the job's own
    /// standard output qualities.
    pub fn responsive_quality(&self) -> u8 {
        match self {
            Self::WebP => 80,
            Self::Avif => 50,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Full-resolution re-encode of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardOutput {
    pub format: OutputFormat,
    pub quality: u8,
    pub suffix: String,
}

impl StandardOutput {
    pub fn new(format: OutputFormat, quality: u8, suffix: &str) -> Self {
        Self {
            format,
            quality,
            suffix: suffix.to_string(),
        }
    }
}

/// Resized copy at a target width, produced in every responsive format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveVariant {
    pub width: u32,
    pub suffix: String,
}

impl ResponsiveVariant {
    pub fn new(width: u32, suffix: &str) -> Self {
        Self {
            width,
            suffix: suffix.to_string(),
        }
    }
}

/// One fully expanded output: what to encode and how to name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub format: OutputFormat,
    pub quality: u8,
    pub suffix: String,
    pub width: Option<u32>,
}

impl OutputSpec {
    pub fn file_name(&self, base_name: &str) -> String {
        output_file_name(base_name, &self.suffix, self.format)
    }
}

/// `{base}{suffix}.{ext}`, the naming rule for every output.
pub fn output_file_name(base_name: &str, suffix: &str, format: OutputFormat) -> String {
    format!("{}{}.{}", base_name, suffix, format.extension())
}

/// A source image and the outputs wanted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub source: String,
    pub outputs: Vec<StandardOutput>,
    pub responsive: Option<Vec<ResponsiveVariant>>,
}

impl ConversionJob {
    pub fn new(source: &str, outputs: Vec<StandardOutput>) -> Self {
        Self {
            source: source.to_string(),
            outputs,
            responsive: None,
        }
    }

    pub fn with_responsive(mut self, variants: Vec<ResponsiveVariant>) -> Self {
        self.responsive = Some(variants);
        self
    }

    /// Source file name without its extension.
    pub fn base_name(&self) -> &str {
        Path::new(&self.source)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.source)
    }

    pub fn standard_specs(&self) -> Vec<OutputSpec> {
        self.outputs
            .iter()
            .map(|output| OutputSpec {
                format: output.format,
                quality: output.quality,
                suffix: output.suffix.clone(),
                width: None,
            })
            .collect()
    }

    /// Every responsive width expanded into both formats at their fixed
    /// qualities. Empty when the job has no responsive variants.
    pub fn responsive_specs(&self) -> Vec<OutputSpec> {
        let Some(variants) = &self.responsive else {
            return Vec::new();
        };

        variants
            .iter()
            .flat_map(|variant| {
                RESPONSIVE_FORMATS.iter().map(move |format| OutputSpec {
                    format: *format,
                    quality: format.responsive_quality(),
                    suffix: variant.suffix.clone(),
                    width: Some(variant.width),
                })
            })
            .collect()
    }
}

/// Outcome of a single successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub output_name: String,
    pub byte_size: u64,
}

/// Immutable table of jobs driven in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub name: String,
    pub jobs: Vec<ConversionJob>,
}

impl Catalog {
    pub fn new(name: &str, jobs: Vec<ConversionJob>) -> Self {
        Self {
            name: name.to_string(),
            jobs,
        }
    }

    /// The shipped asset table: auth background, logo and mascot icon.
    pub fn bundled() -> Self {
        use OutputFormat::{Avif, WebP};

        Self::new(
            "Fiutami",
            vec![
                ConversionJob::new(
                    "auth-bg.png",
                    vec![
                        StandardOutput::new(WebP, 80, ""),
                        StandardOutput::new(Avif, 50, ""),
                    ],
                )
                .with_responsive(vec![
                    ResponsiveVariant::new(480, "-480w"),
                    ResponsiveVariant::new(768, "-768w"),
                    ResponsiveVariant::new(1280, "-1280w"),
                    ResponsiveVariant::new(1920, "-1920w"),
                ]),
                ConversionJob::new(
                    "logo-fiutami.png",
                    vec![
                        StandardOutput::new(WebP, 90, ""),
                        StandardOutput::new(Avif, 60, ""),
                    ],
                ),
                ConversionJob::new(
                    "mascot-icon.png",
                    vec![
                        StandardOutput::new(WebP, 85, ""),
                        StandardOutput::new(Avif, 55, ""),
                    ],
                ),
            ],
        )
    }
}

/// Totals reported by a driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub jobs_processed: usize,
    pub jobs_skipped: usize,
    pub outputs_written: usize,
    pub outputs_failed: usize,
}
