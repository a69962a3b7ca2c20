//! Application orchestration for converting a catalog of images.

use crate::image::{ConversionRequest, ImageConverter};
use crate::models::{Catalog, ConversionJob, ConversionResult, OutputSpec, RunStats};
use crate::report::Reporter;
use crate::summary::{scan_directory, DirectorySummary};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Images directory used when none is given on the command line.
pub const DEFAULT_IMAGES_DIR: &str = "src/assets/images";

/// Drives conversions for every job in a catalog, then summarizes the
/// images directory.
pub struct App {
    converter: Box<dyn ImageConverter>,
    reporter: Reporter,
    images_dir: PathBuf,
}

impl App {
    pub fn new(converter: Box<dyn ImageConverter>, reporter: Reporter, images_dir: PathBuf) -> Self {
        Self {
            converter,
            reporter,
            images_dir,
        }
    }

    /// Convert every job in `catalog`, then print the directory summary.
    ///
    /// Per-output failures are reported and skipped; only reporting or
    /// directory listing errors abort the run.
    pub async fn run(&mut self, catalog: &Catalog) -> Result<RunStats> {
        info!(
            "Optimizing {} job(s) in {}",
            catalog.jobs.len(),
            self.images_dir.display()
        );

        self.reporter.title(&catalog.name)?;

        let mut stats = RunStats::default();
        for job in &catalog.jobs {
            self.process_job(job, &mut stats).await?;
        }

        self.reporter.complete()?;
        self.summarize()?;

        info!(
            "Finished: {} processed, {} skipped, {} written, {} failed",
            stats.jobs_processed, stats.jobs_skipped, stats.outputs_written, stats.outputs_failed
        );
        Ok(stats)
    }

    /// Scan the images directory and print its summary.
    pub fn summarize(&mut self) -> Result<DirectorySummary> {
        let summary = scan_directory(&self.images_dir)?;
        self.reporter.summary(&summary)?;
        Ok(summary)
    }

    async fn process_job(&mut self, job: &ConversionJob, stats: &mut RunStats) -> Result<()> {
        let source = self.images_dir.join(&job.source);

        if !source.exists() {
            warn!("Source {} not found, skipping", source.display());
            self.reporter.skipped(&job.source)?;
            stats.jobs_skipped += 1;
            return Ok(());
        }

        let source_bytes = fs::metadata(&source)?.len();
        self.reporter.job(&job.source, source_bytes)?;
        stats.jobs_processed += 1;

        let base_name = job.base_name();

        for spec in job.standard_specs() {
            match self.convert(&source, base_name, &spec).await {
                Ok(result) => {
                    stats.outputs_written += 1;
                    self.reporter.standard_output(&result, source_bytes)?;
                }
                Err((output_name, message)) => {
                    stats.outputs_failed += 1;
                    self.reporter
                        .standard_error(&output_name, spec.format, &message)?;
                }
            }
        }

        if job.responsive.is_some() {
            self.reporter.responsive_header()?;

            for spec in job.responsive_specs() {
                match self.convert(&source, base_name, &spec).await {
                    Ok(result) => {
                        stats.outputs_written += 1;
                        self.reporter.responsive_output(&result)?;
                    }
                    Err((output_name, message)) => {
                        stats.outputs_failed += 1;
                        self.reporter.responsive_error(&output_name, &message)?;
                    }
                }
            }
        }

        self.reporter.blank()
    }

    /// Run one conversion, folding any failure into the output name and
    /// message for reporting.
    async fn convert(
        &self,
        source: &Path,
        base_name: &str,
        spec: &OutputSpec,
    ) -> std::result::Result<ConversionResult, (String, String)> {
        let output_name = spec.file_name(base_name);
        let request = ConversionRequest {
            source: source.to_path_buf(),
            output: self.images_dir.join(&output_name),
            format: spec.format,
            quality: spec.quality,
            width: spec.width,
        };

        match self.converter.convert(&request).await {
            Ok(byte_size) => Ok(ConversionResult {
                output_name,
                byte_size,
            }),
            Err(e) => {
                error!("Failed to convert {}: {}", output_name, e);
                Err((output_name, e.to_string()))
            }
        }
    }
}
