//! Console reporting
//!
//! Renders per-output results and the directory summary as plain text lines.
//! Results go to the stdout sink, conversion errors to the stderr sink.

use crate::models::{ConversionResult, OutputFormat};
use crate::summary::DirectorySummary;
use crate::Result;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Round to one decimal place, ties away from zero. `{:.1}` alone rounds
/// exact ties to even.
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Size in KiB with one decimal place.
pub fn format_kib(bytes: u64) -> String {
    format!("{:.1}", round_tenths(bytes as f64 / 1024.0))
}

/// Savings percentage with one decimal place.
pub fn format_savings(output_bytes: u64, source_bytes: u64) -> String {
    format!("{:.1}", round_tenths(savings_percent(output_bytes, source_bytes)))
}

/// Relative size reduction of an output against its source, in percent.
/// An empty source reports no savings.
pub fn savings_percent(output_bytes: u64, source_bytes: u64) -> f64 {
    if source_bytes == 0 {
        return 0.0;
    }
    (1.0 - output_bytes as f64 / source_bytes as f64) * 100.0
}

pub struct Reporter {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self { out, err }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn title(&mut self, catalog_name: &str) -> Result<()> {
        writeln!(self.out, "🖼️  Image Optimization for {}", catalog_name)?;
        self.blank()
    }

    pub fn skipped(&mut self, source: &str) -> Result<()> {
        writeln!(self.out, "⚠️  Skipping {} (not found)", source)?;
        Ok(())
    }

    pub fn job(&mut self, source: &str, source_bytes: u64) -> Result<()> {
        writeln!(self.out, "📁 {} ({} KB)", source, format_kib(source_bytes))?;
        Ok(())
    }

    pub fn standard_output(
        &mut self,
        result: &ConversionResult,
        source_bytes: u64,
    ) -> Result<()> {
        writeln!(
            self.out,
            "  {}: {} KB ({}% smaller)",
            result.output_name,
            format_kib(result.byte_size),
            format_savings(result.byte_size, source_bytes)
        )?;
        Ok(())
    }

    pub fn standard_error(
        &mut self,
        output_name: &str,
        format: OutputFormat,
        message: &str,
    ) -> Result<()> {
        writeln!(
            self.err,
            "  ❌ Error converting {} to {}: {}",
            output_name, format, message
        )?;
        Ok(())
    }

    pub fn responsive_header(&mut self) -> Result<()> {
        writeln!(self.out, "  📐 Responsive versions:")?;
        Ok(())
    }

    pub fn responsive_output(&mut self, result: &ConversionResult) -> Result<()> {
        writeln!(
            self.out,
            "    {}: {} KB",
            result.output_name,
            format_kib(result.byte_size)
        )?;
        Ok(())
    }

    pub fn responsive_error(&mut self, output_name: &str, message: &str) -> Result<()> {
        writeln!(self.err, "    ❌ Error converting {}: {}", output_name, message)?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        writeln!(self.out, "✅ Image optimization complete!")?;
        self.blank()
    }

    pub fn summary(&mut self, summary: &DirectorySummary) -> Result<()> {
        writeln!(self.out, "📊 Summary:")?;
        for entry in &summary.entries {
            writeln!(self.out, "  {}: {} KB", entry.name, format_kib(entry.byte_size))?;
        }

        if summary.total_original > 0 && summary.total_optimized > 0 {
            self.blank()?;
            writeln!(
                self.out,
                "💾 Total original: {} KB",
                format_kib(summary.total_original)
            )?;
            writeln!(
                self.out,
                "💾 Total optimized (all sizes): {} KB",
                format_kib(summary.total_optimized)
            )?;
        }

        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }
}

/// Cloneable in-memory sink; clones share one buffer.
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).to_string()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::SummaryEntry;
    use pretty_assertions::assert_eq;

    fn capture() -> (Reporter, CaptureBuffer, CaptureBuffer) {
        let out = CaptureBuffer::new();
        let err = CaptureBuffer::new();
        let reporter = Reporter::new(Box::new(out.clone()), Box::new(err.clone()));
        (reporter, out, err)
    }

    #[test]
    fn test_format_kib() {
        assert_eq!(format_kib(0), "0.0");
        assert_eq!(format_kib(1024), "1.0");
        assert_eq!(format_kib(10_000), "9.8");
        assert_eq!(format_kib(4000), "3.9");
    }

    #[test]
    fn test_format_kib_rounds_ties_up() {
        assert_eq!(format_kib(256), "0.3");
        assert_eq!(format_kib(1280), "1.3");
        assert_eq!(format_kib(2304), "2.3");
    }

    #[test]
    fn test_format_savings_rounds_ties_away_from_zero() {
        assert_eq!(format_savings(4000, 10_000), "60.0");
        // 1 - 15/16 = 6.25% and 1 - 17/16 = -6.25%, both exact ties.
        assert_eq!(format_savings(15, 16), "6.3");
        assert_eq!(format_savings(17, 16), "-6.3");
        assert_eq!(format_savings(12_000, 10_000), "-20.0");
        assert_eq!(format_savings(100, 0), "0.0");
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(format!("{:.1}", savings_percent(4000, 10_000)), "60.0");
        assert_eq!(format!("{:.1}", savings_percent(2500, 10_000)), "75.0");
        assert_eq!(format!("{:.1}", savings_percent(1, 3)), "66.7");
        assert_eq!(format!("{:.1}", savings_percent(12_000, 10_000)), "-20.0");
        assert_eq!(savings_percent(100, 0), 0.0);
    }

    #[test]
    fn test_job_lines() {
        let (mut reporter, out, err) = capture();

        reporter.job("logo.png", 10_000).unwrap();
        reporter
            .standard_output(
                &ConversionResult {
                    output_name: "logo.webp".to_string(),
                    byte_size: 4000,
                },
                10_000,
            )
            .unwrap();
        reporter
            .standard_error("logo.avif", OutputFormat::Avif, "boom")
            .unwrap();

        assert_eq!(
            out.lines(),
            vec!["📁 logo.png (9.8 KB)", "  logo.webp: 3.9 KB (60.0% smaller)"]
        );
        assert_eq!(err.lines(), vec!["  ❌ Error converting logo.avif to avif: boom"]);
    }

    #[test]
    fn test_summary_omits_totals_when_one_side_empty() {
        let (mut reporter, out, _err) = capture();

        reporter
            .summary(&DirectorySummary {
                entries: vec![SummaryEntry {
                    name: "logo.png".to_string(),
                    byte_size: 2048,
                }],
                total_original: 2048,
                total_optimized: 0,
            })
            .unwrap();

        assert_eq!(out.lines(), vec!["📊 Summary:", "  logo.png: 2.0 KB"]);
    }

    #[test]
    fn test_summary_prints_totals() {
        let (mut reporter, out, _err) = capture();

        reporter
            .summary(&DirectorySummary {
                entries: vec![
                    SummaryEntry {
                        name: "logo.png".to_string(),
                        byte_size: 2048,
                    },
                    SummaryEntry {
                        name: "logo.webp".to_string(),
                        byte_size: 512,
                    },
                ],
                total_original: 2048,
                total_optimized: 512,
            })
            .unwrap();

        assert_eq!(
            out.lines(),
            vec![
                "📊 Summary:",
                "  logo.png: 2.0 KB",
                "  logo.webp: 0.5 KB",
                "",
                "💾 Total original: 2.0 KB",
                "💾 Total optimized (all sizes): 0.5 KB",
            ]
        );
    }
}
