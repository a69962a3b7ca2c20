use super::{ConversionRequest, ImageConverter};
use crate::models::OutputFormat;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Deterministic converter that writes fixed-size files without touching a
/// real codec.
#[derive(Clone)]
pub struct MockImageConverter {
    sizes: Arc<Mutex<HashMap<OutputFormat, u64>>>,
    failing_outputs: Arc<Mutex<HashSet<String>>>,
    should_fail: Arc<Mutex<bool>>,
    requests: Arc<Mutex<Vec<ConversionRequest>>>,
}

impl MockImageConverter {
    pub fn new() -> Self {
        let sizes = HashMap::from([(OutputFormat::WebP, 4000), (OutputFormat::Avif, 2500)]);

        Self {
            sizes: Arc::new(Mutex::new(sizes)),
            failing_outputs: Arc::new(Mutex::new(HashSet::new())),
            should_fail: Arc::new(Mutex::new(false)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_output_size(self, format: OutputFormat, bytes: u64) -> Self {
        self.sizes.lock().unwrap().insert(format, bytes);
        self
    }

    /// Fail only conversions whose output file is named `output_name`.
    pub fn with_failing_output(self, output_name: &str) -> Self {
        self.failing_outputs
            .lock()
            .unwrap()
            .insert(output_name.to_string());
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<ConversionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn should_fail_for(&self, request: &ConversionRequest) -> bool {
        if *self.should_fail.lock().unwrap() {
            return true;
        }

        let output_name = request
            .output
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        self.failing_outputs.lock().unwrap().contains(&output_name)
    }
}

impl Default for MockImageConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageConverter for MockImageConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<u64> {
        self.requests.lock().unwrap().push(request.clone());

        if self.should_fail_for(request) {
            return Err(Error::Encode("Mock failure".to_string()));
        }

        let size = self
            .sizes
            .lock()
            .unwrap()
            .get(&request.format)
            .copied()
            .unwrap_or(0);

        let fill = match request.format {
            OutputFormat::WebP => b'W',
            OutputFormat::Avif => b'A',
        };
        tokio::fs::write(&request.output, vec![fill; size as usize]).await?;

        Ok(tokio::fs::metadata(&request.output).await?.len())
    }
}
