use anyhow::Result;
use metrics::{counter, histogram};
use std::time::Duration;

/// Metrics collection and management
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    // Import pipeline metrics
    pub imports_total: &'static str,
    pub import_records_total: &'static str,
    pub import_failures_total: &'static str,
    pub import_duration: &'static str,

    // Render layer metrics
    pub renders_total: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            imports_total: "pharmacare_imports_total",
            import_records_total: "pharmacare_import_records_total",
            import_failures_total: "pharmacare_import_failures_total",
            import_duration: "pharmacare_import_duration_seconds",

            renders_total: "pharmacare_renders_total",

            errors_total: "pharmacare_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Install the no-op recorder so metric macros have a sink.
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Record a completed import
    pub fn record_import(&self, records: usize, duration: Duration, upload_type: &str) {
        counter!(self.imports_total, "type" => upload_type.to_string()).increment(1);
        counter!(self.import_records_total, "type" => upload_type.to_string())
            .increment(records as u64);
        histogram!(self.import_duration).record(duration.as_secs_f64());
    }

    /// Record an aborted import
    pub fn record_import_failure(&self, upload_type: &str) {
        counter!(self.import_failures_total, "type" => upload_type.to_string()).increment(1);
        counter!(self.errors_total, "type" => "import").increment(1);
    }

    /// Record one render call
    pub fn record_render(&self, view: &'static str) {
        counter!(self.renders_total, "view" => view).increment(1);
    }
}
