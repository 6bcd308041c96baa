//! Prometheus text exporter for collected metric readings.
//!
//! Writes the Prometheus text exposition format so a [`MeterRegistry`]
//! poll pass can be scraped by Prometheus or forwarded to an
//! OpenTelemetry collector. Export failures stay inside the writer; they
//! never reach the instrumented cache.

use std::io::Write;

use parking_lot::Mutex;

use crate::registry::{CollectedMetric, MeterRegistry};
use crate::tags::Tag;

/// Text exporter over any `Write` sink.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consume the exporter and return the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    /// Poll `registry` once and export every instrument.
    pub fn export_registry(&self, registry: &MeterRegistry) {
        self.export(&registry.collect());
    }

    /// Export one batch of collected metrics.
    pub fn export(&self, metrics: &[CollectedMetric]) {
        let mut writer = self.writer.lock();
        for metric in metrics {
            let name = self.metric_name(&metric.name);
            if !metric.description.is_empty() {
                let _ = writeln!(writer, "# HELP {} {}", name, metric.description);
            }
            let _ = writeln!(writer, "# TYPE {} counter", name);
            for reading in &metric.readings {
                let _ = writeln!(
                    writer,
                    "{}{} {}",
                    name,
                    format_labels(&reading.tags),
                    reading.value
                );
            }
        }
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

fn format_labels(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let mut out = String::from("{");
    for (index, tag) in tags.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&label_key(&tag.key));
        out.push_str("=\"");
        // escape per the exposition format
        for ch in tag.value.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                other => out.push(other),
            }
        }
        out.push('"');
    }
    out.push('}');
    out
}

/// Map a tag key onto the Prometheus label charset.
///
/// `cache.name` becomes `cache_name`; anything outside
/// `[a-zA-Z0-9_]` is replaced with an underscore.
fn label_key(key: &str) -> String {
    key.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect()
}
