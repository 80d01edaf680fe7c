//! Prometheus text exposition of projected samples.

use crate::collector::projector::{Family, MetricKind, MetricSample};
use prometheus::{CounterVec, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

enum Collector {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Renders samples in the Prometheus text format.
///
/// Each family is registered once in a registry built for this call, with
/// the label names of its first sample. A later sample with the same label
/// values replaces the earlier one.
///
/// # Errors
/// Returns a `prometheus::Error` if a family name or label name is invalid,
/// or if samples of one family disagree on their label names.
pub fn render(samples: &[MetricSample]) -> prometheus::Result<String> {
    let registry = Registry::new();
    let mut collectors: HashMap<&'static str, Collector> = HashMap::new();

    for sample in samples {
        if !collectors.contains_key(sample.family.name) {
            let collector = register(&registry, sample)?;
            collectors.insert(sample.family.name, collector);
        }
        let Some(collector) = collectors.get(sample.family.name) else {
            continue;
        };

        let values: Vec<&str> = sample.labels.iter().map(|(_, v)| v.as_str()).collect();
        match collector {
            Collector::Gauge(vec) => vec.get_metric_with_label_values(&values)?.set(sample.value),
            Collector::Counter(vec) => {
                let counter = vec.get_metric_with_label_values(&values)?;
                counter.reset();
                counter.inc_by(sample.value.max(0.0));
            }
        }
    }

    TextEncoder::new().encode_to_string(&registry.gather())
}

fn register(registry: &Registry, sample: &MetricSample) -> prometheus::Result<Collector> {
    let Family { name, help, kind } = sample.family;
    let opts = Opts::new(name, help);
    let label_names: Vec<&str> = sample.labels.iter().map(|(k, _)| *k).collect();

    match kind {
        MetricKind::Gauge => {
            let vec = GaugeVec::new(opts, &label_names)?;
            registry.register(Box::new(vec.clone()))?;
            Ok(Collector::Gauge(vec))
        }
        MetricKind::Counter => {
            let vec = CounterVec::new(opts, &label_names)?;
            registry.register(Box::new(vec.clone()))?;
            Ok(Collector::Counter(vec))
        }
    }
}
