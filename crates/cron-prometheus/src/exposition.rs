use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

use cron_core::MetricsError;
use cron_model::{LABEL_NAMESPACE, Namespace};

use crate::{MetricSample, MetricType};

/// Render `samples` in the Prometheus text exposition format.
///
/// Every sample gets a `namespace` label set to `namespace`, overriding any
/// explicit label of that name. Metric names are prefixed with `prefix`.
/// Families come out sorted by name and each sample's labels sorted by label
/// name, so equal input always yields byte-identical output.
///
/// Fails when samples sharing a name disagree on type, help or label names,
/// when a counter is negative, or when a name is not a valid metric name.
pub fn render(
    namespace: &Namespace,
    prefix: Option<&str>,
    samples: &[MetricSample],
) -> Result<String, MetricsError> {
    let prefix = prefix.unwrap_or_default();
    let registry = Registry::new();
    for family in group(samples)? {
        register(&registry, namespace, prefix, &family)?;
    }

    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buf)
        .map_err(encode_err)?;
    String::from_utf8(buf).map_err(|e| MetricsError::Encode(e.to_string()))
}

struct Family<'a> {
    name: &'a str,
    help: &'a str,
    kind: MetricType,
    label_names: Vec<&'a str>,
    samples: Vec<&'a MetricSample>,
}

fn group(samples: &[MetricSample]) -> Result<Vec<Family<'_>>, MetricsError> {
    let mut families: Vec<Family<'_>> = Vec::new();
    for sample in samples {
        let names = label_names(sample);
        match families.iter_mut().find(|f| f.name == sample.name) {
            Some(family) => {
                if family.kind != sample.kind || family.help != sample.help {
                    return Err(MetricsError::Encode(format!(
                        "metric {} declared with conflicting type or help",
                        sample.name
                    )));
                }
                if family.label_names != names {
                    return Err(MetricsError::Encode(format!(
                        "metric {} declared with conflicting label names",
                        sample.name
                    )));
                }
                family.samples.push(sample);
            }
            None => families.push(Family {
                name: &sample.name,
                help: &sample.help,
                kind: sample.kind,
                label_names: names,
                samples: vec![sample],
            }),
        }
    }
    Ok(families)
}

/// Sorted label names of `sample`, the implicit namespace label included.
fn label_names(sample: &MetricSample) -> Vec<&str> {
    let mut names: Vec<&str> = sample.labels.names().collect();
    if !sample.labels.contains(LABEL_NAMESPACE) {
        names.push(LABEL_NAMESPACE);
        names.sort_unstable();
    }
    names
}

fn label_values<'a>(
    sample: &'a MetricSample,
    names: &[&str],
    namespace: &'a Namespace,
) -> Vec<&'a str> {
    names
        .iter()
        .map(|name| match *name {
            LABEL_NAMESPACE => namespace.as_str(),
            other => sample.labels.get(other).unwrap_or_default(),
        })
        .collect()
}

fn register(
    registry: &Registry,
    namespace: &Namespace,
    prefix: &str,
    family: &Family<'_>,
) -> Result<(), MetricsError> {
    let opts = Opts::new(format!("{prefix}{}", family.name), family.help);
    match family.kind {
        MetricType::Gauge => {
            let vec = IntGaugeVec::new(opts, &family.label_names).map_err(encode_err)?;
            registry.register(Box::new(vec.clone())).map_err(encode_err)?;
            for sample in &family.samples {
                let values = label_values(sample, &family.label_names, namespace);
                vec.get_metric_with_label_values(values.as_slice())
                    .map_err(encode_err)?
                    .set(sample.value);
            }
        }
        MetricType::Counter => {
            let vec = IntCounterVec::new(opts, &family.label_names).map_err(encode_err)?;
            registry.register(Box::new(vec.clone())).map_err(encode_err)?;
            for sample in &family.samples {
                let value = u64::try_from(sample.value).map_err(|_| {
                    MetricsError::Encode(format!(
                        "counter {} cannot be negative: {}",
                        sample.name, sample.value
                    ))
                })?;
                let values = label_values(sample, &family.label_names, namespace);
                vec.get_metric_with_label_values(values.as_slice())
                    .map_err(encode_err)?
                    .inc_by(value);
            }
        }
    }
    Ok(())
}

fn encode_err(err: prometheus::Error) -> MetricsError {
    MetricsError::Encode(err.to_string())
}
