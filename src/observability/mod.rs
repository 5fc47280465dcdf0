// Observability: metric recording for pipeline stages

pub mod metrics;

pub use metrics::MetricName;
