//! Request metrics.
//!
//! In-process registry of per-endpoint counters and histograms, observed
//! once per request by the HTTP boundary and rendered in Prometheus text
//! exposition format.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Latency buckets in seconds
const LATENCY_BUCKETS: [f64; 9] = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Retrieved-chunk-count buckets
const CHUNK_BUCKETS: [f64; 6] = [0.0, 1.0, 2.0, 5.0, 10.0, 20.0];

/// Cumulative histogram with fixed upper bounds
#[derive(Debug, Clone)]
pub struct Histogram {
    bounds: Vec<f64>,
    counts: Vec<u64>,
    sum: f64,
    count: u64,
}

impl Histogram {
    fn new(bounds: &[f64]) -> Self {
        Self {
            bounds: bounds.to_vec(),
            counts: vec![0; bounds.len()],
            sum: 0.0,
            count: 0,
        }
    }

    fn observe(&mut self, value: f64) {
        for (i, bound) in self.bounds.iter().enumerate() {
            if value <= *bound {
                self.counts[i] += 1;
            }
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }
}

#[derive(Debug, Default)]
struct Inner {
    requests: BTreeMap<String, u64>,
    errors: BTreeMap<String, u64>,
    latency: BTreeMap<String, Histogram>,
    retrieved_chunks: Option<Histogram>,
}

/// Shared metrics registry; cheap to clone, internally synchronized
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Count one request against an endpoint
    pub fn record_request(&self, endpoint: &str) {
        let mut inner = self.inner.lock().unwrap();
        *inner.requests.entry(endpoint.to_string()).or_insert(0) += 1;
    }

    /// Count one failed request against an endpoint
    pub fn record_error(&self, endpoint: &str) {
        let mut inner = self.inner.lock().unwrap();
        *inner.errors.entry(endpoint.to_string()).or_insert(0) += 1;
    }

    /// Observe request latency in seconds
    pub fn observe_latency(&self, endpoint: &str, seconds: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .latency
            .entry(endpoint.to_string())
            .or_insert_with(|| Histogram::new(&LATENCY_BUCKETS))
            .observe(seconds);
    }

    /// Observe how many chunks one request retrieved
    pub fn observe_retrieved_chunks(&self, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .retrieved_chunks
            .get_or_insert_with(|| Histogram::new(&CHUNK_BUCKETS))
            .observe(count as f64);
    }

    pub fn request_count(&self, endpoint: &str) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner.requests.get(endpoint).copied().unwrap_or(0)
    }

    pub fn error_count(&self, endpoint: &str) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner.errors.get(endpoint).copied().unwrap_or(0)
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn render(&self) -> String {
        let inner = self.inner.lock().unwrap();
        let mut out = String::new();

        out.push_str("# HELP rag_requests_total Total number of RAG API requests\n");
        out.push_str("# TYPE rag_requests_total counter\n");
        for (endpoint, count) in &inner.requests {
            out.push_str(&format!(
                "rag_requests_total{{endpoint=\"{}\"}} {}\n",
                endpoint, count
            ));
        }

        out.push_str("# HELP rag_request_errors_total Total number of failed RAG API requests\n");
        out.push_str("# TYPE rag_request_errors_total counter\n");
        for (endpoint, count) in &inner.errors {
            out.push_str(&format!(
                "rag_request_errors_total{{endpoint=\"{}\"}} {}\n",
                endpoint, count
            ));
        }

        out.push_str("# HELP rag_request_latency_seconds Latency of RAG API requests in seconds\n");
        out.push_str("# TYPE rag_request_latency_seconds histogram\n");
        for (endpoint, histogram) in &inner.latency {
            render_histogram(
                &mut out,
                "rag_request_latency_seconds",
                Some(endpoint),
                histogram,
            );
        }

        out.push_str("# HELP rag_retrieved_chunks Number of retrieved chunks per request\n");
        out.push_str("# TYPE rag_retrieved_chunks histogram\n");
        if let Some(histogram) = &inner.retrieved_chunks {
            render_histogram(&mut out, "rag_retrieved_chunks", None, histogram);
        }

        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn render_histogram(out: &mut String, name: &str, endpoint: Option<&str>, histogram: &Histogram) {
    let label = |le: &str| match endpoint {
        Some(ep) => format!("{{endpoint=\"{}\",le=\"{}\"}}", ep, le),
        None => format!("{{le=\"{}\"}}", le),
    };
    let plain = match endpoint {
        Some(ep) => format!("{{endpoint=\"{}\"}}", ep),
        None => String::new(),
    };

    for (bound, count) in histogram.bounds.iter().zip(histogram.counts.iter()) {
        out.push_str(&format!("{}_bucket{} {}\n", name, label(&bound.to_string()), count));
    }
    out.push_str(&format!(
        "{}_bucket{} {}\n",
        name,
        label("+Inf"),
        histogram.count
    ));
    out.push_str(&format!("{}_sum{} {}\n", name, plain, histogram.sum));
    out.push_str(&format!("{}_count{} {}\n", name, plain, histogram.count));
}
