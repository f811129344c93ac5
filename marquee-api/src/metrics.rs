use prometheus::{opts, Encoder, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

pub static METRICS: LazyLock<ApiMetrics> = LazyLock::new(ApiMetrics::default);

pub struct ApiMetrics {
    registry: Registry,
    /// Labels: `kind` (invalid_argument, unknown_reference, conflict, transient, internal)
    rejections: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let rejections = IntCounterVec::new(
            opts!("marquee_rejections_total", "Requests rejected, by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(rejections.clone()))?;

        Ok(Self { registry, rejections })
    }

    pub fn record_rejection(&self, kind: &str) {
        self.rejections.with_label_values(&[kind]).inc();
    }

    pub fn rejections(&self, kind: &str) -> u64 {
        self.rejections.with_label_values(&[kind]).get()
    }

    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for ApiMetrics {
    /// # Panics
    ///
    /// Panics if the counter cannot be registered, which only happens on a
    /// duplicate metric name.
    fn default() -> Self {
        Self::new().expect("metric registration")
    }
}
