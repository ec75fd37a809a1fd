use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatch_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub officer_assignments_total: IntCounterVec,
    pub notifications_in_queue: IntGauge,
    pub notifications_dropped_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatch_total = IntCounterVec::new(
            Opts::new("dispatch_total", "Total dispatch runs by outcome"),
            &["outcome"],
        )
        .expect("valid dispatch_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of a dispatch run in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let officer_assignments_total = IntCounterVec::new(
            Opts::new(
                "officer_assignments_total",
                "Assignments created per officer",
            ),
            &["officer_id"],
        )
        .expect("valid officer_assignments_total metric");

        let notifications_in_queue = IntGauge::new(
            "notifications_in_queue",
            "Current number of notifications awaiting delivery",
        )
        .expect("valid notifications_in_queue metric");

        let notifications_dropped_total = IntCounter::new(
            "notifications_dropped_total",
            "Notifications dropped because the queue was full or closed",
        )
        .expect("valid notifications_dropped_total metric");

        registry
            .register(Box::new(dispatch_total.clone()))
            .expect("register dispatch_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(officer_assignments_total.clone()))
            .expect("register officer_assignments_total");
        registry
            .register(Box::new(notifications_in_queue.clone()))
            .expect("register notifications_in_queue");
        registry
            .register(Box::new(notifications_dropped_total.clone()))
            .expect("register notifications_dropped_total");

        Self {
            registry,
            dispatch_total,
            dispatch_latency_seconds,
            officer_assignments_total,
            notifications_in_queue,
            notifications_dropped_total,
        }
    }

    pub fn record_dispatch(&self, outcome: &str, elapsed_seconds: f64) {
        self.dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_seconds);
        self.dispatch_total.with_label_values(&[outcome]).inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
