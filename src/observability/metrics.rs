use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub proposals_total: IntCounterVec,
    pub acceptances_total: IntCounterVec,
    pub settlements_total: IntCounterVec,
    pub settlement_latency_seconds: HistogramVec,
    pub remittances_total: IntCounterVec,
    pub ledger_entries_total: IntCounterVec,
    pub ready_orders_in_queue: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let proposals_total = IntCounterVec::new(
            Opts::new("proposals_total", "Proposal attempts by outcome"),
            &["outcome"],
        )
        .expect("valid proposals_total metric");

        let acceptances_total = IntCounterVec::new(
            Opts::new("acceptances_total", "Acceptance attempts by outcome"),
            &["outcome"],
        )
        .expect("valid acceptances_total metric");

        let settlements_total = IntCounterVec::new(
            Opts::new("settlements_total", "Delivery settlements by outcome"),
            &["outcome"],
        )
        .expect("valid settlements_total metric");

        let settlement_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "settlement_latency_seconds",
                "Latency of delivery settlement in seconds",
            ),
            &["outcome"],
        )
        .expect("valid settlement_latency_seconds metric");

        let remittances_total = IntCounterVec::new(
            Opts::new("remittances_total", "Cash remittance operations by outcome"),
            &["outcome"],
        )
        .expect("valid remittances_total metric");

        let ledger_entries_total = IntCounterVec::new(
            Opts::new("ledger_entries_total", "Ledger entries appended by kind"),
            &["kind"],
        )
        .expect("valid ledger_entries_total metric");

        let ready_orders_in_queue = IntGauge::new(
            "ready_orders_in_queue",
            "Ready orders waiting for the proposal engine",
        )
        .expect("valid ready_orders_in_queue metric");

        registry
            .register(Box::new(proposals_total.clone()))
            .expect("register proposals_total");
        registry
            .register(Box::new(acceptances_total.clone()))
            .expect("register acceptances_total");
        registry
            .register(Box::new(settlements_total.clone()))
            .expect("register settlements_total");
        registry
            .register(Box::new(settlement_latency_seconds.clone()))
            .expect("register settlement_latency_seconds");
        registry
            .register(Box::new(remittances_total.clone()))
            .expect("register remittances_total");
        registry
            .register(Box::new(ledger_entries_total.clone()))
            .expect("register ledger_entries_total");
        registry
            .register(Box::new(ready_orders_in_queue.clone()))
            .expect("register ready_orders_in_queue");

        Self {
            registry,
            proposals_total,
            acceptances_total,
            settlements_total,
            settlement_latency_seconds,
            remittances_total,
            ledger_entries_total,
            ready_orders_in_queue,
        }
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
