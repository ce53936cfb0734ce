pub(crate) struct Metric {
    pub name: &'static str,
    description: &'static str,
}

pub(crate) const COUNTERS: [Metric; 3] = [
    REBALANCE_RECOVERY_PARTITIONS_TOTAL,
    REBALANCE_LOAD_PARTITIONS_TOTAL,
    REBALANCE_LOAD_THROTTLED_TOTAL,
];

// REBALANCE Metrics --------------------------

pub(crate) const REBALANCE_RECOVERY_PARTITIONS_TOTAL: Metric = Metric {
    name: "meridian_rebalance_recovery_partitions_total",
    description: "Total partitions admitted for recovery balance",
};

pub(crate) const REBALANCE_LOAD_PARTITIONS_TOTAL: Metric = Metric {
    name: "meridian_rebalance_load_partitions_total",
    description: "Total partitions needing load balance",
};

pub(crate) const REBALANCE_LOAD_THROTTLED_TOTAL: Metric = Metric {
    name: "meridian_rebalance_load_throttled_total",
    description: "Total load-balance partitions kept on their current placement by throttling",
};

/// Describes the controller counters to whatever recorder the embedding
/// service installed. Installing an exporter is the service's business.
pub fn register_metrics() {
    for metric in COUNTERS {
        register_counter(metric)
    }
}

/// Registers a counter with the given name.
fn register_counter(metric: Metric) {
    metrics::describe_counter!(metric.name, metric.description);
    let _counter = metrics::counter!(metric.name);
}
