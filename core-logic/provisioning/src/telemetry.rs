//! Telemetry related to the provisioning flows.
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::Counter;
use prometheus::CounterVec;
use prometheus::Opts;

/// Total number of provisioning flow requests.
pub static FLOW_COUNT: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "provisioner_flow_count",
            "Total number of provisioning flow requests",
        ),
        &["flow"],
    )
    .expect("failed to initialise FLOW_COUNT counter")
});

/// Number of provisioning flow requests that resulted in error.
pub static FLOW_ERR: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "provisioner_flow_error",
            "Number of provisioning flow requests that resulted in error",
        ),
        &["flow"],
    )
    .expect("failed to initialise FLOW_ERR counter")
});

/// Number of runtime registration attempts retried after a failure.
pub static REGISTRATION_RETRY: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "provisioner_registration_retry",
        "Number of runtime registration attempts retried after a failure",
    )
    .expect("failed to initialise REGISTRATION_RETRY counter")
});

/// Number of registered runtimes released after a failed provisioning.
pub static COMPENSATION_COUNT: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "provisioner_compensation_count",
        "Number of registered runtimes released after a failed provisioning",
    )
    .expect("failed to initialise COMPENSATION_COUNT counter")
});

/// Number of registered runtimes that could not be released.
pub static COMPENSATION_ERR: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "provisioner_compensation_error",
        "Number of registered runtimes that could not be released",
    )
    .expect("failed to initialise COMPENSATION_ERR counter")
});

/// Number of committed operations that could not be enqueued.
pub static ENQUEUE_ERR: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "provisioner_enqueue_error",
            "Number of committed operations that could not be enqueued",
        ),
        &["queue"],
    )
    .expect("failed to initialise ENQUEUE_ERR counter")
});

/// Ensure metrics are registered only once.
static METRICS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// The first time this method is called it will register the provisioning flows metrics.
pub fn register_metrics(reg: &prometheus::Registry) -> Result<()> {
    // Skip registration if already done before.
    if METRICS_REGISTERED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }

    let collectors: [Box<dyn prometheus::core::Collector>; 6] = [
        Box::new(COMPENSATION_COUNT.clone()),
        Box::new(COMPENSATION_ERR.clone()),
        Box::new(ENQUEUE_ERR.clone()),
        Box::new(FLOW_COUNT.clone()),
        Box::new(FLOW_ERR.clone()),
        Box::new(REGISTRATION_RETRY.clone()),
    ];
    for collector in collectors {
        reg.register(collector)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn register_metrics_once() {
        let registry = prometheus::Registry::new();
        super::register_metrics(&registry).expect("metrics to register");
        super::register_metrics(&registry).expect("second registration to be skipped");
    }
}
