//! Telemetry related to tasks submission.
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use anyhow::Result;
use once_cell::sync::Lazy;
use opentelemetry_api::global::BoxedTracer;
use opentelemetry_api::trace::TracerProvider;
use prometheus::CounterVec;
use prometheus::Opts;

/// Total number of task submissions.
pub static SUBMIT_COUNT: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "provisioner_tasks_submit_count",
            "Total number of task submissions",
        ),
        &["queue"],
    )
    .expect("failed to initialise SUBMIT_COUNT counter")
});

/// Number of task submissions that resulted in error.
pub static SUBMIT_ERR: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "provisioner_tasks_submit_error",
            "Number of task submissions that resulted in error",
        ),
        &["queue"],
    )
    .expect("failed to initialise SUBMIT_ERR counter")
});

/// Open Telemetry tracer for task operations.
pub static TRACER: Lazy<BoxedTracer> = Lazy::new(|| {
    opentelemetry_api::global::tracer_provider().versioned_tracer(
        env!("CARGO_PKG_NAME"),
        Some(env!("CARGO_PKG_VERSION")),
        Option::<&str>::None,
        None,
    )
});

/// Ensure metrics are registered only once.
static METRICS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// The first time this method is called it will register the task submission metrics.
pub fn register_metrics(reg: &prometheus::Registry) -> Result<()> {
    // Skip registration if already done before.
    if METRICS_REGISTERED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }

    let collectors: [Box<dyn prometheus::core::Collector>; 2] = [
        Box::new(SUBMIT_COUNT.clone()),
        Box::new(SUBMIT_ERR.clone()),
    ];
    for collector in collectors {
        reg.register(collector)?;
    }
    Ok(())
}
