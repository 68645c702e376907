//! Asynchronous dispatch of operations to the stage executor.
//!
//! The provisioning flows only submit operation identifiers onto queues.
//! Draining the queues and progressing operations through their stages is the job
//! of a separate executor process and is not part of this crate.
//!
//! The objective of this crate is to abstract away message queues and similar software
//! implementing asynchronous task coordination and distribution.
pub mod conf;
pub mod submit;

mod telemetry;
pub use self::telemetry::register_metrics;
