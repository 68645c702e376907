//! Interface to submit tasks to a message queue platform.
use std::sync::Arc;

use anyhow::Result;
use opentelemetry_api::trace::FutureExt;
use opentelemetry_api::trace::SpanKind;
use opentelemetry_api::trace::TraceContextExt;
use opentelemetry_api::trace::Tracer;
use opentelemetry_api::Context as OTelContext;
use serde::Serialize;
use serde_json::Value;

use provisioner_context::Context;

use crate::conf::Queue;
use crate::telemetry::SUBMIT_COUNT;
use crate::telemetry::SUBMIT_ERR;
use crate::telemetry::TRACER;

/// Information about a task to submit for async execution.
#[derive(Clone, Debug)]
pub struct TaskSubmission {
    /// Payload submitted as part of this task.
    pub payload: Value,

    /// Queue the task is submitted to.
    pub queue: &'static Queue,
}

impl TaskSubmission {
    /// Collect information needed for task submission.
    pub fn new<P>(queue: &'static Queue, payload: &P) -> Result<TaskSubmission>
    where
        P: Serialize,
    {
        let task = TaskSubmission {
            payload: serde_json::to_value(payload)?,
            queue,
        };
        Ok(task)
    }
}

/// Submit tasks to the backing task queue platform.
#[derive(Clone)]
pub struct Tasks(Arc<dyn TasksBackend>);

impl Tasks {
    /// Submit a task onto its queue.
    pub async fn submit<T>(&self, context: &Context, task: T) -> Result<()>
    where
        T: TryInto<TaskSubmission>,
        T::Error: Into<anyhow::Error>,
    {
        let task = task.try_into().map_err(Into::into)?;
        let queue = task.queue;
        SUBMIT_COUNT.with_label_values(&[&queue.queue]).inc();

        let parent = OTelContext::current();
        let mut span = TRACER.span_builder("task.submit");
        span.span_kind = Some(SpanKind::Producer);
        let span = TRACER.build_with_context(span, &parent);
        let trace = parent.with_span(span);

        let result = self.0.submit(context, task).with_context(trace).await;
        if let Err(error) = &result {
            SUBMIT_ERR.with_label_values(&[&queue.queue]).inc();
            slog::debug!(
                context.logger, "Task submission failed";
                "queue" => &queue.queue,
                "error" => %error,
            );
        }
        result
    }

    /// Initialise a new tasks backend fixture for unit tests.
    #[cfg(any(test, feature = "test-fixture"))]
    pub fn fixture() -> TasksFixture {
        TasksFixture::new()
    }
}

impl<T> From<T> for Tasks
where
    T: TasksBackend + 'static,
{
    fn from(value: T) -> Self {
        Tasks(Arc::new(value))
    }
}

/// Operations implemented by message queue platforms supported by the provisioner.
#[async_trait::async_trait]
pub trait TasksBackend: Send + Sync {
    /// Submit a task onto its queue.
    async fn submit(&self, context: &Context, task: TaskSubmission) -> Result<()>;
}

#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::{TasksFixture, TasksFixtureBackend};

#[cfg(any(test, feature = "test-fixture"))]
mod fixture {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result;
    use tokio::sync::broadcast;
    use tokio::sync::broadcast::Receiver;
    use tokio::sync::broadcast::Sender;

    use provisioner_context::Context;

    use super::TaskSubmission;
    use super::TasksBackend;

    /// Introspection tools for tasks submitted during unit tests.
    pub struct TasksFixture {
        fail: Arc<AtomicBool>,
        tasks: Receiver<TaskSubmission>,
        send_task: Sender<TaskSubmission>,
    }

    impl Clone for TasksFixture {
        fn clone(&self) -> Self {
            let tasks = self.send_task.subscribe();
            Self {
                fail: self.fail.clone(),
                tasks,
                send_task: self.send_task.clone(),
            }
        }
    }

    impl TasksFixture {
        /// Create a backend that will send tasks to this fixture.
        pub fn backend(&self) -> TasksFixtureBackend {
            TasksFixtureBackend {
                fail: self.fail.clone(),
                send_task: self.send_task.clone(),
            }
        }

        /// Make backends reject (or accept again) all future submissions.
        pub fn fail_submissions(&self, fail: bool) {
            self.fail.store(fail, Ordering::Release);
        }

        /// Initialise a task queue backend fixture for unit tests.
        pub fn new() -> TasksFixture {
            let (send_task, tasks) = broadcast::channel(50);
            TasksFixture {
                fail: Arc::new(AtomicBool::new(false)),
                tasks,
                send_task,
            }
        }

        /// Fetch the next [`TaskSubmission`] submitted to the fixture.
        pub async fn pop_task(&mut self) -> Result<TaskSubmission> {
            let task = self.tasks.recv().await?;
            Ok(task)
        }

        /// Fetch the next [`TaskSubmission`] submitted to the fixture, with a timeout.
        pub async fn pop_task_timeout(&mut self, timeout: Duration) -> Result<TaskSubmission> {
            let task = tokio::time::timeout(timeout, self.pop_task()).await?;
            task
        }

        /// Fetch the next [`TaskSubmission`] if one was already submitted.
        pub fn try_pop_task(&mut self) -> Option<TaskSubmission> {
            self.tasks.try_recv().ok()
        }
    }

    impl Default for TasksFixture {
        fn default() -> Self {
            TasksFixture::new()
        }
    }

    /// Tasks backend for unit tests.
    pub struct TasksFixtureBackend {
        fail: Arc<AtomicBool>,
        send_task: Sender<TaskSubmission>,
    }

    #[async_trait::async_trait]
    impl TasksBackend for TasksFixtureBackend {
        async fn submit(&self, _: &Context, task: TaskSubmission) -> Result<()> {
            if self.fail.load(Ordering::Acquire) {
                anyhow::bail!("task submission rejected by fixture");
            }
            self.send_task.send(task)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use once_cell::sync::Lazy;
    use serde::Serialize;

    use provisioner_context::Context;

    use super::TaskSubmission;
    use super::Tasks;
    use crate::conf::Queue;

    static TEST_QUEUE: Lazy<Queue> = Lazy::new(|| Queue {
        queue: "test_queue".into(),
        retry_count: 1,
        retry_timeout: Duration::from_secs(1),
    });

    #[derive(Serialize)]
    struct Payload {
        id: String,
    }

    impl TryInto<TaskSubmission> for Payload {
        type Error = anyhow::Error;
        fn try_into(self) -> Result<TaskSubmission, Self::Error> {
            TaskSubmission::new(&TEST_QUEUE, &self)
        }
    }

    #[tokio::test]
    async fn submit_reaches_backend() {
        let context = Context::fixture();
        let mut fixture = Tasks::fixture();
        let tasks = Tasks::from(fixture.backend());
        let payload = Payload { id: "op".into() };
        tasks
            .submit(&context, payload)
            .await
            .expect("task submission to succeed");

        let task = fixture
            .pop_task_timeout(Duration::from_millis(50))
            .await
            .expect("task to be submitted");
        assert_eq!(task.queue.queue, "test_queue");
        assert_eq!(task.payload, serde_json::json!({"id": "op"}));
    }

    #[tokio::test]
    async fn submit_failure_is_reported() {
        let context = Context::fixture();
        let mut fixture = Tasks::fixture();
        fixture.fail_submissions(true);
        let tasks = Tasks::from(fixture.backend());
        let payload = Payload { id: "op".into() };
        let result = tasks.submit(&context, payload).await;
        assert!(result.is_err());
        assert!(fixture.try_pop_task().is_none());
    }
}
