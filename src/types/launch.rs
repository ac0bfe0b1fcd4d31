//! Pluggable strategies for driving resolver futures.

use std::{
    fmt,
    sync::{Arc, Mutex, mpsc},
    thread,
};

use futures::channel::oneshot;

use crate::{
    executor::{FieldError, FieldResult},
    types::object::{Resolved, ResolverFuture},
};

/// How a resolver future is driven to completion.
///
/// The handle is cheap to clone and is inherited by child selections. Three
/// strategies interoperate: deferred (inline on the awaiting thread), queued
/// (an in-process FIFO worker, ordered dispatch but single-threaded
/// execution), and threaded (a dedicated thread per resolver).
#[derive(Clone)]
pub struct Launch(Arc<dyn LaunchStrategy>);

trait LaunchStrategy: Send + Sync {
    fn launch(&self, fut: ResolverFuture) -> ResolverFuture;

    fn name(&self) -> &'static str;
}

impl Default for Launch {
    fn default() -> Self {
        Self::deferred()
    }
}

impl fmt::Debug for Launch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Launch").field(&self.0.name()).finish()
    }
}

impl Launch {
    /// Resolvers run inline on the thread that first awaits the result.
    pub fn deferred() -> Self {
        Self(Arc::new(Deferred))
    }

    /// Resolvers post work to an in-process FIFO worker thread.
    ///
    /// Dispatch order equals launch order, and all queued resolvers execute
    /// on the one worker thread.
    pub fn queued() -> Self {
        Self(Arc::new(Queued::spawn()))
    }

    /// Each resolver runs on its own dedicated thread.
    pub fn threaded() -> Self {
        Self(Arc::new(Threaded))
    }

    pub(crate) fn launch(&self, fut: ResolverFuture) -> ResolverFuture {
        self.0.launch(fut)
    }
}

struct Deferred;

impl LaunchStrategy for Deferred {
    fn launch(&self, fut: ResolverFuture) -> ResolverFuture {
        fut
    }

    fn name(&self) -> &'static str {
        "deferred"
    }
}

struct QueuedJob {
    fut: ResolverFuture,
    reply: oneshot::Sender<FieldResult<Resolved>>,
}

struct Queued {
    sender: Mutex<mpsc::Sender<QueuedJob>>,
}

impl Queued {
    fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel::<QueuedJob>();

        // The worker exits once every handle to this strategy is gone and
        // the channel disconnects.
        thread::spawn(move || {
            while let Ok(job) = receiver.recv() {
                let outcome = futures::executor::block_on(job.fut);
                // The awaiting side may have been dropped; cancellation is
                // silent.
                let _ = job.reply.send(outcome);
            }
        });

        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl LaunchStrategy for Queued {
    fn launch(&self, fut: ResolverFuture) -> ResolverFuture {
        let (reply, receiver) = oneshot::channel();

        let sent = self
            .sender
            .lock()
            .expect("queued worker sender poisoned")
            .send(QueuedJob { fut, reply });

        Box::pin(async move {
            if sent.is_err() {
                return Err(FieldError::from("resolver worker is gone"));
            }

            receiver
                .await
                .map_err(|_| FieldError::from("resolver worker is gone"))?
        })
    }

    fn name(&self) -> &'static str {
        "queued"
    }
}

struct Threaded;

impl LaunchStrategy for Threaded {
    fn launch(&self, fut: ResolverFuture) -> ResolverFuture {
        let (reply, receiver) = oneshot::channel();

        thread::spawn(move || {
            let outcome = futures::executor::block_on(fut);
            let _ = reply.send(outcome);
        });

        Box::pin(async move {
            receiver
                .await
                .map_err(|_| FieldError::from("resolver thread is gone"))?
        })
    }

    fn name(&self) -> &'static str {
        "threaded"
    }
}

#[cfg(test)]
mod tests {
    use super::Launch;
    use crate::{types::object::Resolved, value::Value};

    #[test]
    fn deferred_runs_inline() {
        let launch = Launch::deferred();
        let fut = launch.launch(Box::pin(async { Ok(Resolved::Value(Value::Int(1))) }));

        let out = futures::executor::block_on(fut).unwrap();
        assert!(matches!(out, Resolved::Value(Value::Int(1))));
    }

    #[test]
    fn queued_preserves_dispatch_order() {
        use std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        };

        let launch = Launch::queued();
        let counter = Arc::new(AtomicUsize::new(0));

        let futs: Vec<_> = (0..8)
            .map(|i| {
                let counter = Arc::clone(&counter);
                launch.launch(Box::pin(async move {
                    let seen = counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(seen, i, "jobs must execute in dispatch order");
                    Ok(Resolved::Value(Value::Int(i as i32)))
                }))
            })
            .collect();

        let outcomes = futures::executor::block_on(futures::future::join_all(futs));
        assert_eq!(outcomes.len(), 8);
        assert!(outcomes.iter().all(Result::is_ok));
    }

    #[test]
    fn threaded_completes_off_thread() {
        let launch = Launch::threaded();
        let main_thread = std::thread::current().id();

        let fut = launch.launch(Box::pin(async move {
            assert_ne!(std::thread::current().id(), main_thread);
            Ok(Resolved::Value(Value::Bool(true)))
        }));

        let out = futures::executor::block_on(fut).unwrap();
        assert!(matches!(out, Resolved::Value(Value::Bool(true))));
    }
}
