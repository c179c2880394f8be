//! Action callback registry and execution.
//!
//! Callbacks are registered once, keyed by action id, and invoked on a
//! small worker pool: one worker for sequential dispatch, five when the
//! client is configured to parallelize. Callbacks therefore must be
//! `Send + Sync`; shared state they touch needs its own synchronization.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::descriptor::PluginDescriptor;
use crate::protocol::ActionMessage;

use super::error::{ClientError, ClientResult};
use super::handler::ActionContext;

/// Callback invoked when a matching action fires.
pub type ActionCallback = Arc<dyn Fn(ActionContext) + Send + Sync>;

/// Number of workers when action dispatch is parallelized.
const PARALLEL_WORKERS: usize = 5;

/// Registered action callbacks, keyed by action id.
pub struct ActionRegistry {
    descriptor: Arc<PluginDescriptor>,
    callbacks: HashMap<String, ActionCallback>,
}

impl ActionRegistry {
    /// Create an empty registry bound to a descriptor.
    pub fn new(descriptor: Arc<PluginDescriptor>) -> Self {
        Self { descriptor, callbacks: HashMap::new() }
    }

    /// Register a callback for a declared action id.
    ///
    /// Fails if the descriptor does not declare the action, or a callback
    /// is already registered for it.
    pub fn register<F>(&mut self, action_id: &str, callback: F) -> ClientResult<()>
    where
        F: Fn(ActionContext) + Send + Sync + 'static,
    {
        if !self.descriptor.has_action(action_id) {
            return Err(ClientError::UnknownAction(action_id.to_string()));
        }
        if self.callbacks.contains_key(action_id) {
            return Err(ClientError::CallbackAlreadyRegistered(action_id.to_string()));
        }
        self.callbacks.insert(action_id.to_string(), Arc::new(callback));
        Ok(())
    }

    /// Whether a callback exists for this action id.
    pub fn has_callback(&self, action_id: &str) -> bool {
        self.callbacks.contains_key(action_id)
    }

    /// Look up the callback registered for an inbound action message.
    ///
    /// Exact id match only; returns the context to invoke it with.
    pub fn resolve(
        &self,
        message: &ActionMessage,
        held: Option<bool>,
    ) -> Option<(ActionCallback, ActionContext)> {
        let callback = self.callbacks.get(&message.action_id)?;
        let context = ActionContext {
            action_id: message.action_id.clone(),
            data: message
                .data
                .iter()
                .map(|datum| (datum.id.clone(), datum.value.clone()))
                .collect(),
            held,
        };
        Some((Arc::clone(callback), context))
    }
}

type Job = Box<dyn FnOnce() + Send>;

/// Worker pool running action callbacks.
///
/// One worker keeps dispatch strictly sequential in arrival order;
/// several workers run callbacks concurrently per message.
pub struct CallbackExecutor {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl CallbackExecutor {
    /// Create an executor. `parallel` selects five workers instead of one.
    pub fn new(parallel: bool) -> Self {
        let worker_count = if parallel { PARALLEL_WORKERS } else { 1 };
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..worker_count)
            .map(|index| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("action-worker-{index}"))
                    .spawn(move || Self::worker_loop(&receiver))
                    .expect("failed to spawn action worker")
            })
            .collect();

        Self { sender: Some(sender), workers }
    }

    fn worker_loop(receiver: &Arc<Mutex<Receiver<Job>>>) {
        loop {
            // The lock is released before the job runs, so other workers
            // can pick up jobs concurrently.
            let job = receiver.lock().recv();
            match job {
                Ok(job) => job(),
                Err(_) => break,
            }
        }
    }

    /// Submit a callback invocation.
    pub fn execute(&self, callback: ActionCallback, context: ActionContext) {
        let job: Job = Box::new(move || callback(context));
        if let Some(ref sender) = self.sender {
            if sender.send(job).is_err() {
                tracing::warn!("action worker pool is gone; dropping callback");
            }
        }
    }

    /// Drop the queue and wait for workers to finish in-flight callbacks.
    pub fn shutdown(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for CallbackExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
