//! Operator lifecycle contract and shared wiring state.
//!
//! Every operator variant embeds an [`OperatorBase`]: its upstream input
//! channel, its own output channel (an operator is its own output
//! endpoint), the stop target notified when it terminates, a one-shot run
//! guard, and the batch buffer used by consumer variants.

use async_trait::async_trait;
use driftq_common::{Item, Result};
use tokio::sync::mpsc;

use crate::context::ExecutionContext;
use crate::visitor::Visitor;

/// Sending half of an operator-to-operator item channel.
pub type ItemSender = mpsc::Sender<Item>;
/// Receiving half of an operator-to-operator item channel.
pub type ItemReceiver = mpsc::Receiver<Item>;
/// Handle used to notify an operator that its designated successor stopped.
pub type StopSender = mpsc::Sender<()>;
/// Receiving half of an operator's stop-notification channel.
pub type StopReceiver = mpsc::Receiver<()>;

/// A type-erased operator, owned by its composer until launched.
pub type BoxedOperator = Box<dyn Operator>;

/// One stage of a running pipeline.
///
/// # Lifecycle
///
/// The composing operator calls each wiring setter exactly once before
/// [`Operator::run_once`] starts; the setters are not safe to call
/// concurrently with the run. `run_once` executes its body at most once per
/// instance; later calls are no-ops. On every exit path (input exhausted,
/// fatal error, cancellation) the operator closes its output channel (the
/// sole end-of-stream signal to downstream) and notifies its stop target
/// exactly once.
///
/// Failures are reported on the context's channels, never returned across
/// task boundaries; `run_once` therefore returns nothing.
#[async_trait]
pub trait Operator: Send {
    /// Dispatch to the variant-specific visitor method, for plan introspection.
    fn accept(&self, visitor: &mut dyn Visitor) -> Result<()>;

    /// Independent unstarted clone with equivalent configuration but fresh
    /// channels and run guard, for re-running the same plan shape.
    fn boxed_copy(&self) -> BoxedOperator;

    /// Shared wiring/lifecycle state.
    fn base(&self) -> &OperatorBase;

    /// Mutable shared wiring/lifecycle state.
    fn base_mut(&mut self) -> &mut OperatorBase;

    /// Idempotent entry point; see the trait-level lifecycle contract.
    ///
    /// `parent` carries the correlated outer item for nested execution.
    async fn run_once(&mut self, ctx: &ExecutionContext, parent: Option<Item>);

    /// Bind the upstream producer's channel. The operator never closes it.
    fn set_input(&mut self, input: ItemReceiver) {
        self.base_mut().set_input(input);
    }

    /// Redirect produced items onto `output` instead of the operator's own
    /// channel, making this operator transparent to whatever owns `output`.
    fn set_output(&mut self, output: ItemSender) {
        self.base_mut().set_output(output);
    }

    /// Designate the operator to notify when this one terminates.
    fn set_stop(&mut self, stop: StopSender) {
        self.base_mut().set_stop(stop);
    }

    /// Claim the receiving end of this operator's own output channel.
    ///
    /// Returns `None` once already claimed by a downstream stage.
    fn take_output(&mut self) -> Option<ItemReceiver> {
        self.base_mut().take_output()
    }

    /// Handle a successor uses to notify this operator of its termination.
    fn stop_handle(&self) -> StopSender {
        self.base().stop_handle()
    }
}

/// Shared state embedded by every operator variant.
pub struct OperatorBase {
    capacity: usize,
    input: Option<ItemReceiver>,
    output: Option<ItemSender>,
    output_rx: Option<ItemReceiver>,
    stop_target: Option<StopSender>,
    stop_tx: StopSender,
    stop_rx: Option<StopReceiver>,
    started: bool,
    batch: Vec<Item>,
}

impl OperatorBase {
    /// Fresh base with an eagerly created output channel of `capacity` items.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (output, output_rx) = mpsc::channel(capacity);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        Self {
            capacity,
            input: None,
            output: Some(output),
            output_rx: Some(output_rx),
            stop_target: None,
            stop_tx,
            stop_rx: Some(stop_rx),
            started: false,
            batch: Vec::new(),
        }
    }

    /// Equivalent unstarted base with fresh channels and guard.
    pub fn fresh(&self) -> Self {
        Self::new(self.capacity)
    }

    /// Consume the one-shot run token. Returns false once already started.
    pub fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    /// Bind the upstream input channel.
    pub fn set_input(&mut self, input: ItemReceiver) {
        self.input = Some(input);
    }

    /// Replace the destination produced items are sent to.
    pub fn set_output(&mut self, output: ItemSender) {
        self.output = Some(output);
    }

    /// Designate the stop-notification target.
    pub fn set_stop(&mut self, stop: StopSender) {
        self.stop_target = Some(stop);
    }

    /// Take the input channel for the duration of a consume loop.
    pub fn take_input(&mut self) -> Option<ItemReceiver> {
        self.input.take()
    }

    /// Claim the receiving end of this operator's own output channel.
    pub fn take_output(&mut self) -> Option<ItemReceiver> {
        self.output_rx.take()
    }

    /// Extra sending handle onto this operator's current output destination.
    pub fn output_clone(&self) -> Option<ItemSender> {
        self.output.clone()
    }

    /// Handle successors use to notify this operator.
    pub fn stop_handle(&self) -> StopSender {
        self.stop_tx.clone()
    }

    /// Take the stop-notification receiver for the duration of a run.
    pub fn take_stop_wait(&mut self) -> Option<StopReceiver> {
        self.stop_rx.take()
    }

    /// Send one item downstream, blocking under backpressure.
    ///
    /// Returns false when the downstream consumer is gone or the output was
    /// already closed; the producer should stop.
    pub async fn send_item(&self, item: Item) -> bool {
        match &self.output {
            Some(output) => output.send(item).await.is_ok(),
            None => false,
        }
    }

    /// Append to the batch buffer. The buffer is exclusive to the owning
    /// operator's run; it is never touched by another task.
    pub fn batch_push(&mut self, item: Item) {
        self.batch.push(item);
    }

    /// Current batch occupancy.
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Take ownership of the batch, leaving it empty.
    ///
    /// Ownership transfer happens synchronously inside the flushing
    /// operator's own execution, before any storage call is made.
    pub fn take_batch(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.batch)
    }

    /// Terminate this operator: close the output channel, release the batch
    /// buffer, and notify the stop target. Idempotent.
    pub fn finish(&mut self) {
        self.output = None;
        self.batch = Vec::new();
        if let Some(stop) = self.stop_target.take() {
            let _ = stop.try_send(());
        }
    }

    /// Wait until a successor notifies this operator. Resolves immediately
    /// if the stop receiver was already claimed.
    pub async fn wait_stopped(&mut self) {
        if let Some(stop_rx) = self.stop_rx.as_mut() {
            let _ = stop_rx.recv().await;
        }
    }
}
