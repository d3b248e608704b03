use tracing::debug;

use crate::error::ChannelError;
use crate::worker::messages::{WorkerPush, WorkerRequest, WorkerResponse};

/// Correlates a queued request with the response that eventually arrives.
/// Stale ids (from a torn-down requester) are simply never matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Response {
        id: RequestId,
        response: WorkerResponse,
    },
    Push(WorkerPush),
}

/// Bidirectional async channel to the background worker, with explicit
/// connect/disconnect semantics. `request` never blocks: it queues the
/// message and returns a correlation id; responses and pushes are drained
/// later via `poll` on the single-threaded task queue.
pub trait BackgroundPort {
    fn connect(&mut self) -> Result<(), ChannelError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    fn request(&mut self, request: WorkerRequest) -> Result<RequestId, ChannelError>;

    /// Drain everything the worker has produced since the last poll.
    fn poll(&mut self) -> Vec<WorkerEvent>;
}

/// The worker side of an in-process port: given a request, produce the
/// response the background service would send.
pub trait WorkerBackend {
    fn handle(&mut self, request: &WorkerRequest) -> WorkerResponse;
}

/// Port wired straight to an in-process backend. Responses are produced
/// eagerly but delivered only on `poll`, preserving the asynchronous shape
/// the engine is written against.
#[derive(Debug)]
pub struct InProcessPort<B> {
    backend: B,
    connected: bool,
    next_id: u64,
    inbox: Vec<WorkerEvent>,
}

impl<B> InProcessPort<B> {
    pub fn new(backend: B) -> Self {
        InProcessPort {
            backend,
            connected: false,
            next_id: 0,
            inbox: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Inject a worker-initiated push, as the background service would.
    pub fn push(&mut self, push: WorkerPush) {
        self.inbox.push(WorkerEvent::Push(push));
    }
}

impl<B: WorkerBackend> BackgroundPort for InProcessPort<B> {
    fn connect(&mut self) -> Result<(), ChannelError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.inbox.clear();
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn request(&mut self, request: WorkerRequest) -> Result<RequestId, ChannelError> {
        if !self.connected {
            return Err(ChannelError::Disconnected);
        }
        self.next_id += 1;
        let id = RequestId(self.next_id);
        let response = self.backend.handle(&request);
        debug!(kind = request.kind(), ?id, "worker request queued");
        self.inbox.push(WorkerEvent::Response { id, response });
        Ok(id)
    }

    fn poll(&mut self) -> Vec<WorkerEvent> {
        std::mem::take(&mut self.inbox)
    }
}
