pub mod messages;
pub mod port;
pub mod store;

pub use messages::{
    CredentialPair, LoginItem, SubmissionRecord, SubmissionStatus, WorkerPush, WorkerRequest,
    WorkerResponse, WorkerStatus,
};
pub use port::{BackgroundPort, InProcessPort, RequestId, WorkerBackend, WorkerEvent};
pub use store::MemoryStore;
