//! Request/response channel between the viewer and the extraction worker

use std::time::Duration;

use crate::utils::error::Result;

pub mod protocol;
pub mod session;
pub mod worker;

pub use protocol::{
    DocumentId, MessageId, RenderedPage, Request, RequestEnvelope, RequestKind, Response,
    ResponseEnvelope,
};
pub use session::ExtractionSession;
pub use worker::WorkerChannel;

/// Transport the viewer talks to the extraction side through
///
/// Implementations deliver requests in order. Responses may interleave
/// across requests; the viewer filters them by document identity.
pub trait Channel {
    /// Queue a request. Fails with `ChannelFailure` if the worker is gone.
    fn post(&self, envelope: RequestEnvelope) -> Result<()>;

    /// Next available response without blocking
    fn try_recv(&self) -> Result<Option<ResponseEnvelope>>;

    /// Wait up to `timeout` for the next response
    fn recv_timeout(&self, timeout: Duration) -> Result<Option<ResponseEnvelope>>;
}
