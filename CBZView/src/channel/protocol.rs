//! Messages exchanged between the viewer and the extraction worker
//!
//! Both directions are closed enums so every handler matches exhaustively.
//! Each request travels in an envelope with a [`MessageId`]; the response
//! (or cancellation notice) for it echoes the same id.

use std::fmt;

use crate::pagination::PageRole;
use crate::utils::error::CbzError;

/// Identity of one loaded document
///
/// Allocated by the viewer from a per-viewer generation counter, so a later
/// load always has a larger id. Results tagged with anything but the
/// current id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cbz-doc-{}", self.0)
    }
}

/// Correlates a response with the request that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Debug)]
pub enum Request {
    Init,
    Load {
        archive: Vec<u8>,
        document_id: DocumentId,
    },
    RenderPage {
        page_index: usize,
        document_id: DocumentId,
        role: PageRole,
    },
    Close,
}

/// Payload-free tag of a [`Request`], used to label errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Init,
    Load,
    RenderPage,
    Close,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Init => RequestKind::Init,
            Request::Load { .. } => RequestKind::Load,
            Request::RenderPage { .. } => RequestKind::RenderPage,
            Request::Close => RequestKind::Close,
        }
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        match self {
            Request::Load { document_id, .. } | Request::RenderPage { document_id, .. } => {
                Some(*document_id)
            }
            Request::Init | Request::Close => None,
        }
    }
}

#[derive(Debug)]
pub struct RequestEnvelope {
    pub id: MessageId,
    pub request: Request,
}

/// Extracted page bytes, tagged with everything needed to place them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub document_id: DocumentId,
    pub page_index: usize,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub role: PageRole,
}

#[derive(Debug)]
pub enum Response {
    Initialized,
    Loaded {
        document_id: DocumentId,
        total_pages: usize,
    },
    PageRendered(RenderedPage),
    /// The request was dropped before it ran; not an error
    Cancelled {
        reason: String,
    },
    Closed,
    Error {
        request: RequestKind,
        /// Document the failed request belonged to, if any
        document_id: Option<DocumentId>,
        error: CbzError,
    },
}

#[derive(Debug)]
pub struct ResponseEnvelope {
    pub id: MessageId,
    pub response: Response,
}
