//! Extraction-side state for one viewer
//!
//! An [`ExtractionSession`] owns the archive handle, page list, current
//! document identity and the queue of accepted render requests. Handling is
//! split in two phases:
//!
//! - [`receive`](ExtractionSession::receive) reacts to a request right away:
//!   control messages are answered, loads cancel queued renders and reset
//!   state, renders are queued or dropped.
//! - [`step`](ExtractionSession::step) performs one unit of queued work:
//!   parsing the pending archive, publishing a parsed archive, or else the
//!   oldest queued render.
//!
//! The worker drains every available request before each step, so a load
//! that arrives behind queued renders cancels them instead of waiting.
//! Parsing and publishing are separate steps: requests that arrived while
//! the archive was being parsed are drained while the session still reports
//! [`is_loading`](ExtractionSession::is_loading).

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::protocol::{
    DocumentId, MessageId, RenderedPage, Request, RequestEnvelope, RequestKind, Response,
    ResponseEnvelope,
};
use crate::archive::{build_index, fetch_page, ArchiveHandle, PageList};
use crate::config::MAX_ENTRY_SIZE;
use crate::pagination::PageRole;
use crate::utils::error::Result;

const CANCEL_REASON_NEW_DOCUMENT: &str = "New document being loaded";
const CANCEL_REASON_CLOSED: &str = "Viewer closed";

struct LoadedDocument {
    id: DocumentId,
    handle: ArchiveHandle,
    pages: PageList,
}

enum LoadStage {
    Queued(Vec<u8>),
    Parsed(Result<(ArchiveHandle, PageList)>),
}

struct PendingLoad {
    message: MessageId,
    document_id: DocumentId,
    stage: LoadStage,
}

struct PendingRender {
    message: MessageId,
    document_id: DocumentId,
    page_index: usize,
    role: PageRole,
}

pub struct ExtractionSession {
    document: Option<LoadedDocument>,
    pending_load: Option<PendingLoad>,
    pending_renders: VecDeque<PendingRender>,
    max_entry_size: u64,
}

impl Default for ExtractionSession {
    fn default() -> Self {
        Self::new(MAX_ENTRY_SIZE)
    }
}

impl ExtractionSession {
    pub fn new(max_entry_size: u64) -> Self {
        Self {
            document: None,
            pending_load: None,
            pending_renders: VecDeque::new(),
            max_entry_size,
        }
    }

    /// A load has been received but its document is not published yet
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn current_document(&self) -> Option<DocumentId> {
        self.document.as_ref().map(|doc| doc.id)
    }

    pub fn total_pages(&self) -> usize {
        self.document.as_ref().map_or(0, |doc| doc.pages.len())
    }

    pub fn pending_renders(&self) -> usize {
        self.pending_renders.len()
    }

    pub fn has_work(&self) -> bool {
        self.pending_load.is_some() || !self.pending_renders.is_empty()
    }

    /// Handle an incoming request; immediate replies are appended to `out`
    pub fn receive(&mut self, envelope: RequestEnvelope, out: &mut Vec<ResponseEnvelope>) {
        let RequestEnvelope { id, request } = envelope;

        match request {
            Request::Init => {
                out.push(ResponseEnvelope {
                    id,
                    response: Response::Initialized,
                });
            }
            Request::Load {
                archive,
                document_id,
            } => self.begin_load(id, document_id, archive, out),
            Request::RenderPage {
                page_index,
                document_id,
                role,
            } => self.queue_render(id, document_id, page_index, role),
            Request::Close => {
                self.pending_renders.clear();
                if let Some(load) = self.pending_load.take() {
                    out.push(ResponseEnvelope {
                        id: load.message,
                        response: Response::Cancelled {
                            reason: CANCEL_REASON_CLOSED.to_string(),
                        },
                    });
                }
                self.document = None;
                debug!("Session closed");
                out.push(ResponseEnvelope {
                    id,
                    response: Response::Closed,
                });
            }
        }
    }

    fn begin_load(
        &mut self,
        message: MessageId,
        document_id: DocumentId,
        archive: Vec<u8>,
        out: &mut Vec<ResponseEnvelope>,
    ) {
        debug!(
            new_document = %document_id,
            pending = self.pending_renders.len(),
            "Starting document load"
        );

        for render in self.pending_renders.drain(..) {
            out.push(ResponseEnvelope {
                id: render.message,
                response: Response::Cancelled {
                    reason: CANCEL_REASON_NEW_DOCUMENT.to_string(),
                },
            });
        }

        // A load that never got published is superseded as well
        if let Some(previous) = self.pending_load.take() {
            out.push(ResponseEnvelope {
                id: previous.message,
                response: Response::Cancelled {
                    reason: CANCEL_REASON_NEW_DOCUMENT.to_string(),
                },
            });
        }

        // Nothing from the old document may survive a failed parse
        self.document = None;

        self.pending_load = Some(PendingLoad {
            message,
            document_id,
            stage: LoadStage::Queued(archive),
        });
    }

    fn queue_render(
        &mut self,
        message: MessageId,
        document_id: DocumentId,
        page_index: usize,
        role: PageRole,
    ) {
        if self.is_loading() {
            debug!(requested = %document_id, page_index, "Ignoring render during load");
            return;
        }

        if self.current_document() != Some(document_id) {
            debug!(requested = %document_id, page_index, "Ignoring outdated render request");
            return;
        }

        self.pending_renders.push_back(PendingRender {
            message,
            document_id,
            page_index,
            role,
        });
    }

    /// Run one unit of queued work. Returns `false` if there was none.
    pub fn step(&mut self, out: &mut Vec<ResponseEnvelope>) -> bool {
        if let Some(PendingLoad {
            message,
            document_id,
            stage,
        }) = self.pending_load.take()
        {
            match stage {
                LoadStage::Queued(archive) => {
                    debug!(document = %document_id, "Parsing archive");
                    self.pending_load = Some(PendingLoad {
                        message,
                        document_id,
                        stage: LoadStage::Parsed(build_index(archive)),
                    });
                }
                LoadStage::Parsed(parsed) => {
                    out.push(self.publish_load(message, document_id, parsed));
                }
            }
            return true;
        }

        if let Some(render) = self.pending_renders.pop_front() {
            if let Some(response) = self.run_render(render) {
                out.push(response);
            }
            return true;
        }

        false
    }

    fn publish_load(
        &mut self,
        message: MessageId,
        document_id: DocumentId,
        parsed: Result<(ArchiveHandle, PageList)>,
    ) -> ResponseEnvelope {
        match parsed {
            Ok((handle, pages)) => {
                let total_pages = pages.len();
                self.document = Some(LoadedDocument {
                    id: document_id,
                    handle,
                    pages,
                });
                info!(document = %document_id, total_pages, "Document load complete");
                ResponseEnvelope {
                    id: message,
                    response: Response::Loaded {
                        document_id,
                        total_pages,
                    },
                }
            }
            Err(error) => {
                warn!(document = %document_id, %error, "Document load failed");
                ResponseEnvelope {
                    id: message,
                    response: Response::Error {
                        request: RequestKind::Load,
                        document_id: Some(document_id),
                        error,
                    },
                }
            }
        }
    }

    fn run_render(&mut self, render: PendingRender) -> Option<ResponseEnvelope> {
        let max_entry_size = self.max_entry_size;
        let document = match self.document.as_mut() {
            Some(doc) if doc.id == render.document_id => doc,
            _ => {
                debug!(requested = %render.document_id, "Dropping render for replaced document");
                return None;
            }
        };

        let response = match fetch_page(
            &mut document.handle,
            &document.pages,
            render.page_index,
            max_entry_size,
        ) {
            Ok(page) => {
                debug!(
                    page_index = render.page_index,
                    msg_id = %render.message,
                    "Page render complete"
                );
                Response::PageRendered(RenderedPage {
                    document_id: render.document_id,
                    page_index: render.page_index,
                    bytes: page.bytes,
                    mime_type: page.mime_type,
                    role: render.role,
                })
            }
            Err(error) => {
                warn!(page_index = render.page_index, %error, "Page render failed");
                Response::Error {
                    request: RequestKind::RenderPage,
                    document_id: Some(render.document_id),
                    error,
                }
            }
        };

        Some(ResponseEnvelope {
            id: render.message,
            response,
        })
    }

    /// Receive a request and run all resulting work to completion
    pub fn handle(&mut self, envelope: RequestEnvelope) -> Vec<ResponseEnvelope> {
        let mut out = Vec::new();
        self.receive(envelope, &mut out);
        while self.step(&mut out) {}
        out
    }
}
