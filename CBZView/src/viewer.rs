//! Controlling side of the CBZ viewer
//!
//! [`CbzViewer`] owns the view state and the canvas. It turns navigation
//! into render requests for the extraction worker and applies the worker's
//! responses, dropping any that belong to a document other than the
//! current one.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::channel::{
    Channel, DocumentId, MessageId, RenderedPage, Request, RequestEnvelope, RequestKind,
    Response, ResponseEnvelope, WorkerChannel,
};
use crate::config::ViewerConfig;
use crate::image_processor::{decode_image, Canvas};
use crate::pagination::{ClickZone, ViewState};
use crate::utils::error::{CbzError, Result};

pub struct CbzViewer<C: Channel = WorkerChannel> {
    channel: C,
    view: ViewState,
    canvas: Canvas,
    next_message: u64,
    next_generation: u64,
    /// Load sent, `Loaded` not received yet
    pending_document: Option<DocumentId>,
    current_document: Option<DocumentId>,
    initialized: bool,
    loading: bool,
    error: Option<String>,
}

impl CbzViewer<WorkerChannel> {
    /// Create a viewer backed by its own worker thread
    pub fn spawn(config: ViewerConfig) -> Result<Self> {
        let channel = WorkerChannel::spawn(config.max_entry_size)?;
        Self::new(channel, config)
    }
}

impl<C: Channel> CbzViewer<C> {
    pub fn new(channel: C, config: ViewerConfig) -> Result<Self> {
        let mut viewer = Self {
            channel,
            view: ViewState::new(config.dual_page_default),
            canvas: Canvas::new(config.canvas_width, config.canvas_height, config.resize_filter),
            next_message: 0,
            next_generation: 0,
            pending_document: None,
            current_document: None,
            initialized: false,
            loading: false,
            error: None,
        };
        viewer.post(Request::Init)?;
        Ok(viewer)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn current_document(&self) -> Option<DocumentId> {
        self.current_document
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-visible error, set until the next load
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn can_page(&self) -> bool {
        self.error.is_none() && !self.loading && self.current_document.is_some()
    }

    fn post(&mut self, request: Request) -> Result<MessageId> {
        self.next_message += 1;
        let id = MessageId::new(self.next_message);
        let kind = request.kind();

        match self.channel.post(RequestEnvelope { id, request }) {
            Ok(()) => Ok(id),
            Err(err) => {
                warn!(?kind, %err, "Failed to post request");
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    fn fail(&mut self, message: String) {
        warn!(%message, "CBZ viewer error");
        self.error = Some(message);
        self.loading = false;
    }

    /// Start loading an archive buffer
    ///
    /// The previous document stops being current immediately; anything the
    /// worker still sends for it is ignored.
    pub fn load(&mut self, archive: Vec<u8>) -> Result<DocumentId> {
        self.next_generation += 1;
        let document_id = DocumentId::new(self.next_generation);

        self.pending_document = Some(document_id);
        self.current_document = None;
        self.loading = true;
        self.error = None;

        debug!(document = %document_id, bytes = archive.len(), "Loading archive");
        self.post(Request::Load {
            archive,
            document_id,
        })?;
        Ok(document_id)
    }

    /// Read an archive from disk and load it
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<DocumentId> {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(data) => self.load(data),
            Err(err) => {
                self.fail(format!("Failed to read {}: {}", path.display(), err));
                Err(CbzError::Io(err))
            }
        }
    }

    /// Forget the current document and release the worker's copy
    pub fn close(&mut self) -> Result<()> {
        self.pending_document = None;
        self.current_document = None;
        self.loading = false;
        self.view.reset(0);
        self.canvas.clear();
        self.post(Request::Close)?;
        Ok(())
    }

    /// Apply every response that is already available
    pub fn pump(&mut self) -> Result<usize> {
        let mut applied = 0;
        loop {
            match self.channel.try_recv() {
                Ok(Some(envelope)) => {
                    self.handle_response(envelope);
                    applied += 1;
                }
                Ok(None) => return Ok(applied),
                Err(err) => {
                    self.fail(err.to_string());
                    return Err(err);
                }
            }
        }
    }

    /// Wait up to `timeout` for one response, then apply everything available
    pub fn pump_timeout(&mut self, timeout: Duration) -> Result<usize> {
        match self.channel.recv_timeout(timeout) {
            Ok(Some(envelope)) => {
                self.handle_response(envelope);
                Ok(1 + self.pump()?)
            }
            Ok(None) => Ok(0),
            Err(err) => {
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Apply one worker response
    pub fn handle_response(&mut self, envelope: ResponseEnvelope) {
        let ResponseEnvelope { id, response } = envelope;

        match response {
            Response::Initialized => {
                self.initialized = true;
                debug!("Worker initialized");
            }
            Response::Loaded {
                document_id,
                total_pages,
            } => self.on_loaded(document_id, total_pages),
            Response::PageRendered(page) => self.on_page_rendered(page),
            Response::Cancelled { reason } => {
                debug!(msg_id = %id, %reason, "Request cancelled");
            }
            Response::Closed => {
                debug!("Worker closed document");
            }
            Response::Error {
                request,
                document_id,
                error,
            } => self.on_error(request, document_id, error),
        }
    }

    fn on_loaded(&mut self, document_id: DocumentId, total_pages: usize) {
        if self.pending_document != Some(document_id) {
            debug!(document = %document_id, "Ignoring load completion for replaced document");
            return;
        }

        self.pending_document = None;
        self.current_document = Some(document_id);
        self.loading = false;
        self.view.reset(total_pages);
        info!(document = %document_id, total_pages, "Document ready");

        if let Err(e) = self.render_current_spread() {
            debug!(document = %document_id, error = %e, "Initial spread request failed");
        }
    }

    fn on_page_rendered(&mut self, page: RenderedPage) {
        if self.current_document != Some(page.document_id) {
            debug!(
                document = %page.document_id,
                page_index = page.page_index,
                "Dropping stale page"
            );
            return;
        }
        if self.error.is_some() {
            return;
        }

        let spread = self.view.spread();
        if !spread.requests().any(|wanted| wanted == (page.page_index, page.role)) {
            debug!(
                page_index = page.page_index,
                role = ?page.role,
                "Dropping page no longer in view"
            );
            return;
        }

        // The decoded bitmap lives only for this draw
        let drawn = decode_image(&page.bytes, page.mime_type)
            .and_then(|image| self.canvas.draw(&image, page.role, spread.dual_layout));

        if let Err(err) = drawn {
            self.fail(format!("Failed to display page image: {}", err));
        }
    }

    fn on_error(&mut self, request: RequestKind, document_id: Option<DocumentId>, error: CbzError) {
        let relevant = match document_id {
            None => true,
            Some(id) => Some(id) == self.current_document || Some(id) == self.pending_document,
        };
        if !relevant {
            debug!(?request, %error, "Ignoring error for replaced document");
            return;
        }

        if request == RequestKind::Load {
            self.pending_document = None;
        }
        self.fail(error.to_string());
    }

    fn render_current_spread(&mut self) -> Result<()> {
        let document_id = match self.current_document {
            Some(id) => id,
            None => return Ok(()),
        };

        let spread = self.view.spread();
        for (page_index, role) in spread.requests() {
            self.post(Request::RenderPage {
                page_index,
                document_id,
                role,
            })?;
        }
        Ok(())
    }

    /// Advance one page or spread. Returns whether a new view was requested.
    pub fn next_page(&mut self) -> Result<bool> {
        if !self.can_page() || !self.view.next() {
            return Ok(false);
        }
        self.render_current_spread()?;
        Ok(true)
    }

    /// Go back one page or spread. Returns whether a new view was requested.
    pub fn previous_page(&mut self) -> Result<bool> {
        if !self.can_page() || !self.view.previous() {
            return Ok(false);
        }
        self.render_current_spread()?;
        Ok(true)
    }

    pub fn toggle_dual_page(&mut self) -> Result<()> {
        if self.error.is_some() {
            return Ok(());
        }
        self.view.toggle_dual_page();
        self.render_current_spread()
    }

    /// Page by clicking on the left or right third of the canvas
    pub fn click(&mut self, x: f64) -> Result<bool> {
        match ClickZone::from_position(x, self.canvas.width()) {
            ClickZone::Previous => self.previous_page(),
            ClickZone::Next => self.next_page(),
            ClickZone::None => Ok(false),
        }
    }

    /// Resize the canvas and redraw the current spread
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas.resize(width, height);
        if self.can_page() {
            self.render_current_spread()?;
        }
        Ok(())
    }
}
