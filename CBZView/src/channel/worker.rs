//! Background extraction worker
//!
//! One thread per viewer owns an [`ExtractionSession`]. The viewer and the
//! worker share nothing but two `mpsc` queues: requests in, responses out.
//! The worker exits when the request sender is dropped or when nobody is
//! listening for responses anymore.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error};

use super::protocol::{RequestEnvelope, ResponseEnvelope};
use super::session::ExtractionSession;
use super::Channel;
use crate::utils::error::{CbzError, Result};

const WORKER_THREAD_NAME: &str = "cbz-worker";

pub struct WorkerChannel {
    requests: Option<Sender<RequestEnvelope>>,
    responses: Receiver<ResponseEnvelope>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerChannel {
    /// Start a worker thread with a fresh session
    pub fn spawn(max_entry_size: u64) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                run_worker(ExtractionSession::new(max_entry_size), request_rx, response_tx)
            })
            .map_err(|e| CbzError::ChannelFailure(format!("Failed to spawn worker: {}", e)))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            thread: Some(thread),
        })
    }

    fn disconnected() -> CbzError {
        CbzError::ChannelFailure("Worker is no longer running".to_string())
    }
}

impl Channel for WorkerChannel {
    fn post(&self, envelope: RequestEnvelope) -> Result<()> {
        let sender = self.requests.as_ref().ok_or_else(Self::disconnected)?;
        sender.send(envelope).map_err(|_| Self::disconnected())
    }

    fn try_recv(&self) -> Result<Option<ResponseEnvelope>> {
        match self.responses.try_recv() {
            Ok(envelope) => Ok(Some(envelope)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Self::disconnected()),
        }
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Option<ResponseEnvelope>> {
        match self.responses.recv_timeout(timeout) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Self::disconnected()),
        }
    }
}

impl Drop for WorkerChannel {
    fn drop(&mut self) {
        // Closing the request queue stops the loop
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Worker thread panicked");
            }
        }
    }
}

fn flush(out: &mut Vec<ResponseEnvelope>, responses: &Sender<ResponseEnvelope>) -> bool {
    for envelope in out.drain(..) {
        if responses.send(envelope).is_err() {
            return false;
        }
    }
    true
}

fn run_worker(
    mut session: ExtractionSession,
    requests: Receiver<RequestEnvelope>,
    responses: Sender<ResponseEnvelope>,
) {
    debug!("Worker started");
    let mut out = Vec::new();

    loop {
        // Park until something arrives when there is nothing queued
        if !session.has_work() {
            match requests.recv() {
                Ok(envelope) => session.receive(envelope, &mut out),
                Err(_) => break,
            }
        }

        // Take in everything already sent so loads can cancel queued renders
        // and renders that raced an archive parse are seen as mid-load
        let mut disconnected = false;
        loop {
            match requests.try_recv() {
                Ok(envelope) => session.receive(envelope, &mut out),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if !flush(&mut out, &responses) || disconnected {
            break;
        }

        session.step(&mut out);

        if !flush(&mut out, &responses) {
            break;
        }
    }

    debug!("Worker stopped");
}
