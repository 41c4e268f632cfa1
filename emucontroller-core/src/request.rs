//! Operation requests and their single-shot completion
//!
//! A [`Request`] travels through the dispatcher (and possibly the deferred
//! read queue) while the originator keeps the matching [`RequestHandle`].
//! The two share a tri-state marker so that exactly one terminal outcome is
//! ever recorded, whichever side gets there first.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{HidError, HidResult};
use crate::ioctl::IoControlCode;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique request identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Completion marker shared by a request and its handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum CompletionState {
    Pending = 0,
    Completed = 1,
    Canceled = 2,
}

impl CompletionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Pending,
            1 => Self::Completed,
            _ => Self::Canceled,
        }
    }
}

#[derive(Debug)]
struct SharedState(AtomicU8);

impl SharedState {
    fn new() -> Self {
        Self(AtomicU8::new(CompletionState::Pending as u8))
    }

    fn get(&self) -> CompletionState {
        CompletionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move Pending → `to`. Returns false if another outcome already won.
    fn finish(&self, to: CompletionState) -> bool {
        self.0
            .compare_exchange(
                CompletionState::Pending as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Terminal outcome delivered to the originator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub id: RequestId,
    pub code: IoControlCode,
    /// Bytes written on success, or the failure kind
    pub result: HidResult,
    /// Output buffer, truncated to the bytes actually written
    pub output: Vec<u8>,
}

impl Completion {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// NTSTATUS-style code for this outcome
    pub fn ntstatus(&self) -> u32 {
        match &self.result {
            Ok(_) => crate::error::status::SUCCESS,
            Err(e) => e.ntstatus(),
        }
    }

    /// Number of bytes written (0 on failure)
    pub fn information(&self) -> usize {
        self.result.as_ref().copied().unwrap_or(0)
    }
}

/// One inbound operation
///
/// Owns the input bytes and a zero-filled output buffer of the capacity the
/// caller asked for. Consumed by [`Request::complete`], so it can only ever be
/// completed once.
pub struct Request {
    id: RequestId,
    code: IoControlCode,
    input: Vec<u8>,
    output: Vec<u8>,
    state: Arc<SharedState>,
    tx: oneshot::Sender<Completion>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("input_len", &self.input.len())
            .field("output_capacity", &self.output.len())
            .field("state", &self.state.get())
            .finish()
    }
}

impl Request {
    /// Create a request and the handle its originator waits on
    pub fn new(
        code: IoControlCode,
        input: Vec<u8>,
        output_capacity: usize,
    ) -> (Request, RequestHandle) {
        let id = RequestId::next();
        let state = Arc::new(SharedState::new());
        let (tx, rx) = oneshot::channel();
        let request = Request {
            id,
            code,
            input,
            output: vec![0u8; output_capacity],
            state: Arc::clone(&state),
            tx,
        };
        let handle = RequestHandle {
            id,
            code,
            state,
            rx: Some(rx),
        };
        (request, handle)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn code(&self) -> IoControlCode {
        self.code
    }

    /// Caller-supplied input bytes
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Capacity of the caller's output buffer
    pub fn output_capacity(&self) -> usize {
        self.output.len()
    }

    pub fn state(&self) -> CompletionState {
        self.state.get()
    }

    /// Originator has withdrawn (explicitly or by dropping its handle)
    pub fn is_canceled(&self) -> bool {
        self.state.get() == CompletionState::Canceled
    }

    /// Copy `src` into the output buffer.
    ///
    /// Fails without touching the buffer if it cannot hold all of `src`.
    pub fn write_output(&mut self, src: &[u8]) -> HidResult {
        if src.len() > self.output.len() {
            return Err(HidError::BufferTooSmall {
                required: src.len(),
                available: self.output.len(),
            });
        }
        self.output[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    /// Signal the originator. Consumes the request.
    ///
    /// Returns false when the originator had already canceled; in that case
    /// nothing is delivered.
    pub fn complete(self, result: HidResult) -> bool {
        self.finish(CompletionState::Completed, result)
    }

    /// Deliver the cancellation outcome. Consumes the request.
    pub(crate) fn cancel(self) -> bool {
        self.finish(CompletionState::Canceled, Err(HidError::Cancelled))
    }

    fn finish(self, to: CompletionState, result: HidResult) -> bool {
        if !self.state.finish(to) {
            debug!(
                "Request {} ({}) already {:?}, dropping outcome",
                self.id,
                self.code.name(),
                self.state.get()
            );
            return false;
        }

        let mut output = self.output;
        output.truncate(*result.as_ref().unwrap_or(&0));

        debug!(
            "Completing {} {} -> {:?}",
            self.id,
            self.code.name(),
            result
        );
        // Receiver gone means the originator stopped listening; state is final either way
        let _ = self.tx.send(Completion {
            id: self.id,
            code: self.code,
            result,
            output,
        });
        true
    }
}

/// Originator's side of a request
#[derive(Debug)]
pub struct RequestHandle {
    id: RequestId,
    code: IoControlCode,
    state: Arc<SharedState>,
    rx: Option<oneshot::Receiver<Completion>>,
}

impl RequestHandle {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn code(&self) -> IoControlCode {
        self.code
    }

    pub fn state(&self) -> CompletionState {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state.get() == CompletionState::Pending
    }

    /// Wait for the terminal outcome
    pub async fn wait(mut self) -> Completion {
        let Some(rx) = self.rx.take() else {
            return self.lost();
        };
        match rx.await {
            Ok(completion) => completion,
            Err(_) => self.lost(),
        }
    }

    /// Block the current thread until the outcome arrives.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_wait(mut self) -> Completion {
        let Some(rx) = self.rx.take() else {
            return self.lost();
        };
        match rx.blocking_recv() {
            Ok(completion) => completion,
            Err(_) => self.lost(),
        }
    }

    /// Outcome if it has already been delivered
    pub fn try_result(&mut self) -> Option<Completion> {
        let rx = self.rx.as_mut()?;
        match rx.try_recv() {
            Ok(completion) => {
                self.rx = None;
                Some(completion)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.rx = None;
                Some(self.lost())
            }
        }
    }

    /// The request was dropped without an outcome (e.g. its device went away)
    fn lost(&self) -> Completion {
        Completion {
            id: self.id,
            code: self.code,
            result: Err(HidError::Cancelled),
            output: Vec::new(),
        }
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        // Teardown while still pending: make sure nobody completes it later
        if self.rx.is_some() && self.state.finish(CompletionState::Canceled) {
            debug!("Request {} withdrawn by its originator", self.id);
        }
    }
}
