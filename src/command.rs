//! # Command sessions
//!
//! A [CommandSession] accumulates the response of one outstanding AT command
//! and detects its terminator. Two response grammars share the same scan:
//! plain `OK`/`ERROR` replies and multi-line bodies that end with an
//! `OK`/`ERROR` line.
use heapless::Vec;

const OK_TERMINATOR: &[u8] = b"\r\nOK\r\n";

// No trailing CRLF: error lines may carry detail text after the token.
const ERROR_TERMINATOR: &[u8] = b"\r\nERROR";

/// Status of the current command session
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// No command outstanding, buffer empty
    Clear,
    /// Response bytes are being accumulated
    Receiving,
    /// Response terminated with OK
    Ok,
    /// Response terminated with ERROR
    Error,
    /// Response exceeded the session buffer, accumulation stopped
    Overrun,
}

/// Progress of a single processed response byte
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionProgress {
    /// Response is still incomplete
    Pending,
    /// Session reached a terminal status
    Complete,
}

/// State of one outstanding AT command.
///
/// Exactly one session is live at a time; the adapter rejects a new command
/// while one is outstanding. `N` bounds the accumulated response.
pub struct CommandSession<const N: usize> {
    buffer: Vec<u8, N>,

    /// Position of the last confirmed line boundary (index of its `\r`).
    /// Terminator scans only cover the suffix from this position, since the
    /// terminator keyword sits on the line preceding the CRLF that closes it.
    last_boundary: Option<usize>,

    status: SessionStatus,

    /// Drain further buffered bytes within the same consumer invocation
    fast_process: bool,
}

impl<const N: usize> CommandSession<N> {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            last_boundary: None,
            status: SessionStatus::Clear,
            fast_process: false,
        }
    }

    /// Resets the session to [SessionStatus::Clear]. Idempotent.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_boundary = None;
        self.status = SessionStatus::Clear;
        self.fast_process = false;
    }

    /// Starts a fresh session in [SessionStatus::Receiving].
    pub fn begin(&mut self, fast_process: bool) {
        self.reset();
        self.status = SessionStatus::Receiving;
        self.fast_process = fast_process;
    }

    /// Accumulates one response byte and scans for a terminator.
    pub fn process(&mut self, byte: u8) -> SessionProgress {
        if self.buffer.push(byte).is_err() {
            self.status = SessionStatus::Overrun;
            return SessionProgress::Complete;
        }

        let len = self.buffer.len();
        if byte == b'\n' && len >= 2 && self.buffer[len - 2] == b'\r' {
            if let Some(mark) = self.last_boundary {
                let window = &self.buffer[mark..];

                if find_token(window, OK_TERMINATOR).is_some() {
                    self.status = SessionStatus::Ok;
                    return SessionProgress::Complete;
                }

                if find_token(window, ERROR_TERMINATOR).is_some() {
                    self.status = SessionStatus::Error;
                    return SessionProgress::Complete;
                }
            }

            self.last_boundary = Some(len - 2);
        }

        SessionProgress::Pending
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True once the session reached a terminal status
    pub fn is_ready(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Ok | SessionStatus::Error | SessionStatus::Overrun
        )
    }

    pub fn fast_process(&self) -> bool {
        self.fast_process
    }

    /// The accumulated response, valid until the next [begin](Self::begin)
    pub fn response(&self) -> &[u8] {
        &self.buffer
    }
}

impl<const N: usize> Default for CommandSession<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the position of the first occurrence of `token` in `data`.
pub(crate) fn find_token(data: &[u8], token: &[u8]) -> Option<usize> {
    data.windows(token.len()).position(|window| window == token)
}
