//! # HTTP requests
//!
//! The module ships a built-in HTTP client driven by `AT+S.HTTPGET`. The
//! response body (status line and headers) arrives as a multi-line command
//! response, so requests run in fast-process mode: the whole body must be
//! drained before the module sends its next unsolicited indication.
//!
//! ## Example
//!
//! ````
//! use spwf_at_core::adapter::Adapter;
//! use spwf_at_core::buffer::RxQueue;
//! use spwf_at_core::example::{ExampleConfig, ExampleTimer, ExampleTransport};
//! use spwf_at_core::link::LinkMask;
//!
//! let queue: RxQueue<512> = RxQueue::new();
//! let transport = ExampleTransport::new(&queue);
//! let mut adapter: Adapter<_, _, _, 1_000_000, 512, 512, 128> =
//!     Adapter::new(transport, ExampleTimer::default(), ExampleConfig::default(), &queue);
//!
//! adapter.power_on();
//! adapter.wait_for_link(LinkMask::CONSOLE_ACTIVE).unwrap();
//!
//! let status = adapter.http_get("http://example.com/ping").unwrap();
//! assert_eq!(200, status);
//! ````
use crate::adapter::{Adapter, CommandError};
use crate::command::find_token;
use crate::config::ConfigHandle;
use crate::transport::Transport;
use core::fmt::Write;
use fugit_timer::Timer;
use heapless::String;

const STATUS_TOKEN: &[u8] = b"HTTP/1.";

/// Offset of the status code relative to the token start, fixed by the
/// `HTTP/1.x NNN` prefix of a standard status line
const STATUS_OFFSET: usize = 9;

impl<
        Tx: Transport,
        T: Timer<TIMER_HZ>,
        C: ConfigHandle,
        const TIMER_HZ: u32,
        const QUEUE_SIZE: usize,
        const RX_SIZE: usize,
        const CMD_SIZE: usize,
    > Adapter<'_, Tx, T, C, TIMER_HZ, QUEUE_SIZE, RX_SIZE, CMD_SIZE>
{
    /// Performs a blocking HTTP GET request through the module and returns
    /// the status code of the server's response.
    ///
    /// Returns `0` if the module reported an error, the response carries no
    /// status line, or the status code is malformed. Engine-level failures
    /// (busy, timeouts, buffer overflow) are returned as errors.
    pub fn http_get(&mut self, url: &str) -> Result<u16, CommandError> {
        let mut command: String<CMD_SIZE> = String::new();
        write!(&mut command, "AT+S.HTTPGET={}", url).map_err(|_| CommandError::CommandOverflow)?;

        self.submit(&command, true)?;

        match self.wait_for_completion() {
            Ok(()) => Ok(parse_status(self.response())),
            Err(CommandError::Failed) => Ok(0),
            Err(error) => Err(error),
        }
    }
}

/// Extracts the 3-digit status code from a raw HTTP response, `0` if the
/// status line is absent or malformed.
pub(crate) fn parse_status(response: &[u8]) -> u16 {
    let start = match find_token(response, STATUS_TOKEN) {
        Some(position) => position + STATUS_OFFSET,
        None => return 0,
    };

    let code = match response.get(start..start + 3) {
        Some(code) => code,
        None => return 0,
    };

    if !code.iter().all(|digit| digit.is_ascii_digit()) {
        return 0;
    }

    code.iter().fold(0, |status, digit| status * 10 + (digit - b'0') as u16)
}
