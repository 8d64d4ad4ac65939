//! # AT command engine
//!
//! [Adapter] is the single coordinating object of the core: it owns the link
//! state, the indication frame accumulator and the command session, drains
//! the receive queue and routes every byte either to the indication parser
//! (no command outstanding) or to the session (response accumulation).
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
//! // Power on and wait for the AT console
//! adapter.power_on();
//! adapter.wait_for_link(LinkMask::CONSOLE_ACTIVE).unwrap();
//!
//! // Plain command with OK/ERROR response
//! adapter.send_command_blocking("AT+S.SCFG=blink_led,1").unwrap();
//! ````
use crate::buffer::RxQueue;
use crate::command::{find_token, CommandSession, SessionProgress, SessionStatus};
use crate::config::{ConfigField, ConfigHandle};
use crate::link::{LinkMask, LinkState};
use crate::transport::Transport;
use crate::urc::{self, ButtonAction, FrameAccumulator, FrameProgress, Indication, WindIndication};
use fugit::{ExtU32, TimerDurationU32};
use fugit_timer::Timer;
use heapless::Vec;
use log::{debug, warn};

const SSID_PREFIX: &[u8] = b"#  wifi_ssid = ";

/// Routing of consumed bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RxMode {
    /// No command outstanding, bytes feed the indication parser
    Indication,
    /// Command outstanding, bytes feed the session buffer
    Response,
}

/// Possible errors of command execution
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// A command session is already outstanding. The engine is not
    /// reentrant, the previous session must complete or be aborted first.
    Busy,

    /// Composed command text exceeds the command buffer
    CommandOverflow,

    /// Console did not become active within the configured link timeout
    ConsoleTimeout,

    /// No OK/ERROR terminator within the configured command timeout
    Timeout,

    /// Module answered with ERROR
    Failed,

    /// Response exceeded the session buffer
    ResponseOverrun,

    /// Upstream timer error
    TimerError,
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            CommandError::Busy => defmt::write!(f, "CommandError::Busy"),
            CommandError::CommandOverflow => defmt::write!(f, "CommandError::CommandOverflow"),
            CommandError::ConsoleTimeout => defmt::write!(f, "CommandError::ConsoleTimeout"),
            CommandError::Timeout => defmt::write!(f, "CommandError::Timeout"),
            CommandError::Failed => defmt::write!(f, "CommandError::Failed"),
            CommandError::ResponseOverrun => defmt::write!(f, "CommandError::ResponseOverrun"),
            CommandError::TimerError => defmt::write!(f, "CommandError::TimerError"),
        }
    }
}

/// Possible errors while waiting on a link milestone
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// Milestone not reached within the configured link timeout
    Timeout,

    /// Upstream timer error
    TimerError,
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LinkError::Timeout => defmt::write!(f, "LinkError::Timeout"),
            LinkError::TimerError => defmt::write!(f, "LinkError::TimerError"),
        }
    }
}

/// Central AT command engine.
///
/// QUEUE_SIZE: Capacity of the shared receive queue. Must absorb the worst
/// case burst between two consumer invocations at the configured baud rate.
///
/// RX_SIZE: Capacity of the response accumulation buffer. HTTP responses
/// must fit completely.
///
/// CMD_SIZE: Capacity for composed command text, e.g. `AT+S.HTTPGET=<url>`.
pub struct Adapter<
    'q,
    Tx: Transport,
    T: Timer<TIMER_HZ>,
    C: ConfigHandle,
    const TIMER_HZ: u32,
    const QUEUE_SIZE: usize,
    const RX_SIZE: usize,
    const CMD_SIZE: usize,
> {
    /// Serial link and power control
    pub(crate) transport: Tx,

    /// Timer used for timeout measurement and delays
    pub(crate) timer: T,

    /// Host configuration store, updated by button indications
    pub(crate) config: C,

    /// Receive queue shared with the receive interrupt
    queue: &'q RxQueue<QUEUE_SIZE>,

    /// Link milestones reached so far, updated by WIND indications
    pub(crate) link: LinkState,

    /// Current byte routing
    mode: RxMode,

    frame: FrameAccumulator,

    pub(crate) session: CommandSession<RX_SIZE>,

    /// Timeout for command completion
    command_timeout: TimerDurationU32<TIMER_HZ>,

    /// Timeout for link milestone waits
    link_timeout: TimerDurationU32<TIMER_HZ>,
}

impl<
        'q,
        Tx: Transport,
        T: Timer<TIMER_HZ>,
        C: ConfigHandle,
        const TIMER_HZ: u32,
        const QUEUE_SIZE: usize,
        const RX_SIZE: usize,
        const CMD_SIZE: usize,
    > Adapter<'q, Tx, T, C, TIMER_HZ, QUEUE_SIZE, RX_SIZE, CMD_SIZE>
{
    /// Creates a new engine sharing the given receive queue with the
    /// receive interrupt.
    pub fn new(transport: Tx, timer: T, config: C, queue: &'q RxQueue<QUEUE_SIZE>) -> Self {
        Self {
            transport,
            timer,
            config,
            queue,
            link: LinkState::off(),
            mode: RxMode::Indication,
            frame: FrameAccumulator::new(),
            session: CommandSession::new(),
            command_timeout: 30_000.millis(),
            link_timeout: 10_000.millis(),
        }
    }

    /// Consumes at most one buffered byte. Call from the periodic tick.
    ///
    /// While a response is accumulating in fast-process mode, further
    /// buffered bytes are drained within the same call (bounded by queue
    /// emptiness), so latency-sensitive responses complete before the module
    /// sends its next indication. Bytes are always processed in arrival
    /// order.
    pub fn poll(&mut self) {
        loop {
            let byte = match self.queue.pop() {
                Some(byte) => byte,
                None => return,
            };

            match self.mode {
                RxMode::Indication => {
                    match self.frame.push(byte) {
                        FrameProgress::Pending => {}
                        FrameProgress::Overrun => warn!("indication frame overrun, partial frame dropped"),
                        FrameProgress::Complete => self.dispatch_frame(),
                    }
                    return;
                }
                RxMode::Response => {
                    let fast_process = self.session.fast_process();

                    match self.session.process(byte) {
                        SessionProgress::Complete => {
                            debug!("command session complete: {:?}", self.session.status());
                            self.mode = RxMode::Indication;
                            return;
                        }
                        SessionProgress::Pending => {
                            if !fast_process {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Classifies a completed indication frame and applies its effect
    fn dispatch_frame(&mut self) {
        match urc::parse(self.frame.frame()) {
            Indication::Wind(WindIndication::Undefined) => {
                warn!("undefined WIND indication: {:?}", self.frame.frame())
            }
            Indication::Wind(wind) => self.link.apply(wind),
            Indication::Button(ButtonAction::SetUrl1(url)) => self.config.set(ConfigField::Url1, url),
            Indication::Button(ButtonAction::Undefined) => {
                warn!("undefined BTTN indication: {:?}", self.frame.frame())
            }
            Indication::Unrecognized => warn!("unrecognized indication frame: {:?}", self.frame.frame()),
        }

        self.frame.clear();
    }

    /// Powers the module on. Indications report the boot progress.
    pub fn power_on(&mut self) {
        self.transport.power_on();
    }

    /// Powers the module off. The link state is left untouched, see
    /// [hard_reset](Self::hard_reset) for a full power cycle.
    pub fn power_off(&mut self) {
        self.transport.power_off();
    }

    /// Full power cycle: off, one second settle time, on, then waits for the
    /// power-on milestone.
    pub fn hard_reset(&mut self) -> Result<(), LinkError> {
        self.transport.power_off();
        self.link = LinkState::off();
        self.delay(1_000.millis())?;
        self.transport.power_on();
        self.wait_for_link(LinkMask::POWER_ON)
    }

    /// Resets the module with `AT+CFUN=1` and waits for the power-on
    /// milestone.
    ///
    /// The reset command is transmitted outside a command session: the
    /// module answers with indications, not with an OK/ERROR response.
    pub fn soft_reset(&mut self) -> Result<(), LinkError> {
        self.wait_for_link(LinkMask::CONSOLE_ACTIVE)?;

        // Unset the milestone so the wait below observes the new power on.
        self.link.lower(LinkMask::POWER_ON);

        self.transport.write(b"AT+CFUN=1\r");
        self.wait_for_link(LinkMask::POWER_ON)
    }

    /// Submits a command without blocking for its response.
    ///
    /// Completion can be queried with [command_ready](Self::command_ready)
    /// or awaited with [wait_for_completion](Self::wait_for_completion).
    pub fn send_command(&mut self, command: &str) -> Result<(), CommandError> {
        self.submit(command, false)
    }

    /// Submits a command and blocks until its response terminates.
    pub fn send_command_blocking(&mut self, command: &str) -> Result<(), CommandError> {
        self.send_command(command)?;
        self.wait_for_completion()
    }

    /// Transmits the command and switches byte routing to the session.
    pub(crate) fn submit(&mut self, command: &str, fast_process: bool) -> Result<(), CommandError> {
        if self.mode == RxMode::Response {
            return Err(CommandError::Busy);
        }

        match self.wait_for_link(LinkMask::CONSOLE_ACTIVE) {
            Err(LinkError::Timeout) => return Err(CommandError::ConsoleTimeout),
            Err(LinkError::TimerError) => return Err(CommandError::TimerError),
            Ok(()) => {}
        }

        debug!("sending command: {}", command);
        self.session.begin(fast_process);
        self.transport.write(command.as_bytes());
        self.transport.write(b"\r");
        self.mode = RxMode::Response;

        Ok(())
    }

    /// Blocks until the outstanding session terminates or the command
    /// timeout expires.
    pub fn wait_for_completion(&mut self) -> Result<(), CommandError> {
        self.timer.start(self.command_timeout).map_err(|_| CommandError::TimerError)?;

        loop {
            self.poll();

            match self.session.status() {
                SessionStatus::Ok => return Ok(()),
                SessionStatus::Error => return Err(CommandError::Failed),
                SessionStatus::Overrun => return Err(CommandError::ResponseOverrun),
                SessionStatus::Clear | SessionStatus::Receiving => {}
            }

            match self.timer.wait() {
                Ok(()) => return Err(CommandError::Timeout),
                Err(nb::Error::Other(_)) => return Err(CommandError::TimerError),
                Err(nb::Error::WouldBlock) => {}
            }
        }
    }

    /// Non-blocking completion query, drives one consumer step
    pub fn command_ready(&mut self) -> bool {
        self.poll();
        self.session.is_ready()
    }

    /// Status of the current command session
    pub fn command_status(&self) -> SessionStatus {
        self.session.status()
    }

    /// The accumulated response of the last session, valid until the next
    /// submitted command
    pub fn response(&self) -> &[u8] {
        self.session.response()
    }

    /// Abandons a stalled session and reroutes bytes to the indication
    /// parser. Recovery point for responses that never terminate.
    pub fn abort_command(&mut self) {
        self.session.reset();
        self.mode = RxMode::Indication;
    }

    /// Blocks until any of the masked link milestones is reached or the
    /// link timeout expires.
    pub fn wait_for_link(&mut self, mask: LinkMask) -> Result<(), LinkError> {
        self.timer.start(self.link_timeout).map_err(|_| LinkError::TimerError)?;

        loop {
            if self.link.contains_any(mask) {
                return Ok(());
            }

            self.poll();

            match self.timer.wait() {
                Ok(()) => return Err(LinkError::Timeout),
                Err(nb::Error::Other(_)) => return Err(LinkError::TimerError),
                Err(nb::Error::WouldBlock) => {}
            }
        }
    }

    /// Link milestones reached so far
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Queries the configured SSID with `AT+S.GCFG=wifi_ssid`.
    ///
    /// The module reports the SSID as colon separated hex bytes; the decoded
    /// bytes are returned (empty if the response carries no SSID entry).
    pub fn ssid(&mut self) -> Result<Vec<u8, 32>, CommandError> {
        self.send_command_blocking("AT+S.GCFG=wifi_ssid")?;
        Ok(parse_ssid(self.session.response()))
    }

    /// Sets the timeout for command completion in ms
    pub fn set_command_timeout_ms(&mut self, timeout: u32) {
        self.command_timeout = TimerDurationU32::millis(timeout);
    }

    /// Sets the timeout for link milestone waits in ms
    pub fn set_link_timeout_ms(&mut self, timeout: u32) {
        self.link_timeout = TimerDurationU32::millis(timeout);
    }

    fn delay(&mut self, duration: TimerDurationU32<TIMER_HZ>) -> Result<(), LinkError> {
        self.timer.start(duration).map_err(|_| LinkError::TimerError)?;
        nb::block!(self.timer.wait()).map_err(|_| LinkError::TimerError)
    }
}

/// Extracts the SSID bytes from a `AT+S.GCFG=wifi_ssid` response
fn parse_ssid(response: &[u8]) -> Vec<u8, 32> {
    let mut ssid = Vec::new();

    let start = match find_token(response, SSID_PREFIX) {
        Some(position) => position + SSID_PREFIX.len(),
        None => return ssid,
    };

    let mut rest = &response[start..];
    while let [first, remainder @ ..] = rest {
        if !first.is_ascii_hexdigit() || ssid.is_full() {
            break;
        }

        let mut value = hex_value(*first);
        rest = remainder;

        if let [second, remainder @ ..] = rest {
            if second.is_ascii_hexdigit() {
                value = value * 16 + hex_value(*second);
                rest = remainder;
            }
        }

        if let [b':', remainder @ ..] = rest {
            rest = remainder;
        }

        // Capacity checked above
        let _ = ssid.push(value);
    }

    ssid
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        _ => digit.to_ascii_lowercase() - b'a' + 10,
    }
}
