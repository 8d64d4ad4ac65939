//! # Asynchronous indications
//!
//! While no command is outstanding, the module may send unsolicited
//! indication frames at any time. A frame is delimited by a leading and a
//! trailing `\r\n` pair and carries either a `+WIND:<id>` link-state change
//! or a `+BTTN:<id>` remote button event.
use crate::command::find_token;

/// Accumulation capacity for a single indication frame
pub const FRAME_CAPACITY: usize = 64;

const WIND_TAG: &[u8] = b"+WIND:";
const BTTN_TAG: &[u8] = b"+BTTN:";

/// Known `+WIND` link-state indications
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindIndication {
    /// AT console is ready for commands (id 0)
    ConsoleActive,
    /// Module is resetting (id 2)
    Reset,
    /// Associated with the access point (id 6)
    Associated,
    /// Module completed power on (id 11)
    PowerOn,
    /// Joined the network (id 19)
    Joined,
    /// Link is up (id 24)
    Up,
    /// Valid WIND frame with an unmapped id, ignored
    Undefined,
}

impl WindIndication {
    fn from_id(id: u8) -> Self {
        match id {
            0 => Self::ConsoleActive,
            2 => Self::Reset,
            6 => Self::Associated,
            11 => Self::PowerOn,
            19 => Self::Joined,
            24 => Self::Up,
            _ => Self::Undefined,
        }
    }
}

/// Known `+BTTN` remote button events
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction<'a> {
    /// Remote request to set URL slot 1 (id 1), carrying the new URL
    SetUrl1(&'a [u8]),
    /// Valid BTTN frame with an unmapped id, ignored
    Undefined,
}

/// A classified indication frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Indication<'a> {
    Wind(WindIndication),
    Button(ButtonAction<'a>),
    /// Frame matched neither indication category. Non-fatal, the frame is
    /// dropped.
    Unrecognized,
}

/// Classifies a complete indication frame.
pub fn parse(frame: &[u8]) -> Indication<'_> {
    if let Some((id, _)) = decode_id(frame, WIND_TAG) {
        return Indication::Wind(WindIndication::from_id(id));
    }

    if let Some((id, payload)) = decode_id(frame, BTTN_TAG) {
        return Indication::Button(match id {
            1 => ButtonAction::SetUrl1(payload),
            _ => ButtonAction::Undefined,
        });
    }

    Indication::Unrecognized
}

/// Decodes the indication id following the given tag.
///
/// Ids are unsigned decimal with one or two digits: the second digit is only
/// read if the character after the first one is not `:`. Returns the id and
/// the payload between the id's closing `:` and the trailing CRLF (empty if
/// the id is not followed by `:`).
fn decode_id<'a>(frame: &'a [u8], tag: &[u8]) -> Option<(u8, &'a [u8])> {
    let start = find_token(frame, tag)? + tag.len();

    let first = *frame.get(start)?;
    if !first.is_ascii_digit() {
        return None;
    }

    let mut id = first - b'0';
    let mut next = start + 1;

    if frame.get(next) != Some(&b':') {
        let second = *frame.get(next)?;
        if !second.is_ascii_digit() {
            return None;
        }

        id = id * 10 + (second - b'0');
        next += 1;
    }

    let payload = match frame.get(next) {
        Some(b':') => trim_crlf(&frame[next + 1..]),
        _ => &[],
    };

    Some((id, payload))
}

fn trim_crlf(data: &[u8]) -> &[u8] {
    match data {
        [head @ .., b'\r', b'\n'] => head,
        _ => data,
    }
}

/// Progress of the indication frame accumulation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameProgress {
    /// Frame is still incomplete
    Pending,
    /// Trailing CRLF received, [frame](FrameAccumulator::frame) holds a
    /// complete frame until the next [clear](FrameAccumulator::clear)
    Complete,
    /// Frame exceeded [FRAME_CAPACITY], the partial frame was dropped
    Overrun,
}

/// Accumulates bytes into indication frames.
///
/// A frame is complete once it holds more than two bytes and ends with
/// `\r\n`: the leading CRLF pair opens the frame, the second one closes it.
pub struct FrameAccumulator {
    buffer: heapless::Vec<u8, FRAME_CAPACITY>,

    /// Previously accumulated byte, for CRLF detection across pushes
    previous: u8,
}

impl FrameAccumulator {
    pub const fn new() -> Self {
        Self {
            buffer: heapless::Vec::new(),
            previous: 0,
        }
    }

    /// Accumulates one byte and reports the resulting frame progress.
    pub fn push(&mut self, byte: u8) -> FrameProgress {
        if self.buffer.push(byte).is_err() {
            self.clear();
            return FrameProgress::Overrun;
        }

        if self.buffer.len() > 2 && self.previous == b'\r' && byte == b'\n' {
            self.previous = 0;
            return FrameProgress::Complete;
        }

        self.previous = byte;
        FrameProgress::Pending
    }

    /// The accumulated frame content
    pub fn frame(&self) -> &[u8] {
        &self.buffer
    }

    /// Discards the accumulated frame
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.previous = 0;
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
