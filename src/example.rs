//! Mocks for doc examples
use crate::buffer::RxQueue;
use crate::config::{ConfigField, ConfigHandle};
use crate::transport::Transport;
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Transport mock simulating the module: written commands are answered by
/// feeding canned response bytes into the receive queue.
pub struct ExampleTransport<'a, const N: usize> {
    queue: &'a RxQueue<N>,

    /// Command bytes accumulated until the terminating carriage return
    command: heapless::Vec<u8, 128>,
}

impl<'a, const N: usize> ExampleTransport<'a, N> {
    pub fn new(queue: &'a RxQueue<N>) -> Self {
        Self {
            queue,
            command: heapless::Vec::new(),
        }
    }

    fn feed(&self, bytes: &[u8]) {
        for byte in bytes {
            self.queue.push(*byte);
        }
    }

    fn reply(&mut self) {
        if self.command.starts_with(b"AT+S.HTTPGET=") {
            self.feed(b"\r\nHTTP/1.0 200 OK\r\nServer: example\r\nOK\r\n");
        } else {
            self.feed(b"\r\nOK\r\n");
        }
    }
}

impl<const N: usize> Transport for ExampleTransport<'_, N> {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            if *byte == b'\r' {
                self.reply();
                self.command.clear();
            } else {
                let _ = self.command.push(*byte);
            }
        }
    }

    fn power_on(&mut self) {
        self.feed(b"\r\n+WIND:11:Poweron\r\n\r\n+WIND:0:Console active\r\n");
    }

    fn power_off(&mut self) {}
}

/// Timer mock
#[derive(Default)]
pub struct ExampleTimer {}

impl Timer<1_000_000> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<1000000> {
        unimplemented!()
    }

    fn start(&mut self, _duration: TimerDurationU32<1000000>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        unimplemented!()
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        nb::Result::Err(nb::Error::WouldBlock)
    }
}

/// Configuration store mock discarding all updates
#[derive(Default)]
pub struct ExampleConfig {}

impl ConfigHandle for ExampleConfig {
    fn load(&mut self) {}

    fn commit(&mut self) {}

    fn set(&mut self, _field: ConfigField, _value: &[u8]) {}

    fn request_commit(&mut self) {}

    fn handle_change(&mut self) {}
}
