//! # Transport seam
//!
//! The core never touches hardware directly. Byte transmission and module
//! power control are provided by the host through [Transport]; received
//! bytes enter through [RxQueue](crate::buffer::RxQueue::push) from the
//! receive interrupt.

/// Serial link and power control towards the WiFi module.
///
/// `write` transmits blocking and in order, like a polled UART send loop.
/// Power control toggles the module's enable pin.
pub trait Transport {
    /// Transmits all bytes, blocking until the last one is accepted
    fn write(&mut self, bytes: &[u8]);

    /// Powers the module on
    fn power_on(&mut self);

    /// Powers the module off
    fn power_off(&mut self);
}
