//! # AT command core for SPWF01 WiFi modules
//!
//! Interrupt-driven communication core for driving an SPWF01-style WiFi
//! module over a serial link: a single-producer/single-consumer receive
//! queue fed from the receive interrupt, an asynchronous indication parser
//! (`+WIND` link-state changes, `+BTTN` remote button events), a
//! command/response engine with blocking and non-blocking completion and an
//! HTTP GET helper on top of the module's built-in HTTP client.
//!
//! The crate contains no hardware access: byte transmission and power
//! control go through [transport::Transport], received bytes enter through
//! [buffer::RxQueue::push] from the receive interrupt, and timeouts are
//! measured with a [fugit_timer::Timer].
//!
//! ## Example
//!
//! ````
//! use spwf_at_core::adapter::Adapter;
//! use spwf_at_core::buffer::RxQueue;
//! use spwf_at_core::example::{ExampleConfig, ExampleTimer, ExampleTransport};
//! use spwf_at_core::link::LinkMask;
//!
//! // Shared with the receive interrupt in production
//! static QUEUE: RxQueue<512> = RxQueue::new();
//!
//! let transport = ExampleTransport::new(&QUEUE);
//! let mut adapter: Adapter<_, _, _, 1_000_000, 512, 512, 128> =
//!     Adapter::new(transport, ExampleTimer::default(), ExampleConfig::default(), &QUEUE);
//!
//! adapter.power_on();
//! adapter.wait_for_link(LinkMask::CONSOLE_ACTIVE).unwrap();
//!
//! let status = adapter.http_get("http://example.com/ping").unwrap();
//! assert_eq!(200, status);
//! ````
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod adapter;
pub mod buffer;
pub mod command;
pub mod config;
#[cfg(feature = "examples")]
pub mod example;
pub mod http;
pub mod link;
pub mod transport;
pub mod urc;

#[cfg(test)]
mod tests;
