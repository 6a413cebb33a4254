//! # Infrastructure Adapters
//!
//! Outbound provider implementations of the [`SmsSender`](crate::dispatch::SmsSender) interface.

pub mod twilio;

pub use twilio::{TwilioConfig, TwilioSender};
