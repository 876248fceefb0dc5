//! Progress module
//!
//! A download is a producer/consumer pair: the producer emits zero or more
//! [`ProgressReport`]s and then exactly one outcome; the consumer reads them
//! as a [`futures::Stream`] of [`Event`]s.
//!
//! # Overview
//!
//! - `Reporter` - producer half, finished by value so it can only finish once
//! - `Download` - consumer half, ends after the first `Event::Finished`
//! - `Control` - consumer's answer to a report that asks for one

mod channel;
mod types;

pub use channel::{channel, Download, Reporter};
pub use types::{Control, Event, Progress, ProgressReport};
