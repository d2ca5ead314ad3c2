//! Types and traits for recording per-step diagnostics.
//!
//! Environments emit a [`Record`] alongside every [`Step`](crate::Step). A record is a
//! small key-value container; a [`Recorder`] decides what to do with it (keep it in
//! memory with [`BufferedRecorder`], drop it with [`NullRecorder`], or write it somewhere).
//!
//! ```rust
//! use strider_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("step", RecordValue::Scalar(1.0));
//! record.insert("reward", RecordValue::Scalar(0.5));
//! assert_eq!(record.get_scalar("reward").unwrap(), 0.5);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
