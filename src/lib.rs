//! # reduce-any
//!
//! One reduction engine for in-memory collections, keyed containers, lazy
//! iterators and backpressured push streams.
//!
//! A reduction feeds `(key, element)` pairs to a suspendable reducer and
//! produces a single result. The reducer asks for pairs by yielding the
//! reduction's [`Next`] marker, waits on asynchronous work by yielding a
//! [`Deferred`] value, and returns whenever it likes, including before the
//! source is exhausted.
//!
//! ## Key Features
//!
//! - **Synchronous when possible**: finite sources whose reducer never waits
//!   complete without touching a runtime
//! - **Deferred when needed**: the first wait turns the reduction into a future
//! - **Backpressure**: push producers are paused while a chunk is processed
//! - **Early return**: no pair is pulled or pushed after the reducer returns
//!
//! ## Quick Start
//!
//! ```rust
//! use reduce_any::{Coroutine, done, reduce_any};
//!
//! let reduction = reduce_any(vec!["one", "two", "three"], |next| {
//!   Coroutine::new(move |co| async move {
//!     let mut keys = Vec::new();
//!     while let Some(pair) = co.next_pair(&next).await? {
//!       keys.push(pair.key.as_index().unwrap_or_default());
//!     }
//!     done(keys)
//!   })
//! })
//! .unwrap();
//!
//! let keys = reduction.into_immediate().unwrap();
//! assert_eq!(keys.downcast_ref::<Vec<usize>>(), Some(&vec![0, 1, 2]));
//! ```

#![deny(missing_docs)]

/// Reduction and producer configuration.
pub mod config;
/// Async-block reducers.
pub mod coroutine;
/// Deferred values and the sync-or-async result form.
pub mod deferred;
mod drivers;
/// Faults and reduction errors.
pub mod error;
/// Push producers, sinks and flow control.
pub mod producers;
/// Entry points and result unification.
pub mod reduce;
/// The reducer protocol.
pub mod reducer;
/// Sources and their enumeration.
pub mod source;
/// The step protocol.
pub mod step;
/// Dynamic values, pairs and the `Next` marker.
pub mod value;

pub use config::{ProducerConfig, ReduceConfig};
pub use coroutine::{Co, Coroutine, done};
pub use deferred::Deferred;
pub use error::{Fault, ReduceError};
pub use producers::{IterProducer, Producer, ReaderProducer, Sink, StreamProducer};
pub use reduce::{Reduction, reduce_any, reduce_any_with};
pub use reducer::{Reducer, Resume, State};
pub use source::Source;
pub use value::{Key, Next, Pair, Value, value};
