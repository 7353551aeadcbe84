//! # Entry Points and Result Unification
//!
//! [`reduce_any`] picks a driver from the source's shape and decides the
//! return form:
//!
//! - finite source, no step ever waited → [`Reduction::Immediate`]
//! - finite source, some step waited → [`Reduction::Deferred`]
//! - stream → always [`Reduction::Deferred`]
//! - anything else → `Err(ReduceError::NotEnumerable)` before the reducer is
//!   even created
//!
//! A reducer failing on the synchronous path is returned as `Err` right away;
//! on the deferred path it rejects the future.
//!
//! ## Example
//!
//! ```rust
//! use reduce_any::coroutine::{Coroutine, done};
//! use reduce_any::reduce::{reduce_any, Reduction};
//!
//! let reduction = reduce_any(vec![1i64, 2, 3], |next| {
//!   Coroutine::new(move |co| async move {
//!     let mut sum = 0i64;
//!     while let Some(pair) = co.next_pair(&next).await? {
//!       sum += pair.element_as::<i64>().copied().unwrap_or_default();
//!     }
//!     done(sum)
//!   })
//! })
//! .unwrap();
//!
//! match reduction {
//!   Reduction::Immediate(sum) => assert_eq!(sum.downcast_ref::<i64>(), Some(&6)),
//!   Reduction::Deferred(_) => unreachable!("nothing was awaited"),
//! }
//! ```

use crate::config::ReduceConfig;
use crate::drivers::Run;
use crate::drivers::pull::drive_finite;
use crate::drivers::push::drive_stream;
use crate::error::ReduceError;
use crate::reducer::Reducer;
use crate::source::Source;
use crate::value::{Next, Value};
use futures::future::{self, BoxFuture};
use std::fmt;
use std::future::IntoFuture;
use tracing::{Instrument, debug, info_span};

/// Result of starting a reduction.
pub enum Reduction {
  /// The reduction completed without waiting on anything.
  Immediate(Value),
  /// The reduction settles later.
  Deferred(BoxFuture<'static, Result<Value, ReduceError>>),
}

impl Reduction {
  /// True if the result is only available by awaiting.
  pub fn is_deferred(&self) -> bool {
    matches!(self, Reduction::Deferred(_))
  }

  /// The result, if it was available without waiting.
  pub fn into_immediate(self) -> Option<Value> {
    match self {
      Reduction::Immediate(result) => Some(result),
      Reduction::Deferred(_) => None,
    }
  }
}

impl IntoFuture for Reduction {
  type Output = Result<Value, ReduceError>;
  type IntoFuture = BoxFuture<'static, Result<Value, ReduceError>>;

  fn into_future(self) -> Self::IntoFuture {
    match self {
      Reduction::Immediate(result) => Box::pin(future::ready(Ok(result))),
      Reduction::Deferred(pending) => pending,
    }
  }
}

impl fmt::Debug for Reduction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Reduction::Immediate(result) => {
        write!(f, "Reduction::Immediate({})", crate::value::describe(result))
      }
      Reduction::Deferred(_) => write!(f, "Reduction::Deferred"),
    }
  }
}

/// Reduces `source` with a fresh reducer from `factory`.
///
/// `factory` receives this reduction's [`Next`] marker.
pub fn reduce_any<S, F, R>(source: S, factory: F) -> Result<Reduction, ReduceError>
where
  S: Into<Source>,
  F: FnOnce(Next) -> R,
  R: Reducer + 'static,
{
  reduce_any_with(&ReduceConfig::default(), source, factory)
}

/// [`reduce_any`] with an explicit configuration.
pub fn reduce_any_with<S, F, R>(
  config: &ReduceConfig,
  source: S,
  factory: F,
) -> Result<Reduction, ReduceError>
where
  S: Into<Source>,
  F: FnOnce(Next) -> R,
  R: Reducer + 'static,
{
  let source = source.into().detect()?;
  let name = config.name();
  let span = info_span!("reduce", name = %name, shape = source.shape());
  let _entered = span.enter();
  debug!("reduce_any(name={}, shape={})", name, source.shape());

  match source {
    Source::Stream(producer) => {
      let next = Next::new();
      let run = Run::new(Box::new(factory(next.clone())), next);
      Ok(Reduction::Deferred(Box::pin(
        drive_stream(producer, run).instrument(span.clone()),
      )))
    }
    finite => {
      let pairs = finite.enumerate()?;
      let next = Next::new();
      let run = Run::new(Box::new(factory(next.clone())), next);
      let reduction = drive_finite(pairs, run)?;
      debug!(
        "reduce_any(name={}, deferred={})",
        name,
        reduction.is_deferred()
      );
      Ok(match reduction {
        Reduction::Deferred(pending) => Reduction::Deferred(Box::pin(pending.instrument(span.clone()))),
        immediate => immediate,
      })
    }
  }
}
