//! # Deferred Values
//!
//! A reducer that needs to wait yields a [`Deferred`]; the engine recognizes it
//! by probing for the continuation capability rather than by inspecting what
//! produced it, so any future can take part once wrapped.
//!
//! [`Eventual`] is the engine's internal return form: a result that is either
//! available now or still pending. It keeps the synchronous fast path free of
//! any future machinery.

use crate::error::Fault;
use crate::value::Value;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A value that settles later with either a [`Value`] or a [`Fault`].
///
/// Cloning is cheap and every clone observes the same outcome.
///
/// # Example
///
/// ```rust
/// use reduce_any::deferred::Deferred;
/// use reduce_any::value::value;
///
/// let later = Deferred::new(async { Ok(value(42i32)) });
/// let now = Deferred::resolved(value("ready"));
/// ```
#[derive(Clone)]
pub struct Deferred {
  inner: Shared<BoxFuture<'static, Result<Value, Fault>>>,
}

impl Deferred {
  /// Wraps a future.
  pub fn new<F>(future: F) -> Self
  where
    F: Future<Output = Result<Value, Fault>> + Send + 'static,
  {
    Self {
      inner: future.boxed().shared(),
    }
  }

  /// A deferred value that is already resolved.
  pub fn resolved(value: Value) -> Self {
    Self::new(futures::future::ready(Ok(value)))
  }

  /// A deferred value that is already rejected.
  pub fn rejected(fault: Fault) -> Self {
    Self::new(futures::future::ready(Err(fault)))
  }

  /// Boxes the deferred value so a reducer can yield it.
  pub fn to_value(&self) -> Value {
    crate::value::value(self.clone())
  }

  /// Returns the continuation handle of `yielded` if it carries one.
  pub fn probe(yielded: &Value) -> Option<Deferred> {
    yielded.downcast_ref::<Deferred>().cloned()
  }
}

impl Future for Deferred {
  type Output = Result<Value, Fault>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    Pin::new(&mut self.inner).poll(cx)
  }
}

impl fmt::Debug for Deferred {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.inner.peek() {
      Some(Ok(_)) => write!(f, "Deferred(resolved)"),
      Some(Err(fault)) => write!(f, "Deferred(rejected: {:?})", fault),
      None => write!(f, "Deferred(pending)"),
    }
  }
}

/// Either a result available now or one still in flight.
pub enum Eventual<T> {
  /// Completed without waiting.
  Ready(T),
  /// Completes when the future does.
  Pending(BoxFuture<'static, T>),
}

impl<T: Send + 'static> Eventual<T> {
  /// Waits for the result regardless of which form it has.
  pub async fn settle(self) -> T {
    match self {
      Eventual::Ready(value) => value,
      Eventual::Pending(future) => future.await,
    }
  }

  /// True when the result is still in flight.
  pub fn is_pending(&self) -> bool {
    matches!(self, Eventual::Pending(_))
  }
}

impl<T> fmt::Debug for Eventual<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Eventual::Ready(_) => write!(f, "Eventual::Ready"),
      Eventual::Pending(_) => write!(f, "Eventual::Pending"),
    }
  }
}
