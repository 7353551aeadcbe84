//! # Coroutine Reducers
//!
//! [`Coroutine`] turns an async block into a [`Reducer`]. The block receives a
//! [`Co`] handle and suspends by awaiting it; the engine's resumption becomes
//! the result of that await. The block is polled by hand with a no-op waker,
//! one poll per resumption, so it must not await anything except its `Co`:
//! futures it wants resolved are yielded to the engine as
//! [`Deferred`](crate::deferred::Deferred) values instead.
//!
//! ```rust
//! use reduce_any::coroutine::{Coroutine, done};
//! use reduce_any::value::Next;
//!
//! fn count(next: Next) -> Coroutine {
//!   Coroutine::new(move |co| async move {
//!     let mut n = 0usize;
//!     while let Some(_pair) = co.next_pair(&next).await? {
//!       n += 1;
//!     }
//!     done(n)
//!   })
//! }
//! ```

use crate::deferred::Deferred;
use crate::error::Fault;
use crate::reducer::{Reducer, Resume, State};
use crate::value::{Next, Pair, Value, value};
use futures::future::BoxFuture;
use futures::task::noop_waker_ref;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

/// Terminal result helper for coroutine bodies.
pub fn done<T: Any + Send + Sync>(result: T) -> Result<Value, Fault> {
  Ok(value(result))
}

#[derive(Default)]
struct Channel {
  yielded: Option<Value>,
  resumed: Option<Resume>,
}

fn lock(channel: &Mutex<Channel>) -> MutexGuard<'_, Channel> {
  channel.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Suspension handle given to a coroutine body.
#[derive(Clone)]
pub struct Co {
  channel: Arc<Mutex<Channel>>,
}

impl Co {
  /// Yields `yielded` to the engine and waits to be resumed.
  ///
  /// Resolves to the resumption value (`None` for "no value") or to the fault
  /// injected at this point.
  pub fn suspend(&self, yielded: Value) -> Suspend {
    Suspend {
      channel: self.channel.clone(),
      yielded: Some(yielded),
    }
  }

  /// Requests the next pair; `None` once the source is exhausted.
  pub async fn next_pair(&self, next: &Next) -> Result<Option<Pair>, Fault> {
    match self.suspend(next.to_value()).await? {
      None => Ok(None),
      Some(resumed) => Pair::from_value(&resumed)
        .map(Some)
        .ok_or_else(|| Fault::msg("resumed with something other than a pair")),
    }
  }

  /// Yields `yielded` and expects a value back.
  ///
  /// Deferred values come back resolved; anything else comes back as is.
  pub async fn resolve(&self, yielded: Value) -> Result<Value, Fault> {
    self
      .suspend(yielded)
      .await?
      .ok_or_else(|| Fault::msg("resumed without a value"))
  }

  /// Waits for a deferred value through the engine.
  pub async fn await_deferred(&self, deferred: Deferred) -> Result<Value, Fault> {
    self.resolve(deferred.to_value()).await
  }
}

/// Future returned by [`Co::suspend`].
pub struct Suspend {
  channel: Arc<Mutex<Channel>>,
  yielded: Option<Value>,
}

impl Future for Suspend {
  type Output = Result<Option<Value>, Fault>;

  fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = &mut *self;
    let mut channel = lock(&this.channel);
    if let Some(yielded) = this.yielded.take() {
      channel.resumed = None;
      channel.yielded = Some(yielded);
      return Poll::Pending;
    }
    match channel.resumed.take() {
      Some(Resume::Value(input)) => Poll::Ready(Ok(input)),
      Some(Resume::Failure(fault)) => Poll::Ready(Err(fault)),
      Some(Resume::Start) | None => Poll::Pending,
    }
  }
}

/// A [`Reducer`] backed by an async block.
pub struct Coroutine {
  body: Option<BoxFuture<'static, Result<Value, Fault>>>,
  channel: Arc<Mutex<Channel>>,
  started: bool,
}

impl Coroutine {
  /// Builds a coroutine from a body taking its [`Co`] handle.
  pub fn new<F, Fut>(body: F) -> Self
  where
    F: FnOnce(Co) -> Fut,
    Fut: Future<Output = Result<Value, Fault>> + Send + 'static,
  {
    let channel = Arc::new(Mutex::new(Channel::default()));
    let co = Co {
      channel: channel.clone(),
    };
    Self {
      body: Some(Box::pin(body(co))),
      channel,
      started: false,
    }
  }

  /// True once the body returned or raised.
  pub fn is_finished(&self) -> bool {
    self.body.is_none()
  }

  fn poll_body(&mut self) -> Result<State, Fault> {
    let Some(body) = self.body.as_mut() else {
      return Err(Fault::msg("coroutine resumed after it finished"));
    };
    let mut cx = Context::from_waker(noop_waker_ref());
    match body.as_mut().poll(&mut cx) {
      Poll::Ready(result) => {
        self.body = None;
        result.map(State::Terminated)
      }
      Poll::Pending => match lock(&self.channel).yielded.take() {
        Some(yielded) => Ok(State::Suspended(yielded)),
        None => {
          self.body = None;
          Err(Fault::msg(
            "coroutine awaited a future directly; yield it as a Deferred instead",
          ))
        }
      },
    }
  }
}

impl Reducer for Coroutine {
  fn start(&mut self) -> Result<State, Fault> {
    self.started = true;
    self.poll_body()
  }

  // The value passed to the very first resumption has nowhere to go and is dropped.
  fn resume_with_value(&mut self, input: Option<Value>) -> Result<State, Fault> {
    if !self.started {
      return self.start();
    }
    lock(&self.channel).resumed = Some(Resume::Value(input));
    self.poll_body()
  }

  fn resume_with_failure(&mut self, fault: Fault) -> Result<State, Fault> {
    if !self.started {
      self.started = true;
      self.body = None;
      return Err(fault);
    }
    lock(&self.channel).resumed = Some(Resume::Failure(fault));
    self.poll_body()
  }
}
