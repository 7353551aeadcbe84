//! Pull driver: strict alternation between "ask the reducer" and "ask the
//! source", with no read-ahead.
//!
//! The pump runs synchronously for as long as every step does. The first step
//! that has to wait turns the rest of the reduction into a future, and the
//! reduction stays deferred from then on.

use crate::deferred::Eventual;
use crate::drivers::{EMPTY_ANSWER_LIMIT, Run};
use crate::error::ReduceError;
use crate::reduce::Reduction;
use crate::reducer::{Reducer, Resume};
use crate::source::Enumerator;
use crate::step::{Outcome, Stepped, step};
use crate::value::{Next, Value};
use futures::future::BoxFuture;
use tracing::trace;

/// Pull position in an enumerator.
///
/// Once the enumerator reports its end it is never polled again.
pub(crate) struct Cursor {
  pairs: Enumerator,
  exhausted: bool,
  pulled: usize,
  empty_answers: usize,
}

impl Cursor {
  pub(crate) fn new(pairs: Enumerator) -> Self {
    Self {
      pairs,
      exhausted: false,
      pulled: 0,
      empty_answers: 0,
    }
  }

  /// Fetches the resumption for a pair request.
  ///
  /// Fails once the reducer asked more than [`EMPTY_ANSWER_LIMIT`] times past
  /// the end.
  pub(crate) fn advance(&mut self) -> Result<Resume, ReduceError> {
    if !self.exhausted {
      match self.pairs.next() {
        Some(pair) => {
          self.pulled += 1;
          return Ok(Resume::Value(Some(pair.into_value())));
        }
        None => {
          trace!("Cursor::advance(exhausted_after={})", self.pulled);
          self.exhausted = true;
        }
      }
    }
    if self.empty_answers == EMPTY_ANSWER_LIMIT {
      trace!("Cursor::advance(unterminated_after={})", self.pulled);
      return Err(ReduceError::Unterminated);
    }
    self.empty_answers += 1;
    Ok(Resume::Value(None))
  }
}

/// Reduces a finite source.
///
/// Returns [`Reduction::Immediate`] when no step ever waited, including when
/// the reducer returns before asking for a single pair.
pub(crate) fn drive_finite(pairs: Enumerator, run: Run) -> Result<Reduction, ReduceError> {
  let Run { mut reducer, next } = run;
  let mut cursor = Cursor::new(pairs);
  let mut resume = Resume::Start;
  loop {
    match step(reducer, next.clone(), resume) {
      Eventual::Ready((handed_back, outcome)) => match outcome.map_err(ReduceError::Reducer)? {
        Outcome::Done(result) => {
          trace!("drive_finite(done_sync, pulled={})", cursor.pulled);
          return Ok(Reduction::Immediate(result));
        }
        Outcome::NeedsPair => {
          reducer = handed_back;
          resume = cursor.advance()?;
        }
      },
      Eventual::Pending(pending) => {
        trace!("drive_finite(deferred_at={})", cursor.pulled);
        return Ok(Reduction::Deferred(Box::pin(finish_finite(
          pending, cursor, next,
        ))));
      }
    }
  }
}

async fn finish_finite(
  pending: BoxFuture<'static, Stepped>,
  mut cursor: Cursor,
  next: Next,
) -> Result<Value, ReduceError> {
  let (mut reducer, mut outcome): (Box<dyn Reducer>, _) = pending.await;
  loop {
    match outcome.map_err(ReduceError::Reducer)? {
      Outcome::Done(result) => {
        trace!("drive_finite(done_deferred, pulled={})", cursor.pulled);
        return Ok(result);
      }
      Outcome::NeedsPair => {
        (reducer, outcome) = step(reducer, next.clone(), cursor.advance()?)
          .settle()
          .await;
      }
    }
  }
}
