//! # Drivers
//!
//! Drivers pump the [`step`](crate::step::step) protocol against a source:
//!
//! - **[`pull`]**: finite enumerators; synchronous until a step has to wait
//! - **[`push`]**: backpressured producers; always asynchronous
//!
//! Both answer pair requests the same way: the next pair while there is one,
//! then "no pair" for at most [`EMPTY_ANSWER_LIMIT`] requests after the source
//! ran dry. A reducer still asking after that fails the reduction with
//! [`ReduceError::Unterminated`].

use crate::error::ReduceError;
use crate::reducer::{Reducer, Resume};
use crate::step::{Outcome, step};
use crate::value::{Next, Value};
use tracing::trace;

/// Pull driver over finite enumerators.
pub mod pull;
/// Push driver over backpressured producers.
pub mod push;

/// "No pair" answers a reducer gets once the source is exhausted.
///
/// The first lets its pair loop end, the second is the final step.
pub(crate) const EMPTY_ANSWER_LIMIT: usize = 2;

/// State of one reduction: the reducer and the marker it asks for pairs with.
pub(crate) struct Run {
  pub(crate) reducer: Box<dyn Reducer>,
  pub(crate) next: Next,
}

impl Run {
  pub(crate) fn new(reducer: Box<dyn Reducer>, next: Next) -> Self {
    Self { reducer, next }
  }
}

/// Answers pair requests with "no pair" until the reducer returns, giving up
/// after [`EMPTY_ANSWER_LIMIT`] answers.
pub(crate) async fn drain(run: Run) -> Result<Value, ReduceError> {
  let Run { mut reducer, next } = run;
  for _ in 0..EMPTY_ANSWER_LIMIT {
    let (handed_back, outcome) = step(reducer, next.clone(), Resume::Value(None))
      .settle()
      .await;
    match outcome.map_err(ReduceError::Reducer)? {
      Outcome::Done(result) => return Ok(result),
      Outcome::NeedsPair => reducer = handed_back,
    }
  }
  trace!("drain(unterminated_after={})", EMPTY_ANSWER_LIMIT);
  Err(ReduceError::Unterminated)
}
