//! Push driver: turns a producer's events into one pair per step.
//!
//! ## Flow
//!
//! 1. Subscribe with the producer paused and run the reducer to its first
//!    suspension.
//! 2. Resume the producer; wait for an event.
//! 3. **Data**: the producer is paused as the chunk arrives. Step the reducer
//!    with `(index, chunk)`. On `NeedsPair` bump the index and go back to 2; on
//!    `Done` resolve and leave the producer paused for good.
//! 4. **Error**: reject with the producer's fault.
//! 5. **End**: answer pair requests with "no pair" until the reducer returns;
//!    a reducer still asking after the final step is unterminated.
//!
//! Steps never overlap: the reducer is owned by whichever step is in flight.
//! While a step waits on a deferred value the driver keeps listening so that a
//! producer error rejects right away; data pushed in the meantime by a producer
//! ignoring the pause is queued in arrival order.

use crate::deferred::Eventual;
use crate::drivers::{Run, drain};
use crate::error::ReduceError;
use crate::producers::{Event, FlowControl, Producer, Sink};
use crate::reducer::Resume;
use crate::step::{Outcome, Stepped, step};
use crate::value::{Key, Pair, Value};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::trace;

/// Driver end of a producer subscription.
struct Subscription {
  events: mpsc::UnboundedReceiver<Event>,
  backlog: VecDeque<Event>,
  open: bool,
}

impl Subscription {
  /// Waits for a step to finish, watching for producer errors meanwhile.
  async fn settle(&mut self, stepped: Eventual<Stepped>) -> Result<Stepped, ReduceError> {
    let mut pending = match stepped {
      Eventual::Ready(stepped) => return Ok(stepped),
      Eventual::Pending(pending) => pending,
    };
    loop {
      tokio::select! {
        biased;
        event = self.events.recv(), if self.open => match event {
          Some(Event::Error(fault)) => {
            trace!("Subscription::settle(abandoned_by_error={})", fault);
            return Err(ReduceError::Source(fault));
          }
          Some(event) => self.backlog.push_back(event),
          None => self.open = false,
        },
        stepped = &mut pending => return Ok(stepped),
      }
    }
  }

  async fn next_event(&mut self) -> Result<Event, ReduceError> {
    if let Some(event) = self.backlog.pop_front() {
      return Ok(event);
    }
    if !self.open {
      return Err(ReduceError::Disconnected);
    }
    self.events.recv().await.ok_or(ReduceError::Disconnected)
  }
}

/// Reduces a push source. Always asynchronous.
pub(crate) async fn drive_stream(producer: Box<dyn Producer>, run: Run) -> Result<Value, ReduceError> {
  let Run { reducer, next } = run;
  let flow = FlowControl::new(true);
  let (events, receiver) = mpsc::unbounded_channel();
  producer.subscribe(Sink::new(events, flow.clone()));
  let mut subscription = Subscription {
    events: receiver,
    backlog: VecDeque::new(),
    open: true,
  };

  let (mut reducer, outcome) = subscription
    .settle(step(reducer, next.clone(), Resume::Start))
    .await?;
  if let Outcome::Done(result) = outcome.map_err(ReduceError::Reducer)? {
    trace!("drive_stream(done_before_first_chunk)");
    return Ok(result);
  }

  let mut index = 0usize;
  loop {
    flow.resume();
    match subscription.next_event().await? {
      Event::Data(chunk) => {
        flow.pause();
        let pair = Pair::new(Key::Index(index), chunk).into_value();
        let (handed_back, outcome) = subscription
          .settle(step(reducer, next.clone(), Resume::Value(Some(pair))))
          .await?;
        match outcome.map_err(ReduceError::Reducer)? {
          Outcome::Done(result) => {
            trace!("drive_stream(done_early_at={})", index);
            return Ok(result);
          }
          Outcome::NeedsPair => {
            reducer = handed_back;
            index += 1;
          }
        }
      }
      Event::Error(fault) => {
        trace!("drive_stream(error_at={}, fault={})", index, fault);
        return Err(ReduceError::Source(fault));
      }
      Event::End => {
        trace!("drive_stream(end_after={})", index);
        return drain(Run::new(reducer, next)).await;
      }
    }
  }
}
