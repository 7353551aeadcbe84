mod common;

use common::{collect_indexed, indexed, init_tracing};
use reduce_any::{
  Coroutine, Deferred, Fault, IterProducer, ReaderProducer, ReduceConfig, ReduceError, Reduction,
  Next, Sink, Source, Value, done, reduce_any, reduce_any_with, value,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_array_reduces_synchronously() {
  init_tracing();
  let reduction = assert_ok!(reduce_any(vec!["one", "two", "three"], collect_indexed));
  let result = reduction.into_immediate().expect("no step waited");
  assert_eq!(
    result.downcast_ref::<Vec<(usize, String)>>(),
    Some(&indexed(&["one", "two", "three"]))
  );
}

#[tokio::test]
async fn test_array_of_deferred_elements() {
  init_tracing();
  let elements: Vec<Value> = ["one", "two", "three"]
    .into_iter()
    .map(|word| {
      Deferred::new(async move {
        tokio::task::yield_now().await;
        Ok::<_, Fault>(value(word))
      })
      .to_value()
    })
    .collect();

  let reduction = assert_ok!(reduce_any(elements, |next| {
    Coroutine::new(move |co| async move {
      let mut seen = Vec::new();
      while let Some(pair) = co.next_pair(&next).await? {
        let resolved = co.resolve(pair.element.clone()).await?;
        seen.extend(resolved.downcast_ref::<&str>().map(|word| word.to_string()));
      }
      done(seen)
    })
  }));
  assert!(reduction.is_deferred());
  let result = assert_ok!(reduction.await);
  assert_eq!(
    result.downcast_ref::<Vec<String>>(),
    Some(&vec!["one".to_string(), "two".to_string(), "three".to_string()])
  );
}

#[test]
fn test_early_return_visits_nothing_further() {
  init_tracing();
  let visited = Arc::new(Mutex::new(Vec::new()));
  let log = visited.clone();
  let reduction = assert_ok!(reduce_any(
    vec!["one", "two", "three", "four", "five"],
    move |next| {
      Coroutine::new(move |co| async move {
        while let Some(pair) = co.next_pair(&next).await? {
          log.lock().unwrap().extend(pair.key.as_index());
          let word = pair.element_as::<&str>().copied().unwrap_or_default();
          if word.contains('h') {
            return done(word);
          }
        }
        done("")
      })
    }
  ));
  let result = reduction.into_immediate().expect("no step waited");
  assert_eq!(result.downcast_ref::<&str>(), Some(&"three"));
  assert_eq!(*visited.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_stream_is_upper_cased_in_order() {
  init_tracing();
  let producer = IterProducer::new(vec!["one", "two", "three", "four"]).with_name("words");
  let reduction = assert_ok!(reduce_any(Source::stream(producer), |next| {
    Coroutine::new(move |co| async move {
      let mut out = Vec::new();
      while let Some(pair) = co.next_pair(&next).await? {
        out.extend(pair.element_as::<&str>().map(|word| word.to_uppercase()));
      }
      done(out)
    })
  }));
  assert!(reduction.is_deferred());
  let result = assert_ok!(reduction.await);
  assert_eq!(
    result.downcast_ref::<Vec<String>>(),
    Some(&vec![
      "ONE".to_string(),
      "TWO".to_string(),
      "THREE".to_string(),
      "FOUR".to_string()
    ])
  );
}

#[tokio::test]
async fn test_stream_fault_on_second_chunk_rejects() {
  init_tracing();
  let producer = IterProducer::new(vec!["one", "two", "three"]);
  let reduction = assert_ok!(reduce_any(Source::stream(producer), |next| {
    Coroutine::new(move |co| async move {
      let mut count = 0usize;
      while co.next_pair(&next).await?.is_some() {
        count += 1;
        if count == 2 {
          return Err(Fault::msg("second chunk"));
        }
      }
      done(count)
    })
  }));
  let error = assert_err!(reduction.await);
  assert_eq!(
    error.fault().map(|fault| fault.to_string()),
    Some("second chunk".to_string())
  );
  assert!(matches!(error, ReduceError::Reducer(_)));
}

#[test]
fn test_null_source_fails_before_the_reducer_exists() {
  init_tracing();
  let created = Arc::new(AtomicBool::new(false));
  let flag = created.clone();
  let error = assert_err!(reduce_any(Source::null(), move |_next| {
    flag.store(true, Ordering::SeqCst);
    Coroutine::new(|_co| async move { done(()) })
  }));
  assert!(matches!(error, ReduceError::NotEnumerable(_)));
  assert!(!created.load(Ordering::SeqCst));
}

#[test]
fn test_json_object_reduces_keyed_pairs() {
  init_tracing();
  let object = json!({ "one": 1, "three": 3, "two": 2 });
  let reduction = assert_ok!(reduce_any(object, |next| {
    Coroutine::new(move |co| async move {
      let mut entries = Vec::new();
      while let Some(pair) = co.next_pair(&next).await? {
        let key = pair.key.native_as::<String>().cloned().unwrap_or_default();
        let element = pair
          .element_as::<serde_json::Value>()
          .and_then(serde_json::Value::as_i64)
          .unwrap_or_default();
        entries.push((key, element));
      }
      done(entries)
    })
  }));
  let result = reduction.into_immediate().expect("no step waited");
  assert_eq!(
    result.downcast_ref::<Vec<(String, i64)>>(),
    Some(&vec![
      ("one".to_string(), 1),
      ("three".to_string(), 3),
      ("two".to_string(), 2)
    ])
  );
}

#[test]
fn test_text_and_lazy_iterators() {
  init_tracing();
  let counting = |next: Next| {
    Coroutine::new(move |co| async move {
      let mut count = 0usize;
      while co.next_pair(&next).await?.is_some() {
        count += 1;
      }
      done(count)
    })
  };

  let text = assert_ok!(reduce_any("moose", counting));
  assert_eq!(text.into_immediate().unwrap().downcast_ref::<usize>(), Some(&5));

  let lazy = assert_ok!(reduce_any(Source::iter((0..4).map(|n| n * 10)), counting));
  assert_eq!(lazy.into_immediate().unwrap().downcast_ref::<usize>(), Some(&4));
}

#[test]
fn test_fault_before_first_pair_is_returned_synchronously() {
  init_tracing();
  let error = assert_err!(reduce_any(vec![1, 2, 3], |_next| {
    Coroutine::new(|_co| async move { Err::<Value, Fault>(Fault::msg("too early")) })
  }));
  assert!(matches!(error, ReduceError::Reducer(_)));
}

#[test]
fn test_fault_at_first_pair_is_returned_synchronously() {
  init_tracing();
  let error = assert_err!(reduce_any(vec![1, 2, 3], |next| {
    Coroutine::new(move |co| async move {
      co.next_pair(&next).await?;
      Err::<Value, Fault>(Fault::new(404u16))
    })
  }));
  assert_eq!(error.fault().and_then(|fault| fault.downcast_ref::<u16>()), Some(&404));
}

#[tokio::test]
async fn test_stream_with_async_work_per_chunk() {
  init_tracing();
  let in_flight = Arc::new(AtomicUsize::new(0));
  let gauge = in_flight.clone();
  let producer = IterProducer::new(1..=4i64);
  let reduction = assert_ok!(reduce_any(Source::stream(producer), move |next| {
    Coroutine::new(move |co| async move {
      let mut total = 0i64;
      while let Some(pair) = co.next_pair(&next).await? {
        assert_eq!(gauge.fetch_add(1, Ordering::SeqCst), 0, "steps overlapped");
        let n = pair.element_as::<i64>().copied().unwrap_or_default();
        let squared = co
          .await_deferred(Deferred::new(async move {
            tokio::task::yield_now().await;
            Ok::<_, Fault>(value(n * n))
          }))
          .await?;
        total += squared.downcast_ref::<i64>().copied().unwrap_or_default();
        gauge.fetch_sub(1, Ordering::SeqCst);
      }
      done(total)
    })
  }));
  let result = assert_ok!(reduction.await);
  assert_eq!(result.downcast_ref::<i64>(), Some(&30));
}

#[tokio::test]
async fn test_stream_fault_before_first_chunk() {
  init_tracing();
  let pushed = Arc::new(AtomicUsize::new(0));
  let tally = pushed.clone();
  let producer = move |sink: Sink| {
    tokio::spawn(async move {
      while sink.ready().await && sink.data(value("chunk")) {
        tally.fetch_add(1, Ordering::SeqCst);
      }
    });
  };
  let reduction = assert_ok!(reduce_any(Source::stream(producer), |_next| {
    Coroutine::new(|_co| async move { Err::<Value, Fault>(Fault::msg("not today")) })
  }));
  let error = assert_err!(reduction.await);
  assert!(matches!(error, ReduceError::Reducer(_)));
  tokio::task::yield_now().await;
  assert_eq!(pushed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stream_fault_after_last_chunk() {
  init_tracing();
  let producer = IterProducer::new(vec!["one", "two"]);
  let reduction = assert_ok!(reduce_any(Source::stream(producer), |next| {
    Coroutine::new(move |co| async move {
      while co.next_pair(&next).await?.is_some() {}
      Err::<Value, Fault>(Fault::msg("after the end"))
    })
  }));
  let error = assert_err!(reduction.await);
  assert_eq!(
    error.fault().map(|fault| fault.to_string()),
    Some("after the end".to_string())
  );
}

#[tokio::test]
async fn test_reader_stream_with_config() {
  init_tracing();
  let config = ReduceConfig::default().with_name("byte_count");
  let producer = ReaderProducer::new(&b"a quick brown fox"[..])
    .with_name("fox")
    .with_chunk_size(3);
  let reduction = assert_ok!(reduce_any_with(&config, Source::stream(producer), |next| {
    Coroutine::new(move |co| async move {
      let mut bytes = 0usize;
      let mut chunks = 0usize;
      while let Some(pair) = co.next_pair(&next).await? {
        bytes += pair.element_as::<bytes::Bytes>().map_or(0, |chunk| chunk.len());
        chunks += 1;
      }
      done((bytes, chunks))
    })
  }));
  let result = assert_ok!(reduction.await);
  let (bytes, chunks) = *result.downcast_ref::<(usize, usize)>().unwrap();
  assert_eq!(bytes, 17);
  assert!(chunks > 1);
}

#[tokio::test]
async fn test_immediate_reduction_can_be_awaited() {
  init_tracing();
  let reduction = assert_ok!(reduce_any(vec!["x"], collect_indexed));
  assert!(matches!(reduction, Reduction::Immediate(_)));
  let result = assert_ok!(reduction.await);
  assert_eq!(
    result.downcast_ref::<Vec<(usize, String)>>(),
    Some(&indexed(&["x"]))
  );
}

#[test]
fn test_marker_is_a_valid_result() {
  init_tracing();
  let mut marker = None;
  let reduction = assert_ok!(reduce_any(vec![1, 2], |next: Next| {
    marker = Some(next.clone());
    Coroutine::new(move |_co| async move { Ok::<_, Fault>(next.to_value()) })
  }));
  let result = reduction.into_immediate().expect("no step waited");
  assert!(marker.is_some_and(|next| next.is(&result)));
}

#[tokio::test]
async fn test_rejection_caught_before_first_pair() {
  init_tracing();
  let thrown = Fault::new("rejected before iterating");
  let rejected = Deferred::rejected(thrown.clone());
  let reduction = assert_ok!(reduce_any(vec!["one", "two"], move |next| {
    Coroutine::new(move |co| async move {
      let caught = co.await_deferred(rejected).await.err();
      let mut count = 0usize;
      while co.next_pair(&next).await?.is_some() {
        count += 1;
      }
      done((caught, count))
    })
  }));
  assert!(reduction.is_deferred());
  let result = assert_ok!(reduction.await);
  let (caught, count) = result.downcast_ref::<(Option<Fault>, usize)>().unwrap();
  assert!(caught.as_ref().is_some_and(|fault| fault.is(&thrown)));
  assert_eq!(*count, 2);
}

#[tokio::test]
async fn test_rejection_caught_at_first_pair() {
  init_tracing();
  let thrown = Fault::new(500u16);
  let rejected = Deferred::rejected(thrown.clone());
  let reduction = assert_ok!(reduce_any(vec!["one", "two", "three"], move |next| {
    Coroutine::new(move |co| async move {
      let mut caught = None;
      let mut count = 0usize;
      while co.next_pair(&next).await?.is_some() {
        if count == 0 {
          caught = co.await_deferred(rejected.clone()).await.err();
        }
        count += 1;
      }
      done((caught, count))
    })
  }));
  assert!(reduction.is_deferred());
  let result = assert_ok!(reduction.await);
  let (caught, count) = result.downcast_ref::<(Option<Fault>, usize)>().unwrap();
  assert!(caught.as_ref().is_some_and(|fault| fault.is(&thrown)));
  assert_eq!(*count, 3);
}

#[tokio::test]
async fn test_stream_rejection_caught_at_first_chunk() {
  init_tracing();
  let thrown = Fault::msg("chunk lookup failed");
  let rejected = Deferred::rejected(thrown.clone());
  let producer = IterProducer::new(vec!["one", "two"]);
  let reduction = assert_ok!(reduce_any(Source::stream(producer), move |next| {
    Coroutine::new(move |co| async move {
      let mut caught = None;
      let mut count = 0usize;
      while co.next_pair(&next).await?.is_some() {
        if count == 0 {
          caught = co.await_deferred(rejected.clone()).await.err();
        }
        count += 1;
      }
      done((caught, count))
    })
  }));
  let result = assert_ok!(reduction.await);
  let (caught, count) = result.downcast_ref::<(Option<Fault>, usize)>().unwrap();
  assert!(caught.as_ref().is_some_and(|fault| fault.is(&thrown)));
  assert_eq!(*count, 2);
}

#[test]
fn test_reducer_that_never_returns_after_exhaustion() {
  init_tracing();
  let error = assert_err!(reduce_any(vec![1, 2], |next: Next| {
    Coroutine::new(move |co| async move {
      for _ in 0..100 {
        co.next_pair(&next).await?;
      }
      done("gave up asking")
    })
  }));
  assert!(matches!(error, ReduceError::Unterminated));
}
