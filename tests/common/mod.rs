//! Shared helpers for integration tests.

use reduce_any::{Coroutine, Next, done};

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_max_level(tracing::Level::TRACE)
    .with_test_writer()
    .try_init();
}

/// Reducer collecting `(index, element)` for every pair of `&str` elements.
pub fn collect_indexed(next: Next) -> Coroutine {
  Coroutine::new(move |co| async move {
    let mut seen = Vec::new();
    while let Some(pair) = co.next_pair(&next).await? {
      if let (Some(index), Some(element)) = (pair.key.as_index(), pair.element_as::<&str>()) {
        seen.push((index, element.to_string()));
      }
    }
    done(seen)
  })
}

/// Expected output of [`collect_indexed`].
pub fn indexed(items: &[&str]) -> Vec<(usize, String)> {
  items
    .iter()
    .enumerate()
    .map(|(index, item)| (index, item.to_string()))
    .collect()
}
