//! # Dynamic Values, Pairs and the `Next` Sentinel
//!
//! Everything that flows between a driver and a reducer is a type-erased
//! [`Value`]: the pairs handed to the reducer, the values it yields, the
//! resolutions of deferred values and the terminal result. Typed access is a
//! downcast away.
//!
//! ## Core Types
//!
//! - **[`Value`]**: `Arc<dyn Any + Send + Sync>`, shared without copying
//! - **[`Key`]**: position for positional sources, native key for keyed ones
//! - **[`Pair`]**: one `(key, element)` iteration unit
//! - **[`Next`]**: the per-reduction marker a reducer yields to ask for a pair
//!
//! ## Example
//!
//! ```rust
//! use reduce_any::value::{value, Key, Pair};
//!
//! let pair = Pair::new(Key::Index(0), value("one"));
//! assert_eq!(pair.key.as_index(), Some(0));
//! assert_eq!(pair.element_as::<&str>(), Some(&"one"));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type-erased value exchanged between drivers and reducers.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wraps any `'static` thread-safe value into a [`Value`].
///
/// Passing a [`Value`] returns it unchanged rather than nesting it, so
/// identity is preserved.
pub fn value<T: Any + Send + Sync>(inner: T) -> Value {
  let boxed: Box<dyn Any + Send + Sync> = Box::new(inner);
  match boxed.downcast::<Value>() {
    Ok(already) => *already,
    Err(boxed) => Arc::from(boxed),
  }
}

/// Returns the "no value" marker, the engine's equivalent of `undefined`.
///
/// Terminal results of reducers that have nothing to report use it.
pub fn unit() -> Value {
  value(())
}

/// Key of a [`Pair`].
#[derive(Clone)]
pub enum Key {
  /// 0-based position for positional, iterable, text and stream sources.
  Index(usize),
  /// The container's own key for keyed sources.
  Native(Value),
}

impl Key {
  /// Returns the position if this is an index key.
  pub fn as_index(&self) -> Option<usize> {
    match self {
      Key::Index(index) => Some(*index),
      Key::Native(_) => None,
    }
  }

  /// Downcasts a native key.
  pub fn native_as<T: Any>(&self) -> Option<&T> {
    match self {
      Key::Index(_) => None,
      Key::Native(key) => key.downcast_ref::<T>(),
    }
  }
}

impl fmt::Debug for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Index(index) => write!(f, "Index({})", index),
      Key::Native(key) => write!(f, "Native({})", describe(key)),
    }
  }
}

/// One `(key, element)` unit delivered to a reducer.
#[derive(Clone, Debug)]
pub struct Pair {
  /// Position or native key of the element.
  pub key: Key,
  /// The element itself.
  pub element: Value,
}

impl Pair {
  /// Creates a pair.
  pub fn new(key: Key, element: Value) -> Self {
    Self { key, element }
  }

  /// Downcasts the element.
  pub fn element_as<T: Any>(&self) -> Option<&T> {
    self.element.downcast_ref::<T>()
  }

  /// Boxes the pair into the [`Value`] form reducers are resumed with.
  pub fn into_value(self) -> Value {
    value(self)
  }

  /// Recovers a pair from a resumption value.
  pub fn from_value(value: &Value) -> Option<Pair> {
    value.downcast_ref::<Pair>().cloned()
  }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Marker a reducer yields to request the next pair.
///
/// A fresh `Next` is minted for every reduction and only matches itself:
/// [`Next::is`] compares allocation identity, never structure, so a marker
/// from another reduction (or any user value) is never mistaken for it.
#[derive(Clone)]
pub struct Next {
  token: Arc<u64>,
}

impl Next {
  pub(crate) fn new() -> Self {
    Self {
      token: Arc::new(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
    }
  }

  /// Returns true if `yielded` is this very marker.
  pub fn is(&self, yielded: &Value) -> bool {
    yielded
      .downcast_ref::<Next>()
      .is_some_and(|other| Arc::ptr_eq(&self.token, &other.token))
  }

  /// Boxes the marker so it can be yielded.
  pub fn to_value(&self) -> Value {
    value(self.clone())
  }
}

impl fmt::Debug for Next {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Next(#{})", self.token)
  }
}

/// Renders a value for logs and `Debug` output.
///
/// Only common scalar payloads are shown; everything else is opaque.
pub fn describe(value: &Value) -> String {
  if let Some(s) = value.downcast_ref::<String>() {
    format!("{:?}", s)
  } else if let Some(s) = value.downcast_ref::<&'static str>() {
    format!("{:?}", s)
  } else if let Some(n) = value.downcast_ref::<i64>() {
    n.to_string()
  } else if let Some(n) = value.downcast_ref::<i32>() {
    n.to_string()
  } else if let Some(n) = value.downcast_ref::<usize>() {
    n.to_string()
  } else if let Some(c) = value.downcast_ref::<char>() {
    format!("{:?}", c)
  } else if let Some(json) = value.downcast_ref::<serde_json::Value>() {
    json.to_string()
  } else if value.downcast_ref::<()>().is_some() {
    "()".to_string()
  } else {
    "<opaque>".to_string()
  }
}
