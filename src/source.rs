//! # Sources and Enumeration
//!
//! A [`Source`] is anything a reduction can run over. Finite sources are
//! turned into an [`Enumerator`]: a lazy sequence of [`Pair`]s in the order the
//! container defines.
//!
//! | Shape        | Key                  | Order             |
//! |--------------|----------------------|-------------------|
//! | positional   | `Key::Index`         | index order       |
//! | keyed        | `Key::Native`        | container order   |
//! | set          | `Key::Index`         | container order   |
//! | iterable     | `Key::Index`         | iteration order   |
//! | text         | `Key::Index`         | character order   |
//! | stream       | `Key::Index`         | arrival order     |
//!
//! Values whose shape is only known at runtime go through
//! [`Source::from_value`]; anything that is neither enumerable nor a stream
//! fails with [`ReduceError::NotEnumerable`] before a reducer is created.

use crate::error::ReduceError;
use crate::producers::Producer;
use crate::value::{Key, Pair, Value, unit, value};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Lazy, finite sequence of pairs.
pub type Enumerator = Box<dyn Iterator<Item = Pair> + Send>;

/// Input of a reduction.
pub enum Source {
  /// Elements keyed by position.
  Positional(Vec<Value>),
  /// Native `(key, element)` pairs, delivered in the given order.
  Keyed(Vec<(Value, Value)>),
  /// Any iterator, keyed by iteration count.
  Iterable(Box<dyn Iterator<Item = Value> + Send>),
  /// Characters of a string, keyed by position.
  Text(String),
  /// A push-based producer.
  Stream(Box<dyn Producer>),
  /// A value whose shape is detected when the reduction starts.
  Dynamic(Value),
}

impl Source {
  /// Positional source from any collection.
  pub fn positional<T, I>(items: I) -> Self
  where
    T: Any + Send + Sync,
    I: IntoIterator<Item = T>,
  {
    Source::Positional(items.into_iter().map(value).collect())
  }

  /// Keyed source from native pairs.
  pub fn keyed<K, V, I>(entries: I) -> Self
  where
    K: Any + Send + Sync,
    V: Any + Send + Sync,
    I: IntoIterator<Item = (K, V)>,
  {
    Source::Keyed(
      entries
        .into_iter()
        .map(|(key, element)| (value(key), value(element)))
        .collect(),
    )
  }

  /// Lazy source over an iterator; elements are pulled one at a time.
  pub fn iter<T, I>(items: I) -> Self
  where
    T: Any + Send + Sync,
    I: Iterator<Item = T> + Send + 'static,
  {
    Source::Iterable(Box::new(items.map(value)))
  }

  /// Push source.
  pub fn stream<P: Producer>(producer: P) -> Self {
    Source::Stream(Box::new(producer))
  }

  /// Source whose shape is detected at runtime.
  pub fn from_value(source: Value) -> Self {
    Source::Dynamic(source)
  }

  /// The null source; reducing over it always fails.
  pub fn null() -> Self {
    Source::Dynamic(unit())
  }

  /// Short name of the shape, used in logs.
  pub fn shape(&self) -> &'static str {
    match self {
      Source::Positional(_) => "positional",
      Source::Keyed(_) => "keyed",
      Source::Iterable(_) => "iterable",
      Source::Text(_) => "text",
      Source::Stream(_) => "stream",
      Source::Dynamic(_) => "dynamic",
    }
  }

  /// Resolves a dynamic source into a concrete shape.
  pub(crate) fn detect(self) -> Result<Source, ReduceError> {
    match self {
      Source::Dynamic(source) => detect_value(source),
      concrete => Ok(concrete),
    }
  }

  /// Enumerates a finite source.
  ///
  /// Streams cannot be enumerated and are rejected, as are undetectable
  /// dynamic values.
  pub fn enumerate(self) -> Result<Enumerator, ReduceError> {
    match self.detect()? {
      Source::Positional(items) => Ok(indexed(items.into_iter())),
      Source::Iterable(items) => Ok(indexed(items)),
      Source::Text(text) => {
        let chars: Vec<char> = text.chars().collect();
        Ok(indexed(chars.into_iter().map(value)))
      }
      Source::Keyed(entries) => Ok(Box::new(
        entries
          .into_iter()
          .map(|(key, element)| Pair::new(Key::Native(key), element)),
      )),
      Source::Stream(_) => Err(ReduceError::NotEnumerable(
        "streams are pushed, not enumerated".to_string(),
      )),
      Source::Dynamic(_) => Err(ReduceError::NotEnumerable("unknown shape".to_string())),
    }
  }
}

fn indexed<I>(items: I) -> Enumerator
where
  I: Iterator<Item = Value> + Send + 'static,
{
  Box::new(
    items
      .enumerate()
      .map(|(index, element)| Pair::new(Key::Index(index), element)),
  )
}

fn detect_value(source: Value) -> Result<Source, ReduceError> {
  if let Some(items) = source.downcast_ref::<Vec<Value>>() {
    return Ok(Source::Positional(items.clone()));
  }
  if let Some(text) = source.downcast_ref::<String>() {
    return Ok(Source::Text(text.clone()));
  }
  if let Some(text) = source.downcast_ref::<&'static str>() {
    return Ok(Source::Text(text.to_string()));
  }
  if let Some(map) = source.downcast_ref::<BTreeMap<String, Value>>() {
    return Ok(Source::Keyed(
      map
        .iter()
        .map(|(key, element)| (value(key.clone()), element.clone()))
        .collect(),
    ));
  }
  if let Some(json) = source.downcast_ref::<serde_json::Value>() {
    return detect_json(json);
  }
  if source.downcast_ref::<()>().is_some() {
    return Err(ReduceError::NotEnumerable("null".to_string()));
  }
  Err(ReduceError::NotEnumerable(
    "unsupported container type".to_string(),
  ))
}

fn detect_json(json: &serde_json::Value) -> Result<Source, ReduceError> {
  use serde_json::Value as Json;
  match json {
    Json::Array(items) => Ok(Source::Positional(
      items.iter().cloned().map(value).collect(),
    )),
    Json::Object(map) => Ok(Source::Keyed(
      map
        .iter()
        .map(|(key, element)| (value(key.clone()), value(element.clone())))
        .collect(),
    )),
    Json::String(text) => Ok(Source::Text(text.clone())),
    Json::Null => Err(ReduceError::NotEnumerable("null".to_string())),
    Json::Bool(_) => Err(ReduceError::NotEnumerable("boolean".to_string())),
    Json::Number(_) => Err(ReduceError::NotEnumerable("number".to_string())),
  }
}

impl fmt::Debug for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Source::{}", self.shape())
  }
}

impl<T: Any + Send + Sync> From<Vec<T>> for Source {
  fn from(items: Vec<T>) -> Self {
    Source::positional(items)
  }
}

impl<K, V> From<BTreeMap<K, V>> for Source
where
  K: Any + Send + Sync,
  V: Any + Send + Sync,
{
  fn from(map: BTreeMap<K, V>) -> Self {
    Source::keyed(map)
  }
}

impl<K, V> From<HashMap<K, V>> for Source
where
  K: Any + Send + Sync,
  V: Any + Send + Sync,
{
  fn from(map: HashMap<K, V>) -> Self {
    Source::keyed(map)
  }
}

impl<T: Any + Send + Sync> From<BTreeSet<T>> for Source {
  fn from(set: BTreeSet<T>) -> Self {
    Source::positional(set)
  }
}

impl<T: Any + Send + Sync> From<HashSet<T>> for Source {
  fn from(set: HashSet<T>) -> Self {
    Source::positional(set)
  }
}

impl From<String> for Source {
  fn from(text: String) -> Self {
    Source::Text(text)
  }
}

impl From<&str> for Source {
  fn from(text: &str) -> Self {
    Source::Text(text.to_string())
  }
}

impl From<serde_json::Value> for Source {
  fn from(json: serde_json::Value) -> Self {
    Source::Dynamic(value(json))
  }
}
