//! Embedded-JSON shape detection.
//!
//! Text samples are only handed to the JSON parser when, after trimming,
//! they start with `{` or `[`. Samples that fail to parse are dropped
//! silently; they neither count towards the statistics nor surface as
//! errors.

use std::collections::BTreeMap;

use crate::{
  kind::{ValueKind, value_kind},
  schema::JsonHint,
};

/// Array samples contribute at most this many leading elements.
pub const MAX_LIST_ITEMS: usize = 10;

/// Parse `text` if it looks like a JSON object or array.
pub fn sniff_json(text: &str) -> Option<serde_json::Value> {
  let trimmed = text.trim();
  if !trimmed.starts_with(['{', '[']) {
    return None;
  }
  serde_json::from_str(trimmed).ok()
}

/// Accumulates the shape of sampled values for a single column.
#[derive(Debug, Default)]
pub struct ShapeSampler {
  parsed:     usize,
  /// Per key, kind counts in first-seen order.
  key_kinds:  Vec<(String, Vec<(ValueKind, usize)>)>,
  list_kinds: BTreeMap<ValueKind, usize>,
}

impl ShapeSampler {
  pub fn new() -> Self { Self::default() }

  pub fn observe_text(&mut self, text: &str) {
    if let Some(value) = sniff_json(text) {
      self.observe_json(&value);
    }
  }

  /// Byte samples are decoded lossily; invalid sequences never fail the
  /// sample outright.
  pub fn observe_bytes(&mut self, bytes: &[u8]) {
    self.observe_text(&String::from_utf8_lossy(bytes));
  }

  fn observe_json(&mut self, value: &serde_json::Value) {
    match value {
      serde_json::Value::Object(map) => {
        for (key, v) in map {
          self.bump_key(key, value_kind(v));
        }
      }
      serde_json::Value::Array(items) => {
        for item in items.iter().take(MAX_LIST_ITEMS) {
          *self.list_kinds.entry(value_kind(item)).or_default() += 1;
        }
      }
      // the sniff only admits objects and arrays
      _ => return,
    }
    self.parsed += 1;
  }

  fn bump_key(&mut self, key: &str, kind: ValueKind) {
    let i = match self.key_kinds.iter().position(|(k, _)| k == key) {
      Some(i) => i,
      None => {
        self.key_kinds.push((key.to_owned(), Vec::new()));
        self.key_kinds.len() - 1
      }
    };
    let kinds = &mut self.key_kinds[i].1;
    match kinds.iter_mut().find(|(k, _)| *k == kind) {
      Some((_, n)) => *n += 1,
      None => kinds.push((kind, 1)),
    }
  }

  /// Summarize the observations, or `None` if nothing parsed.
  pub fn finish(self) -> Option<JsonHint> {
    if self.parsed == 0 {
      return None;
    }

    let top_level_keys: BTreeMap<String, ValueKind> = self
      .key_kinds
      .into_iter()
      .filter_map(|(key, kinds)| dominant(&kinds).map(|kind| (key, kind)))
      .collect();

    Some(JsonHint {
      detected:        true,
      top_level_keys:  (!top_level_keys.is_empty()).then_some(top_level_keys),
      list_item_kinds: (!self.list_kinds.is_empty()).then_some(self.list_kinds),
    })
  }
}

/// Most frequent kind; ties go to the kind seen first.
fn dominant(kinds: &[(ValueKind, usize)]) -> Option<ValueKind> {
  let mut best: Option<(ValueKind, usize)> = None;
  for &(kind, n) in kinds {
    if best.is_none_or(|(_, m)| n > m) {
      best = Some((kind, n));
    }
  }
  best.map(|(kind, _)| kind)
}
