//! Answer Store
//!
//! Nested, path-addressable container holding the in-progress result of a run.
//! The store mirrors the schema one-to-one: the skeleton pass creates a slot for
//! every schema path before any interaction, and every later capture is written
//! back into that same tree so following predicates see it immediately.

use crate::schema::{FieldType, LengthSpec, Schema, SchemaField, SchemaNode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single captured (or defaulted) value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnswerValue {
    /// No default and not captured yet.
    #[default]
    Absent,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AnswerValue>),
    Map(AnswerMap),
}

impl AnswerValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, AnswerValue::Absent)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnswerValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AnswerValue]> {
        match self {
            AnswerValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AnswerMap> {
        match self {
            AnswerValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Scalar text form used for prompt defaults and option labels.
    ///
    /// Returns `None` for absent values and containers.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            AnswerValue::Bool(b) => Some(b.to_string()),
            AnswerValue::Integer(i) => Some(i.to_string()),
            AnswerValue::Float(f) => Some(f.to_string()),
            AnswerValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Project into JSON for expression evaluation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AnswerValue::Absent => serde_json::Value::Null,
            AnswerValue::Bool(b) => serde_json::Value::Bool(*b),
            AnswerValue::Integer(i) => serde_json::Value::from(*i),
            AnswerValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            AnswerValue::Text(s) => serde_json::Value::String(s.clone()),
            AnswerValue::List(items) => {
                serde_json::Value::Array(items.iter().map(AnswerValue::to_json).collect())
            }
            AnswerValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Structural shape (keys, nesting, list lengths) with leaf values erased.
    pub fn shape(&self) -> AnswerValue {
        match self {
            AnswerValue::List(items) => {
                AnswerValue::List(items.iter().map(AnswerValue::shape).collect())
            }
            AnswerValue::Map(map) => AnswerValue::Map(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.shape()))
                    .collect(),
            ),
            _ => AnswerValue::Absent,
        }
    }
}

impl From<serde_json::Value> for AnswerValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AnswerValue::Absent,
            serde_json::Value::Bool(b) => AnswerValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AnswerValue::Integer(i),
                None => AnswerValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => AnswerValue::Text(s),
            serde_json::Value::Array(items) => {
                AnswerValue::List(items.into_iter().map(AnswerValue::from).collect())
            }
            serde_json::Value::Object(map) => AnswerValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, AnswerValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Integer(value)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Absent => Ok(()),
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Integer(i) => write!(f, "{}", i),
            AnswerValue::Float(x) => write!(f, "{}", x),
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            AnswerValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for AnswerValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            AnswerValue::Absent => serializer.serialize_none(),
            AnswerValue::Bool(b) => serializer.serialize_bool(*b),
            AnswerValue::Integer(i) => serializer.serialize_i64(*i),
            AnswerValue::Float(x) => serializer.serialize_f64(*x),
            AnswerValue::Text(s) => serializer.serialize_str(s),
            AnswerValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AnswerValue::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(AnswerValue::from)
    }
}

/// Ordered string-keyed map; keeps schema declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerMap {
    entries: Vec<(String, AnswerValue)>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AnswerValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or replace in place; a new key goes to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) -> Option<AnswerValue> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get_or_insert_with(
        &mut self,
        key: &str,
        default: impl FnOnce() -> AnswerValue,
    ) -> &mut AnswerValue {
        let index = match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (String, AnswerValue)>>(iter: I) -> Self {
        let mut map = AnswerMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// One step of an answer path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a slot in the store, e.g. `servers[1].host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AnswerPath(Vec<PathSegment>);

impl AnswerPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the display form: dotted keys with `[n]` indices.
    ///
    /// Empty segments are ignored, so `""` is the root.
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        for part in text.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(end) = stripped.find(']') else {
                    break;
                };
                match stripped[..end].trim().parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    Err(_) => segments.push(PathSegment::Key(stripped[..end].to_string())),
                }
                rest = &stripped[end + 1..];
            }
        }
        Self(segments)
    }
}

impl fmt::Display for AnswerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// The in-progress (and finally the finished) result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerStore {
    root: AnswerValue,
}

impl Default for AnswerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerStore {
    /// Empty store with a map root.
    pub fn new() -> Self {
        Self {
            root: AnswerValue::Map(AnswerMap::new()),
        }
    }

    /// Build the fully default-valued mirror of the schema.
    pub fn skeleton(schema: &Schema) -> Self {
        Self {
            root: Self::fields_skeleton(schema.fields()),
        }
    }

    /// Skeleton of an ordered child group (one hash body or one array element).
    pub fn fields_skeleton(fields: &[SchemaField]) -> AnswerValue {
        AnswerValue::Map(
            fields
                .iter()
                .map(|field| (field.key.clone(), Self::node_skeleton(&field.node)))
                .collect(),
        )
    }

    /// Skeleton of a single node.
    pub fn node_skeleton(node: &SchemaNode) -> AnswerValue {
        match node.field_type {
            FieldType::Hash => Self::fields_skeleton(&node.children),
            FieldType::Array => match node.length {
                LengthSpec::Fixed(count) => AnswerValue::List(
                    (0..count)
                        .map(|_| Self::fields_skeleton(&node.children))
                        .collect(),
                ),
                // Resolved lazily when traversal reaches the array.
                LengthSpec::Computed(_) | LengthSpec::Ask => AnswerValue::List(Vec::new()),
            },
            _ => node.default.clone().unwrap_or_default(),
        }
    }

    /// Dig through the tree; missing or mistyped intermediates yield `None`.
    pub fn get(&self, path: &AnswerPath) -> Option<&AnswerValue> {
        dig(&self.root, path)
    }

    /// Write through to the owning container, creating intermediates as needed.
    pub fn set(&mut self, path: &AnswerPath, value: AnswerValue) {
        let mut slot = &mut self.root;
        for segment in path.segments() {
            slot = match segment {
                PathSegment::Key(key) => {
                    ensure_map(slot).get_or_insert_with(key, AnswerValue::default)
                }
                PathSegment::Index(index) => {
                    let items = ensure_list(slot);
                    if items.len() <= *index {
                        items.resize(*index + 1, AnswerValue::Absent);
                    }
                    &mut items[*index]
                }
            };
        }
        *slot = value;
    }

    /// Read-only view of the whole tree.
    pub fn snapshot(&self) -> &AnswerValue {
        &self.root
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }

    pub fn into_value(self) -> AnswerValue {
        self.root
    }
}

/// Descend from `root` along `path`. Missing or mistyped intermediates yield `None`.
pub fn dig<'a>(root: &'a AnswerValue, path: &AnswerPath) -> Option<&'a AnswerValue> {
    let mut current = root;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), AnswerValue::Map(map)) => map.get(key)?,
            (PathSegment::Index(index), AnswerValue::List(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

fn ensure_map(slot: &mut AnswerValue) -> &mut AnswerMap {
    if !matches!(slot, AnswerValue::Map(_)) {
        *slot = AnswerValue::Map(AnswerMap::new());
    }
    match slot {
        AnswerValue::Map(map) => map,
        _ => unreachable!("slot was just replaced with a map"),
    }
}

fn ensure_list(slot: &mut AnswerValue) -> &mut Vec<AnswerValue> {
    if !matches!(slot, AnswerValue::List(_)) {
        *slot = AnswerValue::List(Vec::new());
    }
    match slot {
        AnswerValue::List(items) => items,
        _ => unreachable!("slot was just replaced with a list"),
    }
}
