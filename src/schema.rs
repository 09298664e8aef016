//! Schema model
//!
//! Permissive parse of the declarative field tree. Document-level problems
//! (unreadable file, invalid YAML, non-mapping root) are errors; node-level
//! problems degrade: a missing or unknown `type` becomes text, missing
//! `children` become empty, and an unusable `length` falls back to asking.

use crate::answers::AnswerValue;
use crate::error::SchemaError;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Upper bound on the repetition count of any array node.
pub const MAX_ARRAY_LENGTH: usize = 1_000;

/// Keys stripped from a handler source before it is forwarded as config.
const HANDLER_SELECTOR_KEYS: [&str; 4] = ["type", "handler", "class", "method"];

/// Field type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
    Select,
    MultiSelect,
    Hash,
    Array,
}

impl FieldType {
    /// Parse a type name, accepting the common aliases. Unknown names are `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Some(FieldType::Text),
            "integer" | "int" | "number" => Some(FieldType::Integer),
            "boolean" | "bool" => Some(FieldType::Boolean),
            "select" => Some(FieldType::Select),
            "multi_select" | "multiselect" => Some(FieldType::MultiSelect),
            "hash" | "map" | "object" => Some(FieldType::Hash),
            "array" | "list" => Some(FieldType::Array),
            _ => None,
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, FieldType::Hash | FieldType::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Hash => "hash",
            FieldType::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a select field's options come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    Static(Vec<String>),
    Directory {
        path: Option<PathBuf>,
    },
    Dataset {
        path: Option<PathBuf>,
    },
    Handler {
        name: Option<String>,
        method: Option<String>,
        config: Map<String, Value>,
    },
    Unknown(String),
}

impl SourceSpec {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let path = map.get("path").and_then(Value::as_str).map(PathBuf::from);
        let kind = match map.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_ascii_lowercase(),
            None if map.contains_key("options") || map.contains_key("choices") => {
                "static".to_string()
            }
            None if map.contains_key("handler") || map.contains_key("class") => {
                "handler".to_string()
            }
            None => String::new(),
        };

        let spec = match kind.as_str() {
            "static" => SourceSpec::Static(option_list(
                map.get("options").or_else(|| map.get("choices")),
            )),
            "directory" | "files" => SourceSpec::Directory { path },
            "dataset" | "yaml" | "json" => SourceSpec::Dataset { path },
            "handler" | "processor" => SourceSpec::Handler {
                name: map
                    .get("handler")
                    .or_else(|| map.get("class"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                method: map.get("method").and_then(Value::as_str).map(str::to_string),
                config: map
                    .iter()
                    .filter(|(k, _)| !HANDLER_SELECTOR_KEYS.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            },
            other => SourceSpec::Unknown(other.to_string()),
        };
        Some(spec)
    }

    pub fn kind(&self) -> &str {
        match self {
            SourceSpec::Static(_) => "static",
            SourceSpec::Directory { .. } => "directory",
            SourceSpec::Dataset { .. } => "dataset",
            SourceSpec::Handler { .. } => "handler",
            SourceSpec::Unknown(kind) => kind,
        }
    }
}

/// Per-field validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidateRule {
    /// `/.../` literal, matched anywhere in the input.
    Pattern(String),
    /// Predicate expression over `value` and `answers`.
    Expression(String),
}

impl ValidateRule {
    pub fn parse(rule: &str) -> Self {
        let rule = rule.trim();
        if rule.len() >= 2 && rule.starts_with('/') && rule.ends_with('/') {
            ValidateRule::Pattern(rule[1..rule.len() - 1].to_string())
        } else {
            ValidateRule::Expression(rule.to_string())
        }
    }
}

/// Fixed numeric coercion applied after transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertRule {
    Int,
    Float,
}

impl ConvertRule {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(ConvertRule::Int),
            "float" => Some(ConvertRule::Float),
            _ => None,
        }
    }
}

/// Repetition count of an array node.
#[derive(Debug, Clone, PartialEq)]
pub enum LengthSpec {
    Fixed(usize),
    /// Expression evaluated against the answers when traversal reaches the array.
    Computed(String),
    /// No length declared; the operator is asked for a count.
    Ask,
}

impl LengthSpec {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => LengthSpec::Ask,
            Some(Value::Number(n)) => match n.as_u64() {
                Some(count) => LengthSpec::fixed(count),
                None => LengthSpec::Fixed(0),
            },
            Some(Value::String(s)) => match s.trim().parse::<u64>() {
                Ok(count) => LengthSpec::fixed(count),
                Err(_) if s.trim().is_empty() => LengthSpec::Ask,
                Err(_) => LengthSpec::Computed(s.clone()),
            },
            Some(other) => {
                warn!(length = %other, "Unusable array length, asking at runtime");
                LengthSpec::Ask
            }
        }
    }

    fn fixed(count: u64) -> Self {
        if count > MAX_ARRAY_LENGTH as u64 {
            warn!(length = count, max = MAX_ARRAY_LENGTH, "Array length too large, capping");
            return LengthSpec::Fixed(MAX_ARRAY_LENGTH);
        }
        LengthSpec::Fixed(count as usize)
    }
}

/// A keyed node within its parent's ordered field list.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub key: String,
    pub node: SchemaNode,
}

/// One node of the declarative field tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub field_type: FieldType,
    /// Prompt label; defaults to the field key.
    pub prompt: String,
    pub default: Option<AnswerValue>,
    pub options: Vec<String>,
    pub help: Option<String>,
    pub required: bool,
    pub source: Option<SourceSpec>,
    pub confirm: bool,
    pub validate: Option<ValidateRule>,
    pub convert: Option<ConvertRule>,
    pub transform: Option<String>,
    pub skip_if: Option<String>,
    pub children: Vec<SchemaField>,
    pub length: LengthSpec,
}

impl SchemaNode {
    /// Plain text node with the given label and nothing else set.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            field_type: FieldType::Text,
            prompt: prompt.into(),
            default: None,
            options: Vec::new(),
            help: None,
            required: false,
            source: None,
            confirm: false,
            validate: None,
            convert: None,
            transform: None,
            skip_if: None,
            children: Vec::new(),
            length: LengthSpec::Ask,
        }
    }

    /// Build a node from its document form, degrading instead of failing.
    pub fn from_value(key: &str, value: &Value) -> Self {
        let mut node = SchemaNode::text(key);
        let Some(map) = value.as_object() else {
            warn!(field = key, "Schema node is not a mapping, treating as text");
            return node;
        };

        node.field_type = match map.get("type").and_then(Value::as_str) {
            None => FieldType::Text,
            Some(name) => FieldType::parse(name).unwrap_or_else(|| {
                warn!(field = key, field_type = name, "Unknown field type, treating as text");
                FieldType::Text
            }),
        };

        if let Some(prompt) = map.get("prompt").and_then(scalar_string) {
            node.prompt = prompt;
        }
        node.help = map.get("help").and_then(scalar_string);
        node.required = map.get("required").and_then(Value::as_bool).unwrap_or(false);
        node.confirm = map.get("confirm").and_then(Value::as_bool).unwrap_or(false);
        node.options = option_list(map.get("options").or_else(|| map.get("choices")));
        node.source = map.get("source").and_then(SourceSpec::from_value);
        node.validate = map
            .get("validate")
            .and_then(Value::as_str)
            .map(ValidateRule::parse);
        node.convert = map.get("convert").and_then(Value::as_str).and_then(|name| {
            let rule = ConvertRule::parse(name);
            if rule.is_none() {
                warn!(field = key, convert = name, "Unknown convert rule ignored");
            }
            rule
        });
        node.transform = non_empty_string(map.get("transform"));
        node.skip_if = non_empty_string(map.get("skip_if"));

        node.default = match map.get("default") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) if node.field_type == FieldType::MultiSelect => Some(
                AnswerValue::List(items.iter().cloned().map(AnswerValue::from).collect()),
            ),
            Some(single) if node.field_type == FieldType::MultiSelect => {
                Some(AnswerValue::List(vec![AnswerValue::from(single.clone())]))
            }
            Some(value) => Some(AnswerValue::from(value.clone())),
        }
        .map(|default| normalize_default(node.field_type, default));

        if node.field_type.is_container() {
            node.children = match map.get("children") {
                Some(Value::Object(children)) => parse_fields(children),
                Some(_) => {
                    warn!(field = key, "Children must be a mapping, treating as empty");
                    Vec::new()
                }
                None => Vec::new(),
            };
        }
        if node.field_type == FieldType::Array {
            node.length = LengthSpec::from_value(map.get("length"));
        }

        node
    }
}

/// Parsed schema: the ordered top-level fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Load a YAML (or JSON) schema document from disk.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        let document: Value =
            serde_yaml_ng::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::from_json_value(&document)
    }

    pub fn from_json_value(document: &Value) -> Result<Self, SchemaError> {
        match document {
            Value::Object(map) => Ok(Self::new(parse_fields(map))),
            // An empty document asks nothing.
            Value::Null => Ok(Self::default()),
            _ => Err(SchemaError::NotAMapping),
        }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.node)
    }

    /// Visit every node depth-first in declaration order.
    ///
    /// Paths use `[]` for array elements, e.g. `servers[].host`.
    pub fn for_each_node(&self, visit: &mut dyn FnMut(&str, &SchemaNode)) {
        fn walk(prefix: &str, fields: &[SchemaField], visit: &mut dyn FnMut(&str, &SchemaNode)) {
            for field in fields {
                let path = if prefix.is_empty() {
                    field.key.clone()
                } else {
                    format!("{}.{}", prefix, field.key)
                };
                visit(&path, &field.node);
                match field.node.field_type {
                    FieldType::Hash => walk(&path, &field.node.children, visit),
                    FieldType::Array => {
                        walk(&format!("{}[]", path), &field.node.children, visit)
                    }
                    _ => {}
                }
            }
        }
        walk("", &self.fields, visit);
    }
}

fn parse_fields(map: &Map<String, Value>) -> Vec<SchemaField> {
    map.iter()
        .map(|(key, value)| SchemaField {
            key: key.clone(),
            node: SchemaNode::from_value(key, value),
        })
        .collect()
}

fn option_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_string).collect(),
        _ => Vec::new(),
    }
}

/// Store a default as the type a capture of this field produces, so accepting
/// it leaves the skeleton value unchanged.
fn normalize_default(field_type: FieldType, default: AnswerValue) -> AnswerValue {
    match (field_type, default) {
        (FieldType::Text | FieldType::Select, value) => match value.scalar_text() {
            Some(text) => AnswerValue::Text(text),
            None => value,
        },
        (FieldType::MultiSelect, AnswerValue::List(items)) => AnswerValue::List(
            items
                .into_iter()
                .map(|item| match item.scalar_text() {
                    Some(text) => AnswerValue::Text(text),
                    None => item,
                })
                .collect(),
        ),
        (FieldType::Integer, AnswerValue::Text(text)) => match text.trim().parse::<i64>() {
            Ok(number) => AnswerValue::Integer(number),
            Err(_) => AnswerValue::Text(text),
        },
        (_, value) => value,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
