// bintree-rust/src/common.rs

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{BinaryTreeError, Result};

/// Name of the record field that carries the sort key.
pub const RECORD_KEY_FIELD: &str = "key";

/// The scalar type an atomic tree is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyKind {
    Int,
    Float,
    Text,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Int => f.write_str("int"),
            KeyKind::Float => f.write_str("float"),
            KeyKind::Text => f.write_str("text"),
        }
    }
}

// Both zeros are one key.
fn unsigned_zero(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x }
}

/// An orderable scalar. Atomic trees store it directly; record trees use the
/// record's `key` field.
///
/// Keys of different kinds never meet inside one tree, but the ordering is
/// total anyway: same-kind keys compare by value (floats via `total_cmp`,
/// with `-0.0` equal to `0.0`), mixed kinds compare by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Key {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Key {
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Int(_) => KeyKind::Int,
            Key::Float(_) => KeyKind::Float,
            Key::Text(_) => KeyKind::Text,
        }
    }

    /// Rejects keys that cannot take part in an ordering (NaN).
    pub fn validate(&self) -> Result<()> {
        match self {
            Key::Float(f) if f.is_nan() => Err(BinaryTreeError::InvalidPayload(
                "NaN cannot be used as a key".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Widens an integer key when the target kind is float. Every other
    /// combination is returned unchanged.
    pub fn coerce_to(self, kind: KeyKind) -> Key {
        match (self, kind) {
            (Key::Int(i), KeyKind::Float) => Key::Float(i as f64),
            (key, _) => key,
        }
    }

    /// Reads a key out of a JSON scalar: integers that fit `i64` become
    /// `Int`, other numbers `Float`, strings `Text`.
    pub fn from_json(value: &JsonValue) -> Result<Key> {
        let key = match value {
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Key::Int(i),
                None => Key::Float(unsigned_zero(n.as_f64().ok_or_else(|| {
                    BinaryTreeError::InvalidPayload(format!("number {} is not representable", n))
                })?)),
            },
            JsonValue::String(s) => Key::Text(s.clone()),
            other => {
                return Err(BinaryTreeError::InvalidPayload(format!(
                    "Can't recognize the value inside the node: {}",
                    other
                )))
            }
        };
        key.validate()?;
        Ok(key)
    }

    pub fn to_json(&self) -> JsonValue {
        Field::from(self.clone()).into()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Float(x) => write!(f, "{}", x),
            Key::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            (Key::Float(a), Key::Float(b)) => unsigned_zero(*a).total_cmp(&unsigned_zero(*b)),
            (Key::Text(a), Key::Text(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Key::Int(i) => i.hash(state),
            Key::Float(x) => unsigned_zero(*x).to_bits().hash(state),
            Key::Text(s) => s.hash(state),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Key::Float(unsigned_zero(value))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

/// An opaque record field. Mirrors the JSON data model but stays
/// bincode-friendly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Field>),
    Map(BTreeMap<String, Field>),
}

impl Field {
    /// The key this field holds, if it is an orderable scalar.
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Field::Int(i) => Some(Key::Int(*i)),
            Field::Float(x) => Some(Key::Float(*x)),
            Field::Text(s) => Some(Key::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<Key> for Field {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(i) => Field::Int(i),
            Key::Float(x) => Field::Float(x),
            Key::Text(s) => Field::Text(s),
        }
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Bool(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Int(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Float(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<JsonValue> for Field {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Field::Null,
            JsonValue::Bool(b) => Field::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Field::Int(i),
                None => n.as_f64().map(Field::Float).unwrap_or(Field::Null),
            },
            JsonValue::String(s) => Field::Text(s),
            JsonValue::Array(items) => Field::List(items.into_iter().map(Field::from).collect()),
            JsonValue::Object(map) => {
                Field::Map(map.into_iter().map(|(k, v)| (k, Field::from(v))).collect())
            }
        }
    }
}

impl From<Field> for JsonValue {
    fn from(field: Field) -> Self {
        match field {
            Field::Null => JsonValue::Null,
            Field::Bool(b) => JsonValue::Bool(b),
            Field::Int(i) => JsonValue::from(i),
            // Non-finite floats have no JSON form.
            Field::Float(x) => serde_json::Number::from_f64(x)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Field::Text(s) => JsonValue::String(s),
            Field::List(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Field::Map(map) => JsonValue::Object(
                map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect(),
            ),
        }
    }
}

/// A labeled mapping ordered by its `key` field. Every other field is
/// carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    key: Key,
    fields: BTreeMap<String, Field>,
}

impl Record {
    pub fn new(key: impl Into<Key>) -> Self {
        Record {
            key: key.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a non-key field. Setting `key` through here is a
    /// no-op; the sort key is fixed at construction.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Field>) -> Self {
        let name = name.into();
        if name != RECORD_KEY_FIELD {
            self.fields.insert(name, value.into());
        }
        self
    }

    /// Builds a record from a full field map, which must contain `key`.
    pub fn from_fields(mut fields: BTreeMap<String, Field>) -> Result<Self> {
        let key_field = fields.remove(RECORD_KEY_FIELD).ok_or_else(|| {
            BinaryTreeError::InvalidPayload(format!("record has no '{}' field", RECORD_KEY_FIELD))
        })?;
        let key = key_field.as_key().ok_or_else(|| {
            BinaryTreeError::InvalidPayload(format!(
                "record '{}' field is not an orderable scalar: {:?}",
                RECORD_KEY_FIELD, key_field
            ))
        })?;
        key.validate()?;
        Ok(Record { key, fields })
    }

    pub fn from_json(value: JsonValue) -> Result<Self> {
        match Field::from(value) {
            Field::Map(fields) => Record::from_fields(fields),
            other => Err(BinaryTreeError::InvalidPayload(format!(
                "record payload must be a mapping, got {:?}",
                other
            ))),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The same record with its key widened towards `kind` (see
    /// [`Key::coerce_to`]).
    pub fn rekeyed(mut self, kind: KeyKind) -> Self {
        self.key = self.key.coerce_to(kind);
        self
    }

    /// Looks a field up by name, `key` included.
    pub fn get(&self, name: &str) -> Option<Field> {
        if name == RECORD_KEY_FIELD {
            Some(Field::from(self.key.clone()))
        } else {
            self.fields.get(name).cloned()
        }
    }

    /// Non-key fields.
    pub fn fields(&self) -> &BTreeMap<String, Field> {
        &self.fields
    }

    pub fn to_json(&self) -> JsonValue {
        let mut object = serde_json::Map::new();
        object.insert(RECORD_KEY_FIELD.to_string(), self.key.to_json());
        for (name, value) in &self.fields {
            object.insert(name.clone(), JsonValue::from(value.clone()));
        }
        JsonValue::Object(object)
    }
}

impl TryFrom<JsonValue> for Record {
    type Error = BinaryTreeError;

    fn try_from(value: JsonValue) -> Result<Self> {
        Record::from_json(value)
    }
}

/// What a tree holds. Fixed for atomic trees; a record tree learns its key
/// kind from the first record it receives unless one was given up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    Atomic(KeyKind),
    Record(Option<KeyKind>),
}

impl PayloadKind {
    pub fn key_kind(&self) -> Option<KeyKind> {
        match self {
            PayloadKind::Atomic(kind) => Some(*kind),
            PayloadKind::Record(kind) => *kind,
        }
    }

    /// Whether two trees may meet in a comparison or a merge.
    pub fn is_compatible(&self, other: &PayloadKind) -> bool {
        match (self, other) {
            (PayloadKind::Atomic(a), PayloadKind::Atomic(b)) => a == b,
            (PayloadKind::Record(a), PayloadKind::Record(b)) => match (a, b) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            },
            _ => false,
        }
    }

    /// Checks a lookup key against this kind.
    pub fn check_key(&self, key: &Key) -> Result<()> {
        key.validate()?;
        match self.key_kind() {
            Some(kind) if kind != key.kind() => Err(BinaryTreeError::InvalidPayload(format!(
                "expected a {} key, got {}",
                kind, key
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Atomic(kind) => write!(f, "atomic<{}>", kind),
            PayloadKind::Record(Some(kind)) => write!(f, "record<{}>", kind),
            PayloadKind::Record(None) => f.write_str("record<?>"),
        }
    }
}

/// Configuration for persisting trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Extension appended to a tree name to form its blob key.
    pub file_extension: String,
    /// Length of the lowercase names generated for unnamed trees.
    pub generated_name_len: usize,
    /// Verify the whole-blob BLAKE3 checksum on load.
    pub verify_checksum: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            file_extension: "bt".to_string(),
            generated_name_len: 10,
            verify_checksum: true,
        }
    }
}
