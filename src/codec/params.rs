//! Parameter values and the pure transforms between positional and named forms.
//!
//! # Responsibilities
//! - Represent URL parameter values (`Scalar`) and containers (`Params`)
//! - Pair a flat sequence into a map (keyed grammars)
//! - Bind positional values to annotated names and flatten them back
//!
//! # Design Decisions
//! - Every scalar is stored in its URL string form, so a value survives
//!   encode → decode unchanged regardless of its original Rust type
//! - `ParamMap` keeps insertion order; re-inserting a key replaces the value
//!   in place, matching how ordered hash arrays behave
//! - All functions here are free of hidden state

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// A single scalar parameter value, held in its URL string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Scalar(String);

impl Scalar {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

// Booleans travel as 1/0 so they stay scalar in every grammar.
impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self(if value { "1" } else { "0" }.to_string())
    }
}

macro_rules! scalar_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

/// Insertion-ordered name → scalar map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, Scalar)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Append a value under the next free integer key.
    pub fn push(&mut self, value: impl Into<Scalar>) {
        let next = self
            .entries
            .iter()
            .filter_map(|(k, _)| k.parse::<usize>().ok())
            .map(|i| i + 1)
            .max()
            .unwrap_or(0);
        self.insert(next.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Returns the values in order when the keys are exactly `0..len`.
    pub fn as_sequence(&self) -> Option<Vec<Scalar>> {
        let sequential = self
            .entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == i.to_string());
        sequential.then(|| self.values().cloned().collect())
    }
}

// Config files carry plain strings, numbers and booleans; all become scalars.
impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
                Ok(Scalar::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
                Ok(Scalar::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
                Ok(Scalar::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
                Ok(Scalar::from(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
                Ok(Scalar::from(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
                Ok(Scalar::from(v))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

impl Serialize for ParamMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParamMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamMapVisitor;

        impl<'de> Visitor<'de> for ParamMapVisitor {
            type Value = ParamMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of scalar parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ParamMap, A::Error> {
                let mut map = ParamMap::new();
                while let Some((k, v)) = access.next_entry::<String, Scalar>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ParamMapVisitor)
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Route parameters: nothing, an ordered sequence, a named map, or one raw scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Params {
    #[default]
    Empty,
    List(Vec<Scalar>),
    Map(ParamMap),
    Raw(Scalar),
}

impl Params {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        Params::List(values.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        Params::Map(pairs.into_iter().collect())
    }

    /// True for `Empty` and for empty containers.
    pub fn is_empty(&self) -> bool {
        match self {
            Params::Empty => true,
            Params::List(values) => values.is_empty(),
            Params::Map(map) => map.is_empty(),
            Params::Raw(_) => false,
        }
    }

    /// Values in order, discarding names.
    pub fn values(&self) -> Vec<Scalar> {
        match self {
            Params::Empty => Vec::new(),
            Params::List(values) => values.clone(),
            Params::Map(map) => map.values().cloned().collect(),
            Params::Raw(value) => vec![value.clone()],
        }
    }
}

impl From<Vec<Scalar>> for Params {
    fn from(values: Vec<Scalar>) -> Self {
        Params::List(values)
    }
}

impl From<ParamMap> for Params {
    fn from(map: ParamMap) -> Self {
        Params::Map(map)
    }
}

impl From<Scalar> for Params {
    fn from(value: Scalar) -> Self {
        Params::Raw(value)
    }
}

/// Pair a flat sequence two elements at a time; a trailing odd element is dropped.
pub fn pair(values: &[Scalar]) -> ParamMap {
    values
        .chunks_exact(2)
        .map(|kv| (kv[0].as_str().to_string(), kv[1].clone()))
        .collect()
}

/// Annotated names that may be bound positionally.
///
/// Names shadowed by an addition parameter are skipped; addition parameters
/// are merged after binding and must never be overwritten by position.
pub fn bindable_names<'a, 'b, I>(names: &'a [String], addition_keys: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'b str>,
{
    let reserved: Vec<&str> = addition_keys.into_iter().collect();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| !reserved.iter().any(|r| r == name))
        .collect()
}

/// Bind positional values to names in order; surplus values get integer keys.
pub fn bind(values: &[Scalar], names: &[&str]) -> ParamMap {
    let mut map = ParamMap::new();
    for (i, value) in values.iter().enumerate() {
        match names.get(i) {
            Some(name) => map.insert(*name, value.clone()),
            None => map.push(value.clone()),
        }
    }
    map
}

/// Inverse of [`bind`]: named values go to their annotated slot, the rest follow in map order.
///
/// A gap (a later annotated name present while an earlier one is missing)
/// would shift every following slot, so it is rejected.
pub fn flatten(map: &ParamMap, names: &[&str]) -> Result<Vec<Scalar>, CodecError> {
    let mut out = Vec::with_capacity(map.len());
    let mut missing: Option<&str> = None;

    for &name in names {
        match map.get(name) {
            Some(value) => {
                if let Some(gap) = missing {
                    return Err(CodecError::MissingParam {
                        name: gap.to_string(),
                    });
                }
                out.push(value.clone());
            }
            None => {
                missing.get_or_insert(name);
            }
        }
    }

    out.extend(
        map.iter()
            .filter(|(k, _)| !names.contains(k))
            .map(|(_, v)| v.clone()),
    );
    Ok(out)
}

/// Merge always-injected addition params with decoded params; the caller's value wins.
pub fn merge_addition(params: Params, addition: &ParamMap) -> Params {
    if params.is_empty() {
        return if addition.is_empty() {
            Params::Empty
        } else {
            Params::Map(addition.clone())
        };
    }
    if addition.is_empty() {
        return params;
    }

    match params {
        Params::List(values) => {
            let mut merged = addition.clone();
            for value in values {
                merged.push(value);
            }
            Params::Map(merged)
        }
        Params::Map(map) => {
            let mut merged = addition.clone();
            for (k, v) in map.iter() {
                merged.insert(k, v.clone());
            }
            Params::Map(merged)
        }
        other => other,
    }
}
