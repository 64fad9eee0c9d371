//! Classifier input schema and the assembled feature record.
//!
//! Column names, order and types are fixed by the trained model and must not
//! change independently of the model artifact.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

impl Column {
    pub fn default_value(&self) -> FeatureValue {
        match self.kind {
            ColumnType::Int => FeatureValue::Int(0),
            ColumnType::Float => FeatureValue::Float(0.0),
            ColumnType::Text => FeatureValue::Text(String::new()),
        }
    }
}

const fn int(name: &'static str) -> Column {
    Column { name, kind: ColumnType::Int }
}

const fn float(name: &'static str) -> Column {
    Column { name, kind: ColumnType::Float }
}

const fn text(name: &'static str) -> Column {
    Column { name, kind: ColumnType::Text }
}

pub const FEATURE_COUNT: usize = 52;

pub const FEATURE_SCHEMA: [Column; FEATURE_COUNT] = [
    // URL structure
    int("URLLength"),
    int("DomainLength"),
    int("IsDomainIP"),
    text("TLD"),
    int("TLDLength"),
    int("NoOfSubDomain"),
    int("HasObfuscation"),
    int("NoOfObfuscatedChar"),
    float("ObfuscationRatio"),
    int("NoOfLettersInURL"),
    float("LetterRatioInURL"),
    int("NoOfDegitsInURL"),
    float("DegitRatioInURL"),
    int("NoOfEqualsInURL"),
    int("NoOfQMarkInURL"),
    int("NoOfAmpersandInURL"),
    int("NoOfOtherSpecialCharsInURL"),
    float("SpacialCharRatioInURL"),
    int("IsHTTPS"),
    // page content, never observed here
    int("HasTitle"),
    text("Title"),
    int("DomainTitleMatchScore"),
    int("URLTitleMatchScore"),
    int("HasFavicon"),
    int("Robots"),
    int("IsResponsive"),
    int("NoOfURLRedirect"),
    int("NoOfSelfRedirect"),
    int("HasDescription"),
    int("NoOfPopup"),
    int("NoOfiFrame"),
    int("HasExternalFormSubmit"),
    int("HasSocialNet"),
    int("HasSubmitButton"),
    int("HasHiddenFields"),
    int("HasPasswordField"),
    int("Bank"),
    int("Pay"),
    int("Crypto"),
    int("HasCopyrightInfo"),
    int("NoOfImage"),
    int("NoOfCSS"),
    int("NoOfJS"),
    int("NoOfSelfRef"),
    int("NoOfEmptyRef"),
    int("NoOfExternalRef"),
    // keyword suspicion
    int("has_login"),
    int("has_secure"),
    int("has_bank"),
    int("has_payment"),
    int("has_support"),
    int("num_suspicious_keywords"),
];

pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|c| c.name == name)
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    pub fn kind(&self) -> ColumnType {
        match self {
            FeatureValue::Int(_) => ColumnType::Int,
            FeatureValue::Float(_) => ColumnType::Float,
            FeatureValue::Text(_) => ColumnType::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    // Integers widen into float columns; nothing else converts.
    fn coerce(self, kind: ColumnType) -> Option<FeatureValue> {
        match (self, kind) {
            (FeatureValue::Int(v), ColumnType::Float) => Some(FeatureValue::Float(v as f64)),
            (value, kind) if value.kind() == kind => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Int(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Int(v) => serializer.serialize_i64(*v),
            FeatureValue::Float(v) => serializer.serialize_f64(*v),
            FeatureValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("unknown feature column {0:?}")]
    UnknownColumn(String),

    #[error("column {column} expects {expected}, got {actual}")]
    TypeMismatch {
        column: &'static str,
        expected: ColumnType,
        actual: ColumnType,
    },
}

/// One row of classifier input: a value for every column of
/// [`FEATURE_SCHEMA`], in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: Vec<FeatureValue>,
}

impl FeatureRecord {
    /// Build a record from whatever columns are supplied. Absent columns take
    /// their typed default; a later pair for the same column wins.
    pub fn assemble<I, K>(pairs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, FeatureValue)>,
        K: AsRef<str>,
    {
        let mut values: Vec<FeatureValue> =
            FEATURE_SCHEMA.iter().map(Column::default_value).collect();

        for (name, value) in pairs {
            let name = name.as_ref();
            let idx = column_index(name).ok_or_else(|| SchemaError::UnknownColumn(name.to_string()))?;
            let column = &FEATURE_SCHEMA[idx];
            let actual = value.kind();
            values[idx] = value.coerce(column.kind).ok_or(SchemaError::TypeMismatch {
                column: column.name,
                expected: column.kind,
                actual,
            })?;
        }

        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        column_index(name).map(|idx| &self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> + '_ {
        FEATURE_SCHEMA.iter().map(|c| c.name).zip(self.values.iter())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter().map(|(name, _)| name)
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
