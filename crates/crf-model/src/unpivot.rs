//! Wide-to-long reshape configuration.
//!
//! A source column's config accepts two JSON shapes:
//!
//! ```json
//! {"key": "HEIGHT", "attr": [{"val": "cm"}, {"col": "VISIT"}]}
//! ["HEIGHT", "cm", ["VISIT"]]
//! ```
//!
//! In the positional form the first item is the key label (or `null` for the
//! source column name); a one-element list is a column reference and any other
//! item is a literal.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::ModelError;

/// Where an attribute column takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSource {
    /// Same value on every emitted row.
    Literal(Cell),
    /// Copied per row from another column of the input.
    Column(String),
}

impl AttributeSource {
    pub fn literal(value: impl Into<Cell>) -> Self {
        Self::Literal(value.into())
    }

    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }
}

/// Key label and attributes for one source column.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawColumnConfig")]
pub struct UnpivotColumnConfig {
    /// Label written to the key column; the source column name when `None`.
    pub key: Option<String>,
    pub attributes: Vec<AttributeSource>,
}

impl UnpivotColumnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_literal(mut self, value: impl Into<Cell>) -> Self {
        self.attributes.push(AttributeSource::literal(value));
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.attributes.push(AttributeSource::column(column));
        self
    }
}

/// Shared options of the reshape operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnpivotSpec {
    /// Carried through unchanged.
    pub id_columns: Vec<String>,
    pub key_column: String,
    pub value_column: String,
    /// Attribute column names; `attr1..attrN` when `None`.
    pub attribute_columns: Option<Vec<String>>,
    /// Drop rows whose source value is missing or empty.
    pub filter_empty: bool,
}

impl Default for UnpivotSpec {
    fn default() -> Self {
        Self {
            id_columns: Vec::new(),
            key_column: "variable".to_string(),
            value_column: "value".to_string(),
            attribute_columns: None,
            filter_empty: true,
        }
    }
}

impl UnpivotSpec {
    pub fn new<I, S>(id_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id_columns: id_columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_key_column(mut self, name: impl Into<String>) -> Self {
        self.key_column = name.into();
        self
    }

    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }

    pub fn with_attribute_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter_empty(mut self, filter_empty: bool) -> Self {
        self.filter_empty = filter_empty;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<Literal> for Cell {
    fn from(value: Literal) -> Self {
        match value {
            Literal::Int(v) => Cell::Int(v),
            Literal::Float(v) => Cell::Float(v),
            Literal::Text(v) => Cell::Text(v),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAttribute {
    Column { col: String },
    Value { val: Option<Literal> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PositionalItem {
    Column(Vec<String>),
    Value(Option<Literal>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColumnConfig {
    Positional(Vec<PositionalItem>),
    Object {
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        attr: Vec<RawAttribute>,
    },
}

impl TryFrom<RawColumnConfig> for UnpivotColumnConfig {
    type Error = ModelError;

    fn try_from(raw: RawColumnConfig) -> Result<Self, Self::Error> {
        match raw {
            RawColumnConfig::Object { key, attr } => Ok(Self {
                key,
                attributes: attr
                    .into_iter()
                    .map(|a| match a {
                        RawAttribute::Column { col } => AttributeSource::Column(col),
                        RawAttribute::Value { val } => AttributeSource::Literal(val.into()),
                    })
                    .collect(),
            }),
            RawColumnConfig::Positional(items) => {
                let mut items = items.into_iter();
                let key = match items.next() {
                    None | Some(PositionalItem::Value(None)) => None,
                    Some(PositionalItem::Value(Some(label))) => Some(Cell::from(label).to_string()),
                    Some(PositionalItem::Column(_)) => {
                        return Err(ModelError::InvalidConfig(
                            "unpivot key label must be a value or null".to_string(),
                        ));
                    }
                };
                let attributes = items
                    .map(|item| match item {
                        PositionalItem::Column(names) => names
                            .into_iter()
                            .next()
                            .map(AttributeSource::Column)
                            .ok_or_else(|| {
                                ModelError::InvalidConfig(
                                    "unpivot column reference is an empty list".to_string(),
                                )
                            }),
                        PositionalItem::Value(val) => Ok(AttributeSource::Literal(val.into())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self { key, attributes })
            }
        }
    }
}
