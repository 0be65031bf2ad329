//! Join configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::predicate::RowFilter;

/// Default suffix appended to selected right columns that clash with a left
/// column name.
pub const DEFAULT_JOIN_SUFFIX: &str = "_JOIN";

/// Equality keys of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKeys {
    /// Same column names on both sides.
    Same(Vec<String>),
    /// Left and right names, matched pairwise.
    Distinct { left: Vec<String>, right: Vec<String> },
}

impl JoinKeys {
    pub fn left(&self) -> &[String] {
        match self {
            Self::Same(keys) => keys,
            Self::Distinct { left, .. } => left,
        }
    }

    pub fn right(&self) -> &[String] {
        match self {
            Self::Same(keys) => keys,
            Self::Distinct { right, .. } => right,
        }
    }
}

/// Which right-side columns are carried into the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelection {
    /// Keep the listed columns under their own names.
    Keep(Vec<String>),
    /// Keep the mapped columns under their target names.
    Rename(IndexMap<String, String>),
}

impl ColumnSelection {
    /// `(source, target)` pairs in declaration order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Keep(names) => names.iter().map(|n| (n.as_str(), n.as_str())).collect(),
            Self::Rename(map) => map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinHow {
    /// Every left row is kept.
    #[default]
    Left,
    /// Left rows without a match are dropped.
    Inner,
}

/// A filtered join of a left table against a right table.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "JoinConfig")]
pub struct JoinSpec {
    pub keys: JoinKeys,
    /// Conjunction applied to right rows before joining.
    pub right_filter: Vec<RowFilter>,
    pub columns: ColumnSelection,
    /// Appended on name clashes. Empty means the right column replaces the
    /// left one.
    pub suffix: String,
    pub how: JoinHow,
}

impl JoinSpec {
    /// Join on columns with the same name on both sides.
    pub fn on<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_keys(JoinKeys::Same(keys.into_iter().map(Into::into).collect()))
    }

    /// Join on differently named key columns.
    pub fn on_distinct<L, R, S>(left: L, right: R) -> Self
    where
        L: IntoIterator<Item = S>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_keys(JoinKeys::Distinct {
            left: left.into_iter().map(Into::into).collect(),
            right: right.into_iter().map(Into::into).collect(),
        })
    }

    fn with_keys(keys: JoinKeys) -> Self {
        Self {
            keys,
            right_filter: Vec::new(),
            columns: ColumnSelection::Keep(Vec::new()),
            suffix: DEFAULT_JOIN_SUFFIX.to_string(),
            how: JoinHow::Left,
        }
    }

    pub fn keep<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = ColumnSelection::Keep(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn rename<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.columns = ColumnSelection::Rename(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.right_filter.push(filter);
        self
    }

    pub fn filter_eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(RowFilter::equals(column, value))
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn how(mut self, how: JoinHow) -> Self {
        self.how = how;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

fn default_suffix() -> String {
    DEFAULT_JOIN_SUFFIX.to_string()
}

/// Serialized shape of a [`JoinSpec`].
#[derive(Debug, Deserialize)]
struct JoinConfig {
    on: Option<OneOrMany>,
    left_on: Option<OneOrMany>,
    right_on: Option<OneOrMany>,
    #[serde(default)]
    columns: Option<ColumnSelection>,
    #[serde(default)]
    right_filter: IndexMap<String, String>,
    #[serde(default = "default_suffix")]
    suffix: String,
    #[serde(default)]
    how: JoinHow,
}

impl TryFrom<JoinConfig> for JoinSpec {
    type Error = ModelError;

    fn try_from(config: JoinConfig) -> Result<Self, Self::Error> {
        let keys = match (config.on, config.left_on, config.right_on) {
            (Some(on), None, None) => JoinKeys::Same(on.into_vec()),
            (None, Some(left), Some(right)) => {
                let left = left.into_vec();
                let right = right.into_vec();
                if left.len() != right.len() {
                    return Err(ModelError::InvalidConfig(format!(
                        "left_on has {} keys but right_on has {}",
                        left.len(),
                        right.len()
                    )));
                }
                JoinKeys::Distinct { left, right }
            }
            _ => {
                return Err(ModelError::InvalidConfig(
                    "join needs either 'on' or both 'left_on' and 'right_on'".to_string(),
                ));
            }
        };
        if keys.left().is_empty() {
            return Err(ModelError::InvalidConfig("join has no keys".to_string()));
        }
        Ok(Self {
            keys,
            right_filter: config
                .right_filter
                .into_iter()
                .map(|(column, value)| RowFilter::Equals { column, value })
                .collect(),
            columns: config.columns.unwrap_or(ColumnSelection::Keep(Vec::new())),
            suffix: config.suffix,
            how: config.how,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let spec = JoinSpec::on(["SUBJID"]).keep(["AGE"]);
        assert_eq!(spec.suffix, "_JOIN");
        assert_eq!(spec.how, JoinHow::Left);
        assert_eq!(spec.columns.pairs(), vec![("AGE", "AGE")]);
    }

    #[test]
    fn rename_preserves_order() {
        let spec = JoinSpec::on(["ID"]).rename([("B", "Y"), ("A", "X")]);
        assert_eq!(spec.columns.pairs(), vec![("B", "Y"), ("A", "X")]);
    }
}
