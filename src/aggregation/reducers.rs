//! Reducers applied to each group of an aggregation.
//!
//! Every reducer is a name plus a fixed positional argument list:
//!
//! | function              | name                | args                          |
//! |-----------------------|---------------------|-------------------------------|
//! | [`count`]             | `COUNT`             | none                          |
//! | [`count_distinct`]    | `COUNT_DISTINCT`    | field                         |
//! | [`count_distinctish`] | `COUNT_DISTINCTISH` | field                         |
//! | [`sum`]               | `SUM`               | field                         |
//! | [`min`]               | `MIN`               | field                         |
//! | [`max`]               | `MAX`               | field                         |
//! | [`avg`]               | `AVG`               | field                         |
//! | [`stddev`]            | `STDDEV`            | field                         |
//! | [`quantile`]          | `QUANTILE`          | field, fraction               |
//! | [`tolist`]            | `TOLIST`            | field                         |
//! | [`first_value`]       | `FIRST_VALUE`       | field [`BY` field direction]  |
//! | [`random_sample`]     | `RANDOM_SAMPLE`     | field, size                   |

use crate::aggregation::SortKey;
use crate::error::{RediSearchError, Result};
use crate::query::SortDirection;

/// The aggregation function a reducer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReducerFunction {
    Count,
    CountDistinct,
    CountDistinctish,
    Sum,
    Min,
    Max,
    Avg,
    StdDev,
    Quantile,
    ToList,
    FirstValue,
    RandomSample,
}

impl ReducerFunction {
    /// The reducer name sent on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            ReducerFunction::Count => "COUNT",
            ReducerFunction::CountDistinct => "COUNT_DISTINCT",
            ReducerFunction::CountDistinctish => "COUNT_DISTINCTISH",
            ReducerFunction::Sum => "SUM",
            ReducerFunction::Min => "MIN",
            ReducerFunction::Max => "MAX",
            ReducerFunction::Avg => "AVG",
            ReducerFunction::StdDev => "STDDEV",
            ReducerFunction::Quantile => "QUANTILE",
            ReducerFunction::ToList => "TOLIST",
            ReducerFunction::FirstValue => "FIRST_VALUE",
            ReducerFunction::RandomSample => "RANDOM_SAMPLE",
        }
    }
}

/// Name under which a reducer's output appears in result rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alias {
    /// Use this exact name.
    Explicit(String),
    /// Use the reduced field's name without its leading `@`.
    FromField,
}

impl From<&str> for Alias {
    fn from(alias: &str) -> Self {
        Alias::Explicit(alias.to_string())
    }
}

impl From<String> for Alias {
    fn from(alias: String) -> Self {
        Alias::Explicit(alias)
    }
}

/// A reducer: function, positional arguments and optional output alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Reducer {
    function: ReducerFunction,
    args: Vec<String>,
    field: Option<String>,
    alias: Option<String>,
}

impl Reducer {
    fn new(function: ReducerFunction, field: Option<String>, args: Vec<String>) -> Self {
        Reducer {
            function,
            args,
            field,
            alias: None,
        }
    }

    fn on_field(function: ReducerFunction, field: String, extra: Vec<String>) -> Self {
        let mut args = Vec::with_capacity(extra.len() + 1);
        args.push(field.clone());
        args.extend(extra);
        Self::new(function, Some(field), args)
    }

    /// The function this reducer applies.
    pub fn function(&self) -> ReducerFunction {
        self.function
    }

    /// The reducer name, e.g. `COUNT`.
    pub fn name(&self) -> &'static str {
        self.function.name()
    }

    /// Positional arguments, not counting the name or the alias.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The field this reducer operates on, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// The output alias, if one was set.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Set the output alias.
    ///
    /// [`Alias::FromField`] is only valid for reducers that operate on a
    /// field; the leading `@` of the field name is dropped.
    pub fn alias<A: Into<Alias>>(mut self, alias: A) -> Result<Self> {
        let alias = match alias.into() {
            Alias::Explicit(name) => name,
            Alias::FromField => {
                let field = self.field.as_deref().ok_or_else(|| {
                    RediSearchError::validation(format!(
                        "cannot use the field name as alias for {}, which has no field",
                        self.name()
                    ))
                })?;
                field.strip_prefix('@').unwrap_or(field).to_string()
            }
        };
        self.alias = Some(alias);
        Ok(self)
    }

    /// Wire tokens: `REDUCE name nargs args... [AS alias]`.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "REDUCE".to_string(),
            self.name().to_string(),
            self.args.len().to_string(),
        ];
        args.extend(self.args.iter().cloned());
        if let Some(alias) = &self.alias {
            args.push("AS".to_string());
            args.push(alias.clone());
        }
        args
    }
}

/// Number of records in the group.
pub fn count() -> Reducer {
    Reducer::new(ReducerFunction::Count, None, Vec::new())
}

/// Exact number of distinct values of `field`.
pub fn count_distinct<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::CountDistinct, field.into(), Vec::new())
}

/// Approximate number of distinct values of `field`.
pub fn count_distinctish<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::CountDistinctish, field.into(), Vec::new())
}

/// Sum of `field`.
pub fn sum<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::Sum, field.into(), Vec::new())
}

/// Minimum of `field`.
pub fn min<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::Min, field.into(), Vec::new())
}

/// Maximum of `field`.
pub fn max<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::Max, field.into(), Vec::new())
}

/// Mean of `field`.
pub fn avg<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::Avg, field.into(), Vec::new())
}

/// Standard deviation of `field`.
pub fn stddev<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::StdDev, field.into(), Vec::new())
}

/// The value of `field` at quantile `pct` (between 0 and 1).
pub fn quantile<S: Into<String>>(field: S, pct: f64) -> Reducer {
    Reducer::on_field(ReducerFunction::Quantile, field.into(), vec![pct.to_string()])
}

/// All distinct values of `field`, as a list.
pub fn tolist<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::ToList, field.into(), Vec::new())
}

/// The first value of `field` in the group.
pub fn first_value<S: Into<String>>(field: S) -> Reducer {
    Reducer::on_field(ReducerFunction::FirstValue, field.into(), Vec::new())
}

/// The value of `field` in the record that sorts first by `by`. A bare sort
/// key sorts ascending.
pub fn first_value_by<S, K>(field: S, by: K) -> Reducer
where
    S: Into<String>,
    K: Into<SortKey>,
{
    let by = by.into();
    let direction = by.direction.unwrap_or(SortDirection::Asc);
    Reducer::on_field(
        ReducerFunction::FirstValue,
        field.into(),
        vec!["BY".to_string(), by.field, direction.as_str().to_string()],
    )
}

/// The first value of `field` when the group is sorted by `field` itself.
pub fn first_value_ordered<S: Into<String>>(field: S, direction: SortDirection) -> Reducer {
    let field = field.into();
    first_value_by(
        field.clone(),
        SortKey {
            field,
            direction: Some(direction),
        },
    )
}

/// A random sample of `size` values of `field`.
pub fn random_sample<S: Into<String>>(field: S, size: usize) -> Reducer {
    Reducer::on_field(ReducerFunction::RandomSample, field.into(), vec![size.to_string()])
}
