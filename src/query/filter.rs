//! Numeric and geo filters attached to a search query.
//!
//! Unlike query-string predicates, filters travel as separate keyword
//! arguments (`FILTER field min max`, `GEOFILTER field lon lat radius unit`).

use serde::{Deserialize, Serialize};

/// Distance unit for geo filters and predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeoUnit {
    /// Meters (`m`).
    Meters,
    /// Kilometers (`km`).
    #[default]
    Kilometers,
    /// Feet (`ft`).
    Feet,
    /// Miles (`mi`).
    Miles,
}

impl GeoUnit {
    /// The unit token sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            GeoUnit::Meters => "m",
            GeoUnit::Kilometers => "km",
            GeoUnit::Feet => "ft",
            GeoUnit::Miles => "mi",
        }
    }
}

/// Render one end of a numeric range. Infinite values and open ends use the
/// `-inf`/`+inf` sentinels, which take no exclusive prefix.
pub(crate) fn render_bound(value: Option<f64>, exclusive: bool, open: &str) -> String {
    match value {
        Some(v) if v == f64::INFINITY => NumericFilter::INF.to_string(),
        Some(v) if v == f64::NEG_INFINITY => NumericFilter::NEG_INF.to_string(),
        Some(v) if exclusive => format!("({v}"),
        Some(v) => v.to_string(),
        None => open.to_string(),
    }
}

/// Restrict results to documents whose numeric field falls in a range.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFilter {
    field: String,
    min: Option<f64>,
    max: Option<f64>,
    min_exclusive: bool,
    max_exclusive: bool,
}

impl NumericFilter {
    /// Sentinel for an open upper bound.
    pub const INF: &'static str = "+inf";
    /// Sentinel for an open lower bound.
    pub const NEG_INF: &'static str = "-inf";

    /// Create an inclusive range filter. `None` leaves that side open.
    pub fn new<S, A, B>(field: S, min: A, max: B) -> Self
    where
        S: Into<String>,
        A: Into<Option<f64>>,
        B: Into<Option<f64>>,
    {
        NumericFilter {
            field: field.into(),
            min: min.into(),
            max: max.into(),
            min_exclusive: false,
            max_exclusive: false,
        }
    }

    /// Exclude the minimum value itself.
    pub fn min_exclusive(mut self, exclusive: bool) -> Self {
        self.min_exclusive = exclusive;
        self
    }

    /// Exclude the maximum value itself.
    pub fn max_exclusive(mut self, exclusive: bool) -> Self {
        self.max_exclusive = exclusive;
        self
    }

    /// Wire tokens, starting with `FILTER`.
    pub fn args(&self) -> Vec<String> {
        vec![
            "FILTER".to_string(),
            self.field.clone(),
            render_bound(self.min, self.min_exclusive, Self::NEG_INF),
            render_bound(self.max, self.max_exclusive, Self::INF),
        ]
    }
}

/// Restrict results to documents within a radius of a point.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFilter {
    field: String,
    lon: f64,
    lat: f64,
    radius: f64,
    unit: GeoUnit,
}

impl GeoFilter {
    /// Create a geo filter; the unit defaults to kilometers.
    pub fn new<S: Into<String>>(field: S, lon: f64, lat: f64, radius: f64) -> Self {
        GeoFilter {
            field: field.into(),
            lon,
            lat,
            radius,
            unit: GeoUnit::default(),
        }
    }

    /// Set the radius unit.
    pub fn unit(mut self, unit: GeoUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Wire tokens, starting with `GEOFILTER`.
    pub fn args(&self) -> Vec<String> {
        vec![
            "GEOFILTER".to_string(),
            self.field.clone(),
            self.lon.to_string(),
            self.lat.to_string(),
            self.radius.to_string(),
            self.unit.as_str().to_string(),
        ]
    }
}

/// Any filter a query can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Numeric range on a field.
    Numeric(NumericFilter),
    /// Geo radius on a field.
    Geo(GeoFilter),
    /// Keyword, field and arbitrary trailing arguments, passed through as-is.
    Raw {
        keyword: String,
        field: String,
        args: Vec<String>,
    },
}

impl Filter {
    /// Build a pass-through filter.
    pub fn raw<K, F, I, S>(keyword: K, field: F, args: I) -> Self
    where
        K: Into<String>,
        F: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Raw {
            keyword: keyword.into(),
            field: field.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Wire tokens for this filter.
    pub fn args(&self) -> Vec<String> {
        match self {
            Filter::Numeric(f) => f.args(),
            Filter::Geo(f) => f.args(),
            Filter::Raw {
                keyword,
                field,
                args,
            } => {
                let mut out = Vec::with_capacity(args.len() + 2);
                out.push(keyword.clone());
                out.push(field.clone());
                out.extend(args.iter().cloned());
                out
            }
        }
    }
}

impl From<NumericFilter> for Filter {
    fn from(filter: NumericFilter) -> Self {
        Filter::Numeric(filter)
    }
}

impl From<GeoFilter> for Filter {
    fn from(filter: GeoFilter) -> Self {
        Filter::Geo(filter)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_numeric_filter_args() {
        let f = NumericFilter::new("num", 1.0, 10.0);
        assert_eq!(f.args(), vec!["FILTER", "num", "1", "10"]);

        let f = NumericFilter::new("num", 1.0, 10.0)
            .min_exclusive(true)
            .max_exclusive(true);
        assert_eq!(f.args(), vec!["FILTER", "num", "(1", "(10"]);

        let f = NumericFilter::new("num", None, 2.5);
        assert_eq!(f.args(), vec!["FILTER", "num", "-inf", "2.5"]);

        let f = NumericFilter::new("num", 0.0, None);
        assert_eq!(f.args(), vec!["FILTER", "num", "0", "+inf"]);
    }

    #[test]
    fn test_numeric_filter_infinite_bounds() {
        let f = NumericFilter::new("x", f64::NEG_INFINITY, f64::INFINITY).min_exclusive(true);
        assert_eq!(f.args(), vec!["FILTER", "x", "-inf", "+inf"]);
    }

    proptest! {
        #[test]
        fn prop_numeric_filter_bounds(
            min in proptest::option::of(-1.0e9f64..1.0e9),
            max in proptest::option::of(-1.0e9f64..1.0e9),
            min_exclusive in any::<bool>(),
            max_exclusive in any::<bool>(),
        ) {
            let args = NumericFilter::new("n", min, max)
                .min_exclusive(min_exclusive)
                .max_exclusive(max_exclusive)
                .args();
            let expected_min = match min {
                None => "-inf".to_string(),
                Some(v) if min_exclusive => format!("({v}"),
                Some(v) => v.to_string(),
            };
            let expected_max = match max {
                None => "+inf".to_string(),
                Some(v) if max_exclusive => format!("({v}"),
                Some(v) => v.to_string(),
            };
            prop_assert_eq!(
                args,
                vec!["FILTER".to_string(), "n".to_string(), expected_min, expected_max]
            );
        }
    }

    #[test]
    fn test_geo_filter_args() {
        let f = GeoFilter::new("location", -0.44, 51.45, 10.0);
        assert_eq!(
            f.args(),
            vec!["GEOFILTER", "location", "-0.44", "51.45", "10", "km"]
        );

        let f = GeoFilter::new("location", -0.44, 51.45, 100.0).unit(GeoUnit::Meters);
        assert_eq!(f.args()[5], "m");
    }

    #[test]
    fn test_raw_filter_args() {
        let f = Filter::raw("FILTER", "price", ["5", "(9"]);
        assert_eq!(f.args(), vec!["FILTER", "price", "5", "(9"]);
    }
}
