//! Composable builder for query-string predicates.
//!
//! Values (`between`, `tags`, `geo`, scalars) render to the fragment that
//! follows `@field:` in a query string. Nodes (`intersect`, `union`,
//! `disjunct`, `optional`) combine field clauses and sub-expressions.
//!
//! ```
//! use redisearch::query::querystring::{between, intersect, tags, union};
//!
//! let expr = union()
//!     .child(intersect().field("foo", 1).field("bar", 2))
//!     .child(intersect().field("foo", 3).field("bar", 4));
//! assert_eq!(expr.to_string(), "((@foo:1 @bar:2)|(@foo:3 @bar:4))");
//!
//! let expr = intersect()
//!     .field("price", between(10.0, 20.0).inclusive_max(false))
//!     .field("color", tags(["red", "blue"]).unwrap());
//! assert_eq!(expr.to_string(), "(@price:[10 (20] @color:{red | blue})");
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{RediSearchError, Result};
use crate::query::filter::{GeoUnit, render_bound};

lazy_static! {
    static ref SPECIAL_CHARS: Regex =
        Regex::new(r#"([,.<>{}\[\]"':;!@#$%^&*()\-+=~|/\\\s])"#).unwrap();
}

/// Escape query-syntax punctuation and whitespace with a backslash.
///
/// Use this for tag values and terms that contain separators, e.g.
/// `escape("hello;world")` yields `hello\;world`.
pub fn escape(text: &str) -> String {
    SPECIAL_CHARS.replace_all(text, r"\$1").into_owned()
}

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Inclusive bound.
    Included(f64),
    /// Exclusive bound.
    Excluded(f64),
    /// No limit on this side.
    Unbounded,
}

impl Bound {
    fn new(value: Option<f64>) -> Self {
        match value {
            Some(v) => Bound::Included(v),
            None => Bound::Unbounded,
        }
    }

    fn with_inclusive(self, inclusive: bool) -> Self {
        match self {
            Bound::Included(v) | Bound::Excluded(v) if inclusive => Bound::Included(v),
            Bound::Included(v) | Bound::Excluded(v) => Bound::Excluded(v),
            Bound::Unbounded => Bound::Unbounded,
        }
    }

    fn render(&self, unbounded: &str) -> String {
        match *self {
            Bound::Included(v) => render_bound(Some(v), false, unbounded),
            Bound::Excluded(v) => render_bound(Some(v), true, unbounded),
            Bound::Unbounded => unbounded.to_string(),
        }
    }
}

/// A numeric range predicate, rendered as `[min max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValue {
    lower: Bound,
    upper: Bound,
}

impl RangeValue {
    /// Make the lower bound inclusive (the default) or exclusive.
    pub fn inclusive_min(mut self, inclusive: bool) -> Self {
        self.lower = self.lower.with_inclusive(inclusive);
        self
    }

    /// Make the upper bound inclusive (the default) or exclusive.
    pub fn inclusive_max(mut self, inclusive: bool) -> Self {
        self.upper = self.upper.with_inclusive(inclusive);
        self
    }

    /// The lower bound.
    pub fn lower(&self) -> Bound {
        self.lower
    }

    /// The upper bound.
    pub fn upper(&self) -> Bound {
        self.upper
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}]",
            self.lower.render("-inf"),
            self.upper.render("+inf")
        )
    }
}

/// A tag-set predicate, rendered as `{a | b | c}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    tags: Vec<String>,
}

impl TagValue {
    /// The tags in this predicate.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.tags.join(" | "))
    }
}

/// A geo-radius predicate, rendered as `[lon lat radius unit]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoValue {
    lon: f64,
    lat: f64,
    radius: f64,
    unit: GeoUnit,
}

impl fmt::Display for GeoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} {} {}]",
            self.lon,
            self.lat,
            self.radius,
            self.unit.as_str()
        )
    }
}

/// Anything that can follow `@field:` in a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A bare term or number.
    Scalar(String),
    /// A numeric range.
    Range(RangeValue),
    /// A set of tags.
    Tags(TagValue),
    /// A geo radius.
    Geo(GeoValue),
}

impl Value {
    /// Scalars can be merged into a single `@field:(a|b)` clause; the
    /// bracketed forms cannot.
    fn is_combinable(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => f.write_str(s),
            Value::Range(r) => r.fmt(f),
            Value::Tags(t) => t.fmt(f),
            Value::Geo(g) => g.fmt(f),
        }
    }
}

impl From<RangeValue> for Value {
    fn from(value: RangeValue) -> Self {
        Value::Range(value)
    }
}

impl From<TagValue> for Value {
    fn from(value: TagValue) -> Self {
        Value::Tags(value)
    }
}

impl From<GeoValue> for Value {
    fn from(value: GeoValue) -> Self {
        Value::Geo(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

macro_rules! scalar_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Scalar(value.to_string())
            }
        })*
    };
}

scalar_from_number!(i32, i64, u32, u64, usize, f64);

/// Numeric range between `min` and `max`, both inclusive. `None` leaves that
/// side open.
pub fn between<A, B>(min: A, max: B) -> RangeValue
where
    A: Into<Option<f64>>,
    B: Into<Option<f64>>,
{
    RangeValue {
        lower: Bound::new(min.into()),
        upper: Bound::new(max.into()),
    }
}

/// Exactly `n`.
pub fn equal(n: f64) -> RangeValue {
    between(n, n)
}

/// Strictly less than `n`.
pub fn lt(n: f64) -> RangeValue {
    between(None, n).inclusive_max(false)
}

/// Less than or equal to `n`.
pub fn le(n: f64) -> RangeValue {
    between(None, n)
}

/// Strictly greater than `n`.
pub fn gt(n: f64) -> RangeValue {
    between(n, None).inclusive_min(false)
}

/// Greater than or equal to `n`.
pub fn ge(n: f64) -> RangeValue {
    between(n, None)
}

/// Match any of the given tags. At least one tag is required.
pub fn tags<I, S>(values: I) -> Result<TagValue>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    let tags: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    if tags.is_empty() {
        return Err(RediSearchError::invalid_argument(
            "at least one tag must be specified",
        ));
    }
    Ok(TagValue { tags })
}

/// Points within `radius` of `(lon, lat)`.
pub fn geo(lon: f64, lat: f64, radius: f64, unit: GeoUnit) -> GeoValue {
    GeoValue {
        lon,
        lat,
        radius,
        unit,
    }
}

/// How a node joins its clauses and what it prefixes them with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// All clauses must match (space-joined).
    Intersect,
    /// Any clause may match (`|`-joined).
    Union,
    /// None of the clauses may match together (`-` prefix, space-joined).
    Disjunct,
    /// None of the clauses may match (`-` prefix, `|`-joined).
    DisjunctUnion,
    /// Clauses boost but do not filter (`~` prefix, space-joined).
    Optional,
}

impl Operator {
    fn join_str(self) -> &'static str {
        match self {
            Operator::Intersect | Operator::Disjunct | Operator::Optional => " ",
            Operator::Union | Operator::DisjunctUnion => "|",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Operator::Disjunct | Operator::DisjunctUnion => "-",
            Operator::Optional => "~",
            Operator::Intersect | Operator::Union => "",
        }
    }

    fn is_union(self) -> bool {
        matches!(self, Operator::Union | Operator::DisjunctUnion)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Param {
    Leaf(String),
    Node(Node),
}

impl Param {
    fn render(&self) -> String {
        match self {
            Param::Leaf(s) => s.clone(),
            Param::Node(n) => n.render(None),
        }
    }
}

/// A combinator over field clauses and nested expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    operator: Operator,
    params: Vec<Param>,
}

impl Node {
    /// Create an empty node with the given operator.
    pub fn new(operator: Operator) -> Self {
        Node {
            operator,
            params: Vec::new(),
        }
    }

    /// The node's operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Number of top-level clauses.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the node has no clauses.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Add a nested node.
    pub fn child(mut self, node: Node) -> Self {
        self.params.push(Param::Node(node));
        self
    }

    /// Add a raw query-string fragment, used verbatim.
    pub fn expr<S: Into<String>>(mut self, expr: S) -> Self {
        self.params.push(Param::Leaf(expr.into()));
        self
    }

    /// Add a `@name:value` clause.
    pub fn field<S, V>(self, name: S, value: V) -> Self
    where
        S: AsRef<str>,
        V: Into<Value>,
    {
        self.field_any(name, [value])
    }

    /// Add a clause matching `name` against any of `values`.
    ///
    /// Scalars collapse into `@name:(a|b)`. Bracketed values become one clause
    /// each, grouped in their own union unless this node already is one.
    pub fn field_any<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.as_ref();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        match values.len() {
            0 => {}
            1 => self
                .params
                .push(Param::Leaf(format!("@{}:{}", name, values[0]))),
            _ if values.iter().all(Value::is_combinable) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                self.params
                    .push(Param::Leaf(format!("@{}:({})", name, joined.join("|"))));
            }
            _ => {
                let leaves = values
                    .iter()
                    .map(|v| Param::Leaf(format!("@{name}:{v}")));
                if self.operator.is_union() {
                    self.params.extend(leaves);
                } else {
                    let mut alternatives = Node::new(Operator::Union);
                    alternatives.params.extend(leaves);
                    self.params.push(Param::Node(alternatives));
                }
            }
        }
        self
    }

    /// Render, optionally forcing parentheses on or off. By default a node is
    /// parenthesized when it has more than one clause.
    pub fn render(&self, with_parens: Option<bool>) -> String {
        let with_parens = with_parens.unwrap_or(self.params.len() > 1);
        let body: Vec<String> = self.params.iter().map(Param::render).collect();
        let body = body.join(self.operator.join_str());
        let prefix = self.operator.prefix();
        if with_parens {
            format!("({prefix}{body})")
        } else {
            format!("{prefix}{body}")
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// All clauses must match.
pub fn intersect() -> Node {
    Node::new(Operator::Intersect)
}

/// Any clause may match.
pub fn union() -> Node {
    Node::new(Operator::Union)
}

/// Exclude documents matching all the clauses.
pub fn disjunct() -> Node {
    Node::new(Operator::Disjunct)
}

/// Exclude documents matching any of the clauses.
pub fn disjunct_union() -> Node {
    Node::new(Operator::DisjunctUnion)
}

/// Clauses that raise the score when present without being required.
pub fn optional() -> Node {
    Node::new(Operator::Optional)
}

/// Render an intersection of the given node's clauses as a query string.
pub fn querystring(node: Node) -> String {
    let mut root = intersect();
    root.params = node.params;
    root.to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_between_infinite_bounds() {
        assert_eq!(
            between(f64::NEG_INFINITY, f64::INFINITY).to_string(),
            "[-inf +inf]"
        );
        assert_eq!(gt(f64::NEG_INFINITY).to_string(), "[-inf +inf]");
    }

    fn render_end(value: Option<f64>, inclusive: bool, open: &str) -> String {
        match value {
            None => open.to_string(),
            Some(v) if inclusive => v.to_string(),
            Some(v) => format!("({v}"),
        }
    }

    proptest! {
        #[test]
        fn prop_range_rendering(
            min in proptest::option::of(-1.0e9f64..1.0e9),
            max in proptest::option::of(-1.0e9f64..1.0e9),
            inclusive_min in any::<bool>(),
            inclusive_max in any::<bool>(),
        ) {
            let rendered = between(min, max)
                .inclusive_min(inclusive_min)
                .inclusive_max(inclusive_max)
                .to_string();
            let expected = format!(
                "[{} {}]",
                render_end(min, inclusive_min, "-inf"),
                render_end(max, inclusive_max, "+inf")
            );
            prop_assert_eq!(rendered, expected);
        }

        #[test]
        fn prop_range_field_clause(
            min in -1.0e6f64..1.0e6,
            span in 0.0f64..1.0e6,
            inclusive_min in any::<bool>(),
            inclusive_max in any::<bool>(),
        ) {
            let max = min + span;
            let range = between(min, max)
                .inclusive_min(inclusive_min)
                .inclusive_max(inclusive_max);
            let clause = intersect().field("price", range).to_string();
            let lo = if inclusive_min { min.to_string() } else { format!("({min}") };
            let hi = if inclusive_max { max.to_string() } else { format!("({max}") };
            prop_assert_eq!(clause, format!("@price:[{lo} {hi}]"));
        }
    }

    #[test]
    fn test_between() {
        assert_eq!(between(1.0, 10.0).to_string(), "[1 10]");
        assert_eq!(between(None, 10.0).to_string(), "[-inf 10]");
        assert_eq!(between(1.0, None).to_string(), "[1 +inf]");
        assert_eq!(between(None, None).to_string(), "[-inf +inf]");
        assert_eq!(between(1.0, 10.0).inclusive_min(false).to_string(), "[(1 10]");
        assert_eq!(between(1.0, 10.0).inclusive_max(false).to_string(), "[1 (10]");
        assert_eq!(
            between(1.5, 10.0)
                .inclusive_min(false)
                .inclusive_max(false)
                .to_string(),
            "[(1.5 (10]"
        );
    }

    #[test]
    fn test_range_helpers() {
        assert_eq!(equal(5.0).to_string(), "[5 5]");
        assert_eq!(lt(5.0).to_string(), "[-inf (5]");
        assert_eq!(le(5.0).to_string(), "[-inf 5]");
        assert_eq!(gt(5.0).to_string(), "[(5 +inf]");
        assert_eq!(ge(5.0).to_string(), "[5 +inf]");
    }

    #[test]
    fn test_tags() {
        assert!(tags(Vec::<String>::new()).is_err());
        assert_eq!(tags([1, 2, 3]).unwrap().to_string(), "{1 | 2 | 3}");
        assert_eq!(tags(["foo"]).unwrap().to_string(), "{foo}");
    }

    #[test]
    fn test_geo_value() {
        let value = geo(-122.41, 37.77, 5.0, GeoUnit::Kilometers);
        assert_eq!(value.to_string(), "[-122.41 37.77 5 km]");
    }

    #[test]
    fn test_union() {
        assert_eq!(union().to_string(), "");

        let u = union().field("foo", "fooval").field("bar", "barval");
        assert_eq!(u.to_string(), "(@foo:fooval|@bar:barval)");

        let u = union()
            .child(intersect().field("foo", 1).field("bar", 2))
            .child(intersect().field("foo", 3).field("bar", 4));
        assert_eq!(u.to_string(), "((@foo:1 @bar:2)|(@foo:3 @bar:4))");
    }

    #[test]
    fn test_special_nodes() {
        let u = union().field("num", between(1.0, 10.0));
        assert_eq!(u.to_string(), "@num:[1 10]");

        let u = union().field_any("num", [between(1.0, 10.0), between(100.0, 200.0)]);
        assert_eq!(u.to_string(), "(@num:[1 10]|@num:[100 200])");

        let u = union().field_any(
            "num",
            [
                tags(["t1", "t2", "t3"]).unwrap(),
                tags(["t100", "t200", "t300"]).unwrap(),
            ],
        );
        assert_eq!(
            u.to_string(),
            "(@num:{t1 | t2 | t3}|@num:{t100 | t200 | t300})"
        );
    }

    #[test]
    fn test_intersect_alternatives_become_union() {
        let i = intersect()
            .field_any("num", [between(1.0, 10.0), between(100.0, 200.0)])
            .field("title", "hello");
        assert_eq!(i.to_string(), "((@num:[1 10]|@num:[100 200]) @title:hello)");

        let i = intersect().field_any("color", ["red", "blue"]);
        assert_eq!(i.to_string(), "@color:(red|blue)");
    }

    #[test]
    fn test_negation_and_optional() {
        assert_eq!(disjunct().field("foo", "bar").to_string(), "-@foo:bar");
        assert_eq!(
            disjunct().field("foo", "bar").field("baz", 1).to_string(),
            "(-@foo:bar @baz:1)"
        );
        assert_eq!(
            disjunct_union().field("foo", "bar").field("baz", 1).to_string(),
            "(-@foo:bar|@baz:1)"
        );
        assert_eq!(optional().field("foo", "bar").to_string(), "~@foo:bar");
    }

    #[test]
    fn test_querystring_and_expr() {
        let q = querystring(union().expr("hello").field("title", "world"));
        assert_eq!(q, "(hello @title:world)");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("hello;world"), r"hello\;world");
        assert_eq!(escape("foo bar"), r"foo\ bar");
        assert_eq!(escape("test-user"), r"test\-user");
        assert_eq!(escape("plain"), "plain");
    }
}
