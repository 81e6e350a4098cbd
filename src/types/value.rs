use std::borrow::Cow;
use std::fmt;

/// A raw scalar returned by a [`FieldResolver`](crate::FieldResolver).
///
/// Absence is expressed by the resolver returning `None`, never by a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text or an enum constant name.
    Text(String),
    /// Any numeric attribute. `NaN` is treated as absent.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
}

impl FieldValue {
    /// Text view used by string, enum and property rules.
    ///
    /// Numbers and booleans are rendered with their `Display` form so that a
    /// resolver may hand back whatever type it naturally has.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Bool(b) => Cow::Owned(b.to_string()),
        }
    }

    /// Numeric view used by number rules. Returns `NaN` when the value has no
    /// numeric reading.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            FieldValue::Bool(_) => f64::NAN,
        }
    }

    /// Boolean view used by boolean rules.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            FieldValue::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(v) => write!(f, "\"{v}\""),
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
        }
    }
}
