//! Cell values.
//!
//! Every cell a [`DataSource`](super::DataSource) exposes is a [`CellValue`],
//! a tagged container for the dynamically typed data found in tables. The
//! tag drives the default ordering in [`natural_cmp`](super::natural_cmp).

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

/// The dynamic kind of a value, or of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Mixed or unknown content. Only used to describe columns.
    Any,
    /// No value.
    Empty,
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Text.
    Text,
    /// Date and time.
    Date,
    /// An application type, identified by its [`CustomValue::kind`].
    Custom(&'static str),
}

/// Application-defined cell content.
///
/// Implement this for values that do not fit the built-in variants of
/// [`CellValue`]. The comparator queries the capability methods to decide
/// how two values are ordered.
///
/// # Type Hierarchy
///
/// A custom value may declare that it is also an instance of other custom
/// kinds via [`ancestors`](Self::ancestors). When two values both provide a
/// natural ordering against each other, the comparator delegates to the more
/// derived one.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::cmp::Ordering;
/// use std::fmt;
/// use gridstate::model::{CellValue, CustomValue};
///
/// #[derive(Debug)]
/// struct Version(u32, u32);
///
/// impl fmt::Display for Version {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}.{}", self.0, self.1)
///     }
/// }
///
/// impl CustomValue for Version {
///     fn kind(&self) -> &'static str {
///         "version"
///     }
///
///     fn natural_cmp(&self, other: &CellValue) -> Option<Ordering> {
///         let other = other.downcast::<Version>()?;
///         Some((self.0, self.1).cmp(&(other.0, other.1)))
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let a = CellValue::custom(Version(1, 10));
/// let b = CellValue::custom(Version(1, 9));
/// assert_eq!(gridstate::model::natural_cmp(&a, &b), Ordering::Greater);
/// ```
pub trait CustomValue: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The name of this value's concrete kind.
    fn kind(&self) -> &'static str;

    /// Kinds this value is also an instance of, most specific first.
    fn ancestors(&self) -> &'static [&'static str] {
        &[]
    }

    /// Natural ordering of `self` against `other`, if this type defines one
    /// for the concrete kind of `other`.
    fn natural_cmp(&self, _other: &CellValue) -> Option<Ordering> {
        None
    }

    /// Numeric view of this value, if it is a number.
    fn as_number(&self) -> Option<f64> {
        None
    }

    /// Boolean view of this value, if it is a truth value.
    fn as_bool(&self) -> Option<bool> {
        None
    }

    /// Get this as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// The content of a single cell.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    /// No value.
    #[default]
    Empty,
    /// Boolean data.
    Bool(bool),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Text data.
    Text(String),
    /// Date and time data.
    Date(NaiveDateTime),
    /// Application-defined data.
    Custom(Arc<dyn CustomValue>),
}

impl CellValue {
    /// Wraps an application value.
    pub fn custom<T: CustomValue>(value: T) -> Self {
        CellValue::Custom(Arc::new(value))
    }

    /// Returns the dynamic kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            CellValue::Empty => ValueKind::Empty,
            CellValue::Bool(_) => ValueKind::Bool,
            CellValue::Int(_) => ValueKind::Int,
            CellValue::Float(_) => ValueKind::Float,
            CellValue::Text(_) => ValueKind::Text,
            CellValue::Date(_) => ValueKind::Date,
            CellValue::Custom(value) => ValueKind::Custom(value.kind()),
        }
    }

    /// Returns `true` if this is `CellValue::Empty`.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns `true` if this value is an instance of `kind`, either
    /// directly or through one of its declared ancestors.
    pub fn is_instance_of(&self, kind: ValueKind) -> bool {
        match (self, kind) {
            (CellValue::Custom(value), ValueKind::Custom(name)) => {
                value.kind() == name || value.ancestors().contains(&name)
            }
            (value, kind) => value.kind() == kind,
        }
    }

    /// Attempts to get the data as a string slice.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view: integers, floats and numeric custom values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            CellValue::Custom(value) => value.as_number(),
            _ => None,
        }
    }

    /// Boolean view: booleans and boolean-like custom values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Custom(value) => value.as_bool(),
            _ => None,
        }
    }

    /// Attempts to get the data as a date.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            CellValue::Custom(value) => value.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Custom(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Float(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => value.into(),
            None => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Tag(&'static str);

    impl fmt::Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{}", self.0)
        }
    }

    impl CustomValue for Tag {
        fn kind(&self) -> &'static str {
            "tag"
        }

        fn ancestors(&self) -> &'static [&'static str] {
            &["label"]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(CellValue::Empty.kind(), ValueKind::Empty);
        assert_eq!(CellValue::from(3).kind(), ValueKind::Int);
        assert_eq!(CellValue::from(3.5).kind(), ValueKind::Float);
        assert_eq!(CellValue::from("x").kind(), ValueKind::Text);
        assert_eq!(CellValue::custom(Tag("a")).kind(), ValueKind::Custom("tag"));
    }

    #[test]
    fn test_instance_of_ancestors() {
        let tag = CellValue::custom(Tag("a"));
        assert!(tag.is_instance_of(ValueKind::Custom("tag")));
        assert!(tag.is_instance_of(ValueKind::Custom("label")));
        assert!(!tag.is_instance_of(ValueKind::Custom("other")));
        assert!(!tag.is_instance_of(ValueKind::Text));
        assert!(CellValue::from(1).is_instance_of(ValueKind::Int));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::from(true).to_string(), "true");
        assert_eq!(CellValue::from(-4).to_string(), "-4");
        assert_eq!(CellValue::custom(Tag("x")).to_string(), "#x");

        let date = NaiveDate::from_ymd_opt(2003, 6, 3).unwrap();
        assert_eq!(CellValue::from(date).to_string(), "2003-06-03 00:00:00");
    }

    #[test]
    fn test_numeric_and_downcast() {
        assert_eq!(CellValue::from(7).as_number(), Some(7.0));
        assert_eq!(CellValue::from("7").as_number(), None);
        assert_eq!(CellValue::from(Some(2)).as_int(), Some(2));
        assert!(CellValue::from(None::<i32>).is_empty());

        let tag = CellValue::custom(Tag("z"));
        assert_eq!(tag.downcast::<Tag>().map(|t| t.0), Some("z"));
        assert!(tag.downcast::<String>().is_none());
    }
}
