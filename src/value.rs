use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::sync::Arc;
use time::macros::datetime;
use time::PrimitiveDateTime;

/// Fixed literal used for SQL NULL.
const NULL_LITERAL: &str = "NULL";

/// Fixed literal used for the zero timestamp sentinel.
const ZERO_TIMESTAMP_LITERAL: &str = "'0000-00-00 00:00:00'";

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Error returned by a [`SqlValuer`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sql valuer error: {0}")]
pub struct ValuerError(pub String);

/// A self-describing value: a type that knows how to produce its own
/// underlying storable [`Value`].
///
/// Implement this for wrapper types whose SQL representation depends on
/// runtime state, such as a nullable string:
///
/// ```
/// use sqlx_params::{SqlValuer, Value, ValuerError};
///
/// #[derive(Debug)]
/// struct NullString {
///     value: String,
///     valid: bool,
/// }
///
/// impl SqlValuer for NullString {
///     fn sql_value(&self) -> Result<Value, ValuerError> {
///         if self.valid {
///             Ok(Value::Text(self.value.clone()))
///         } else {
///             Ok(Value::Null)
///         }
///     }
/// }
/// ```
pub trait SqlValuer: fmt::Debug + Send + Sync {
    /// Produces the underlying value, or fails with a [`ValuerError`].
    fn sql_value(&self) -> Result<Value, ValuerError>;
}

/// A value that renders itself as display text. Used as the fallback
/// encoding path when no more specific rule applies; the produced text is
/// quoted and escaped like any other string.
pub trait SqlStringer: fmt::Debug + Send + Sync {
    /// Produces the display text for this value.
    fn sql_string(&self) -> String;
}

/// A typed SQL argument.
///
/// `Value` is the single argument type accepted by [`inline`](crate::inline)
/// and [`expand_in`](crate::expand_in). Most Rust primitives convert with
/// `From`/`Into`; `Option<T>` maps `None` to [`Value::Null`], and vectors of
/// integers or strings map to [`Value::List`].
///
/// ```
/// use sqlx_params::Value;
///
/// assert_eq!(Value::from(42).to_literal().unwrap(), "42");
/// assert_eq!(Value::from("it's").to_literal().unwrap(), r"'it\'s'");
/// assert_eq!(Value::from(None::<i32>).to_literal().unwrap(), "NULL");
/// assert_eq!(Value::from(vec![1, 2, 3]).to_literal().unwrap(), "ARRAY[1, 2, 3]");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(PrimitiveDateTime),
    /// An ordered sequence of values. Renders as an `ARRAY[...]` literal and
    /// expands to one placeholder per element in [`expand_in`](crate::expand_in).
    List(Vec<Value>),
    /// A fixed, ordered set of named fields, standing in for a parameter
    /// struct. Field order decides positional numbering; field names decide
    /// named-placeholder keys.
    Record(Vec<(String, Value)>),
    /// An unordered string-keyed mapping. Keys always bind by name.
    Map(BTreeMap<String, Value>),
    /// A self-describing value, resolved through [`SqlValuer`].
    Valuer(Arc<dyn SqlValuer>),
    /// A display-text value, resolved through [`SqlStringer`].
    Stringer(Arc<dyn SqlStringer>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Text(l), Self::Text(r)) => l == r,
            (Self::Bytes(l), Self::Bytes(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::List(l), Self::List(r)) => l == r,
            (Self::Record(l), Self::Record(r)) => l == r,
            (Self::Map(l), Self::Map(r)) => l == r,
            (Self::Valuer(l), Self::Valuer(r)) => Arc::ptr_eq(l, r),
            (Self::Stringer(l), Self::Stringer(r)) => Arc::ptr_eq(l, r),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    /// The zero timestamp sentinel. Encodes as `'0000-00-00 00:00:00'`
    /// instead of a real calendar date.
    pub fn zero_timestamp() -> PrimitiveDateTime {
        datetime!(0001-01-01 0:00)
    }

    /// Wraps a self-describing value.
    pub fn valuer(value: impl SqlValuer + 'static) -> Self {
        Value::Valuer(Arc::new(value))
    }

    /// Wraps a display-text value.
    pub fn stringer(value: impl SqlStringer + 'static) -> Self {
        Value::Stringer(Arc::new(value))
    }

    /// Builds a [`Value::List`] from any iterator of convertible elements.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(..) => "boolean",
            Value::Int8(..) => "int8",
            Value::Int16(..) => "int16",
            Value::Int32(..) => "int32",
            Value::Int64(..) => "int64",
            Value::UInt8(..) => "uint8",
            Value::UInt16(..) => "uint16",
            Value::UInt32(..) => "uint32",
            Value::UInt64(..) => "uint64",
            Value::Float32(..) => "float32",
            Value::Float64(..) => "float64",
            Value::Text(..) => "text",
            Value::Bytes(..) => "bytes",
            Value::Timestamp(..) => "timestamp",
            Value::List(..) => "list",
            Value::Record(..) => "record",
            Value::Map(..) => "map",
            Value::Valuer(..) => "valuer",
            Value::Stringer(..) => "stringer",
        }
    }

    /// Encodes this value as a SQL literal.
    ///
    /// The only failing path is a [`SqlValuer`] that reports an error; every
    /// other variant encodes unconditionally.
    ///
    /// ```
    /// use sqlx_params::Value;
    ///
    /// assert_eq!(Value::from(true).to_literal().unwrap(), "true");
    /// assert_eq!(Value::from(1.5).to_literal().unwrap(), "1.500000");
    /// ```
    pub fn to_literal(&self) -> Result<String, ValuerError> {
        let mut out = String::new();
        self.write_literal(&mut out)?;
        Ok(out)
    }

    fn write_literal(&self, out: &mut String) -> Result<(), ValuerError> {
        match self {
            Value::Null => out.push_str(NULL_LITERAL),
            Value::Valuer(v) => v.sql_value()?.write_literal(out)?,
            Value::Bool(v) => out.push_str(["false", "true"][*v as usize]),
            Value::Timestamp(v) => write_timestamp(out, v),
            Value::Stringer(v) => write_quoted(out, &v.sql_string()),
            Value::Bytes(v) => {
                if let Some(text) = printable_text(v) {
                    write_quoted(out, text);
                } else {
                    out.push_str("'<binary>'");
                }
            }
            Value::Int8(v) => write_integer!(out, *v),
            Value::Int16(v) => write_integer!(out, *v),
            Value::Int32(v) => write_integer!(out, *v),
            Value::Int64(v) => write_integer!(out, *v),
            Value::UInt8(v) => write_integer!(out, *v),
            Value::UInt16(v) => write_integer!(out, *v),
            Value::UInt32(v) => write_integer!(out, *v),
            Value::UInt64(v) => write_integer!(out, *v),
            Value::Float32(v) => {
                let _ = write!(out, "{:.6}", v);
            }
            Value::Float64(v) => {
                let _ = write!(out, "{:.6}", v);
            }
            Value::Text(v) => write_quoted(out, v),
            Value::List(items) => {
                out.push_str("ARRAY[");
                let mut first = true;
                for item in items {
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    item.write_literal(out)?;
                }
                out.push(']');
            }
            Value::Record(..) | Value::Map(..) => write_quoted(out, &format!("{self:?}")),
        }
        Ok(())
    }
}

/// Renders the encoded literal; a failing [`SqlValuer`] degrades to `NULL`
/// so display never errors.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_literal() {
            Ok(literal) => f.write_str(&literal),
            Err(_) => f.write_str(NULL_LITERAL),
        }
    }
}

/// Writes `value` single-quoted, backslash-escaping embedded quotes.
fn write_quoted(out: &mut String, value: &str) {
    out.push('\'');
    let mut position = 0;
    for (i, c) in value.char_indices() {
        if c == '\'' {
            out.push_str(&value[position..i]);
            out.push_str("\\'");
            position = i + 1;
        }
    }
    out.push_str(&value[position..]);
    out.push('\'');
}

/// Timestamps render at millisecond precision with trailing zeros trimmed;
/// an exact second carries no fractional part at all.
fn write_timestamp(out: &mut String, value: &PrimitiveDateTime) {
    if *value == Value::zero_timestamp() {
        out.push_str(ZERO_TIMESTAMP_LITERAL);
        return;
    }
    let _ = write!(
        out,
        "'{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        value.year(),
        value.month() as u8,
        value.day(),
        value.hour(),
        value.minute(),
        value.second()
    );
    let mut subsecond = value.millisecond();
    if subsecond != 0 {
        let mut width = 3;
        while width > 1 && subsecond % 10 == 0 {
            subsecond /= 10;
            width -= 1;
        }
        let _ = write!(out, ".{:0width$}", subsecond, width = width);
    }
    out.push('\'');
}

/// Returns the bytes as text if every character is printable.
fn printable_text(bytes: &[u8]) -> Option<&str> {
    match std::str::from_utf8(bytes) {
        Ok(text) if text.chars().all(|c| !c.is_control()) => Some(text),
        _ => None,
    }
}

macro_rules! impl_from {
    ($source:ty, $variant:path) => {
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                $variant(value)
            }
        }
    };
}

impl_from!(bool, Value::Bool);
impl_from!(i8, Value::Int8);
impl_from!(i16, Value::Int16);
impl_from!(i32, Value::Int32);
impl_from!(i64, Value::Int64);
impl_from!(u8, Value::UInt8);
impl_from!(u16, Value::UInt16);
impl_from!(u32, Value::UInt32);
impl_from!(u64, Value::UInt64);
impl_from!(f32, Value::Float32);
impl_from!(f64, Value::Float64);
impl_from!(String, Value::Text);
impl_from!(Vec<u8>, Value::Bytes);
impl_from!(PrimitiveDateTime, Value::Timestamp);
impl_from!(Vec<Value>, Value::List);
impl_from!(BTreeMap<String, Value>, Value::Map);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

macro_rules! impl_from_list {
    ($element:ty) => {
        impl From<Vec<$element>> for Value {
            fn from(value: Vec<$element>) -> Self {
                Value::list(value)
            }
        }
    };
}

impl_from_list!(String);
impl_from_list!(&str);
impl_from_list!(i8);
impl_from_list!(i16);
impl_from_list!(i32);
impl_from_list!(i64);
impl_from_list!(u16);
impl_from_list!(u32);
impl_from_list!(u64);

/// Builds a `Vec<Value>` argument list, converting each element with
/// [`Value::from`].
///
/// ```
/// use sqlx_params::{params, Value};
///
/// let args = params![1, "two", None::<i64>];
/// assert_eq!(args[2], Value::Null);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Value::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[derive(Debug)]
    struct NullString {
        value: String,
        valid: bool,
    }

    impl SqlValuer for NullString {
        fn sql_value(&self) -> Result<Value, ValuerError> {
            if self.valid {
                Ok(Value::Text(self.value.clone()))
            } else {
                Ok(Value::Null)
            }
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl SqlValuer for Failing {
        fn sql_value(&self) -> Result<Value, ValuerError> {
            Err(ValuerError("broken".into()))
        }
    }

    #[derive(Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl SqlStringer for Point {
        fn sql_string(&self) -> String {
            format!("({}, {})", self.x, self.y)
        }
    }

    #[test]
    fn test_integers_render_unquoted() {
        assert_eq!(Value::from(123i32).to_literal().unwrap(), "123");
        assert_eq!(Value::from(-7i8).to_literal().unwrap(), "-7");
        assert_eq!(Value::from(u64::MAX).to_literal().unwrap(), "18446744073709551615");
    }

    #[test]
    fn test_floats_render_six_decimal_places() {
        assert_eq!(Value::from(1.5f64).to_literal().unwrap(), "1.500000");
        assert_eq!(Value::from(0.25f32).to_literal().unwrap(), "0.250000");
    }

    #[test]
    fn test_bool_and_null() {
        assert_eq!(Value::from(true).to_literal().unwrap(), "true");
        assert_eq!(Value::from(false).to_literal().unwrap(), "false");
        assert_eq!(Value::Null.to_literal().unwrap(), "NULL");
        assert_eq!(Value::from(None::<String>).to_literal().unwrap(), "NULL");
    }

    #[test]
    fn test_text_is_quoted_and_escaped() {
        assert_eq!(Value::from("plain").to_literal().unwrap(), "'plain'");
        assert_eq!(Value::from("it's").to_literal().unwrap(), r"'it\'s'");
        assert_eq!(Value::from("''").to_literal().unwrap(), r"'\'\''");
    }

    #[test]
    fn test_nested_option_flattens_to_null() {
        assert_eq!(Value::from(None::<Option<i32>>).to_literal().unwrap(), "NULL");
        assert_eq!(Value::from(Some(Some(5))).to_literal().unwrap(), "5");
    }

    #[test]
    fn test_timestamp_millisecond_trimming() {
        let full = datetime!(2009-11-17 20:34:58.651387237);
        assert_eq!(
            Value::from(full).to_literal().unwrap(),
            "'2009-11-17 20:34:58.651'"
        );
        let tens = datetime!(2009-11-17 20:34:58.650);
        assert_eq!(
            Value::from(tens).to_literal().unwrap(),
            "'2009-11-17 20:34:58.65'"
        );
        let exact = datetime!(2009-11-17 20:34:58);
        assert_eq!(
            Value::from(exact).to_literal().unwrap(),
            "'2009-11-17 20:34:58'"
        );
    }

    #[test]
    fn test_zero_timestamp_sentinel() {
        assert_eq!(
            Value::Timestamp(Value::zero_timestamp()).to_literal().unwrap(),
            "'0000-00-00 00:00:00'"
        );
    }

    #[test]
    fn test_printable_bytes_render_as_text() {
        assert_eq!(
            Value::from(b"hello".to_vec()).to_literal().unwrap(),
            "'hello'"
        );
    }

    #[test]
    fn test_binary_bytes_render_as_marker() {
        assert_eq!(
            Value::from(vec![0u8, 159, 146, 150]).to_literal().unwrap(),
            "'<binary>'"
        );
    }

    #[test]
    fn test_integer_list_renders_as_array() {
        assert_eq!(
            Value::from(vec![1, 2, 3]).to_literal().unwrap(),
            "ARRAY[1, 2, 3]"
        );
    }

    #[test]
    fn test_string_list_renders_as_array() {
        assert_eq!(
            Value::from(vec!["a", "b's"]).to_literal().unwrap(),
            r"ARRAY['a', 'b\'s']"
        );
    }

    #[test]
    fn test_valuer_resolves_before_encoding() {
        let valid = Value::valuer(NullString {
            value: "other test string".into(),
            valid: true,
        });
        assert_eq!(valid.to_literal().unwrap(), "'other test string'");

        let null = Value::valuer(NullString {
            value: String::new(),
            valid: false,
        });
        assert_eq!(null.to_literal().unwrap(), "NULL");
    }

    #[test]
    fn test_valuer_failure_propagates() {
        let err = Value::valuer(Failing).to_literal().unwrap_err();
        assert_eq!(err, ValuerError("broken".into()));
    }

    #[test]
    fn test_valuer_failure_degrades_to_null_in_display() {
        assert_eq!(Value::valuer(Failing).to_string(), "NULL");
    }

    #[test]
    fn test_stringer_renders_quoted_display_text() {
        let point = Value::stringer(Point { x: 3, y: 4 });
        assert_eq!(point.to_literal().unwrap(), "'(3, 4)'");
    }

    #[test]
    fn test_quoting_round_trips() {
        let original = "a'b'c";
        let literal = Value::from(original).to_literal().unwrap();
        let inner = literal.trim_matches('\'');
        assert_eq!(inner.replace(r"\'", "'"), original);
    }

    #[test]
    fn test_params_macro_converts_elements() {
        let args = params![1i64, "text", vec![1, 2]];
        assert_eq!(args[0], Value::Int64(1));
        assert_eq!(args[1], Value::Text("text".into()));
        assert_eq!(args[2], Value::List(vec![Value::Int32(1), Value::Int32(2)]));
    }
}
