use std::any::Any;
use std::fmt::{self, Display, Formatter};

use crate::{Error, Result};

/// A value.
///
/// The set is closed: anything bound to or read from a statement is one of
/// these variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Binary data.
    Binary(Vec<u8>),
    /// A Boolean, stored as the integer 0 or 1.
    Boolean(bool),
    /// A floating-point number.
    Float(f64),
    /// An integer number.
    Integer(i64),
    /// A string.
    String(String),
    /// A null value.
    Null,
}

/// A type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Type {
    /// The binary type.
    Binary,
    /// The Boolean type.
    Boolean,
    /// The floating-point type.
    Float,
    /// The integer type.
    Integer,
    /// The string type.
    String,
    /// The null type.
    Null,
}

/// A dynamically typed argument.
///
/// Implemented for every `'static` type so that callers holding arguments
/// of arbitrary types can hand them to [`values_from_args`].
pub trait Argument: Any {
    /// Return the name of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Return the argument as `Any`.
    fn as_any(&self) -> &dyn Any;
}

impl Value {
    /// Return the type.
    pub fn kind(&self) -> Type {
        match self {
            Value::Binary(_) => Type::Binary,
            Value::Boolean(_) => Type::Boolean,
            Value::Float(_) => Type::Float,
            Value::Integer(_) => Type::Integer,
            Value::String(_) => Type::String,
            Value::Null => Type::Null,
        }
    }

    /// Convert the value into a Rust type.
    #[inline]
    pub fn read<'l, T>(&'l self) -> Result<T>
    where
        T: TryFrom<&'l Value, Error = Error>,
    {
        T::try_from(self)
    }
}

impl<T: Any> Argument for T {
    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convert dynamically typed arguments into values.
///
/// Fails on the first argument whose type has no counterpart among the
/// values, naming its position and type.
pub fn values_from_args(arguments: &[&dyn Argument]) -> Result<Vec<Value>> {
    arguments
        .iter()
        .enumerate()
        .map(|(position, &argument)| {
            from_any(Argument::as_any(argument)).ok_or(Error::UnsupportedType {
                position,
                type_name: Argument::type_name(argument),
            })
        })
        .collect()
}

fn from_any(argument: &dyn Any) -> Option<Value> {
    macro_rules! convert(
        ($($kind:ty => $convert:expr,)*) => ($(
            if let Some(value) = argument.downcast_ref::<$kind>() {
                return Some($convert(value));
            }
        )*);
    );

    convert!(
        Value => |value: &Value| value.clone(),
        () => |_: &()| Value::Null,
        bool => |value: &bool| Value::Boolean(*value),
        i8 => |value: &i8| Value::Integer(*value as i64),
        i16 => |value: &i16| Value::Integer(*value as i64),
        i32 => |value: &i32| Value::Integer(*value as i64),
        i64 => |value: &i64| Value::Integer(*value),
        u8 => |value: &u8| Value::Integer(*value as i64),
        u16 => |value: &u16| Value::Integer(*value as i64),
        u32 => |value: &u32| Value::Integer(*value as i64),
        f32 => |value: &f32| Value::Float(*value as f64),
        f64 => |value: &f64| Value::Float(*value),
        String => |value: &String| Value::String(value.clone()),
        &'static str => |value: &&str| Value::String((*value).into()),
        Vec<u8> => |value: &Vec<u8>| Value::Binary(value.clone()),
        &'static [u8] => |value: &&[u8]| Value::Binary(value.to_vec()),
    );
    None
}

impl Display for Type {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let name = match self {
            Type::Binary => "binary",
            Type::Boolean => "boolean",
            Type::Float => "float",
            Type::Integer => "integer",
            Type::String => "string",
            Type::Null => "null",
        };
        formatter.write_str(name)
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.into())
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<()> for Value {
    #[inline]
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, T::into)
    }
}

macro_rules! conversion_error(
    ($value:expr, $into:expr) => (
        Err(Error::Conversion { from: $value.kind(), into: $into })
    );
);

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;

    #[inline]
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Binary(value) => Ok(value),
            Value::String(value) => Ok(value.into_bytes()),
            value => conversion_error!(value, "binary"),
        }
    }
}

impl<'l> TryFrom<&'l Value> for &'l [u8] {
    type Error = Error;

    #[inline]
    fn try_from(value: &'l Value) -> Result<Self> {
        match value {
            Value::Binary(value) => Ok(value),
            Value::String(value) => Ok(value.as_bytes()),
            value => conversion_error!(value, "binary"),
        }
    }
}

impl TryFrom<&Value> for bool {
    type Error = Error;

    #[inline]
    fn try_from(value: &Value) -> Result<Self> {
        match *value {
            Value::Boolean(value) => Ok(value),
            Value::Integer(value) => Ok(value != 0),
            ref value => conversion_error!(value, "boolean"),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = Error;

    #[inline]
    fn try_from(value: &Value) -> Result<Self> {
        if let Value::Float(value) = *value {
            return Ok(value);
        }
        conversion_error!(value, "float")
    }
}

impl TryFrom<&Value> for i64 {
    type Error = Error;

    #[inline]
    fn try_from(value: &Value) -> Result<Self> {
        match *value {
            Value::Integer(value) => Ok(value),
            Value::Boolean(value) => Ok(value as i64),
            ref value => conversion_error!(value, "integer"),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    #[inline]
    fn try_from(value: Value) -> Result<Self> {
        if let Value::String(value) = value {
            return Ok(value);
        }
        conversion_error!(value, "string")
    }
}

impl TryFrom<&Value> for String {
    type Error = Error;

    #[inline]
    fn try_from(value: &Value) -> Result<Self> {
        <&str>::try_from(value).map(String::from)
    }
}

impl<'l> TryFrom<&'l Value> for &'l str {
    type Error = Error;

    #[inline]
    fn try_from(value: &'l Value) -> Result<Self> {
        if let Value::String(value) = value {
            return Ok(value);
        }
        conversion_error!(value, "string")
    }
}

impl TryFrom<&Value> for () {
    type Error = Error;

    #[inline]
    fn try_from(value: &Value) -> Result<Self> {
        if let Value::Null = value {
            return Ok(());
        }
        conversion_error!(value, "null")
    }
}
