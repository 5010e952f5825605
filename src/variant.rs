//! Owned representation of dynamically typed D-Bus values.
//!
//! ConnMan answers almost everything with `a{sv}` dictionaries whose values
//! may themselves be lists or nested dictionaries. [`Variant`] is the
//! transport-independent form of such a value and [`FromVariant`] decodes
//! it into the type the caller expects.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use thiserror::Error;

/// String-keyed property bag, ordered so output is deterministic.
pub type PropertyMap = BTreeMap<String, Variant>;

#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Bool(bool),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Str(String),
    ObjectPath(String),
    List(Vec<Variant>),
    Map(PropertyMap),
    /// Anything the client never needs to look inside (structures, fds).
    Other(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum VariantError {
    #[error("expected a {expected}, found a {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("property '{key}' is not a {expected}, it is: {found}")]
    InvalidProperty {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("dictionary key is not a string: {0}")]
    NonStringKey(String),

    #[error("cannot send a {0} over D-Bus")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, VariantError>;

impl Variant {
    /// Short name of the variant's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Variant::Bool(_) => "boolean",
            Variant::Byte(_) => "byte",
            Variant::Int16(_) => "int16",
            Variant::UInt16(_) => "uint16",
            Variant::Int32(_) => "int32",
            Variant::UInt32(_) => "uint32",
            Variant::Int64(_) => "int64",
            Variant::UInt64(_) => "uint64",
            Variant::Double(_) => "double",
            Variant::Str(_) => "string",
            Variant::ObjectPath(_) => "object path",
            Variant::List(_) => "list",
            Variant::Map(_) => "dictionary",
            Variant::Other(_) => "unsupported value",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::Byte(n) => write!(f, "{}", n),
            Variant::Int16(n) => write!(f, "{}", n),
            Variant::UInt16(n) => write!(f, "{}", n),
            Variant::Int32(n) => write!(f, "{}", n),
            Variant::UInt32(n) => write!(f, "{}", n),
            Variant::Int64(n) => write!(f, "{}", n),
            Variant::UInt64(n) => write!(f, "{}", n),
            Variant::Double(n) => write!(f, "{}", n),
            Variant::Str(s) | Variant::ObjectPath(s) => write!(f, "{}", s),
            Variant::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Variant::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Variant::Other(desc) => write!(f, "<{}>", desc),
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<u16> for Variant {
    fn from(value: u16) -> Self {
        Variant::UInt16(value)
    }
}

impl From<Vec<String>> for Variant {
    fn from(value: Vec<String>) -> Self {
        Variant::List(value.into_iter().map(Variant::Str).collect())
    }
}

impl From<PropertyMap> for Variant {
    fn from(value: PropertyMap) -> Self {
        Variant::Map(value)
    }
}

/// Types that can be decoded out of a [`Variant`].
///
/// Implementations return `None` when the variant has a different shape;
/// [`decode`] turns that into a [`VariantError::Mismatch`].
pub trait FromVariant: Sized {
    /// Human readable name of the expected shape.
    const EXPECTED: &'static str;

    fn from_variant(value: &Variant) -> Option<Self>;
}

impl FromVariant for String {
    const EXPECTED: &'static str = "string";

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Str(s) | Variant::ObjectPath(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromVariant for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromVariant for u16 {
    const EXPECTED: &'static str = "uint16";

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::UInt16(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromVariant for Vec<String> {
    const EXPECTED: &'static str = "string list";

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::List(items) => items.iter().map(String::from_variant).collect(),
            _ => None,
        }
    }
}

impl FromVariant for PropertyMap {
    const EXPECTED: &'static str = "dictionary";

    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Map(map) => Some(map.clone()),
            _ => None,
        }
    }
}

impl FromVariant for Variant {
    const EXPECTED: &'static str = "value";

    fn from_variant(value: &Variant) -> Option<Self> {
        Some(value.clone())
    }
}

/// Decode a value into `T`, failing if its shape does not match.
pub fn decode<T: FromVariant>(value: &Variant) -> Result<T> {
    T::from_variant(value).ok_or(VariantError::Mismatch {
        expected: T::EXPECTED,
        found: value.kind(),
    })
}

/// Decode an optional property.
///
/// An absent key is `Ok(None)`. A present key with the wrong shape is an
/// error naming the key.
pub fn get<T: FromVariant>(props: &PropertyMap, key: &str) -> Result<Option<T>> {
    match props.get(key) {
        None => Ok(None),
        Some(value) => T::from_variant(value)
            .map(Some)
            .ok_or_else(|| VariantError::InvalidProperty {
                key: key.to_string(),
                expected: T::EXPECTED,
                found: value.kind(),
            }),
    }
}

/// Like [`get`], falling back to `T::default()` when the key is absent.
pub fn get_or_default<T: FromVariant + Default>(props: &PropertyMap, key: &str) -> Result<T> {
    Ok(get(props, key)?.unwrap_or_default())
}
