//! Translation between zvariant values and [`Variant`].
//!
//! Replies from ConnMan arrive as loosely typed `a{sv}` dictionaries. This
//! module turns them into owned [`Variant`] trees, unwrapping nested `v`
//! containers on the way, and encodes [`Variant`]s back into zvariant
//! values for `SetProperty`. No I/O or D-Bus interaction is performed.

use super::client::DBusDict;
use crate::variant::{PropertyMap, Result, Variant, VariantError};
use std::collections::HashMap;
use zvariant::{ObjectPath, Value};

/// Convert one D-Bus value.
///
/// # Errors
///
/// `NonStringKey` if a dictionary (at any depth) is not keyed by strings.
pub fn variant_from_value(value: &Value<'_>) -> Result<Variant> {
    Ok(match value {
        Value::Bool(b) => Variant::Bool(*b),
        Value::U8(n) => Variant::Byte(*n),
        Value::I16(n) => Variant::Int16(*n),
        Value::U16(n) => Variant::UInt16(*n),
        Value::I32(n) => Variant::Int32(*n),
        Value::U32(n) => Variant::UInt32(*n),
        Value::I64(n) => Variant::Int64(*n),
        Value::U64(n) => Variant::UInt64(*n),
        Value::F64(n) => Variant::Double(*n),
        Value::Str(s) => Variant::Str(s.as_str().to_string()),
        Value::ObjectPath(p) => Variant::ObjectPath(p.as_str().to_string()),
        Value::Value(inner) => variant_from_value(inner)?,
        Value::Array(array) => Variant::List(
            array
                .iter()
                .map(variant_from_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Dict(dict) => {
            let mut map = PropertyMap::new();
            for (key, value) in dict.iter() {
                let key = match key {
                    Value::Str(s) => s.as_str().to_string(),
                    other => return Err(VariantError::NonStringKey(other.to_string())),
                };
                map.insert(key, variant_from_value(value)?);
            }
            Variant::Map(map)
        }
        other => Variant::Other(other.to_string()),
    })
}

/// Convert a whole `GetProperties` reply.
pub fn property_map(props: &DBusDict) -> Result<PropertyMap> {
    props
        .iter()
        .map(|(key, value)| variant_from_value(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Encode a [`Variant`] for sending.
///
/// Lists are sent as `as` and maps as `a{sv}`, the only composite shapes
/// ConnMan accepts in `SetProperty`.
///
/// # Errors
///
/// `Unsupported` for lists holding anything but strings and for opaque
/// values.
pub fn value_from_variant(variant: &Variant) -> Result<Value<'static>> {
    Ok(match variant {
        Variant::Bool(b) => Value::from(*b),
        Variant::Byte(n) => Value::from(*n),
        Variant::Int16(n) => Value::from(*n),
        Variant::UInt16(n) => Value::from(*n),
        Variant::Int32(n) => Value::from(*n),
        Variant::UInt32(n) => Value::from(*n),
        Variant::Int64(n) => Value::from(*n),
        Variant::UInt64(n) => Value::from(*n),
        Variant::Double(n) => Value::from(*n),
        Variant::Str(s) => Value::from(s.clone()),
        Variant::ObjectPath(p) => Value::from(
            ObjectPath::try_from(p.clone()).map_err(|_| VariantError::Unsupported("object path"))?,
        ),
        Variant::List(items) => {
            let strings = items
                .iter()
                .map(|item| match item {
                    Variant::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<String>>>()
                .ok_or(VariantError::Unsupported("list of non-strings"))?;
            Value::from(strings)
        }
        Variant::Map(map) => {
            let mut dict: HashMap<String, Value<'static>> = HashMap::new();
            for (key, value) in map {
                dict.insert(key.clone(), value_from_variant(value)?);
            }
            Value::from(dict)
        }
        Variant::Other(_) => return Err(VariantError::Unsupported("opaque value")),
    })
}
