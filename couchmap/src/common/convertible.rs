use crate::common::Value;
use crate::document::Document;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Conversion between a Rust type and a [Value].
///
/// Property getters and setters generated for entities go through this trait,
/// and `#[derive(Convertible)]` implements it for nested structs and enums.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> CouchmapResult<Value>;
    fn from_value(value: &Value) -> CouchmapResult<Self::Output>;
}

fn type_mismatch(value: &Value, expected: &str) -> CouchmapError {
    log::error!("Value {} is not a {}", value, expected);
    CouchmapError::new(
        &format!("Value of type {} is not a {}", value.type_name(), expected),
        ErrorKind::ObjectMappingError,
    )
}

macro_rules! convertible_signed {
    ($($t:ty),*) => {
        $(
            impl Convertible for $t {
                type Output = $t;

                fn to_value(&self) -> CouchmapResult<Value> {
                    Ok(Value::I64(*self as i64))
                }

                fn from_value(value: &Value) -> CouchmapResult<Self> {
                    value
                        .as_i64()
                        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| type_mismatch(value, stringify!($t)))
                }
            }
        )*
    };
}

macro_rules! convertible_unsigned {
    ($($t:ty),*) => {
        $(
            impl Convertible for $t {
                type Output = $t;

                fn to_value(&self) -> CouchmapResult<Value> {
                    Ok(Value::U64(*self as u64))
                }

                fn from_value(value: &Value) -> CouchmapResult<Self> {
                    value
                        .as_u64()
                        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| type_mismatch(value, stringify!($t)))
                }
            }
        )*
    };
}

convertible_signed!(i8, i16, i32, i64, isize);
convertible_unsigned!(u8, u16, u32, u64, usize);

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        value.as_f64().ok_or_else(|| type_mismatch(value, "f64"))
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| type_mismatch(value, "f32"))
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        value.as_bool().ok_or_else(|| type_mismatch(value, "bool"))
    }
}

impl Convertible for char {
    type Output = char;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        let mut chars = value
            .as_str()
            .ok_or_else(|| type_mismatch(value, "char"))?
            .chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(type_mismatch(value, "char")),
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_mismatch(value, "string"))
    }
}

impl Convertible for () {
    type Output = ();

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::Null)
    }

    fn from_value(_: &Value) -> CouchmapResult<Self> {
        Ok(())
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        value
            .as_document()
            .cloned()
            .ok_or_else(|| type_mismatch(value, "document"))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        Ok(value.clone())
    }
}

// timestamps travel as RFC 3339 strings
impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> CouchmapResult<Value> {
        Ok(Value::String(self.to_rfc3339()))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self> {
        let text = value
            .as_str()
            .ok_or_else(|| type_mismatch(value, "timestamp"))?;
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|err| {
                log::error!("Invalid timestamp {}: {}", text, err);
                CouchmapError::new(
                    &format!("Invalid timestamp '{}': {}", text, err),
                    ErrorKind::ObjectMappingError,
                )
            })
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> CouchmapResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> CouchmapResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

impl<T> Convertible for Box<T>
where
    T: Convertible,
{
    type Output = Box<T::Output>;

    fn to_value(&self) -> CouchmapResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> CouchmapResult<Self::Output> {
        Ok(Box::new(T::from_value(value)?))
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible,
{
    type Output = Vec<T::Output>;

    fn to_value(&self) -> CouchmapResult<Value> {
        let mut values = Vec::with_capacity(self.len());
        for item in self {
            values.push(item.to_value()?);
        }
        Ok(Value::Array(values))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self::Output> {
        let array = value.as_array().ok_or_else(|| type_mismatch(value, "array"))?;
        array.iter().map(T::from_value).collect()
    }
}

impl<V> Convertible for BTreeMap<String, V>
where
    V: Convertible,
{
    type Output = BTreeMap<String, V::Output>;

    fn to_value(&self) -> CouchmapResult<Value> {
        let mut document = Document::new();
        for (key, value) in self {
            document.put(key.as_str(), value.to_value()?);
        }
        Ok(Value::Document(document))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self::Output> {
        let document = value
            .as_document()
            .ok_or_else(|| type_mismatch(value, "document"))?;
        let mut map = BTreeMap::new();
        for (key, value) in document.iter() {
            map.insert(key.clone(), V::from_value(value)?);
        }
        Ok(map)
    }
}

impl<V> Convertible for HashMap<String, V>
where
    V: Convertible,
{
    type Output = HashMap<String, V::Output>;

    fn to_value(&self) -> CouchmapResult<Value> {
        // sorted keys keep the encoded text stable across runs
        let mut keys: Vec<&String> = self.keys().collect();
        keys.sort();
        let mut document = Document::new();
        for key in keys {
            document.put(key.as_str(), self[key].to_value()?);
        }
        Ok(Value::Document(document))
    }

    fn from_value(value: &Value) -> CouchmapResult<Self::Output> {
        let document = value
            .as_document()
            .ok_or_else(|| type_mismatch(value, "document"))?;
        let mut map = HashMap::with_capacity(document.size());
        for (key, value) in document.iter() {
            map.insert(key.clone(), V::from_value(value)?);
        }
        Ok(map)
    }
}

pub fn from_value<T>(value: &Value) -> CouchmapResult<T::Output>
where
    T: Convertible,
{
    T::from_value(value)
}

pub fn to_value<T>(data: &T) -> CouchmapResult<Value>
where
    T: Convertible,
{
    data.to_value()
}
