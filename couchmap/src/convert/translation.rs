use crate::common::Value;
use crate::document::Document;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number};

/// Encodes documents to their stored text form and back.
pub trait TranslationService: Send + Sync {
    /// Encodes the fields of `source` as a JSON object. Side channels such as
    /// id and CAS are not part of the text.
    fn encode(&self, source: &Document) -> CouchmapResult<String>;

    /// Decodes a JSON object into `target`, keeping its side channels.
    fn decode(&self, source: &str, target: &mut Document) -> CouchmapResult<()>;

    /// Decodes a JSON fragment straight into a deserializable type.
    fn decode_fragment<T: DeserializeOwned>(&self, source: &str) -> CouchmapResult<T>
    where
        Self: Sized;
}

/// JSON translation backed by `serde_json`.
///
/// Strings are written as UTF-8 without escaping non-ASCII characters, and
/// field order follows document insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTranslationService;

impl JsonTranslationService {
    pub fn new() -> Self {
        JsonTranslationService
    }
}

impl TranslationService for JsonTranslationService {
    fn encode(&self, source: &Document) -> CouchmapResult<String> {
        let json = document_to_json(source)?;
        serde_json::to_string(&json).map_err(|err| {
            log::error!("Could not encode document: {}", err);
            CouchmapError::new_with_cause(
                "Could not encode document",
                ErrorKind::EncodingError,
                err.into(),
            )
        })
    }

    fn decode(&self, source: &str, target: &mut Document) -> CouchmapResult<()> {
        let json: serde_json::Value = serde_json::from_str(source).map_err(|err| {
            log::error!("Could not decode document text: {}", err);
            CouchmapError::new_with_cause(
                "Could not decode document text",
                ErrorKind::EncodingError,
                err.into(),
            )
        })?;

        match json {
            serde_json::Value::Object(map) => {
                for (key, value) in map {
                    target.put(key, json_to_value(value));
                }
                target.set_raw_value(source);
                Ok(())
            }
            other => {
                log::error!("Document text is not a JSON object: {}", other);
                Err(CouchmapError::new(
                    "Document text must be a JSON object",
                    ErrorKind::EncodingError,
                ))
            }
        }
    }

    fn decode_fragment<T: DeserializeOwned>(&self, source: &str) -> CouchmapResult<T> {
        serde_json::from_str(source).map_err(|err| {
            log::error!("Could not decode fragment: {}", err);
            CouchmapError::new_with_cause(
                "Could not decode fragment",
                ErrorKind::EncodingError,
                err.into(),
            )
        })
    }
}

/// Converts a [Value] to its JSON form.
///
/// Fails for floating point values JSON cannot represent.
pub fn value_to_json(value: &Value) -> CouchmapResult<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::I64(v) => serde_json::Value::Number(Number::from(*v)),
        Value::U64(v) => serde_json::Value::Number(Number::from(*v)),
        Value::F64(v) => match Number::from_f64(*v) {
            Some(number) => serde_json::Value::Number(number),
            None => {
                log::error!("Value {} is not representable in JSON", v);
                return Err(CouchmapError::new(
                    &format!("Value {} is not representable in JSON", v),
                    ErrorKind::EncodingError,
                ));
            }
        },
        Value::String(v) => serde_json::Value::String(v.clone()),
        Value::Array(values) => serde_json::Value::Array(
            values
                .iter()
                .map(value_to_json)
                .collect::<CouchmapResult<Vec<_>>>()?,
        ),
        Value::Document(document) => document_to_json(document)?,
    })
}

/// Converts the fields of a [Document] to a JSON object.
pub fn document_to_json(document: &Document) -> CouchmapResult<serde_json::Value> {
    let mut map = Map::with_capacity(document.size());
    for (key, value) in document.iter() {
        map.insert(key.clone(), value_to_json(value)?);
    }
    Ok(serde_json::Value::Object(map))
}

/// Converts JSON to a [Value], keeping integers exact.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(v),
        serde_json::Value::Number(number) => {
            if let Some(v) = number.as_i64() {
                Value::I64(v)
            } else if let Some(v) = number.as_u64() {
                Value::U64(v)
            } else {
                number.as_f64().map(Value::F64).unwrap_or_default()
            }
        }
        serde_json::Value::String(v) => Value::String(v),
        serde_json::Value::Array(values) => {
            Value::Array(values.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Document(json_to_document(map)),
    }
}

/// Converts a JSON object to a [Document] without side channels.
pub fn json_to_document(map: Map<String, serde_json::Value>) -> Document {
    let mut document = Document::new();
    for (key, value) in map {
        document.put(key, json_to_value(value));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use serde::Deserialize;

    #[test]
    fn encode_keeps_field_order() {
        let service = JsonTranslationService::new();
        let document = doc! { b: 1, a: "x", nested: { flag: true }, list: [1, 2] };
        assert_eq!(
            service.encode(&document).unwrap(),
            r#"{"b":1,"a":"x","nested":{"flag":true},"list":[1,2]}"#
        );
    }

    #[test]
    fn encode_leaves_out_side_channels() {
        let service = JsonTranslationService::new();
        let mut document = Document::with_id("key");
        document.set_version(5);
        document.put("name", "n");
        assert_eq!(service.encode(&document).unwrap(), r#"{"name":"n"}"#);
    }

    #[test]
    fn encode_writes_non_ascii_unescaped() {
        let service = JsonTranslationService::new();
        let document = doc! { language: "русский" };
        assert_eq!(service.encode(&document).unwrap(), r#"{"language":"русский"}"#);
    }

    #[test]
    fn encode_rejects_nan() {
        let service = JsonTranslationService::new();
        let document = doc! { ratio: (f64::NAN) };
        let err = service.encode(&document).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn decode_fills_target_and_keeps_id() {
        let service = JsonTranslationService::new();
        let mut target = Document::with_id("key");
        service
            .decode(r#"{"language":"русский","count":18446744073709551615}"#, &mut target)
            .unwrap();
        assert_eq!(target.id(), Some("key"));
        assert_eq!(target.get("language"), Some(&Value::from("русский")));
        assert_eq!(target.get("count"), Some(&Value::U64(u64::MAX)));
        assert!(target.raw_value().is_some());
    }

    #[test]
    fn decode_rejects_non_objects() {
        let service = JsonTranslationService::new();
        let mut target = Document::new();
        assert!(service.decode("[1,2]", &mut target).is_err());
        assert!(service.decode("{not json", &mut target).is_err());
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Fragment {
        language: String,
    }

    #[test]
    fn decode_fragment_into_struct() {
        let service = JsonTranslationService::new();
        let fragment: Fragment = service.decode_fragment(r#"{"language":"русский"}"#).unwrap();
        assert_eq!(fragment.language, "русский");
        let err = service.decode_fragment::<Fragment>(r#"{"lang":1}"#).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }
}
