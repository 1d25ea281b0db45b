use crate::common::Value;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// A stored document, independent of any entity type.
///
/// A document is an insertion-ordered map from field name to [Value] plus three
/// side channels that never appear as regular fields:
///
/// * `id` - the document key, unique within a bucket.
/// * `version` - the CAS token used for optimistic concurrency. It is opaque:
///   it is compared for equality by the store and otherwise only round-tripped.
/// * `expiry` - seconds to live, `0` meaning the document never expires.
///
/// After an entity is written into a document, the encoded text is kept as the
/// raw value so it can be handed to the store without encoding twice.
///
/// Documents are single-owner values; they are not meant to be shared between
/// threads while they are being filled.
#[derive(Clone, Default, PartialEq)]
pub struct Document {
    id: Option<String>,
    version: Option<u64>,
    expiry: u32,
    content: IndexMap<String, Value>,
    raw_value: Option<String>,
}

impl Document {
    /// Creates a new empty document without id.
    pub fn new() -> Self {
        Document::default()
    }

    /// Creates a new empty document with the given id.
    ///
    /// ```ignore
    /// let doc = Document::with_id("user::1");
    /// assert_eq!(doc.id(), Some("user::1"));
    /// assert!(doc.is_empty());
    /// ```
    pub fn with_id(id: impl Into<String>) -> Self {
        Document {
            id: Some(id.into()),
            ..Document::default()
        }
    }

    /// Associates `value` with `field`, replacing any previous value.
    ///
    /// Field names are not validated; a repeated `put` overwrites the value
    /// but keeps the field at its original position.
    pub fn put(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.content.insert(field.into(), value.into());
    }

    /// Returns the value stored under `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.content.get(field)
    }

    /// Checks whether `field` is present, even when it holds [Value::Null].
    pub fn contains_field(&self, field: &str) -> bool {
        self.content.contains_key(field)
    }

    /// Removes `field`, keeping the order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.content.shift_remove(field)
    }

    /// Number of top-level fields.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.content.iter()
    }

    /// Names of the top-level fields in insertion order.
    pub fn fields(&self) -> FieldVec {
        self.content.keys().cloned().collect()
    }

    /// Removes every field. Side channels are kept.
    pub fn clear(&mut self) {
        self.content.clear();
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = Some(version);
    }

    pub fn expiry(&self) -> u32 {
        self.expiry
    }

    pub fn set_expiry(&mut self, expiry: u32) {
        self.expiry = expiry;
    }

    /// The encoded text produced by the last write, if any.
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    pub fn set_raw_value(&mut self, raw_value: impl Into<String>) {
        self.raw_value = Some(raw_value.into());
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("expiry", &self.expiry)
            .field("content", &self.content)
            .finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.content.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{}\": {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use couchmap::doc;
///
/// let empty = doc!{};
///
/// let base = 100;
/// let user = doc!{
///     name: "Alice",
///     score: (base * 2),
///     address: {
///         city: "Paris",
///         tags: ["home", "work"]
///     }
/// };
/// assert_eq!(user.size(), 3);
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::document::Document::new()
    };

    () => {
        $crate::document::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::document::Document::new();
            $(
                doc.put($crate::document::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
