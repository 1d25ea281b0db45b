use crate::common::Value;
use crate::errors::CouchmapResult;
use std::fmt::{Debug, Formatter};

/// Reads a property straight from the entity's field.
pub type PropertyGetter<T> = fn(&T) -> CouchmapResult<Value>;

/// Writes a property straight into the entity's field.
pub type PropertySetter<T> = fn(&mut T, &Value) -> CouchmapResult<()>;

/// The part a property plays in the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyRole {
    /// The document key, stored out of band.
    Id,
    /// The CAS token, stored out of band.
    Version,
    /// A regular field of the document body.
    Regular,
}

/// Descriptor of one persistent property of an entity type `T`.
///
/// The getter and setter are plain function pointers that access the field
/// directly, so no accessor logic of the entity runs during conversion.
pub struct PersistentProperty<T> {
    name: String,
    field_name: String,
    type_name: &'static str,
    role: PropertyRole,
    constructor_argument: bool,
    getter: PropertyGetter<T>,
    setter: PropertySetter<T>,
}

impl<T> PersistentProperty<T> {
    /// Creates a regular property whose storage field name equals `name`.
    pub fn new(
        name: &str,
        type_name: &'static str,
        getter: PropertyGetter<T>,
        setter: PropertySetter<T>,
    ) -> Self {
        PersistentProperty {
            name: name.to_string(),
            field_name: name.to_string(),
            type_name,
            role: PropertyRole::Regular,
            constructor_argument: false,
            getter,
            setter,
        }
    }

    /// Overrides the name of the field in the stored document.
    pub fn field_name(mut self, field_name: &str) -> Self {
        self.field_name = field_name.to_string();
        self
    }

    /// Marks this property as the identifier.
    pub fn id(mut self) -> Self {
        self.role = PropertyRole::Id;
        self
    }

    /// Marks this property as the optimistic-concurrency version.
    pub fn version(mut self) -> Self {
        self.role = PropertyRole::Version;
        self
    }

    /// Marks this property as bound through the entity instantiator.
    pub fn constructor_argument(mut self) -> Self {
        self.constructor_argument = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_field_name(&self) -> &str {
        &self.field_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn role(&self) -> PropertyRole {
        self.role
    }

    pub fn is_id_property(&self) -> bool {
        self.role == PropertyRole::Id
    }

    pub fn is_version_property(&self) -> bool {
        self.role == PropertyRole::Version
    }

    pub(crate) fn is_constructor_bound(&self) -> bool {
        self.constructor_argument
    }

    /// Reads the value of this property from `entity`.
    pub fn get_value(&self, entity: &T) -> CouchmapResult<Value> {
        (self.getter)(entity)
    }

    /// Assigns `value` to this property of `entity`.
    pub fn set_value(&self, entity: &mut T, value: &Value) -> CouchmapResult<()> {
        (self.setter)(entity, value)
    }
}

impl<T> Clone for PersistentProperty<T> {
    fn clone(&self) -> Self {
        PersistentProperty {
            name: self.name.clone(),
            field_name: self.field_name.clone(),
            type_name: self.type_name,
            role: self.role,
            constructor_argument: self.constructor_argument,
            getter: self.getter,
            setter: self.setter,
        }
    }
}

impl<T> PartialEq for PersistentProperty<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.field_name == other.field_name && self.role == other.role
    }
}

impl<T> Debug for PersistentProperty<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentProperty")
            .field("name", &self.name)
            .field("field_name", &self.field_name)
            .field("type_name", &self.type_name)
            .field("role", &self.role)
            .field("constructor_argument", &self.constructor_argument)
            .finish()
    }
}
