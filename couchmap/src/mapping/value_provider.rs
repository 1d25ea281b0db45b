use crate::common::{Convertible, Value};
use crate::document::Document;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::mapping::{PersistentEntity, PersistentProperty, PropertyRole};

/// Resolves raw property values while an entity is being reconstructed.
///
/// Constructor binding and post-construction assignment both go through the
/// same provider, so a property resolves identically on either path.
pub trait PropertyValueProvider<T> {
    /// Returns the raw value of `property`, or [Value::Null] when absent.
    fn resolve(&self, property: &PersistentProperty<T>) -> Value;

    /// Checks whether the source carries a value for `property`.
    fn contains(&self, property: &PersistentProperty<T>) -> bool;
}

/// Reads property values from a [Document].
///
/// The identifier resolves to the document id and the version to the
/// document CAS; every other property is a field lookup.
pub struct DocumentValueProvider<'a> {
    source: &'a Document,
}

impl<'a> DocumentValueProvider<'a> {
    pub fn new(source: &'a Document) -> Self {
        DocumentValueProvider { source }
    }
}

impl<T> PropertyValueProvider<T> for DocumentValueProvider<'_> {
    fn resolve(&self, property: &PersistentProperty<T>) -> Value {
        match property.role() {
            PropertyRole::Id => Value::from(self.source.id()),
            PropertyRole::Version => Value::from(self.source.version()),
            PropertyRole::Regular => self
                .source
                .get(property.storage_field_name())
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn contains(&self, property: &PersistentProperty<T>) -> bool {
        match property.role() {
            PropertyRole::Id => self.source.id().is_some(),
            PropertyRole::Version => self.source.version().is_some(),
            PropertyRole::Regular => self.source.contains_field(property.storage_field_name()),
        }
    }
}

/// Hands constructor arguments to an entity instantiator.
///
/// Arguments are looked up by property name. A property the source does not
/// carry, or carries as null, yields the type's default value.
pub struct ParameterValueProvider<'a, T> {
    entity: &'a PersistentEntity<T>,
    provider: &'a dyn PropertyValueProvider<T>,
}

impl<'a, T> ParameterValueProvider<'a, T> {
    pub fn new(entity: &'a PersistentEntity<T>, provider: &'a dyn PropertyValueProvider<T>) -> Self {
        ParameterValueProvider { entity, provider }
    }

    /// Resolves the constructor argument bound to property `name`.
    pub fn argument<V>(&self, name: &str) -> CouchmapResult<V>
    where
        V: Convertible<Output = V> + Default,
    {
        let property = self.entity.property(name).ok_or_else(|| {
            log::error!("Constructor argument {} is not a property of {}", name, self.entity.name());
            CouchmapError::new(
                &format!(
                    "Constructor argument '{}' is not a persistent property of entity type {}",
                    name,
                    self.entity.name()
                ),
                ErrorKind::ConfigurationError,
            )
        })?;

        if !self.provider.contains(property) {
            return Ok(V::default());
        }

        match self.provider.resolve(property) {
            Value::Null => Ok(V::default()),
            value => V::from_value(&value),
        }
    }

    /// Raw access to the underlying provider.
    pub fn resolve(&self, property: &PersistentProperty<T>) -> Value {
        self.provider.resolve(property)
    }
}
