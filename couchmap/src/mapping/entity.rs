use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::index::EntityIndex;
use crate::mapping::{ParameterValueProvider, PersistentProperty, PropertyValueProvider};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

/// Builds a fresh entity from constructor arguments.
pub type EntityInstantiator<T> = fn(&ParameterValueProvider<'_, T>) -> CouchmapResult<T>;

/// A type that can be mapped to and from a stored document.
///
/// Implementations are usually generated by `#[derive(CouchbaseEntity)]`.
/// The descriptor returned by [MappedEntity::describe] is built once per type
/// and then cached by the [MappingContext](crate::mapping::MappingContext).
pub trait MappedEntity: Default + Send + Sync + 'static {
    fn describe() -> PersistentEntityBuilder<Self>;
}

/// Mapping metadata of one entity type.
pub struct PersistentEntity<T> {
    name: String,
    properties: Vec<PersistentProperty<T>>,
    id_index: Option<usize>,
    version_index: Option<usize>,
    expiry: u32,
    instantiator: Option<EntityInstantiator<T>>,
    indexes: Vec<EntityIndex>,
}

impl<T: Default> PersistentEntity<T> {
    /// Creates a new instance, binding constructor arguments from `provider`.
    ///
    /// Without an instantiator the type's default value is returned and every
    /// property is left for post-construction assignment.
    pub fn instantiate(&self, provider: &dyn PropertyValueProvider<T>) -> CouchmapResult<T> {
        match self.instantiator {
            Some(instantiator) => instantiator(&ParameterValueProvider::new(self, provider)),
            None => Ok(T::default()),
        }
    }
}

impl<T> PersistentEntity<T> {
    /// Entity type name, used in messages and as the type marker of indexes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_property(&self) -> Option<&PersistentProperty<T>> {
        self.id_index.map(|index| &self.properties[index])
    }

    pub fn version_property(&self) -> Option<&PersistentProperty<T>> {
        self.version_index.map(|index| &self.properties[index])
    }

    /// Iterates over all persistent properties in declaration order.
    pub fn properties(&self) -> std::slice::Iter<'_, PersistentProperty<T>> {
        self.properties.iter()
    }

    /// Finds a property by its name in the entity type.
    pub fn property(&self, name: &str) -> Option<&PersistentProperty<T>> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Whether `property` is bound through the instantiator.
    ///
    /// Only meaningful when an instantiator is present; otherwise no property
    /// is consumed at construction time.
    pub fn is_constructor_argument(&self, property: &PersistentProperty<T>) -> bool {
        self.instantiator.is_some() && property.is_constructor_bound()
    }

    pub fn has_id_property(&self) -> bool {
        self.id_index.is_some()
    }

    pub fn has_version_property(&self) -> bool {
        self.version_index.is_some()
    }

    /// Document expiry in seconds, `0` meaning no expiry.
    pub fn expiry(&self) -> u32 {
        self.expiry
    }

    /// Index declarations of the entity type.
    pub fn indexes(&self) -> &[EntityIndex] {
        &self.indexes
    }
}

impl<T> Debug for PersistentEntity<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentEntity")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("expiry", &self.expiry)
            .field("indexes", &self.indexes)
            .finish()
    }
}

/// Collects the descriptor table of an entity type and validates it.
pub struct PersistentEntityBuilder<T> {
    name: String,
    properties: Vec<PersistentProperty<T>>,
    expiry: u32,
    instantiator: Option<EntityInstantiator<T>>,
    indexes: Vec<EntityIndex>,
}

impl<T> PersistentEntityBuilder<T> {
    pub fn new(name: &str) -> Self {
        PersistentEntityBuilder {
            name: name.to_string(),
            properties: Vec::new(),
            expiry: 0,
            instantiator: None,
            indexes: Vec::new(),
        }
    }

    pub fn property(mut self, property: PersistentProperty<T>) -> Self {
        self.properties.push(property);
        self
    }

    pub fn expiry(mut self, expiry: u32) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn instantiator(mut self, instantiator: EntityInstantiator<T>) -> Self {
        self.instantiator = Some(instantiator);
        self
    }

    pub fn index(mut self, index: EntityIndex) -> Self {
        self.indexes.push(index);
        self
    }

    /// Validates the collected descriptors.
    ///
    /// An entity needs at least one property, at most one identifier and at
    /// most one version, and storage field names must be unique.
    pub fn build(self) -> CouchmapResult<PersistentEntity<T>> {
        if self.properties.is_empty() {
            return Err(configuration_error(&format!(
                "Entity type {} declares no persistent properties",
                self.name
            )));
        }

        let mut id_index = None;
        let mut version_index = None;
        let mut field_names = HashSet::new();

        for (index, property) in self.properties.iter().enumerate() {
            if property.is_id_property() {
                if id_index.is_some() {
                    return Err(configuration_error(&format!(
                        "Entity type {} declares more than one id property",
                        self.name
                    )));
                }
                id_index = Some(index);
            } else if property.is_version_property() {
                if version_index.is_some() {
                    return Err(configuration_error(&format!(
                        "Entity type {} declares more than one version property",
                        self.name
                    )));
                }
                version_index = Some(index);
            } else if !field_names.insert(property.storage_field_name()) {
                return Err(configuration_error(&format!(
                    "Entity type {} maps more than one property to field '{}'",
                    self.name,
                    property.storage_field_name()
                )));
            }
        }

        Ok(PersistentEntity {
            name: self.name,
            properties: self.properties,
            id_index,
            version_index,
            expiry: self.expiry,
            instantiator: self.instantiator,
            indexes: self.indexes,
        })
    }
}

fn configuration_error(message: &str) -> CouchmapError {
    log::error!("{}", message);
    CouchmapError::new(message, ErrorKind::ConfigurationError)
}
