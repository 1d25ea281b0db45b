use crate::common::{Value, TYPE_KEY};
use crate::convert::{JsonTranslationService, TranslationService};
use crate::document::Document;
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::mapping::{
    DocumentValueProvider, MappedEntity, MappingContext, PersistentEntity, PersistentProperty,
    PropertyValueProvider,
};
use std::any::type_name;
use std::sync::Arc;

/// Converts entities to documents and back using their mapping metadata.
///
/// The converter is stateless apart from the shared metadata cache and the
/// translation service, so it can be cloned and used from many threads.
#[derive(Clone)]
pub struct MappingConverter {
    context: MappingContext,
    translation: Arc<dyn TranslationService>,
    type_key: Option<String>,
}

impl MappingConverter {
    pub fn new(context: MappingContext, translation: Arc<dyn TranslationService>) -> Self {
        MappingConverter {
            context,
            translation,
            type_key: None,
        }
    }

    /// Writes the entity type name under `type_key` in every written document.
    pub fn with_type_key(mut self, type_key: Option<&str>) -> Self {
        self.type_key = type_key.map(str::to_string);
        self
    }

    pub fn mapping_context(&self) -> &MappingContext {
        &self.context
    }

    pub fn translation_service(&self) -> &Arc<dyn TranslationService> {
        &self.translation
    }

    pub fn type_key(&self) -> Option<&str> {
        self.type_key.as_deref()
    }

    /// Reconstructs an entity of type `T` from `source`.
    ///
    /// Constructor arguments are bound first. Every remaining property the
    /// document carries is then assigned directly to its field; properties
    /// the document does not carry keep the value the instantiator gave them.
    pub fn read<T: MappedEntity>(&self, source: &Document) -> CouchmapResult<T> {
        let entity = self.context.persistent_entity::<T>()?;
        let provider = DocumentValueProvider::new(source);

        let mut instance = entity.instantiate(&provider).map_err(|err| {
            log::error!("Could not instantiate {}: {}", entity.name(), err);
            CouchmapError::new_with_cause(
                &format!("Could not instantiate entity of type {}", entity.name()),
                ErrorKind::ObjectMappingError,
                err,
            )
        })?;

        for property in entity.properties() {
            if entity.is_constructor_argument(property) || !provider.contains(property) {
                continue;
            }

            let value = provider.resolve(property);
            property.set_value(&mut instance, &value).map_err(|err| {
                log::error!("Could not read property {} of {}: {}", property.name(), entity.name(), err);
                CouchmapError::new_with_cause(
                    &format!(
                        "Could not read property '{}' of entity type {}",
                        property.name(),
                        entity.name()
                    ),
                    ErrorKind::ObjectMappingError,
                    err,
                )
            })?;
        }
        Ok(instance)
    }

    /// Writes `source` into `target`.
    ///
    /// A missing source leaves `target` untouched. Otherwise the target is
    /// replaced as a whole once every property converted and the document
    /// encoded; on failure it is left as it was.
    pub fn write<T: MappedEntity>(&self, source: Option<&T>, target: &mut Document) -> CouchmapResult<()> {
        let Some(source) = source else {
            return Ok(());
        };

        let entity = self.context.persistent_entity::<T>()?;
        let id_property = entity.id_property().ok_or_else(|| {
            log::error!("Entity type {} has no id property", entity.name());
            CouchmapError::new(
                &format!("ID property required for entity of type {}", entity.name()),
                ErrorKind::ObjectMappingError,
            )
        })?;

        if let Some(type_key) = &self.type_key {
            // id and version travel outside the body
            if let Some(property) = entity.properties().find(|property| {
                !property.is_id_property()
                    && !property.is_version_property()
                    && property.storage_field_name() == type_key.as_str()
            }) {
                log::error!(
                    "Property {} of {} is stored under the type key {}",
                    property.name(),
                    entity.name(),
                    type_key
                );
                return Err(CouchmapError::new(
                    &format!(
                        "Property '{}' of entity type {} is stored under the type key '{}'",
                        property.name(),
                        entity.name(),
                        type_key
                    ),
                    ErrorKind::ObjectMappingError,
                ));
            }
        }

        let id = coerce_id(write_property(&entity, id_property, source)?, entity.name())?;
        let mut staged = Document::with_id(id);
        staged.set_expiry(entity.expiry());

        if let Some(version_property) = entity.version_property() {
            let version = write_property(&entity, version_property, source)?;
            if let Some(version) = coerce_version(version, entity.name())? {
                staged.set_version(version);
            }
        }

        if let Some(type_key) = &self.type_key {
            staged.put(type_key.as_str(), entity.name());
        }

        for property in entity.properties() {
            if property.is_id_property() || property.is_version_property() {
                continue;
            }

            let value = write_property(&entity, property, source)?;
            if !value.is_null() {
                staged.put(property.storage_field_name(), value);
            }
        }

        let raw_value = self.translation.encode(&staged).map_err(|err| {
            log::error!("Could not translate {} to JSON: {}", entity.name(), err);
            CouchmapError::new_with_cause(
                &format!("Could not translate to JSON while converting {}", type_name::<T>()),
                ErrorKind::ObjectMappingError,
                err,
            )
        })?;
        staged.set_raw_value(raw_value);

        *target = staged;
        Ok(())
    }

    /// Writes `source` into a fresh document.
    pub fn to_document<T: MappedEntity>(&self, source: &T) -> CouchmapResult<Document> {
        let mut document = Document::new();
        self.write(Some(source), &mut document)?;
        Ok(document)
    }

    /// Decodes stored text and reads it as `T`, attaching id and CAS.
    pub fn read_raw<T: MappedEntity>(&self, id: &str, raw_value: &str, cas: u64) -> CouchmapResult<T> {
        let mut document = Document::with_id(id);
        if cas != 0 {
            document.set_version(cas);
        }
        self.translation.decode(raw_value, &mut document)?;
        self.read(&document)
    }
}

impl Default for MappingConverter {
    fn default() -> Self {
        MappingConverter::new(MappingContext::new(), Arc::new(JsonTranslationService::new()))
    }
}

fn write_property<T>(
    entity: &PersistentEntity<T>,
    property: &PersistentProperty<T>,
    source: &T,
) -> CouchmapResult<Value> {
    property.get_value(source).map_err(|err| {
        log::error!("Could not write property {} of {}: {}", property.name(), entity.name(), err);
        CouchmapError::new_with_cause(
            &format!(
                "Could not write property '{}' of entity type {}",
                property.name(),
                entity.name()
            ),
            ErrorKind::ObjectMappingError,
            err,
        )
    })
}

/// Default type key when type markers are enabled.
pub fn default_type_key() -> &'static str {
    TYPE_KEY
}

fn coerce_id(value: Value, entity_name: &str) -> CouchmapResult<String> {
    match value {
        Value::String(id) if !id.is_empty() => Ok(id),
        Value::I64(id) => Ok(id.to_string()),
        Value::U64(id) => Ok(id.to_string()),
        Value::String(_) | Value::Null => {
            log::error!("Entity of type {} has no id value", entity_name);
            Err(CouchmapError::new(
                &format!("ID must not be empty for entity of type {}", entity_name),
                ErrorKind::ObjectMappingError,
            ))
        }
        other => {
            log::error!("Id {} of {} cannot be converted to a string", other, entity_name);
            Err(CouchmapError::new(
                &format!(
                    "ID of type {} cannot be converted to a string for entity of type {}",
                    other.type_name(),
                    entity_name
                ),
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}

// a zero CAS means "never stored"
fn coerce_version(value: Value, entity_name: &str) -> CouchmapResult<Option<u64>> {
    match value {
        Value::Null => Ok(None),
        other => match other.as_u64() {
            Some(0) => Ok(None),
            Some(version) => Ok(Some(version)),
            None => {
                log::error!("Version {} of {} is not a CAS value", other, entity_name);
                Err(CouchmapError::new(
                    &format!("Version of entity type {} must be a non-negative integer", entity_name),
                    ErrorKind::ObjectMappingError,
                ))
            }
        },
    }
}
