use crate::common::{escape_identifier, SYSTEM_INDEXES, TYPE_KEY};
use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};
use crate::index::{DesignDocument, EntityIndex, ViewDefinition};
use crate::mapping::PersistentEntity;
use crate::query::{build_query, QueryScanConsistency, Statement};
use crate::store::StoreClient;

/// What happened to a declared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexStatus {
    Created,
    AlreadyExists,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    index: EntityIndex,
    status: IndexStatus,
}

impl IndexReport {
    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    pub fn status(&self) -> IndexStatus {
        self.status
    }
}

/// Creates the indexes entity types declare, when they are missing.
///
/// Each kind of index can be switched off, e.g. in production setups where
/// indexes are managed outside the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexManager {
    ignore_views: bool,
    ignore_n1ql_primary: bool,
    ignore_n1ql_secondary: bool,
}

impl IndexManager {
    pub fn new(ignore_views: bool, ignore_n1ql_primary: bool, ignore_n1ql_secondary: bool) -> Self {
        IndexManager {
            ignore_views,
            ignore_n1ql_primary,
            ignore_n1ql_secondary,
        }
    }

    pub fn is_ignore_views(&self) -> bool {
        self.ignore_views
    }

    pub fn is_ignore_n1ql_primary(&self) -> bool {
        self.ignore_n1ql_primary
    }

    pub fn is_ignore_n1ql_secondary(&self) -> bool {
        self.ignore_n1ql_secondary
    }

    /// Ensures every index declared by `entity` exists, in declaration order.
    pub fn build_indexes<T>(
        &self,
        entity: &PersistentEntity<T>,
        client: &dyn StoreClient,
    ) -> CouchmapResult<Vec<IndexReport>> {
        let mut reports = Vec::with_capacity(entity.indexes().len());
        for index in entity.indexes() {
            let status = match index {
                EntityIndex::N1qlPrimary if self.ignore_n1ql_primary => IndexStatus::Ignored,
                EntityIndex::N1qlSecondary { .. } if self.ignore_n1ql_secondary => IndexStatus::Ignored,
                EntityIndex::View { .. } if self.ignore_views => IndexStatus::Ignored,
                EntityIndex::N1qlPrimary => self.ensure_primary(client)?,
                EntityIndex::N1qlSecondary { name } => {
                    self.ensure_secondary(name, entity.name(), client)?
                }
                EntityIndex::View {
                    design_document,
                    view_name,
                } => self.ensure_view(design_document, view_name, entity.name(), client)?,
            };

            log::debug!("{} of {}: {:?}", index, entity.name(), status);
            reports.push(IndexReport {
                index: index.clone(),
                status,
            });
        }
        Ok(reports)
    }

    fn ensure_primary(&self, client: &dyn StoreClient) -> CouchmapResult<IndexStatus> {
        let bucket = client.bucket_name();
        let exists = format!(
            "SELECT COUNT(name) = 1 AS exist FROM {} WHERE keyspace_id = \"{}\" AND is_primary",
            SYSTEM_INDEXES, bucket
        );
        if index_exists(&exists, client)? {
            return Ok(IndexStatus::AlreadyExists);
        }

        let create = format!("CREATE PRIMARY INDEX ON {}", escape_identifier(bucket));
        execute_ddl(&create, client)?;
        log::info!("Created primary index on {}", bucket);
        Ok(IndexStatus::Created)
    }

    fn ensure_secondary(
        &self,
        index_name: &str,
        type_name: &str,
        client: &dyn StoreClient,
    ) -> CouchmapResult<IndexStatus> {
        let bucket = client.bucket_name();
        let exists = format!(
            "SELECT COUNT(name) = 1 AS exist FROM {} WHERE keyspace_id = \"{}\" AND name = \"{}\"",
            SYSTEM_INDEXES, bucket, index_name
        );
        if index_exists(&exists, client)? {
            return Ok(IndexStatus::AlreadyExists);
        }

        let type_key = escape_identifier(TYPE_KEY);
        let create = format!(
            "CREATE INDEX {} ON {}({}) WHERE {} = \"{}\"",
            escape_identifier(index_name),
            escape_identifier(bucket),
            type_key,
            type_key,
            type_name
        );
        execute_ddl(&create, client)?;
        log::info!("Created secondary index {} on {}", index_name, bucket);
        Ok(IndexStatus::Created)
    }

    fn ensure_view(
        &self,
        design_name: &str,
        view_name: &str,
        type_name: &str,
        client: &dyn StoreClient,
    ) -> CouchmapResult<IndexStatus> {
        let existing = client.get_design_document(design_name)?;
        if existing
            .as_ref()
            .is_some_and(|design| design.view(view_name).is_some())
        {
            return Ok(IndexStatus::AlreadyExists);
        }

        let mut design = existing.unwrap_or_else(|| DesignDocument::new(design_name));
        design.put_view(view_name, ViewDefinition::new(&default_map_function(type_name)));
        client.upsert_design_document(design)?;
        log::info!("Created view {}/{}", design_name, view_name);
        Ok(IndexStatus::Created)
    }
}

/// Map function emitting the id of every document of `type_name`.
pub fn default_map_function(type_name: &str) -> String {
    format!(
        "function (doc, meta) {{ if(doc.{} == \"{}\") {{ emit(meta.id, null); }} }}",
        TYPE_KEY, type_name
    )
}

fn index_exists(statement: &str, client: &dyn StoreClient) -> CouchmapResult<bool> {
    let query = build_query(Statement::new(statement), vec![], QueryScanConsistency::NotBounded);
    let result = client.query(&query)?;
    if !result.is_success() {
        log::error!("Index lookup failed: {:?}", result.errors());
        return Err(CouchmapError::new(
            &format!("Could not look up index metadata: {}", result.errors().join(", ")),
            ErrorKind::IndexingError,
        ));
    }

    Ok(result
        .rows()
        .first()
        .and_then(|row| row.get("exist"))
        .and_then(|exist| exist.as_bool())
        .unwrap_or(false))
}

fn execute_ddl(statement: &str, client: &dyn StoreClient) -> CouchmapResult<()> {
    let query = build_query(Statement::new(statement), vec![], QueryScanConsistency::NotBounded);
    let result = client.query(&query)?;
    if result.is_success() {
        Ok(())
    } else {
        log::error!("Index creation failed: {:?}", result.errors());
        Err(CouchmapError::new(
            &format!("Could not create index: {}", result.errors().join(", ")),
            ErrorKind::IndexingError,
        ))
    }
}
