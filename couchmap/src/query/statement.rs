use crate::common::{
    escape_identifier, PLACEHOLDER_BUCKET, PLACEHOLDER_ENTITY, PLACEHOLDER_SELECT_FROM, SELECT_CAS,
    SELECT_COUNT, SELECT_ID,
};
use crate::query::PageRequest;
use std::fmt::{Display, Formatter};

/// Final N1QL statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement(String);

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Statement(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Restricts the statement to the rows of `page`.
    pub fn with_page(&self, page: &PageRequest) -> Statement {
        self.with_limit(page.page_size(), page.offset())
    }

    /// Appends `LIMIT` and, when non-zero, `OFFSET` clauses.
    pub fn with_limit(&self, limit: usize, offset: usize) -> Statement {
        if offset > 0 {
            Statement(format!("{} LIMIT {} OFFSET {}", self.0, limit, offset))
        } else {
            Statement(format!("{} LIMIT {}", self.0, limit))
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::new(value)
    }
}

impl From<String> for Statement {
    fn from(value: String) -> Self {
        Statement(value)
    }
}

/// Turns statement templates into executable statements.
///
/// Templates may use three placeholders:
///
/// * `$SELECT_ENTITY$` - the complete `SELECT ... FROM` clause needed to
///   rebuild entities, projecting id and CAS next to the document body.
/// * `$BUCKET$` - the escaped bucket name.
/// * `$ENTITY$` - only the id and CAS projections.
///
/// Only the first `$SELECT_ENTITY$` or `$ENTITY$` is replaced, while every
/// `$BUCKET$` is. A template with `$SELECT_ENTITY$` gets no other
/// substitution.
pub struct StatementBuilder;

impl StatementBuilder {
    pub fn prepare(template: &str, bucket_name: &str) -> Statement {
        let bucket = escape_identifier(bucket_name);

        if template.contains(PLACEHOLDER_SELECT_FROM) {
            return Statement(template.replacen(
                PLACEHOLDER_SELECT_FROM,
                &Self::select_entity(&bucket),
                1,
            ));
        }

        let mut result = template.to_string();
        if result.contains(PLACEHOLDER_BUCKET) {
            result = result.replace(PLACEHOLDER_BUCKET, &bucket);
        }
        if result.contains(PLACEHOLDER_ENTITY) {
            result = result.replacen(PLACEHOLDER_ENTITY, &Self::entity_projection(&bucket), 1);
        }
        Statement(result)
    }

    /// Builds the statement counting the rows `template` would return.
    ///
    /// A `$SELECT_ENTITY$` template counts straight over the bucket with the
    /// rest of the template kept as is; any other template is wrapped in a
    /// subquery.
    pub fn prepare_count(template: &str, bucket_name: &str) -> Statement {
        let bucket = escape_identifier(bucket_name);

        if template.contains(PLACEHOLDER_SELECT_FROM) {
            let select_count = format!("SELECT COUNT(*) AS {} FROM {}", SELECT_COUNT, bucket);
            return Statement(template.replacen(PLACEHOLDER_SELECT_FROM, &select_count, 1));
        }

        let content = Self::prepare(template, bucket_name);
        Statement(format!(
            "SELECT COUNT(*) AS {} FROM ({}) AS sub",
            SELECT_COUNT, content
        ))
    }

    /// `META(b).id AS _ID, META(b).cas AS _CAS` for an escaped bucket.
    pub fn entity_projection(escaped_bucket: &str) -> String {
        format!(
            "META({b}).id AS {id}, META({b}).cas AS {cas}",
            b = escaped_bucket,
            id = SELECT_ID,
            cas = SELECT_CAS
        )
    }

    /// `SELECT <entity projection>, b.* FROM b` for an escaped bucket.
    pub fn select_entity(escaped_bucket: &str) -> String {
        format!(
            "SELECT {}, {}.* FROM {}",
            Self::entity_projection(escaped_bucket),
            escaped_bucket,
            escaped_bucket
        )
    }
}
