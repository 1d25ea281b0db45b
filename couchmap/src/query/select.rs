use crate::common::{escape_identifier, SELECT_COUNT};
use crate::query::{Statement, StatementBuilder};
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Builds an entity select over one bucket without a template.
///
/// ```ignore
/// let statement = SelectBuilder::new("travel")
///     .filter("`city` = $1")
///     .type_filter("_class", "Airline")
///     .order_by("name", SortOrder::Ascending)
///     .limit(10)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    bucket: String,
    conditions: Vec<String>,
    order_by: Vec<(String, SortOrder)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl SelectBuilder {
    pub fn new(bucket_name: &str) -> Self {
        SelectBuilder {
            bucket: escape_identifier(bucket_name),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Adds a raw condition; conditions are joined with `AND`.
    pub fn filter(mut self, condition: &str) -> Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Restricts rows to documents whose `type_key` equals `type_name`.
    pub fn type_filter(mut self, type_key: &str, type_name: &str) -> Self {
        self.conditions.push(format!(
            "{} = \"{}\"",
            escape_identifier(type_key),
            type_name.replace('"', "\\\"")
        ));
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((escape_identifier(field), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The entity select with id and CAS projections.
    pub fn build(&self) -> Statement {
        let mut text = StatementBuilder::select_entity(&self.bucket);
        self.push_where(&mut text);
        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(field, order)| format!("{} {}", field, order.keyword()))
                .join(", ");
            text.push_str(" ORDER BY ");
            text.push_str(&order);
        }
        if let Some(limit) = self.limit {
            text.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            text.push_str(&format!(" OFFSET {}", offset));
        }
        Statement::new(text)
    }

    /// Counts the rows matching the conditions, ignoring order and limits.
    pub fn build_count(&self) -> Statement {
        let mut text = format!("SELECT COUNT(*) AS {} FROM {}", SELECT_COUNT, self.bucket);
        self.push_where(&mut text);
        Statement::new(text)
    }

    fn push_where(&self, text: &mut String) {
        if !self.conditions.is_empty() {
            text.push_str(" WHERE ");
            text.push_str(&self.conditions.iter().join(" AND "));
        }
    }
}
