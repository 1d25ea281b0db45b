/// Declared result shape of a repository query method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// A single entity or nothing.
    Entity,
    /// All matching entities.
    Collection,
    /// Entities converted lazily while iterating.
    Stream,
    /// A page plus the total number of matches.
    Page,
    /// A page that only knows whether more rows follow.
    Slice,
    /// Anything else, e.g. a scalar projection.
    Other,
}

/// Description of a repository query method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryMethod {
    name: String,
    shape: ReturnShape,
    modifying: bool,
}

impl QueryMethod {
    pub fn new(name: &str, shape: ReturnShape) -> Self {
        QueryMethod {
            name: name.to_string(),
            shape,
            modifying: false,
        }
    }

    /// Marks the method as modifying data, which repository queries reject.
    pub fn modifying(mut self) -> Self {
        self.modifying = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_shape(&self) -> ReturnShape {
        self.shape
    }

    pub fn is_modifying(&self) -> bool {
        self.modifying
    }

    pub fn is_page_query(&self) -> bool {
        self.shape == ReturnShape::Page
    }

    pub fn is_slice_query(&self) -> bool {
        self.shape == ReturnShape::Slice
    }

    pub fn is_collection_query(&self) -> bool {
        self.shape == ReturnShape::Collection
    }

    pub fn is_query_for_entity(&self) -> bool {
        self.shape == ReturnShape::Entity
    }

    pub fn is_stream_query(&self) -> bool {
        self.shape == ReturnShape::Stream
    }
}
