use std::fmt::{Display, Formatter};

/// An index an entity type asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityIndex {
    /// The primary N1QL index of the bucket.
    N1qlPrimary,
    /// A secondary N1QL index over the type marker of the entity.
    N1qlSecondary { name: String },
    /// A view emitting the ids of all documents of the entity type.
    View {
        design_document: String,
        view_name: String,
    },
}

impl EntityIndex {
    pub fn secondary(name: &str) -> Self {
        EntityIndex::N1qlSecondary {
            name: name.to_string(),
        }
    }

    pub fn view(design_document: &str, view_name: &str) -> Self {
        EntityIndex::View {
            design_document: design_document.to_string(),
            view_name: view_name.to_string(),
        }
    }
}

impl Display for EntityIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityIndex::N1qlPrimary => write!(f, "primary index"),
            EntityIndex::N1qlSecondary { name } => write!(f, "secondary index {}", name),
            EntityIndex::View {
                design_document,
                view_name,
            } => write!(f, "view {}/{}", design_document, view_name),
        }
    }
}
