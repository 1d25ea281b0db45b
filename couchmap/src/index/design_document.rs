use indexmap::IndexMap;

/// Map and optional reduce function of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    map: String,
    reduce: Option<String>,
}

impl ViewDefinition {
    pub fn new(map: &str) -> Self {
        ViewDefinition {
            map: map.to_string(),
            reduce: None,
        }
    }

    pub fn with_reduce(mut self, reduce: &str) -> Self {
        self.reduce = Some(reduce.to_string());
        self
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn reduce(&self) -> Option<&str> {
        self.reduce.as_deref()
    }
}

/// A named group of views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignDocument {
    name: String,
    views: IndexMap<String, ViewDefinition>,
}

impl DesignDocument {
    pub fn new(name: &str) -> Self {
        DesignDocument {
            name: name.to_string(),
            views: IndexMap::new(),
        }
    }

    pub fn with_view(mut self, name: &str, view: ViewDefinition) -> Self {
        self.views.insert(name.to_string(), view);
        self
    }

    pub fn put_view(&mut self, name: &str, view: ViewDefinition) {
        self.views.insert(name.to_string(), view);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn view(&self, name: &str) -> Option<&ViewDefinition> {
        self.views.get(name)
    }

    pub fn views(&self) -> indexmap::map::Iter<'_, String, ViewDefinition> {
        self.views.iter()
    }
}
