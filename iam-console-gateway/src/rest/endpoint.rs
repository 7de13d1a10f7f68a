//! REST endpoint description of one collection

use std::collections::BTreeMap;

/// Placeholder replaced by the URL-encoded record id in item paths.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Shape of the list response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListShape {
    /// `{"content": [...], "number": n, "size": s, "totalElements": t}`
    #[default]
    Paged,
    /// A bare JSON array; the whole collection in one page.
    Plain,
}

/// Paths of one collection, relative to the gateway base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub collection: String,
    pub list_path: String,
    pub item_path: String,
    pub create_path: String,
    pub option_paths: BTreeMap<String, String>,
    pub list_shape: ListShape,
}

impl Endpoint {
    /// Conventional resource layout: list and create on `base_path`, items on `base_path/{id}`.
    pub fn new(collection: impl Into<String>, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            collection: collection.into(),
            item_path: format!("{base_path}/{ID_PLACEHOLDER}"),
            create_path: base_path.clone(),
            list_path: base_path,
            option_paths: BTreeMap::new(),
            list_shape: ListShape::Paged,
        }
    }

    #[must_use]
    pub fn with_list_path(mut self, path: impl Into<String>) -> Self {
        self.list_path = path.into();
        self
    }

    #[must_use]
    pub fn with_item_path(mut self, path: impl Into<String>) -> Self {
        self.item_path = path.into();
        self
    }

    #[must_use]
    pub fn with_create_path(mut self, path: impl Into<String>) -> Self {
        self.create_path = path.into();
        self
    }

    #[must_use]
    pub fn with_option_path(mut self, field: impl Into<String>, path: impl Into<String>) -> Self {
        self.option_paths.insert(field.into(), path.into());
        self
    }

    #[must_use]
    pub fn plain_list(mut self) -> Self {
        self.list_shape = ListShape::Plain;
        self
    }

    /// Item path with the id substituted.
    pub fn item(&self, id: &str) -> String {
        self.item_path
            .replace(ID_PLACEHOLDER, &urlencoding::encode(id))
    }

    pub fn option_path(&self, field: &str) -> Option<&str> {
        self.option_paths.get(field).map(String::as_str)
    }
}
