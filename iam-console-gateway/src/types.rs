use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ Record ============

/// A single persisted entity of a collection (an announcement, a mail template, a project).
///
/// Records carry no fixed schema. Each collection decides which fields it uses,
/// so the record is a thin wrapper over a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    /// Identifier stored in `field`, as text.
    ///
    /// Backends return identifiers either as JSON strings or as integers.
    /// Empty strings are treated as absent.
    pub fn id_string(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Overlay `other` onto this record; fields of `other` win.
    pub fn merge(&mut self, other: &Record) {
        for (field, value) in &other.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this record passes every active filter.
    pub fn matches(&self, filters: &Filters) -> bool {
        filters.matches(self)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Literal text of a scalar JSON value; used for filter and search comparisons.
pub(crate) fn literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Ordering used when a collection is sorted by a field.
///
/// Missing values sort first. Two numbers compare numerically, anything else by literal text.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => literal(x).cmp(&literal(y)),
    }
}

// ============ Sorting ============

/// Sort direction of a list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Wire spelling used in the `sort` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Column sort requested by the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub key: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Ascending)
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Descending)
    }

    /// `key,asc` / `key,desc`
    pub fn to_param(&self) -> String {
        format!("{},{}", self.key, self.direction.as_param())
    }
}

// ============ Filters ============

/// Multi-select column filters: field name to the ordered set of accepted values.
///
/// A record matches when, for every field with a non-empty value set, the record's
/// field value is one of the accepted values. Fields with an empty set are not
/// filtered and are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, Vec<String>>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, values);
        self
    }

    /// Replace the accepted values of `field`. An empty set clears the filter.
    pub fn set<I, S>(&mut self, field: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = field.into();
        let mut accepted: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !accepted.contains(&value) {
                accepted.push(value);
            }
        }
        if accepted.is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, accepted);
        }
    }

    /// Accepted values of `field`; empty when the field is not filtered.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, accepted)| {
            record
                .get(field)
                .and_then(literal)
                .is_some_and(|value| accepted.contains(&value))
        })
    }
}

// ============ Queries ============

/// Default number of rows per page on every console table.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameters of a list request, as sent across the gateway boundary.
///
/// `page` is 1-indexed here. Controllers keep a 0-based page index internally and
/// translate at the call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(default, skip_serializing_if = "Filters::is_empty")]
    pub filters: Filters,
    /// Free-text search terms typed into the table's filter bar.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            filters: Filters::default(),
            params: Vec::new(),
        }
    }
}

impl ListQuery {
    /// Clamp pagination values to valid ranges.
    ///
    /// - `page` is clamped to `>= 1`
    /// - `page_size` is clamped to `1..=max_page_size`
    #[must_use]
    pub fn validated(&self, max_page_size: u32) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max_page_size.max(1)),
            ..self.clone()
        }
    }

    /// Query-string pairs in wire order: paging, sort, one pair per accepted filter
    /// value, then search terms.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.page_size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.to_param()));
        }
        for (field, accepted) in self.filters.iter() {
            for value in accepted {
                pairs.push((field.clone(), value.clone()));
            }
        }
        for param in &self.params {
            pairs.push(("params".to_string(), param.clone()));
        }
        pairs
    }
}

// ============ Pages ============

/// One fetched slice of a collection plus pagination metadata.
///
/// `page_index` is 0-based, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T = Record> {
    pub items: Vec<T>,
    pub page_index: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_index: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            items,
            page_index,
            page_size,
            total_count,
        }
    }

    pub fn empty(page_size: u32) -> Self {
        Self::new(Vec::new(), 0, page_size, 0)
    }

    /// Checks `items.len() <= page_size` and that a non-empty page lies inside the total.
    pub fn is_consistent(&self) -> bool {
        if self.page_size == 0 || self.items.len() > self.page_size as usize {
            return false;
        }
        self.items.is_empty()
            || u64::from(self.page_index) * u64::from(self.page_size) < self.total_count
    }

    /// 1-based page number shown by the pager.
    pub fn display_page(&self) -> u32 {
        self.page_index.saturating_add(1)
    }

    pub fn has_more(&self) -> bool {
        (u64::from(self.page_index) + 1) * u64::from(self.page_size) < self.total_count
    }

    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }
}

// ============ Wire envelopes ============

/// Paged list body as produced by the console backends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringPage<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// 0-based page number.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
}

impl<T> SpringPage<T> {
    /// Convert to a [`Page`], falling back to `requested_size` when the body omits `size`.
    pub fn into_page(self, requested_size: u32) -> Page<T> {
        let page_size = if self.size == 0 {
            requested_size.max(1)
        } else {
            self.size
        };
        Page::new(self.content, self.number, page_size, self.total_elements)
    }
}

/// Logical failure body: `{"failed": true, "code": "...", "message": "..."}`.
///
/// Any JSON object deserializes into this type; only `failed == true` marks a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEnvelope {
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
