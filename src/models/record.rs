// src/models/record.rs

//! List and detail records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Category;

/// Field holding the display name of a list row.
pub const NAME_FIELD: &str = "name";

/// Field holding the relative link to a detail page.
pub const LINK_FIELD: &str = "href";

/// Field holding the absolute detail URL, added by the list stage.
pub const URL_FIELD: &str = "url";

/// A flat row scraped from a list page.
///
/// Fields are kept in a sorted map so the serialized form is canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListRecord {
    pub fields: BTreeMap<String, String>,
}

impl ListRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Display name, empty when the row had none.
    pub fn name(&self) -> &str {
        self.get(NAME_FIELD).unwrap_or("")
    }

    /// Relative link to the detail page, if the row carried a non-empty one.
    pub fn link(&self) -> Option<&str> {
        self.get(LINK_FIELD).filter(|l| !l.trim().is_empty())
    }
}

/// Structured content of a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailPayload {
    /// Flat label/value pairs
    pub fields: BTreeMap<String, String>,
    /// Named lists of unique scalar values (e.g. financial services)
    pub lists: BTreeMap<String, Vec<String>>,
    /// Named sub-collections (e.g. associated individuals, regulatory actions)
    pub collections: BTreeMap<String, Vec<BTreeMap<String, String>>>,
}

/// A list row joined with the detail page fetched through its link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub category: Category,
    /// Absolute URL the detail page was fetched from
    pub link: String,
    pub source: ListRecord,
    pub detail: DetailPayload,
}

impl DetailRecord {
    pub fn new(
        category: Category,
        link: impl Into<String>,
        source: ListRecord,
        detail: DetailPayload,
    ) -> Self {
        Self {
            category,
            link: link.into(),
            source,
            detail,
        }
    }

    /// Build the persisted tree: list section, detail section, then one key
    /// per sub-collection.
    pub fn to_value(&self) -> Value {
        let mut list = Map::new();
        for (key, value) in &self.source.fields {
            list.insert(key.clone(), Value::String(value.clone()));
        }
        list.insert(URL_FIELD.to_string(), Value::String(self.link.clone()));

        let mut details = Map::new();
        for (key, value) in &self.detail.fields {
            details.insert(key.clone(), Value::String(value.clone()));
        }
        for (key, values) in &self.detail.lists {
            details.insert(
                key.clone(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }

        let mut root = Map::new();
        root.insert(self.category.list_section(), Value::Object(list));
        root.insert(self.category.details_section(), Value::Object(details));
        for (name, rows) in &self.detail.collections {
            let items = rows
                .iter()
                .map(|row| {
                    Value::Object(
                        row.iter()
                            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                            .collect(),
                    )
                })
                .collect();
            root.insert(name.clone(), Value::Array(items));
        }

        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_source() -> ListRecord {
        ListRecord::new()
            .with("name", "Acme Capital Ltd")
            .with("referenceNumber", "F001234")
            .with("href", "/public-register/firms/acme-capital")
    }

    #[test]
    fn test_link_ignores_blank() {
        let record = ListRecord::new().with("name", "x").with("href", "  ");
        assert_eq!(record.link(), None);
        assert_eq!(sample_source().link(), Some("/public-register/firms/acme-capital"));
    }

    #[test]
    fn test_to_value_sections() {
        let mut detail = DetailPayload::default();
        detail.fields.insert("Legal Status".into(), "Private Company".into());
        detail
            .lists
            .insert("financialServices".into(), vec!["Advising".into()]);
        detail.collections.insert(
            "individuals".into(),
            vec![BTreeMap::from([("name".to_string(), "Jane Roe".to_string())])],
        );

        let record = DetailRecord::new(
            Category::Firms,
            "https://example.com/public-register/firms/acme-capital",
            sample_source(),
            detail,
        );
        let value = record.to_value();

        assert_eq!(value["firm_list"]["name"], "Acme Capital Ltd");
        assert_eq!(
            value["firm_list"]["url"],
            "https://example.com/public-register/firms/acme-capital"
        );
        assert_eq!(value["firm_details"]["Legal Status"], "Private Company");
        assert_eq!(value["firm_details"]["financialServices"][0], "Advising");
        assert_eq!(value["individuals"][0]["name"], "Jane Roe");
    }

    #[test]
    fn test_list_record_serializes_flat() {
        let json = serde_json::to_string(&ListRecord::new().with("b", "2").with("a", "1")).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
    }
}
