// src/models/profile.rs

//! Per-category crawl profiles.
//!
//! A profile describes everything that differs between register categories:
//! where the list lives, how rows map to fields, how pagination terminates and
//! how a detail page is read. One generic pipeline runs every profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Category;

/// Which matched element a field reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    /// First match
    #[default]
    First,
    /// Last match
    Last,
    /// Zero-based index into the matches
    Nth(usize),
    /// Text of every match joined together
    All,
}

/// A single named field read from a scope element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output key
    pub name: String,

    /// CSS selector, relative to the scope element
    pub selector: String,

    #[serde(default)]
    pub pick: Pick,

    /// Label prefix removed from the text (e.g. "Name:")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            pick: Pick::First,
            strip: None,
        }
    }

    pub fn pick(mut self, pick: Pick) -> Self {
        self.pick = pick;
        self
    }

    pub fn strip(mut self, prefix: impl Into<String>) -> Self {
        self.strip = Some(prefix.into());
        self
    }
}

/// How list pages are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum PageStrategy {
    /// One page at a time
    Sequential,
    /// `size` pages concurrently, stopping at the first empty page
    Batched { size: usize },
}

impl Default for PageStrategy {
    fn default() -> Self {
        Self::Sequential
    }
}

/// Pagination behaviour of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(flatten)]
    pub strategy: PageStrategy,

    /// Number of the first page; some endpoints count from 0
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Known page count for endpoints that never return an empty page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,

    /// Independent filter sets, each walked to exhaustion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<BTreeMap<String, String>>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            strategy: PageStrategy::default(),
            start_page: default_start_page(),
            max_pages: None,
            partitions: Vec::new(),
        }
    }
}

fn default_start_page() -> u32 {
    1
}

/// Label/value pairs found inside repeated scope elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledGroup {
    pub scope: String,
    pub label: String,
    pub value: String,
}

/// A list of unique values gathered across rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueList {
    pub name: String,

    /// Row selector, matched against the whole document
    pub rows: String,

    /// Value selector, relative to each row
    pub selector: String,

    /// Separator splitting one cell into several values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
}

/// A repeated table rendered as a sub-collection of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    pub rows: String,
    pub fields: Vec<FieldSpec>,
}

/// How to read a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailProfile {
    #[serde(default)]
    pub labelled: Vec<LabelledGroup>,

    /// Fields read from the whole document
    #[serde(default)]
    pub named: Vec<FieldSpec>,

    #[serde(default)]
    pub value_lists: Vec<ValueList>,

    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
}

/// Everything the pipeline needs to know about one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub category: Category,

    /// Path of the list endpoint, relative to the base URL
    pub list_path: String,

    /// Fixed query parameters sent with every list request
    #[serde(default)]
    pub list_params: BTreeMap<String, String>,

    /// Selector matching one row of the list
    pub list_row: String,

    pub list_fields: Vec<FieldSpec>,

    /// Row attribute carrying the detail link
    #[serde(default = "default_link_attr")]
    pub link_attr: String,

    #[serde(default)]
    pub pagination: Pagination,

    /// Absent for list-only categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailProfile>,

    #[serde(default = "default_detail_batch_size")]
    pub detail_batch_size: usize,
}

fn default_link_attr() -> String {
    "href".to_string()
}

fn default_detail_batch_size() -> usize {
    1
}

impl CategoryProfile {
    /// Whether the category has detail pages to follow.
    pub fn has_details(&self) -> bool {
        self.detail.is_some()
    }

    /// Every CSS selector the profile uses, for up-front validation.
    pub fn selectors(&self) -> Vec<&str> {
        let mut all = vec![self.list_row.as_str()];
        all.extend(self.list_fields.iter().map(|f| f.selector.as_str()));
        if let Some(detail) = &self.detail {
            for group in &detail.labelled {
                all.extend([group.scope.as_str(), &group.label, &group.value]);
            }
            all.extend(detail.named.iter().map(|f| f.selector.as_str()));
            for list in &detail.value_lists {
                all.extend([list.rows.as_str(), &list.selector]);
            }
            for collection in &detail.collections {
                all.push(&collection.rows);
                all.extend(collection.fields.iter().map(|f| f.selector.as_str()));
            }
        }
        all
    }

    /// Built-in profile for a category.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Firms => firms(),
            Category::Individuals => individuals(),
            Category::Funds => funds(),
            Category::PassportedFunds => passported_funds(),
            Category::ProhibitedIndividuals => prohibited_individuals(),
        }
    }

    /// Built-in profiles for every category.
    pub fn defaults() -> Vec<Self> {
        Category::ALL.into_iter().map(Self::for_category).collect()
    }
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Columns `.col:nth-child(1..)` of a table row, one field per name.
fn columns(names: &[&str]) -> Vec<FieldSpec> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| FieldSpec::new(*name, format!(".col:nth-child({}) p", i + 1)).pick(Pick::All))
        .collect()
}

fn fund_tab_fields() -> LabelledGroup {
    LabelledGroup {
        scope: ".tab-pane#funds .table-row.row_with_padding .col".into(),
        label: "p.small.grey".into(),
        value: "p:nth-child(2)".into(),
    }
}

fn firms() -> CategoryProfile {
    CategoryProfile {
        category: Category::Firms,
        list_path: "/public-register/firms".into(),
        list_params: params(&[
            ("type", ""),
            ("financial_service", ""),
            ("keywords", ""),
            ("legal_status", ""),
            ("endorsement", ""),
            ("isAjax", "true"),
        ]),
        list_row: "a.table-row".into(),
        list_fields: vec![
            FieldSpec::new("name", "div.col p").strip("Name:"),
            FieldSpec::new("referenceNumber", "div.col p.grey").strip("Reference number:"),
            FieldSpec::new("firmType", "div.col p.grey")
                .pick(Pick::Last)
                .strip("Firm Type:"),
        ],
        link_attr: default_link_attr(),
        pagination: Pagination {
            strategy: PageStrategy::Sequential,
            start_page: 1,
            max_pages: Some(95),
            partitions: Vec::new(),
        },
        detail: Some(DetailProfile {
            labelled: vec![LabelledGroup {
                scope: "#firms .table-row.row_with_padding .col".into(),
                label: ".small.grey".into(),
                value: "p:not(.grey)".into(),
            }],
            named: vec![
                FieldSpec::new("Restrictions", "#firms .border-bottom-0 p:not(.grey)").pick(Pick::All),
            ],
            value_lists: vec![
                ValueList {
                    name: "financialServices".into(),
                    rows: "#firms .spcl_row1, #firms .spcl_row2".into(),
                    selector: ".col:first-child p".into(),
                    split: None,
                },
                ValueList {
                    name: "investments".into(),
                    rows: "#firms .spcl_row1, #firms .spcl_row2".into(),
                    selector: ".col:nth-child(3) p".into(),
                    split: Some(",".into()),
                },
            ],
            collections: vec![
                CollectionSpec {
                    name: "individuals".into(),
                    rows: "#individuals .table-row".into(),
                    fields: columns(&[
                        "name",
                        "referenceNumber",
                        "typeOfIndividual",
                        "effectiveDate",
                        "dateWithdrawn",
                    ]),
                },
                CollectionSpec {
                    name: "regulatory_actions".into(),
                    rows: "#regulatory .table-row".into(),
                    fields: columns(&["title", "category", "dateOfUse"]),
                },
            ],
        }),
        detail_batch_size: 1,
    }
}

fn individuals() -> CategoryProfile {
    let partitions = ["Mr", "Ms"]
        .into_iter()
        .flat_map(|prefix| ('A'..='Z').map(move |letter| format!("{prefix} {letter}")))
        .map(|keywords| params(&[("keywords", &keywords)]))
        .collect();

    CategoryProfile {
        category: Category::Individuals,
        list_path: "/public-register/individuals".into(),
        list_params: params(&[
            ("key_individual_function", ""),
            (
                "authorised_individual_function",
                "Senior Executive Officer,Compliance Officer,Money Laundering Reporting Officer,\
                 Finance Officer,Responsible Officer,Licensed Representative,Licensed Partner,\
                 Licensed Director,Senior Manager",
            ),
            ("audit_principal_function", ""),
            ("isAjax", "true"),
        ]),
        list_row: "a.table-row".into(),
        list_fields: vec![
            FieldSpec::new("name", ".col:nth-child(1) p").pick(Pick::All).strip("Name:"),
            FieldSpec::new("referenceNumber", ".col:nth-child(2) p")
                .pick(Pick::All)
                .strip("Reference number:"),
            FieldSpec::new("individualType", ".col:nth-child(3) p")
                .pick(Pick::All)
                .strip("Individual Type:"),
        ],
        link_attr: default_link_attr(),
        pagination: Pagination {
            strategy: PageStrategy::Batched { size: 10 },
            start_page: 0,
            max_pages: None,
            partitions,
        },
        detail: Some(DetailProfile {
            labelled: vec![LabelledGroup {
                scope: ".tab-pane#individuals .table-row .col".into(),
                label: "p.small.grey".into(),
                value: "p:nth-child(2)".into(),
            }],
            named: Vec::new(),
            value_lists: Vec::new(),
            collections: vec![
                CollectionSpec {
                    name: "firms".into(),
                    rows: ".tab-pane#firms .table-row".into(),
                    fields: columns(&["Name", "Reference Number", "Type of Firm", "Date Withdrawn"]),
                },
                CollectionSpec {
                    name: "regulatory_actions".into(),
                    rows: ".tab-pane#regulatory .table-row".into(),
                    fields: columns(&["Title", "Category", "Date of Use"]),
                },
            ],
        }),
        detail_batch_size: 10,
    }
}

fn funds() -> CategoryProfile {
    CategoryProfile {
        category: Category::Funds,
        list_path: "/public-register/funds".into(),
        list_params: params(&[
            ("fundType", ""),
            ("type", ""),
            ("jurisdiction", ""),
            ("status", ""),
            ("keywords", ""),
            ("isAjax", "true"),
        ]),
        list_row: "a.table-row".into(),
        list_fields: vec![
            FieldSpec::new("name", "div.col p").strip("Name:"),
            FieldSpec::new("referenceNumber", "div.col p.grey").strip("Reference number:"),
            FieldSpec::new("fundType", "div.col p.grey")
                .pick(Pick::Last)
                .strip("Fund Type:"),
        ],
        link_attr: default_link_attr(),
        pagination: Pagination::default(),
        detail: Some(DetailProfile {
            labelled: vec![fund_tab_fields()],
            named: Vec::new(),
            value_lists: Vec::new(),
            collections: vec![CollectionSpec {
                name: "sub_funds".into(),
                rows: ".tab-pane#sub-funds .table-row".into(),
                fields: columns(&["Name", "Reference Number", "Type of Fund", "Start Date"]),
            }],
        }),
        detail_batch_size: 1,
    }
}

fn passported_funds() -> CategoryProfile {
    CategoryProfile {
        category: Category::PassportedFunds,
        list_path: "/public-register/passport-funds".into(),
        list_params: params(&[
            ("fundType", ""),
            ("type", ""),
            ("jurisdiction", ""),
            ("status", ""),
            ("keywords", ""),
            ("isAjax", "true"),
        ]),
        list_row: "a.table-row".into(),
        list_fields: vec![
            FieldSpec::new("name", "div.col p").strip("Name:"),
            FieldSpec::new("referenceNumber", "div.col p.grey").strip("Reference number:"),
            FieldSpec::new("dateOfRegistration", "div.col p.grey")
                .pick(Pick::Nth(1))
                .strip("Date of Registration:"),
            FieldSpec::new("status", "div.col p.grey")
                .pick(Pick::Last)
                .strip("Status:"),
        ],
        link_attr: default_link_attr(),
        pagination: Pagination::default(),
        detail: Some(DetailProfile {
            labelled: vec![fund_tab_fields()],
            ..DetailProfile::default()
        }),
        detail_batch_size: 1,
    }
}

fn prohibited_individuals() -> CategoryProfile {
    CategoryProfile {
        category: Category::ProhibitedIndividuals,
        list_path: "/public-register/prohibited-individuals".into(),
        list_params: params(&[("status", ""), ("keywords", ""), ("isAjax", "true")]),
        list_row: "a.table-row".into(),
        list_fields: vec![
            FieldSpec::new("dateOfRestriction", "div.col p")
                .strip("Date of Restriction / Prohibition:"),
            FieldSpec::new("name", "div.col p.grey").strip("Name"),
            FieldSpec::new("status", "div.col p.grey")
                .pick(Pick::Last)
                .strip("Status of Restriction / Prohibition (Ongoing / Past)"),
        ],
        link_attr: default_link_attr(),
        pagination: Pagination::default(),
        detail: None,
        detail_batch_size: 1,
    }
}
