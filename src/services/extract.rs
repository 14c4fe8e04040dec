// src/services/extract.rs

//! Record extraction from list and detail documents.
//!
//! Selectors are compiled once per profile. Extraction itself never fails:
//! a field whose element is missing comes out as an empty string, so a layout
//! change upstream shows up as blank data rather than an aborted run.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    CategoryProfile, CollectionSpec, DetailPayload, DetailProfile, FieldSpec, LINK_FIELD,
    LabelledGroup, ListRecord, Pick, ValueList,
};
use crate::utils::normalize_whitespace;

struct Field {
    name: String,
    selector: Selector,
    pick: Pick,
    strip: Option<String>,
}

impl Field {
    fn compile(spec: &FieldSpec) -> Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            selector: parse_selector(&spec.selector)?,
            pick: spec.pick,
            strip: spec.strip.clone(),
        })
    }

    fn read(&self, scope: ElementRef<'_>) -> String {
        let text = pick_text(scope, &self.selector, self.pick);
        match &self.strip {
            Some(prefix) => normalize_whitespace(&text.replacen(prefix.as_str(), "", 1)),
            None => text,
        }
    }
}

struct Labelled {
    scope: Selector,
    label: Selector,
    value: Selector,
}

struct Values {
    name: String,
    rows: Selector,
    selector: Selector,
    split: Option<String>,
}

struct Collection {
    name: String,
    rows: Selector,
    fields: Vec<Field>,
}

struct Detail {
    labelled: Vec<Labelled>,
    named: Vec<Field>,
    value_lists: Vec<Values>,
    collections: Vec<Collection>,
}

/// Compiled extraction rules for one category.
pub struct Extractor {
    row: Selector,
    fields: Vec<Field>,
    link_attr: String,
    detail: Option<Detail>,
}

impl Extractor {
    /// Compile every selector in the profile.
    pub fn new(profile: &CategoryProfile) -> Result<Self> {
        Ok(Self {
            row: parse_selector(&profile.list_row)?,
            fields: compile_fields(&profile.list_fields)?,
            link_attr: profile.link_attr.clone(),
            detail: profile.detail.as_ref().map(compile_detail).transpose()?,
        })
    }

    /// Rows of a list page, in document order.
    pub fn extract_list(&self, html: &str) -> Vec<ListRecord> {
        let document = Html::parse_document(html);
        document
            .select(&self.row)
            .map(|row| {
                let mut record = ListRecord::new();
                for field in &self.fields {
                    record.insert(field.name.clone(), field.read(row));
                }
                if let Some(link) = row.value().attr(&self.link_attr) {
                    record.insert(LINK_FIELD, link.trim());
                }
                record
            })
            .collect()
    }

    /// Structured content of a detail page. Empty for list-only profiles.
    pub fn extract_detail(&self, html: &str) -> DetailPayload {
        let mut payload = DetailPayload::default();
        let Some(detail) = &self.detail else {
            return payload;
        };

        let document = Html::parse_document(html);
        let root = document.root_element();

        for group in &detail.labelled {
            for scope in root.select(&group.scope) {
                let label = pick_text(scope, &group.label, Pick::All);
                let label = label.trim_end_matches(':').trim();
                let value = pick_text(scope, &group.value, Pick::All);
                if !label.is_empty() && !value.is_empty() {
                    payload.fields.insert(label.to_string(), value);
                }
            }
        }

        for field in &detail.named {
            payload.fields.insert(field.name.clone(), field.read(root));
        }

        for list in &detail.value_lists {
            let mut values: Vec<String> = Vec::new();
            for row in root.select(&list.rows) {
                let cell = pick_text(row, &list.selector, Pick::All);
                let parts: Vec<String> = match &list.split {
                    Some(sep) => cell.split(sep.as_str()).map(normalize_whitespace).collect(),
                    None => vec![cell],
                };
                for part in parts {
                    if !part.is_empty() && !values.contains(&part) {
                        values.push(part);
                    }
                }
            }
            payload.lists.insert(list.name.clone(), values);
        }

        for collection in &detail.collections {
            let rows = root
                .select(&collection.rows)
                .map(|row| {
                    collection
                        .fields
                        .iter()
                        .map(|f| (f.name.clone(), f.read(row)))
                        .collect::<BTreeMap<_, _>>()
                })
                .collect();
            payload.collections.insert(collection.name.clone(), rows);
        }

        payload
    }
}

fn compile_fields(specs: &[FieldSpec]) -> Result<Vec<Field>> {
    specs.iter().map(Field::compile).collect()
}

fn compile_detail(profile: &DetailProfile) -> Result<Detail> {
    Ok(Detail {
        labelled: profile
            .labelled
            .iter()
            .map(|LabelledGroup { scope, label, value }| {
                Ok(Labelled {
                    scope: parse_selector(scope)?,
                    label: parse_selector(label)?,
                    value: parse_selector(value)?,
                })
            })
            .collect::<Result<_>>()?,
        named: compile_fields(&profile.named)?,
        value_lists: profile
            .value_lists
            .iter()
            .map(|list: &ValueList| {
                Ok(Values {
                    name: list.name.clone(),
                    rows: parse_selector(&list.rows)?,
                    selector: parse_selector(&list.selector)?,
                    split: list.split.clone(),
                })
            })
            .collect::<Result<_>>()?,
        collections: profile
            .collections
            .iter()
            .map(|c: &CollectionSpec| {
                Ok(Collection {
                    name: c.name.clone(),
                    rows: parse_selector(&c.rows)?,
                    fields: compile_fields(&c.fields)?,
                })
            })
            .collect::<Result<_>>()?,
    })
}

/// Whitespace-normalized text of the picked match, empty when nothing matches.
fn pick_text(scope: ElementRef<'_>, selector: &Selector, pick: Pick) -> String {
    let text_of = |el: ElementRef<'_>| el.text().collect::<String>();
    let raw = match pick {
        Pick::First => scope.select(selector).next().map(text_of),
        Pick::Last => scope.select(selector).last().map(text_of),
        Pick::Nth(i) => scope.select(selector).nth(i).map(text_of),
        Pick::All => Some(scope.select(selector).map(text_of).collect()),
    };
    raw.map(|t| normalize_whitespace(&t)).unwrap_or_default()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    const FIRMS_LIST: &str = r#"
        <div class="results">
          <a class="table-row" href="/public-register/firms/acme-capital">
            <div class="col"><p>Name: Acme   Capital Ltd</p></div>
            <div class="col"><p class="grey">Reference number: F001234</p></div>
            <div class="col"><p class="grey">Firm Type: Authorised Firm</p></div>
          </a>
          <a class="table-row" href="/public-register/firms/beta">
            <div class="col"><p>Name: Beta LLP</p></div>
          </a>
        </div>
    "#;

    const FIRM_DETAIL: &str = r#"
        <div id="firms">
          <div class="table-row row_with_padding">
            <div class="col"><p class="small grey">Legal Status:</p><p>Private Company</p></div>
            <div class="col"><p class="small grey">Date of Licence:</p><p>01/02/2010</p></div>
          </div>
          <div class="spcl_row1">
            <div class="col"><p>Advising on Financial Products</p></div>
            <div class="col"><p>-</p></div>
            <div class="col"><p>Shares, Bonds</p></div>
          </div>
          <div class="spcl_row2">
            <div class="col"><p>Arranging Custody</p></div>
            <div class="col"><p>-</p></div>
            <div class="col"><p>Bonds, Units</p></div>
          </div>
          <div class="border-bottom-0"><p class="small grey">Restrictions</p><p>None</p></div>
        </div>
        <div id="individuals">
          <div class="table-row">
            <div class="col"><p>Jane Roe</p></div>
            <div class="col"><p>I000001</p></div>
            <div class="col"><p>Licensed Director</p></div>
            <div class="col"><p>01/01/2020</p></div>
            <div class="col"><p></p></div>
          </div>
        </div>
    "#;

    fn firms() -> Extractor {
        Extractor::new(&CategoryProfile::for_category(Category::Firms)).unwrap()
    }

    #[test]
    fn test_extract_list_rows() {
        let rows = firms().extract_list(FIRMS_LIST);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name(), "Acme Capital Ltd");
        assert_eq!(rows[0].get("referenceNumber"), Some("F001234"));
        assert_eq!(rows[0].get("firmType"), Some("Authorised Firm"));
        assert_eq!(rows[0].link(), Some("/public-register/firms/acme-capital"));
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let rows = firms().extract_list(FIRMS_LIST);
        assert_eq!(rows[1].name(), "Beta LLP");
        assert_eq!(rows[1].get("referenceNumber"), Some(""));
        assert_eq!(rows[1].get("firmType"), Some(""));
    }

    #[test]
    fn test_extract_list_of_unrelated_document_is_empty() {
        assert!(firms().extract_list("<html><body>maintenance</body></html>").is_empty());
    }

    #[test]
    fn test_extract_detail() {
        let detail = firms().extract_detail(FIRM_DETAIL);

        assert_eq!(detail.fields["Legal Status"], "Private Company");
        assert_eq!(detail.fields["Date of Licence"], "01/02/2010");
        assert_eq!(detail.fields["Restrictions"], "None");
        assert_eq!(
            detail.lists["financialServices"],
            vec!["Advising on Financial Products", "Arranging Custody"]
        );
        assert_eq!(detail.lists["investments"], vec!["Shares", "Bonds", "Units"]);

        let individuals = &detail.collections["individuals"];
        assert_eq!(individuals.len(), 1);
        assert_eq!(individuals[0]["name"], "Jane Roe");
        assert_eq!(individuals[0]["dateWithdrawn"], "");
        assert!(detail.collections["regulatory_actions"].is_empty());
    }

    #[test]
    fn test_list_only_profile_has_empty_detail() {
        let extractor =
            Extractor::new(&CategoryProfile::for_category(Category::ProhibitedIndividuals)).unwrap();
        assert_eq!(extractor.extract_detail(FIRM_DETAIL), DetailPayload::default());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let mut profile = CategoryProfile::for_category(Category::Funds);
        profile.list_row = "[[invalid".into();
        assert!(matches!(Extractor::new(&profile), Err(AppError::Selector { .. })));
    }
}
