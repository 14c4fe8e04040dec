// src/models/category.rs

//! Register categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A record type published by the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Firms,
    Individuals,
    Funds,
    PassportedFunds,
    ProhibitedIndividuals,
}

impl Category {
    /// Every category, in the order `all` runs them.
    pub const ALL: [Category; 5] = [
        Category::Firms,
        Category::Individuals,
        Category::Funds,
        Category::PassportedFunds,
        Category::ProhibitedIndividuals,
    ];

    /// Plural key used for directories and aggregate file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Firms => "firms",
            Category::Individuals => "individuals",
            Category::Funds => "funds",
            Category::PassportedFunds => "passported_funds",
            Category::ProhibitedIndividuals => "prohibited_individuals",
        }
    }

    /// Singular key used to prefix sections of a combined record.
    pub fn singular(&self) -> &'static str {
        match self {
            Category::Firms => "firm",
            Category::Individuals => "individual",
            Category::Funds => "fund",
            Category::PassportedFunds => "passported_fund",
            Category::ProhibitedIndividuals => "prohibited_individual",
        }
    }

    /// Human-readable label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Firms => "Firms",
            Category::Individuals => "Individuals",
            Category::Funds => "Funds",
            Category::PassportedFunds => "Passported Funds",
            Category::ProhibitedIndividuals => "Prohibited Individuals",
        }
    }

    /// Key of the list section inside a combined record, e.g. `firm_list`.
    pub fn list_section(&self) -> String {
        format!("{}_list", self.singular())
    }

    /// Key of the detail section inside a combined record, e.g. `firm_details`.
    pub fn details_section(&self) -> String {
        format!("{}_details", self.singular())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "unknown category '{s}' (expected one of: {})",
                    Category::ALL.map(|c| c.as_str()).join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_dashes_and_case() {
        assert_eq!(
            "Passported-Funds".parse::<Category>().unwrap(),
            Category::PassportedFunds
        );
        assert_eq!("firms".parse::<Category>().unwrap(), Category::Firms);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("banks".parse::<Category>().is_err());
    }

    #[test]
    fn test_section_keys() {
        assert_eq!(Category::Firms.list_section(), "firm_list");
        assert_eq!(Category::Funds.details_section(), "fund_details");
    }
}
