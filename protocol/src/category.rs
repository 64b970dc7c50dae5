use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;

/// Top-level document classification ("major head" on the wire).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Personal,
    Professional,
}

/// Category → subcategory lookup table.
///
/// Personal documents are filed under a person's name, professional ones under
/// a department. The table is injected as configuration; the defaults mirror
/// what the service currently accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    entries: BTreeMap<Category, Vec<String>>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            Category::Personal,
            vec!["John".to_string(), "Tom".to_string(), "Emily".to_string()],
        );
        entries.insert(
            Category::Professional,
            vec![
                "Accounts".to_string(),
                "HR".to_string(),
                "IT".to_string(),
                "Finance".to_string(),
            ],
        );
        Self { entries }
    }
}

impl CategoryTable {
    pub fn new(entries: BTreeMap<Category, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Subcategories offered for `category`. Unset or unknown yields nothing.
    pub fn subcategories(&self, category: Option<Category>) -> &[String] {
        category
            .and_then(|category| self.entries.get(&category))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, category: Category, subcategory: &str) -> bool {
        self.subcategories(Some(category))
            .iter()
            .any(|candidate| candidate == subcategory)
    }
}
