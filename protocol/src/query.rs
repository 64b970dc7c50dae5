use serde::Deserialize;
use serde::Serialize;

/// Normalized filter constraints, ready to be embedded in a search request.
///
/// Unset values are rendered as empty strings because that is how the service
/// spells "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CriteriaQuery {
    #[serde(rename = "major_head")]
    pub category: String,
    #[serde(rename = "minor_head")]
    pub subcategory: String,
    pub from_date: String,
    pub to_date: String,
    pub tags: Vec<TagLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLabel {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchValue {
    pub value: String,
}

/// Body of `POST /searchDocumentEntry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocumentsRequest {
    #[serde(flatten)]
    pub criteria: CriteriaQuery,
    pub uploaded_by: String,
    pub start: usize,
    pub length: usize,
    #[serde(rename = "filterId")]
    pub filter_id: String,
    pub search: SearchValue,
}

impl SearchDocumentsRequest {
    pub fn new(criteria: &CriteriaQuery, start: usize, length: usize, free_text: &str) -> Self {
        Self {
            criteria: criteria.clone(),
            uploaded_by: String::new(),
            start,
            length,
            filter_id: String::new(),
            search: SearchValue {
                value: free_text.to_string(),
            },
        }
    }
}
