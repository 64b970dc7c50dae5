use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

const UNTITLED: &str = "Untitled Document";
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// A document entry as returned by the search endpoint.
///
/// Only the fields the client renders are typed; anything else the service
/// sends is preserved in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "document_remarks", default)]
    pub remarks: Option<String>,
    #[serde(rename = "major_head", default)]
    pub category: Option<String>,
    #[serde(rename = "minor_head", default)]
    pub subcategory: Option<String>,
    #[serde(rename = "document_date", default)]
    pub date: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a document's file can be previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Pdf,
    Image,
    Unsupported,
    Missing,
}

impl Document {
    pub fn title(&self) -> &str {
        match self.remarks.as_deref() {
            Some(remarks) if !remarks.trim().is_empty() => remarks,
            _ => UNTITLED,
        }
    }

    /// "category - subcategory", as listed under the title.
    pub fn subtitle(&self) -> String {
        format!(
            "{} - {}",
            self.category.as_deref().unwrap_or_default(),
            self.subcategory.as_deref().unwrap_or_default()
        )
    }

    /// The service does not report a content type, so the file URL's
    /// extension decides.
    pub fn preview_kind(&self) -> PreviewKind {
        let Some(url) = self.file_url.as_deref().filter(|url| !url.is_empty()) else {
            return PreviewKind::Missing;
        };
        let path = url.split('?').next().unwrap_or(url).to_lowercase();
        if path.ends_with(".pdf") {
            PreviewKind::Pdf
        } else if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            PreviewKind::Image
        } else {
            PreviewKind::Unsupported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn with_url(url: &str) -> Document {
        Document {
            file_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_service_entry_and_keeps_unknown_fields() -> anyhow::Result<()> {
        let doc: Document = serde_json::from_value(json!({
            "document_remarks": "March invoice",
            "major_head": "Professional",
            "minor_head": "Accounts",
            "document_date": "2024-03-02",
            "file_url": "https://files.example/doc.pdf",
            "uploaded_by": "tom",
            "document_id": 42
        }))?;
        assert_eq!(doc.title(), "March invoice");
        assert_eq!(doc.subtitle(), "Professional - Accounts");
        assert_eq!(doc.extra.get("document_id"), Some(&json!(42)));
        Ok(())
    }

    #[test]
    fn rejects_mistyped_fields() {
        let parsed = serde_json::from_value::<Document>(json!({ "document_remarks": 12 }));
        assert!(parsed.is_err());
    }

    #[test]
    fn blank_remarks_fall_back_to_untitled() {
        let doc = Document {
            remarks: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.title(), "Untitled Document");
        assert_eq!(Document::default().subtitle(), " - ");
    }

    #[test]
    fn preview_kind_follows_extension() {
        assert_eq!(with_url("https://x/a.PDF?sig=1").preview_kind(), PreviewKind::Pdf);
        assert_eq!(with_url("https://x/a.jpeg").preview_kind(), PreviewKind::Image);
        assert_eq!(with_url("https://x/a.png?x=.pdf").preview_kind(), PreviewKind::Image);
        assert_eq!(with_url("https://x/a.docx").preview_kind(), PreviewKind::Unsupported);
        assert_eq!(with_url("").preview_kind(), PreviewKind::Missing);
        assert_eq!(Document::default().preview_kind(), PreviewKind::Missing);
    }
}
