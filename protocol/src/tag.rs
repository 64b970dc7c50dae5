use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// A document tag.
///
/// `id` is assigned by the service; tags typed freehand by the user carry no
/// id until the service learns about them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_tag_id"
    )]
    pub id: Option<String>,
}

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: None,
        }
    }

    pub fn with_id(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: Some(id.into()),
        }
    }

    /// Tags are unique by label, compared without regard to case.
    pub fn same_label(&self, label: &str) -> bool {
        labels_match(&self.label, label)
    }
}

pub(crate) fn labels_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// The service hands out numeric ids for some tags and string ids for others.
fn deserialize_tag_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_numeric_and_string_ids() -> anyhow::Result<()> {
        let tags: Vec<Tag> = serde_json::from_str(
            r#"[{"label": "urgent", "id": 7}, {"label": "tax", "id": "t-2"}, {"label": "misc", "id": null}, {"label": "new"}]"#,
        )?;
        assert_eq!(
            tags,
            vec![
                Tag::with_id("urgent", "7"),
                Tag::with_id("tax", "t-2"),
                Tag::new("misc"),
                Tag::new("new"),
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_tag_without_label() {
        let parsed = serde_json::from_str::<Tag>(r#"{"id": 3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn label_comparison_ignores_case() {
        assert!(Tag::new("Urgent").same_label("uRGENT"));
        assert!(!Tag::new("Urgent").same_label("urgently"));
    }
}
