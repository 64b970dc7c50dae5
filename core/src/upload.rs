use chrono::Local;
use chrono::NaiveDate;
use docsearch_protocol::Category;
use docsearch_protocol::CategoryTable;
use docsearch_protocol::DocumentUploadService;
use docsearch_protocol::FileAttachment;
use docsearch_protocol::ServiceError;
use docsearch_protocol::Tag;
use docsearch_protocol::UPLOAD_DATE_FORMAT;
use docsearch_protocol::UploadPayload;
use docsearch_protocol::UploadReceipt;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::criteria::TagSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("select a category")]
    MissingCategory,

    #[error("select a subcategory")]
    MissingSubcategory,

    #[error("{subcategory} is not a {category} subcategory")]
    UnknownSubcategory {
        category: Category,
        subcategory: String,
    },

    #[error("select a file to upload")]
    MissingFile,

    #[error("upload rejected by the service{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected(Option<String>),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// The upload form while it is being filled in.
#[derive(Debug, Clone, Default)]
pub struct UploadDraft {
    category: Option<Category>,
    subcategory: Option<String>,
    date: Option<NaiveDate>,
    remarks: String,
    tags: TagSet,
    file: Option<FileAttachment>,
    user_id: String,
}

impl UploadDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.subcategory = None;
    }

    pub fn set_subcategory(&mut self, subcategory: Option<String>) {
        self.subcategory = subcategory;
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.remarks = remarks.into();
    }

    pub fn add_tag(&mut self, label: &str) -> bool {
        self.tags.insert(Tag::new(label))
    }

    pub fn remove_tag(&mut self, index: usize) {
        self.tags.remove(index);
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn set_file(&mut self, file: Option<FileAttachment>) {
        self.file = file;
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
    }

    /// Validate the form and render the wire payload. An unset date means
    /// `today`.
    pub fn build(&self, table: &CategoryTable, today: NaiveDate) -> Result<UploadPayload, UploadError> {
        let category = self.category.ok_or(UploadError::MissingCategory)?;
        let subcategory = self
            .subcategory
            .clone()
            .filter(|subcategory| !subcategory.is_empty())
            .ok_or(UploadError::MissingSubcategory)?;
        if !table.contains(category, &subcategory) {
            return Err(UploadError::UnknownSubcategory {
                category,
                subcategory,
            });
        }
        let file = self.file.clone().ok_or(UploadError::MissingFile)?;

        Ok(UploadPayload {
            major_head: category.to_string(),
            minor_head: subcategory,
            document_date: self
                .date
                .unwrap_or(today)
                .format(UPLOAD_DATE_FORMAT)
                .to_string(),
            document_remarks: self.remarks.clone(),
            tags: self.tags.labels(),
            user_id: self.user_id.clone(),
            file: Some(file),
        })
    }

    pub async fn submit(
        &self,
        service: &dyn DocumentUploadService,
        table: &CategoryTable,
    ) -> Result<UploadReceipt, UploadError> {
        let payload = self.build(table, Local::now().date_naive())?;
        let receipt = service.upload_document(&payload).await?;
        if !receipt.status {
            warn!("upload rejected: {:?}", receipt.message);
            return Err(UploadError::Rejected(receipt.message));
        }
        info!(category = %payload.major_head, "document uploaded");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docsearch_protocol::TagLabel;
    use pretty_assertions::assert_eq;

    fn pdf() -> FileAttachment {
        FileAttachment {
            name: "scan.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    fn complete_draft() -> UploadDraft {
        let mut draft = UploadDraft::new();
        draft.set_category(Some(Category::Professional));
        draft.set_subcategory(Some("Finance".to_string()));
        draft.set_file(Some(pdf()));
        draft
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default()
    }

    #[test]
    fn required_fields_are_checked_in_order() {
        let table = CategoryTable::default();
        let mut draft = UploadDraft::new();
        assert_eq!(draft.build(&table, today()), Err(UploadError::MissingCategory));

        draft.set_category(Some(Category::Personal));
        assert_eq!(draft.build(&table, today()), Err(UploadError::MissingSubcategory));

        draft.set_subcategory(Some("HR".to_string()));
        assert_eq!(
            draft.build(&table, today()),
            Err(UploadError::UnknownSubcategory {
                category: Category::Personal,
                subcategory: "HR".to_string(),
            })
        );

        draft.set_subcategory(Some("Tom".to_string()));
        assert_eq!(draft.build(&table, today()), Err(UploadError::MissingFile));
    }

    #[test]
    fn payload_uses_day_first_date_and_dedups_tags() -> anyhow::Result<()> {
        let mut draft = complete_draft();
        draft.set_remarks("Q1 statement");
        draft.add_tag("bank");
        draft.add_tag("BANK");

        let payload = draft.build(&CategoryTable::default(), today())?;
        assert_eq!(payload.document_date, "09-03-2024");
        assert_eq!(payload.major_head, "Professional");
        assert_eq!(payload.minor_head, "Finance");
        assert_eq!(
            payload.tags,
            vec![TagLabel {
                label: "bank".to_string()
            }]
        );
        assert_eq!(payload.file, Some(pdf()));
        Ok(())
    }

    #[test]
    fn category_change_drops_subcategory() {
        let mut draft = complete_draft();
        draft.set_category(Some(Category::Personal));
        assert_eq!(
            draft.build(&CategoryTable::default(), today()),
            Err(UploadError::MissingSubcategory)
        );
    }

    struct FixedReceipt(UploadReceipt);

    #[async_trait]
    impl DocumentUploadService for FixedReceipt {
        async fn upload_document(
            &self,
            _payload: &UploadPayload,
        ) -> Result<UploadReceipt, ServiceError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn false_status_is_a_rejection() {
        let service = FixedReceipt(UploadReceipt {
            status: false,
            message: Some("quota".to_string()),
        });
        let result = complete_draft()
            .submit(&service, &CategoryTable::default())
            .await;
        assert_eq!(result, Err(UploadError::Rejected(Some("quota".to_string()))));
        assert_eq!(
            UploadError::Rejected(Some("quota".to_string())).to_string(),
            "upload rejected by the service: quota"
        );
    }

    #[tokio::test]
    async fn accepted_upload_returns_receipt() -> anyhow::Result<()> {
        let service = FixedReceipt(UploadReceipt {
            status: true,
            message: None,
        });
        let receipt = complete_draft()
            .submit(&service, &CategoryTable::default())
            .await?;
        assert!(receipt.status);
        Ok(())
    }
}
