use anyhow::Context as _;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use docsearch_core::UploadDraft;
use docsearch_protocol::Category;
use docsearch_protocol::FileAttachment;
use owo_colors::OwoColorize;
use std::path::Path;
use std::path::PathBuf;

use crate::context::Context;

#[derive(Debug, Parser)]
pub struct UploadArgs {
    /// File to upload
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long)]
    pub category: Category,

    #[arg(long)]
    pub subcategory: String,

    /// Document date; defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    pub remarks: String,

    /// Attach a tag; repeat for several
    #[arg(long = "tag", value_name = "LABEL")]
    pub tags: Vec<String>,

    #[arg(long, default_value = "")]
    pub user_id: String,
}

pub(crate) async fn run_upload(context: &Context, args: UploadArgs) -> Result<()> {
    context.require_session()?;
    let categories = &context.config.search.categories;

    let mut draft = UploadDraft::new();
    draft.set_category(Some(args.category));
    draft.set_subcategory(Some(args.subcategory));
    draft.set_date(args.date);
    draft.set_remarks(args.remarks);
    draft.set_user_id(args.user_id);
    for tag in &args.tags {
        draft.add_tag(tag);
    }
    draft.set_file(Some(read_attachment(&args.file)?));
    let receipt = draft
        .submit(context.client.as_ref(), categories)
        .await
        .context("upload failed")?;
    let message = receipt.message.unwrap_or_else(|| "uploaded".to_string());
    println!("{} {message}", "✓".green());
    Ok(())
}

fn read_attachment(path: &Path) -> Result<FileAttachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(FileAttachment {
        name: file_name(path),
        mime_type: mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
        bytes,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
