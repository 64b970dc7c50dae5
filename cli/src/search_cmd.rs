use anyhow::Context as _;
use anyhow::Result;
use anyhow::bail;
use chrono::NaiveDate;
use clap::Parser;
use docsearch_core::DocumentSearch;
use docsearch_core::Notification;
use docsearch_core::Notifier;
use docsearch_core::Severity;
use docsearch_protocol::Category;
use docsearch_protocol::Document;
use docsearch_protocol::PreviewKind;
use docsearch_protocol::TagSearchService;
use owo_colors::OwoColorize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::context::Context;

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Free text matched against document remarks
    #[arg(value_name = "TEXT", default_value = "")]
    pub text: String,

    /// Personal or Professional
    #[arg(long)]
    pub category: Option<Category>,

    /// Subcategory within --category
    #[arg(long, requires = "category")]
    pub subcategory: Option<String>,

    /// Earliest document date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Latest document date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Require a tag; repeat for several
    #[arg(long = "tag", value_name = "LABEL")]
    pub tags: Vec<String>,

    /// Number of pages to fetch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

#[derive(Debug, Parser)]
pub struct TagsArgs {
    /// Beginning of the tag label
    #[arg(value_name = "TERM")]
    pub term: String,
}

pub(crate) async fn run_search(context: &Context, args: SearchArgs) -> Result<()> {
    context.require_session()?;
    let categories = &context.config.search.categories;
    if let (Some(category), Some(subcategory)) = (args.category, args.subcategory.as_deref())
        && !categories.contains(category, subcategory)
    {
        bail!(
            "{subcategory} is not a {category} subcategory (expected one of: {})",
            categories.subcategories(Some(category)).join(", ")
        );
    }

    let (notifier, mut notifications) = Notifier::channel();
    let search = DocumentSearch::new(
        context.session.clone(),
        &context.config.search,
        context.client.clone(),
        context.client.clone(),
        notifier,
    );
    search.update_criteria(|criteria| {
        criteria.set_category(args.category);
        criteria.set_subcategory(args.subcategory.clone());
        criteria.set_date_from(args.from);
        criteria.set_date_to(args.to);
        for tag in &args.tags {
            criteria.add_tag(tag);
        }
        criteria.set_free_text(args.text.trim());
    });

    let searched = search.search().await;
    report(&mut notifications);
    searched.context("search failed")?;

    for _ in 1..args.pages {
        if !search.results().has_more() {
            break;
        }
        let loaded = search.load_more().await;
        report(&mut notifications);
        loaded.context("loading more documents failed")?;
    }

    let results = search.results().results();
    if results.is_empty() {
        println!("No documents found.");
        return Ok(());
    }
    for (index, document) in results.iter().enumerate() {
        print_document(index + 1, document);
    }
    let more = if search.results().has_more() {
        " (more available, raise --pages)"
    } else {
        ""
    };
    println!("{} documents{more}", results.len());
    Ok(())
}

pub(crate) async fn run_tags(context: &Context, args: TagsArgs) -> Result<()> {
    context.require_session()?;
    let page = context
        .client
        .search_tags(args.term.trim())
        .await
        .context("tag lookup failed")?;
    if page.items.is_empty() {
        println!("No matching tags.");
    }
    for tag in page.items {
        println!("{}", tag.label);
    }
    Ok(())
}

fn print_document(position: usize, document: &Document) {
    let preview = match document.preview_kind() {
        PreviewKind::Pdf => "pdf",
        PreviewKind::Image => "image",
        PreviewKind::Unsupported => "no preview",
        PreviewKind::Missing => "no file",
    };
    println!(
        "{position:>3}. {} {}",
        document.title().bold(),
        format!("[{preview}]").dimmed()
    );
    let date = document.date.as_deref().unwrap_or_default();
    println!("     {}  {date}", document.subtitle());
    if let Some(url) = document.file_url.as_deref().filter(|url| !url.is_empty()) {
        println!("     {}", url.cyan());
    }
}

fn report(notifications: &mut UnboundedReceiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        match notification.severity {
            Severity::Blocking => eprintln!("{} {}", "error:".red().bold(), notification.message),
            Severity::Light => eprintln!("{} {}", "warning:".yellow(), notification.message),
        }
    }
}
