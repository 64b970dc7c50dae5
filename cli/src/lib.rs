mod context;
mod login_cmd;
mod search_cmd;
mod upload_cmd;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;

pub use context::CliConfig;
pub use context::Context;
pub use login_cmd::LoginArgs;
pub use search_cmd::SearchArgs;
pub use search_cmd::TagsArgs;
pub use upload_cmd::UploadArgs;

/// Search and upload documents in the remote document repository.
#[derive(Debug, Parser)]
#[command(name = "docsearch", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with a one-time code sent to your mobile number
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Search documents by category, date range, tags and text
    Search(SearchArgs),

    /// List tags matching a term
    Tags(TagsArgs),

    /// Upload a document
    Upload(UploadArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let context = Context::load()?;
        match self.command {
            Command::Login(args) => login_cmd::run_login(&context, args).await,
            Command::Logout => login_cmd::run_logout(&context),
            Command::Search(args) => search_cmd::run_search(&context, args).await,
            Command::Tags(args) => search_cmd::run_tags(&context, args).await,
            Command::Upload(args) => upload_cmd::run_upload(&context, args).await,
        }
    }
}
