use anyhow::Result;
use clap::Parser;
use docsearch_login::request_otp;
use docsearch_login::verify_otp;
use owo_colors::OwoColorize;

use crate::context::Context;

#[derive(Debug, Parser)]
pub struct LoginArgs {
    /// Mobile number the one-time code is sent to
    #[arg(long, value_name = "NUMBER")]
    pub mobile: String,

    /// The code you received; omit it to have one sent
    #[arg(long, value_name = "CODE")]
    pub otp: Option<String>,
}

pub(crate) async fn run_login(context: &Context, args: LoginArgs) -> Result<()> {
    let client = context.client.as_ref();
    match args.otp {
        None => {
            let number = request_otp(client, &args.mobile).await?;
            println!("{} code sent to {number}", "✓".green());
            println!("Run `docsearch login --mobile {number} --otp <CODE>` to finish.");
        }
        Some(otp) => {
            verify_otp(client, &context.session, &args.mobile, &otp).await?;
            println!("{} signed in", "✓".green());
        }
    }
    Ok(())
}

pub(crate) fn run_logout(context: &Context) -> Result<()> {
    context.session.sign_out()?;
    println!("Signed out.");
    Ok(())
}
