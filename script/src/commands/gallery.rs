use anyhow::Result;
use clap::Args;
use colored::*;

use sealmint_lib::validation::parse_address;

use super::{print_header, render_reveal_outcome, spinner};
use crate::config::{NetworkArgs, Session};

/// List tokens owned by an account
#[derive(Args, Debug)]
pub struct GalleryCommand {
    /// Owner to list (defaults to the signing account)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    /// Also reveal each token's message
    #[arg(long)]
    pub reveal: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl GalleryCommand {
    pub async fn execute(&self) -> Result<()> {
        print_header("🖼️ SealMint - Gallery");

        let session = Session::connect(&self.network).await?;
        let workflow = session.workflow()?;
        let owner = match &self.owner {
            Some(owner) => parse_address(owner)?,
            None => workflow.account(),
        };

        let pb = spinner("cyan");
        pb.set_message(format!("Loading tokens of {owner}..."));
        let views = workflow.gallery(owner).await;
        pb.finish_and_clear();
        let views = views?;

        if views.is_empty() {
            println!("{} No tokens owned by {}", "📭".bright_yellow(), owner);
            return Ok(());
        }

        println!("{} {} token(s)", "📦".bright_green(), views.len());
        println!("{}", "─".repeat(30).bright_black());
        for view in views {
            let image = if view.image_uri.starts_with("data:") {
                "inline image".to_string()
            } else {
                view.image_uri.clone()
            };
            println!("{} {}", format!("#{}", view.token_id).bright_white().bold(), image.bright_cyan());

            // Only the owner's device can hold the plaintext
            if self.reveal && owner == workflow.account() {
                let outcome = workflow.reveal(view.token_id).await;
                println!("   {}", render_reveal_outcome(view.token_id, &outcome));
            }
        }
        Ok(())
    }
}
