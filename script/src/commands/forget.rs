use anyhow::Result;
use clap::Args;
use colored::*;

use super::{print_header, token_id_or_prompt};
use crate::config::{NetworkArgs, Session};

/// Remove this device's cached message for a token
#[derive(Args, Debug)]
pub struct ForgetCommand {
    #[arg(long, short = 't')]
    pub token_id: Option<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl ForgetCommand {
    pub async fn execute(&self) -> Result<()> {
        print_header("🧹 SealMint - Forget Command");

        let token_id = token_id_or_prompt(self.token_id.as_deref())?;
        let session = Session::connect(&self.network).await?;
        let workflow = session.workflow()?;

        if workflow.cached_message(token_id).is_none() {
            println!("{} Nothing cached for token #{}", "ℹ️".bright_blue(), token_id);
            return Ok(());
        }
        if !workflow.forget(token_id) {
            anyhow::bail!("could not update the local cache");
        }
        println!("{} Forgot the message of token #{}", "🗑️".bright_green(), token_id);
        Ok(())
    }
}
