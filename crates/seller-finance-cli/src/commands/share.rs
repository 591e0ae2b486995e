use clap::{Args, Subcommand};
use serde_json::{json, Value};

use seller_finance_core::share::{decode_share_link, encode_share_link, share_url, token_from_url};

use super::DealSourceArgs;
use crate::config::Settings;

#[derive(Subcommand)]
pub enum ShareCommand {
    /// Encode a deal as a share token (and URL when --base-url is given)
    Encode(EncodeArgs),
    /// Decode a share token or URL back into deal inputs
    Decode(DecodeArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub deal: DealSourceArgs,

    /// Page the link should open, e.g. https://example.com/calculator
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Token or full URL carrying an `s` parameter
    pub token: String,
}

pub fn run_share(cmd: ShareCommand, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    match cmd {
        ShareCommand::Encode(args) => {
            let inputs = args.deal.resolve(settings)?;
            let token = encode_share_link(&inputs)?;
            let url = args
                .base_url
                .as_deref()
                .map(|base| share_url(base, &inputs))
                .transpose()?;
            Ok(json!({ "token": token, "url": url }))
        }
        ShareCommand::Decode(args) => {
            let token = token_from_url(&args.token).unwrap_or(args.token.as_str());
            let inputs = decode_share_link(token)?;
            Ok(serde_json::to_value(inputs)?)
        }
    }
}
