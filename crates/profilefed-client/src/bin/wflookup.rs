//! WebFinger lookup CLI
//!
//! Resolves a resource to its JRD and pretty-prints it.

use anyhow::{bail, Context, Result};
use clap::Parser;
use profilefed_client::webfinger;

#[derive(Parser)]
#[command(name = "wflookup", about = "Look up a WebFinger resource", version)]
struct Args {
    /// Resource to look up: an acct ID (user@host or acct:user@host) or a URL
    resource: String,

    /// Query this server instead of deriving one from the resource
    #[arg(long)]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let http = reqwest::Client::new();

    let descriptor = if let Some(server) = &args.server {
        webfinger::lookup(&http, &args.resource, server).await?
    } else if args.resource.starts_with("http") {
        webfinger::lookup_url(&http, &args.resource).await?
    } else if args.resource.starts_with("acct:") || args.resource.contains('@') {
        webfinger::lookup_acct(&http, &args.resource).await?
    } else {
        bail!("unable to determine the resource kind; pass --server to query a specific server");
    };

    let out = serde_json::to_string_pretty(&descriptor).context("encoding descriptor")?;
    println!("{out}");

    Ok(())
}
