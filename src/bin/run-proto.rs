use anyhow::Result;
use clap::Parser;
use run_cli::commands::{
    DecodeCommand, DescribeCommand, EncodeCommand, FrameCommand, UnframeCommand,
};
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn version() -> &'static str {
    option_env!("CARGO_VERSION_INFO").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Encode, decode and inspect run HTTP envelope messages.
#[derive(Parser)]
#[clap(
    bin_name = "run-proto",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
#[command(version = version())]
enum RunProtoCli {
    Encode(EncodeCommand),
    Decode(DecodeCommand),
    Frame(FrameCommand),
    Unframe(UnframeCommand),
    Describe(DescribeCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = match RunProtoCli::parse() {
        RunProtoCli::Encode(cmd) => cmd.exec().await,
        RunProtoCli::Decode(cmd) => cmd.exec().await,
        RunProtoCli::Frame(cmd) => cmd.exec().await,
        RunProtoCli::Unframe(cmd) => cmd.exec().await,
        RunProtoCli::Describe(cmd) => cmd.exec().await,
    } {
        eprintln!("error: {e:?}");
        exit(1);
    }

    Ok(())
}
