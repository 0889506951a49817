use super::{to_json, CommonOptions};
use anyhow::{Context, Result};
use clap::Args;
use run_protobuf::{framing, sandbox::SandboxResponse};

/// Split sandbox stdout into handler logs and the framed response.
///
/// Log lines are printed to standard error; the response is written as JSON.
#[derive(Args)]
pub struct UnframeCommand {
    /// The common command options.
    #[clap(flatten)]
    pub common: CommonOptions,

    /// Render the body as text and header values as plain lists.
    #[clap(long)]
    pub plain: bool,

    /// Print the JSON on a single line.
    #[clap(long, env = "RUN_PROTO_COMPACT")]
    pub compact: bool,
}

impl UnframeCommand {
    /// Executes the command.
    pub async fn exec(self) -> Result<()> {
        let output = self.common.read_input().await?;
        let (split, response) =
            framing::parse_output(&output).context("failed to parse sandbox output")?;

        for line in split.log_lines() {
            eprintln!("log: {line}");
        }

        let json = if self.plain {
            to_json(&SandboxResponse::from(&response), self.compact)?
        } else {
            to_json(&response, self.compact)?
        };
        self.common.write_output(&json).await
    }
}
