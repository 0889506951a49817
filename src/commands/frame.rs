use super::{from_json, CommonOptions};
use anyhow::{Context, Result};
use clap::Args;
use run_protobuf::{framing, HttpResponse};

/// Frame a JSON response the way a sandboxed handler writes it to stdout.
#[derive(Args)]
pub struct FrameCommand {
    /// The common command options.
    #[clap(flatten)]
    pub common: CommonOptions,
}

impl FrameCommand {
    /// Executes the command.
    pub async fn exec(self) -> Result<()> {
        let json = self.common.read_input().await?;
        let response: HttpResponse = from_json(&json)?;
        let framed = framing::frame_response(&response).context("failed to frame response")?;
        tracing::debug!(len = framed.len(), "framed response");

        self.common.write_output(&framed).await
    }
}
