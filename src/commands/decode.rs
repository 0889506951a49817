use super::{CommonOptions, MessageKind};
use anyhow::Result;
use clap::Args;

/// Decode a binary message into JSON.
#[derive(Args)]
pub struct DecodeCommand {
    /// The common command options.
    #[clap(flatten)]
    pub common: CommonOptions,

    /// The kind of message to decode.
    #[clap(value_name = "KIND")]
    pub kind: MessageKind,

    /// Print the JSON on a single line.
    #[clap(long, env = "RUN_PROTO_COMPACT")]
    pub compact: bool,
}

impl DecodeCommand {
    /// Executes the command.
    pub async fn exec(self) -> Result<()> {
        let bytes = self.common.read_input().await?;
        tracing::debug!(kind = ?self.kind, len = bytes.len(), "decoding message");

        let json = self.kind.decode_to_json(&bytes, self.compact)?;
        self.common.write_output(&json).await
    }
}
