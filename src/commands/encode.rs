use super::{CommonOptions, MessageKind};
use anyhow::Result;
use clap::Args;

/// Encode a JSON message into its binary form.
#[derive(Args)]
pub struct EncodeCommand {
    /// The common command options.
    #[clap(flatten)]
    pub common: CommonOptions,

    /// The kind of message to encode.
    #[clap(value_name = "KIND")]
    pub kind: MessageKind,
}

impl EncodeCommand {
    /// Executes the command.
    pub async fn exec(self) -> Result<()> {
        let json = self.common.read_input().await?;
        let bytes = self.kind.encode_from_json(&json)?;
        tracing::debug!(kind = ?self.kind, len = bytes.len(), "encoded message");

        self.common.write_output(&bytes).await
    }
}
