use super::{write_output, MessageKind};
use anyhow::Result;
use clap::Args;
use run_protobuf::MessageDescriptor;
use std::path::PathBuf;

/// Print the schema table of a message.
#[derive(Args)]
pub struct DescribeCommand {
    /// The file to write to; standard output is used if not specified.
    #[clap(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// The kind of message to describe.
    #[clap(value_name = "KIND")]
    pub kind: MessageKind,
}

impl DescribeCommand {
    /// Executes the command.
    pub async fn exec(self) -> Result<()> {
        let table = Self::render(self.kind.descriptor());
        write_output(self.output.as_deref(), table.as_bytes()).await
    }

    fn render(descriptor: &MessageDescriptor) -> String {
        let width = descriptor
            .fields
            .iter()
            .map(|f| f.name.len())
            .max()
            .unwrap_or_default();

        let mut table = format!("message {name}\n", name = descriptor.name);
        for field in descriptor.fields {
            table.push_str(&format!(
                "  {number:>2}  {name:<width$}  {kind}\n",
                number = field.number,
                name = field.name,
                kind = field.kind,
            ));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_response_table() {
        assert_eq!(
            DescribeCommand::render(MessageKind::Response.descriptor()),
            "message proto.v1.HTTPResponse\n\
             \x20  1  body        bytes\n\
             \x20  2  code        int32\n\
             \x20  3  request_id  string\n\
             \x20  4  header      map<string, proto.v1.HeaderFields>\n"
        );
    }
}
