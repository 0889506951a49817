//! Commands for the `run-proto` tool.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use run_protobuf::{HeaderFields, HttpRequest, HttpResponse, Message, MessageDescriptor};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

mod decode;
mod describe;
mod encode;
mod frame;
mod unframe;

pub use self::decode::*;
pub use self::describe::*;
pub use self::encode::*;
pub use self::frame::*;
pub use self::unframe::*;

/// Common options for commands.
#[derive(Args)]
pub struct CommonOptions {
    /// The file to read from; standard input is used if not specified.
    #[clap(long, short, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// The file to write to; standard output is used if not specified.
    #[clap(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl CommonOptions {
    /// Reads the entire input.
    pub async fn read_input(&self) -> Result<Vec<u8>> {
        match &self.input {
            Some(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read `{path}`", path = path.display())),
            None => {
                let mut buf = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut buf)
                    .await
                    .context("failed to read standard input")?;
                Ok(buf)
            }
        }
    }

    /// Writes the given bytes to the output.
    pub async fn write_output(&self, bytes: &[u8]) -> Result<()> {
        write_output(self.output.as_deref(), bytes).await
    }
}

/// Writes bytes to the given file, or to standard output if there is none.
async fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("failed to write `{path}`", path = path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(bytes)
                .await
                .context("failed to write standard output")?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

/// The kind of message a command operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    /// `proto.v1.HTTPRequest`
    Request,
    /// `proto.v1.HTTPResponse`
    Response,
    /// `proto.v1.HeaderFields`
    HeaderFields,
}

impl MessageKind {
    /// Gets the schema table for the kind.
    pub fn descriptor(self) -> &'static MessageDescriptor {
        match self {
            Self::Request => HttpRequest::descriptor(),
            Self::Response => HttpResponse::descriptor(),
            Self::HeaderFields => HeaderFields::descriptor(),
        }
    }

    /// Decodes a binary message of this kind and renders it as JSON.
    pub fn decode_to_json(self, bytes: &[u8], compact: bool) -> Result<Vec<u8>> {
        match self {
            Self::Request => to_json(&decode::<HttpRequest>(bytes)?, compact),
            Self::Response => to_json(&decode::<HttpResponse>(bytes)?, compact),
            Self::HeaderFields => to_json(&decode::<HeaderFields>(bytes)?, compact),
        }
    }

    /// Parses a JSON message of this kind and encodes it.
    pub fn encode_from_json(self, json: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Request => Ok(from_json::<HttpRequest>(json)?.encode_to_vec()),
            Self::Response => Ok(from_json::<HttpResponse>(json)?.encode_to_vec()),
            Self::HeaderFields => Ok(from_json::<HeaderFields>(json)?.encode_to_vec()),
        }
    }
}

fn decode<M: Message>(bytes: &[u8]) -> Result<M> {
    M::decode(bytes).with_context(|| format!("failed to decode `{}`", M::descriptor().name))
}

fn from_json<M: Message + DeserializeOwned>(json: &[u8]) -> Result<M> {
    serde_json::from_slice(json)
        .with_context(|| format!("failed to parse `{}` from JSON", M::descriptor().name))
}

fn to_json(value: &impl Serialize, compact: bool) -> Result<Vec<u8>> {
    let mut json = if compact {
        serde_json::to_vec(value)?
    } else {
        serde_json::to_vec_pretty(value)?
    };
    json.push(b'\n');
    Ok(json)
}
