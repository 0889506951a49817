//! The `run-proto` command line tool for inspecting `proto.v1` envelopes.

pub mod commands;
