//! One module per subcommand.  Each exposes an `execute` entry point.

pub mod completions;
pub mod config;
pub mod graph;
pub mod init;
pub mod resolve;
pub mod script;
