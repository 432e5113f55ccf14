//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "gas",
    bin_name = "gas",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Resolve gas resource configs",
    long_about = "gas discovers the resources in a container directory, lays out \
                  their dependency graph and evaluates each resource's exported \
                  config through a JavaScript runtime.",
    after_help = "EXAMPLES:\n\
        \x20 gas resolve\n\
        \x20 gas resolve --dir ./infra/gas --format json\n\
        \x20 gas graph\n\
        \x20 gas script | node --input-type=module\n\
        \x20 gas completions bash > /usr/share/bash-completion/completions/gas",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve every resource's config.
    #[command(
        visible_alias = "r",
        about = "Resolve resource configs",
        after_help = "EXAMPLES:\n\
            \x20 gas resolve\n\
            \x20 gas resolve --format json\n\
            \x20 gas resolve --dir ./gas --format list"
    )]
    Resolve(ResolveArgs),

    /// Print the dependency layout without evaluating anything.
    #[command(
        about = "Show the resource dependency graph",
        after_help = "EXAMPLES:\n\
            \x20 gas graph\n\
            \x20 gas graph --output-format json"
    )]
    Graph,

    /// Print the synthesized evaluation script.
    #[command(
        about = "Print the evaluation script",
        after_help = "EXAMPLES:\n\
            \x20 gas script > resolve.mjs\n\
            \x20 gas script | node --input-type=module"
    )]
    Script,

    /// Initialise a gas configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 gas init          # writes ./.gas.toml\n\
            \x20 gas init --force  # overwrite an existing file"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 gas completions bash > ~/.local/share/bash-completion/completions/gas\n\
            \x20 gas completions zsh  > ~/.zfunc/_gas\n\
            \x20 gas completions fish > ~/.config/fish/completions/gas.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the gas configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 gas config get resources.container_dir\n\
            \x20 gas config list\n\
            \x20 gas config path"
    )]
    Config(ConfigCommands),
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Arguments for `gas resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// How to print the resolved configs.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ResolveFormat,
}

/// Output format for the `resolve` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveFormat {
    /// Human-readable table.
    Table,
    /// One identifier per line.
    List,
    /// JSON object keyed by identifier.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `gas init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `gas completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `gas config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `evaluator.program`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the global configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
