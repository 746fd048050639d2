use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod dispatcher;
mod registry;
mod utils;

use cmd::{AnalyzeArgs, ChatArgs, ExecArgs, FormatArgs, ServersArgs};
use dispatcher::Dispatcher;
use registry::Registry;

/// devrunner - dispatch developer-tool invocations from the command line
///
/// Command layout:
///   devrunner servers
///   devrunner execute --server <name> --code <code> [--language <lang>]
///   devrunner analyze --file <path>
///   devrunner format  --file <path>
///   devrunner chat    --message <text> [--context <text>] [--conversation <id>]
///
/// Global flags:
///   -v / -vv             Increase verbosity (logs on stderr)
///   -q / --quiet         Errors only
///   --project-root DIR   Working directory for spawned tools (default ".")
///   --tools FILE         Load the registry from a YAML file
///   --host / --port      Accepted for interface compatibility; unused, no
///                        listener is started
///
/// All results are pretty JSON on stdout. Dispatcher failures (unknown tool,
/// missing file, failed spawn) are JSON error objects with exit status 0;
/// only a missing required flag exits non-zero (1).
///
/// Examples:
///   devrunner servers
///   devrunner execute --server python --code 'print(1)' --language python
///   devrunner analyze --file src/app.ts
///   devrunner chat --message 'refactor this' --conversation review-1
#[derive(Parser, Debug)]
#[command(
    name = "devrunner",
    version,
    about = "Dispatch execute/analyze/format/chat commands to configured developer tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Host to bind (accepted for compatibility; no listener is started)
    #[arg(long, global = true, default_value = "localhost")]
    host: String,

    /// Port to bind (accepted for compatibility; no listener is started)
    #[arg(long, global = true, default_value_t = 8080)]
    port: u16,

    /// Working directory for spawned tools
    #[arg(long = "project-root", global = true, value_name = "DIR", default_value = ".")]
    project_root: PathBuf,

    /// Load the tool registry from a YAML file instead of the built-in list
    #[arg(long = "tools", global = true, value_name = "FILE")]
    tools: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered tools
    Servers(ServersArgs),

    /// Execute inline code on a named tool
    Execute(ExecArgs),

    /// Analyze a source file with the analyzer tool
    Analyze(AnalyzeArgs),

    /// Reformat a source file in place with the formatter tool
    Format(FormatArgs),

    /// Send a message to the assistant tool
    Chat(ChatArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let registry = match &cli.tools {
        Some(path) => match Registry::from_yaml_file(path) {
            Ok(reg) => {
                crate::log_debug!("loaded {} tool(s) from {}", reg.all().len(), path.display());
                reg
            }
            Err(e) => {
                eprintln!("Invalid tools file '{}': {e:#}", path.display());
                std::process::exit(2);
            }
        },
        None => Registry::builtin(),
    };

    let dispatcher = Dispatcher::new(registry, &cli.project_root);

    match cli.command {
        Commands::Servers(args) => cmd::execute_servers(&dispatcher, args),
        Commands::Execute(args) => cmd::execute_exec(&dispatcher, args),
        Commands::Analyze(args) => cmd::execute_analyze(&dispatcher, args),
        Commands::Format(args) => cmd::execute_format(&dispatcher, args),
        Commands::Chat(args) => cmd::execute_chat(&dispatcher, args),
    }
}
