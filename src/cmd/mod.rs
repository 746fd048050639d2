/*!
Command modules for the `devrunner` CLI.

Layout:
  src/cmd/
    mod.rs       (module declarations + re-exports)
    servers.rs   (ServersArgs + execute_servers)
    exec.rs      (ExecArgs    + execute_exec)
    analyze.rs   (AnalyzeArgs + execute_analyze)
    format.rs    (FormatArgs  + execute_format)
    chat.rs      (ChatArgs    + execute_chat)
    shared.rs    (runtime + JSON output helpers)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    taking the shared `Dispatcher` and its args struct, returning
    `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
  - All result output is pretty JSON on stdout; logs go to stderr.
*/

pub mod analyze;
pub mod chat;
pub mod exec;
pub mod format;
pub mod servers;
pub mod shared;

pub use analyze::{AnalyzeArgs, execute_analyze};
pub use chat::{ChatArgs, execute_chat};
pub use exec::{ExecArgs, execute_exec};
pub use format::{FormatArgs, execute_format};
pub use servers::{ServersArgs, execute_servers};
