/*!
`exec.rs`

Implements the `execute` subcommand: run an inline code snippet on a named
tool from the registry.

JSON success output:
{
  "success": true,
  "output": "...",
  "stderr": "...",
  "exit_code": 0,
  "language": "typescript",
  "tool": "typescript"
}

JSON error output:
{
  "error": "tool nonexistent not found",
  "tool": "nonexistent"
}

Missing --server / --code exits with status 1; dispatcher failures are
reported as JSON with exit status 0.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{block_on, missing_arg, print_outcome};
use crate::dispatcher::Dispatcher;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Tool to run the code on
    #[arg(long = "server", value_name = "NAME")]
    pub server: Option<String>,

    /// Inline code to execute
    #[arg(long, value_name = "CODE")]
    pub code: Option<String>,

    /// Language label echoed back in the result
    #[arg(long, default_value = "typescript")]
    pub language: String,
}

pub fn execute_exec(dispatcher: &Dispatcher, args: ExecArgs) -> Result<()> {
    let Some(server) = args.server else {
        missing_arg("--server", "execute")
    };
    let Some(code) = args.code else {
        missing_arg("--code", "execute")
    };

    let outcome = block_on(dispatcher.run_code(&server, &code, &args.language, None))?;
    print_outcome(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Execute(ExecArgs),
    }

    #[test]
    fn clap_parses_execute_flags() {
        let cli = TestCli::try_parse_from([
            "t", "execute", "--server", "python", "--code", "print(1)",
        ])
        .unwrap();
        let TestSub::Execute(a) = cli.cmd;
        assert_eq!(a.server.as_deref(), Some("python"));
        assert_eq!(a.code.as_deref(), Some("print(1)"));
        assert_eq!(a.language, "typescript");
    }

    #[test]
    fn flags_are_optional_at_parse_time() {
        // Required-flag enforcement happens in execute_exec (exit 1), not in
        // clap, so a bare `execute` must still parse.
        let cli = TestCli::try_parse_from(["t", "execute"]).unwrap();
        let TestSub::Execute(a) = cli.cmd;
        assert!(a.server.is_none());
        assert!(a.code.is_none());
    }
}
