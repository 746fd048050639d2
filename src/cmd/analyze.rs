/*!
`analyze.rs`

Implements the `analyze` subcommand: run the analyzer-role tool over a file.
The analyzer receives the resolved path and the file contents as its final
two positional arguments; its stdout is reported as `analysis` and stderr as
`suggestions`.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{block_on, missing_arg, print_outcome};
use crate::dispatcher::Dispatcher;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// File to analyze (relative paths resolve against --project-root)
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,
}

pub fn execute_analyze(dispatcher: &Dispatcher, args: AnalyzeArgs) -> Result<()> {
    let Some(file) = args.file else {
        missing_arg("--file", "analyze")
    };

    let outcome = block_on(dispatcher.analyze_file(&file))?;
    print_outcome(outcome)
}
