/*!
`format.rs`

Implements the `format` subcommand: run the formatter-role tool over a file
and rewrite the file with the formatter's stdout when it exits successfully.
The only command with a persistent side effect; a non-zero formatter exit
leaves the file byte-identical.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{block_on, missing_arg, print_outcome};
use crate::dispatcher::Dispatcher;

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// File to reformat in place (relative paths resolve against --project-root)
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,
}

pub fn execute_format(dispatcher: &Dispatcher, args: FormatArgs) -> Result<()> {
    let Some(file) = args.file else {
        missing_arg("--file", "format")
    };

    let outcome = block_on(dispatcher.format_file(&file))?;
    print_outcome(outcome)
}
