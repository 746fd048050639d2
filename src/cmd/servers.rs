/*!
`servers.rs`

Implements the `servers` subcommand: print the tool registry as pretty JSON,
in registration order. No side effects, cannot fail past serialization.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::print_json;
use crate::dispatcher::Dispatcher;

#[derive(Args, Debug)]
pub struct ServersArgs {}

pub fn execute_servers(dispatcher: &Dispatcher, _args: ServersArgs) -> Result<()> {
    print_json(dispatcher.list_tools())
}
