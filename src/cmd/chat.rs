/*!
`chat.rs`

Implements the `chat` subcommand: send a message to the assistant-role tool.

Context resolution: --context wins; otherwise the last response remembered
for --conversation; otherwise a process-wide default. The reply is printed
as JSON (the shipped Python version silently discarded it).
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{block_on, missing_arg, print_outcome};
use crate::dispatcher::Dispatcher;

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Message for the assistant
    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Explicit context text (overrides conversation memory)
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Conversation identifier correlating chat turns for context reuse
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,
}

pub fn execute_chat(dispatcher: &Dispatcher, args: ChatArgs) -> Result<()> {
    let Some(message) = args.message else {
        missing_arg("--message", "chat")
    };

    let outcome = block_on(dispatcher.chat(
        &message,
        args.context.as_deref(),
        args.conversation.as_deref(),
    ))?;
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
        Chat(ChatArgs),
    }

    #[test]
    fn clap_parses_chat_flags() {
        let cli = TestCli::try_parse_from([
            "t", "chat", "--message", "hi", "--conversation", "c1",
        ])
        .unwrap();
        let TestSub::Chat(a) = cli.cmd;
        assert_eq!(a.message.as_deref(), Some("hi"));
        assert!(a.context.is_none());
        assert_eq!(a.conversation.as_deref(), Some("c1"));
    }
}
