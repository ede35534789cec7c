#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Read,
    WikiId,
    WikiSearch,
    Git,
}

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub kind: CommandKind,
}

/// A `/token argument` pair parsed from the latest user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    /// The leading token, slash included.
    pub name: &'a str,
    pub args: &'a str,
}

impl CommandInvocation<'_> {
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| command.name == name)
}

const COMMANDS: &[Command] = &[
    Command {
        name: "/help",
        usage: "/help",
        help: "List the commands handled locally.",
        kind: CommandKind::Help,
    },
    Command {
        name: "/read",
        usage: "/read <path-or-url>",
        help: "Load a local file or a web page into the conversation.",
        kind: CommandKind::Read,
    },
    Command {
        name: "/wiki_id",
        usage: "/wiki_id <page-id-or-title>",
        help: "Load a Wikipedia page as markdown.",
        kind: CommandKind::WikiId,
    },
    Command {
        name: "/wiki_search",
        usage: "/wiki_search <query>",
        help: "Search Wikipedia and list matching page ids.",
        kind: CommandKind::WikiSearch,
    },
    Command {
        name: "/git",
        usage: "/git <path-or-url>",
        help: "Load every text file of a git repository into the conversation.",
        kind: CommandKind::Git,
    },
];
