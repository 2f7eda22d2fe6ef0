//! Prefix command parsing and the informational commands.
//!
//! A command is `<prefix><name> <args>`, where the prefix is one of the
//! configured text prefixes or a mention of the bot (`<@id> ` / `<@!id> `).
//! Mentions are checked first, then the text prefixes in configured order.

use serenity::model::permissions::Permissions;

use evalbot_core::config::EvalbotConfig;
use evalbot_core::VERSION;

const PYTHON_RESOURCES: &str = "\
https://www.python.org/
Official Tutorial:
<https://docs.python.org/3/tutorial/>
Built-ins:
<https://docs.python.org/3/library/functions.html>
<https://docs.python.org/3/library/stdtypes.html>
<https://docs.python.org/3/library/exceptions.html>
<https://docs.python.org/3/library/index.html>

https://www.pythondiscord.com/resources/
";

const EVAL_HELP: &str = "\
Run Python code and get the results.
This command supports multiple lines of code, including code wrapped inside a formatted code \
block. Code can be re-evaluated by editing the original message within a short window and \
clicking the reaction that subsequently appears.
A `.py` file attached to the command message is run as-is when no code is given.";

/// Permissions requested by the invite link.
pub fn invite_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::ADD_REACTIONS
        | Permissions::ATTACH_FILES
        | Permissions::MANAGE_MESSAGES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Eval,
    Help,
    Github,
    Bugs,
    Version,
    Prefix,
    Invite,
    Resources,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Eval,
        Command::Help,
        Command::Github,
        Command::Bugs,
        Command::Version,
        Command::Prefix,
        Command::Invite,
        Command::Resources,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Eval => "eval",
            Command::Help => "help",
            Command::Github => "github",
            Command::Bugs => "bugs",
            Command::Version => "version",
            Command::Prefix => "prefix",
            Command::Invite => "invite",
            Command::Resources => "resources",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Command::Eval => &["e", "exec"],
            Command::Help => &[],
            Command::Github => &["github-link", "git", "source"],
            Command::Bugs => &["bug", "report-bug", "report-bugs", "bug-report"],
            Command::Version => &["V"],
            Command::Prefix => &["prefixes", "bot-prefix", "bot-prefixes"],
            Command::Invite => &["bot-invite", "invite-bot"],
            Command::Resources => &["python-resources", "pr", "r"],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Eval => "Run Python code and get the results.",
            Command::Help => "Show this message.",
            Command::Github => "Send the GitHub link for this bot's source code.",
            Command::Bugs => "Send info on reporting bugs.",
            Command::Version => "Send the current version number for this bot.",
            Command::Prefix => "Send the command prefixes for this bot.",
            Command::Invite => "Send a Discord bot invite for this bot.",
            Command::Resources => "Send some links to Python tutorials, documentation etc.",
        }
    }

    /// Look a command up by its name or one of its aliases. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name || c.aliases().contains(&name))
    }
}

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub command: Command,
    /// Everything after the command name, trimmed.
    pub args: &'a str,
}

/// Every prefix that introduces a command, in matching order.
pub fn prefixes(config: &EvalbotConfig, bot_id: Option<u64>) -> Vec<String> {
    let mut out = Vec::new();
    if config.discord.mention_prefix {
        if let Some(id) = bot_id {
            out.push(format!("<@{id}> "));
            out.push(format!("<@!{id}> "));
        }
    }
    out.extend(config.discord.command_prefixes.iter().cloned());
    out
}

/// The prefix shown in help text: the first one that is not a mention.
pub fn display_prefix(prefixes: &[String]) -> &str {
    prefixes
        .iter()
        .map(String::as_str)
        .find(|p| !p.starts_with("<@"))
        .unwrap_or("")
}

/// Parse `content` as a command. Returns `None` when no prefix matches or the
/// word right after it is not a known command.
pub fn parse<'a>(content: &'a str, prefixes: &[String]) -> Option<Invocation<'a>> {
    let rest = prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .find_map(|p| content.strip_prefix(p.as_str()))?;
    let (word, args) = match rest.find(char::is_whitespace) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let command = Command::from_name(word)?;
    Some(Invocation {
        command,
        args: args.trim(),
    })
}

/// The code to re-run after an edit.
///
/// An edit that still invokes eval contributes only its argument; any other
/// content is run whole. Empty code ends the re-evaluation chain.
pub fn code_from_edit(content: &str, prefixes: &[String]) -> Option<String> {
    let code = match parse(content, prefixes) {
        Some(Invocation {
            command: Command::Eval,
            args,
        }) => args,
        _ => content,
    };
    (!code.trim().is_empty()).then(|| code.to_string())
}

/// Help for every command, or for the one named in `topic`.
pub fn help_text(topic: &str, display_prefix: &str) -> String {
    if let Some(command) = Command::from_name(topic.trim()) {
        return command_help(command, display_prefix);
    }
    let mut out = String::from("```\nCommands:\n");
    for command in Command::ALL {
        out.push_str(&format!("  {:<10} {}\n", command.name(), command.description()));
    }
    out.push_str(&format!(
        "\nType {display_prefix}help command for more info on a command.\n```"
    ));
    out
}

/// Usage and description for a single command.
pub fn command_help(command: Command, display_prefix: &str) -> String {
    let mut usage = format!("{display_prefix}{}", command.name());
    if !command.aliases().is_empty() {
        usage = format!(
            "{display_prefix}[{}|{}]",
            command.name(),
            command.aliases().join("|")
        );
    }
    if command == Command::Eval {
        usage.push_str(" <code>");
    }
    let body = match command {
        Command::Eval => EVAL_HELP,
        other => other.description(),
    };
    format!("```\n{usage}\n\n{body}\n```")
}

/// Reply text for commands that need no network access.
pub fn static_reply(command: Command, config: &EvalbotConfig, prefixes: &[String]) -> Option<String> {
    let github = config.info.github_url.trim_end_matches('/');
    match command {
        Command::Github => Some(format!("<{github}>")),
        Command::Bugs => {
            let mut msg = String::new();
            if let Some(contact) = &config.info.bug_contact {
                msg.push_str(&format!("Message me on Discord: \n{contact}\n "));
            }
            msg.push_str(&format!("Open an issue on GitHub:\n <{github}/issues/new>"));
            Some(msg)
        }
        Command::Version => Some(VERSION.to_string()),
        Command::Prefix => Some(
            prefixes
                .iter()
                .filter(|p| !p.starts_with("<@!"))
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Command::Resources => Some(PYTHON_RESOURCES.to_string()),
        Command::Eval | Command::Help | Command::Invite => None,
    }
}

/// OAuth2 URL that adds the bot with the permissions it needs.
pub fn invite_url(client_id: u64, guild_id: Option<u64>) -> String {
    let mut url = format!(
        "https://discord.com/oauth2/authorize?client_id={client_id}&scope=bot&permissions={}",
        invite_permissions().bits()
    );
    if let Some(guild) = guild_id {
        url.push_str(&format!("&guild_id={guild}"));
    }
    url
}
