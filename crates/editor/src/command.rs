//! Console command grammar.
//!
//! One command per line: a keyword followed by an optional argument that
//! runs to the end of the line.

use newsdesk_core::article::{ArticleEdit, Language};

pub const HELP: &str = "\
Commands:
  title <text>          two-line <text>       four-line <text>
  swipe <text>          content <text>        categories <a, b, ...>
  tag+ <tag>            tag- <tag>            headline on|off
  publish on|off        language en|hi        image <url>
  source <url>          status                save
  unlock                cancel                leave [!]
  help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(ArticleEdit),
    Status,
    Save,
    Unlock,
    Cancel,
    /// `leave!` skips the unsaved-changes confirmation.
    Leave { confirmed: bool },
    Help,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command `{0}`. Type `help` for a list.")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("`{command}` expects {expected}, got `{got}`")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
        got: String,
    },
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        let command = match keyword.to_ascii_lowercase().as_str() {
            "status" => Command::Status,
            "save" => Command::Save,
            "unlock" => Command::Unlock,
            "cancel" => Command::Cancel,
            "help" | "?" => Command::Help,
            "leave!" => Command::Leave { confirmed: true },
            "leave" => Command::Leave {
                confirmed: rest == "!",
            },
            "title" => Command::Edit(ArticleEdit::Title(text("title", rest)?)),
            "two-line" => Command::Edit(ArticleEdit::TwoLineSummary(text("two-line", rest)?)),
            "four-line" => Command::Edit(ArticleEdit::FourLineSummary(text("four-line", rest)?)),
            "swipe" => Command::Edit(ArticleEdit::SwipeSummary(text("swipe", rest)?)),
            "content" => Command::Edit(ArticleEdit::FullDescription(text("content", rest)?)),
            "categories" => Command::Edit(ArticleEdit::Categories(rest.to_string())),
            "tag+" => Command::Edit(ArticleEdit::AddTag(text("tag+", rest)?)),
            "tag-" => Command::Edit(ArticleEdit::RemoveTag(text("tag-", rest)?)),
            "headline" => Command::Edit(ArticleEdit::Headline(switch("headline", rest)?)),
            "publish" => Command::Edit(ArticleEdit::Published(switch("publish", rest)?)),
            "language" => Command::Edit(ArticleEdit::Language(language(rest)?)),
            "image" => Command::Edit(ArticleEdit::ImageUrl(rest.to_string())),
            "source" => Command::Edit(ArticleEdit::SourceUrl(rest.to_string())),
            _ => return Err(CommandError::Unknown(keyword.to_string())),
        };
        Ok(command)
    }
}

fn text(command: &'static str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument(command));
    }
    Ok(rest.to_string())
}

fn switch(command: &'static str, rest: &str) -> Result<bool, CommandError> {
    match rest.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(CommandError::BadArgument {
            command,
            expected: "on or off",
            got: rest.to_string(),
        }),
    }
}

fn language(rest: &str) -> Result<Language, CommandError> {
    Language::from_wire(rest).map_err(|_| CommandError::BadArgument {
        command: "language",
        expected: "en or hi",
        got: rest.to_string(),
    })
}
