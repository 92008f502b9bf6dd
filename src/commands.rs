//! Prompt commands. Anything that is not a keyword is taken as dropped file paths,
//! which is what a terminal inserts when a file is dragged onto it.

use std::path::{Path, PathBuf};

pub const HELP: &str = "\
commands:
  <path>            submit an image (drag it onto the terminal)
  pick              choose an image with the file dialog
  intensity <0..1>  set the heatmap overlay opacity (alias: opacity)
  show              print the current page again
  save <path>       write the blended overlay as an image
  help              show this text
  quit              exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Drop(Vec<PathBuf>),
    Pick,
    Intensity(f64),
    Show,
    Save(PathBuf),
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("\"{0}\" is not a number")]
    InvalidNumber(String),

    #[error("unterminated quote in \"{0}\"")]
    UnterminatedQuote(String),

    #[error("unknown command \"{0}\", type help for the list")]
    UnknownCommand(String),
}

/// Parses one prompt line. Blank lines give `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let command = match keyword {
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "show" => Command::Show,
        "pick" | "browse" => Command::Pick,
        "intensity" | "opacity" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("intensity"));
            }
            let value = rest.parse().map_err(|_| CommandError::InvalidNumber(rest.to_string()))?;
            Command::Intensity(value)
        }
        "save" => {
            let mut paths = split_paths(rest)?;
            if paths.is_empty() {
                return Err(CommandError::MissingArgument("save"));
            }
            Command::Save(paths.swap_remove(0))
        }
        _ => {
            let paths = split_paths(line)?;
            if let Some(first) = paths.first().filter(|p| looks_like_keyword(p)) {
                return Err(CommandError::UnknownCommand(first.display().to_string()));
            }
            Command::Drop(paths)
        }
    };

    Ok(Some(command))
}

/// A bare word with no directory or extension that names no file, most likely a
/// mistyped command.
fn looks_like_keyword(path: &Path) -> bool {
    path.components().count() == 1 && path.extension().is_none() && !path.exists()
}

/// Splits shell-style paths: whitespace separated, with single or double quotes and
/// backslash escapes.
pub fn split_paths(input: &str) -> Result<Vec<PathBuf>, CommandError> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandError::UnterminatedQuote(input.to_string()));
    }
    if in_token {
        paths.push(PathBuf::from(current));
    }
    Ok(paths)
}
