//! Parsing of the interactive command line.

use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  add <path>...   stage files (quote paths containing spaces)
  remove <index>  unstage the file at <index>
  clear           unstage every file
  run             submit the staged batch for extraction
  json            show the extracted ESG JSON
  raw             show the raw text preview
  detail          show the full error detail
  status          show the current state again
  help            show this help
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    Remove(usize),
    Clear,
    Run,
    ShowJson,
    ShowRaw,
    ShowDetail,
    Status,
    Help,
    Quit,
}

/// Returns `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let words = split_words(line)?;
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "add" => {
            if args.is_empty() {
                return Err("add: expected at least one path".to_string());
            }
            Command::Add(args.iter().map(PathBuf::from).collect())
        }
        "remove" | "rm" => match args {
            [index] => index
                .parse()
                .map(Command::Remove)
                .map_err(|_| format!("remove: {index:?} is not an index"))?,
            _ => return Err("remove: expected exactly one index".to_string()),
        },
        "clear" => Command::Clear,
        "run" => Command::Run,
        "json" => Command::ShowJson,
        "raw" => Command::ShowRaw,
        "detail" => Command::ShowDetail,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; type `help`")),
    };
    Ok(Some(command))
}

/// Whitespace-separated words; double quotes group words containing spaces.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
