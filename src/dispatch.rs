//! Command dispatcher: turns one inbound line into a parsed verb +
//! arguments. Ported from `examples/original_source/server.py`'s
//! `_handle_request` (`match request.split()`) and the `argparse` flag
//! parsing used for SEND's `-d`/`-r`.

/// A recognized, parsed client command. Unknown verbs and empty lines
/// parse to `None` and are silently ignored by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Introduce(String),
    Rename(String),
    Users,
    Send {
        message: String,
        recipient: Option<String>,
        delay: u64,
    },
    Cancel,
    History,
    Report(String),
}

/// Tokenizes `line` by whitespace; `verb` is case-insensitive.
pub fn parse_line(line: &str) -> Option<ParsedCommand> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next()?;
    let tail: Vec<&str> = tokens.collect();

    let command = match verb.to_ascii_uppercase().as_str() {
        "INTRODUCE" => ParsedCommand::Introduce(tail.join(" ")),
        "RENAME" => ParsedCommand::Rename(tail.join(" ")),
        "USERS" => ParsedCommand::Users,
        "SEND" => parse_send(&tail),
        "CANCEL" => ParsedCommand::Cancel,
        "HISTORY" => ParsedCommand::History,
        "REPORT" => ParsedCommand::Report(tail.join(" ")),
        _ => return None,
    };
    Some(command)
}

/// Scans SEND's argument tail for `-d`/`--delay N` and
/// `-r`/`--recipient NAME`; everything else (including a recognized flag
/// missing its value) is folded back into the message body in its
/// original order, matching `parser.parse_known_args`'s "leftover
/// tokens" behavior in the original source.
fn parse_send(tail: &[&str]) -> ParsedCommand {
    let mut delay: u64 = 0;
    let mut recipient: Option<String> = None;
    let mut words: Vec<&str> = Vec::with_capacity(tail.len());

    let mut i = 0;
    while i < tail.len() {
        match tail[i] {
            "-d" | "--delay" if tail.get(i + 1).and_then(|v| v.parse::<u64>().ok()).is_some() => {
                delay = tail[i + 1].parse().unwrap();
                i += 2;
            }
            "-r" | "--recipient" if tail.get(i + 1).is_some() => {
                recipient = Some(tail[i + 1].to_string());
                i += 2;
            }
            other => {
                words.push(other);
                i += 1;
            }
        }
    }

    ParsedCommand::Send {
        message: words.join(" "),
        recipient,
        delay,
    }
}
