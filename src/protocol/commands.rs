//! Module `commands`
//!
//! Parses one line received on a client connection into a `Command`.
//! Arguments are whitespace separated; paths arrive percent-encoded so they
//! never contain spaces. The `PUT` body is the JSON remainder of the line.

use crate::storage::ObjectRequest;

/// Represents a command parsed from the client input.
#[derive(Debug, PartialEq)]
pub enum Command {
    Browse {
        path: String,
        max_depth: u32,
        published_pages: bool,
    },
    Get(String),
    Put {
        path: String,
        request: ObjectRequest,
    },
    Delete(String),
    Publish(String),
    Unpublish(String),
    Quit,
    Invalid(String), // Known command with malformed arguments
    Unknown(String), // Unknown or unsupported command
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

/// Parses a raw command line into the `Command` enum.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let rest = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "BROWSE" => parse_browse(rest),
        "GET" => single_path(rest, Command::Get),
        "PUT" => parse_put(rest),
        "DELETE" => single_path(rest, Command::Delete),
        "PUBLISH" => single_path(rest, Command::Publish),
        "UNPUBLISH" => single_path(rest, Command::Unpublish),
        "QUIT" | "Q" if rest.is_empty() => Command::Quit,
        "QUIT" | "Q" => Command::Invalid("QUIT takes no arguments".into()),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn single_path(args: &str, build: fn(String) -> Command) -> Command {
    let mut tokens = args.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(path), None) => build(path.to_string()),
        (None, _) => Command::Invalid("missing path".into()),
        (Some(_), Some(extra)) => Command::Invalid(format!("unexpected argument {extra:?}")),
    }
}

fn parse_browse(args: &str) -> Command {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let (path, max_depth, published_pages) = match tokens.as_slice() {
        [] => return Command::Invalid("missing path".into()),
        [path] => (*path, None, None),
        [path, depth] => (*path, Some(*depth), None),
        [path, depth, published] => (*path, Some(*depth), Some(*published)),
        _ => return Command::Invalid("too many arguments for BROWSE".into()),
    };

    let max_depth = match max_depth.map(str::parse::<u32>) {
        None => 0,
        Some(Ok(depth)) => depth,
        Some(Err(_)) => return Command::Invalid("maxdepth must be a non-negative integer".into()),
    };

    let published_pages = match published_pages {
        None => false,
        Some(flag) if flag.eq_ignore_ascii_case("true") => true,
        Some(flag) if flag.eq_ignore_ascii_case("false") => false,
        Some(flag) => {
            return Command::Invalid(format!("publishedpages must be true or false, got {flag:?}"));
        }
    };

    Command::Browse {
        path: path.to_string(),
        max_depth,
        published_pages,
    }
}

fn parse_put(args: &str) -> Command {
    let mut parts = args.splitn(2, char::is_whitespace);
    let path = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("").trim();

    if path.is_empty() {
        return Command::Invalid("missing path".into());
    }
    if body.is_empty() {
        return Command::Invalid("missing object body".into());
    }

    match serde_json::from_str::<ObjectRequest>(body) {
        Ok(request) => Command::Put {
            path: path.to_string(),
            request,
        },
        Err(e) => Command::Invalid(format!("invalid object body: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_commands() {
        assert_eq!(
            parse_command("GET root_file.txt"),
            Command::Get("root_file.txt".to_string())
        );
        assert_eq!(
            parse_command("delete new_dir"),
            Command::Delete("new_dir".to_string())
        );
        assert_eq!(
            parse_command("PUBLISH home"),
            Command::Publish("home".to_string())
        );
        assert_eq!(
            parse_command("UNPUBLISH home.page\r\n"),
            Command::Unpublish("home.page".to_string())
        );
        assert_eq!(parse_command("  QUIT  "), Command::Quit);
    }

    #[test]
    fn test_parse_browse_defaults() {
        assert_eq!(
            parse_command("BROWSE .%2F"),
            Command::Browse {
                path: ".%2F".to_string(),
                max_depth: 0,
                published_pages: false,
            }
        );
        assert_eq!(
            parse_command("BROWSE dir_level_1 1 TRUE"),
            Command::Browse {
                path: "dir_level_1".to_string(),
                max_depth: 1,
                published_pages: true,
            }
        );
    }

    #[test]
    fn test_parse_browse_invalid_arguments() {
        assert!(matches!(parse_command("BROWSE"), Command::Invalid(_)));
        assert!(matches!(parse_command("BROWSE . -1"), Command::Invalid(_)));
        assert!(matches!(parse_command("BROWSE . 1 maybe"), Command::Invalid(_)));
        assert!(matches!(parse_command("BROWSE . 1 true x"), Command::Invalid(_)));
    }

    #[test]
    fn test_parse_put() {
        assert_eq!(
            parse_command(r#"PUT new_file.txt {"type":"F","content":"funky soul"}"#),
            Command::Put {
                path: "new_file.txt".to_string(),
                request: ObjectRequest::file("funky soul"),
            }
        );
        assert_eq!(
            parse_command(r#"PUT new_dir {"type":"D"}"#),
            Command::Put {
                path: "new_dir".to_string(),
                request: ObjectRequest::directory(),
            }
        );
        assert!(matches!(parse_command("PUT new_dir"), Command::Invalid(_)));
        assert!(matches!(
            parse_command(r#"PUT new_dir {"type":"X"}"#),
            Command::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_missing_or_extra_path() {
        assert!(matches!(parse_command("GET"), Command::Invalid(_)));
        assert!(matches!(parse_command("GET a b"), Command::Invalid(_)));
    }

    #[test]
    fn test_unknown_commands() {
        assert_eq!(
            parse_command("FOO bar"),
            Command::Unknown("FOO bar".to_string())
        );
        assert_eq!(parse_command(""), Command::Unknown("".to_string()));
    }
}
