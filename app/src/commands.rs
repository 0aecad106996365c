//! Line commands understood by the terminal front end

use thiserror::Error;

pub const HELP: &str = "\
Commands:
  countries [query]   list country codes, optionally filtered
  country <code>      select a country by dial code (+44) or ISO code (GB)
  phone <number>      start verifying a phone number
  code <code>         submit the verification code
  resend              request a new code
  cancel              abandon the current verification
  link <url>          open a verification deep link
  status              show the current session
  help                show this help
  quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Countries { query: String },
    Country { code: String },
    Phone { number: String },
    Code { code: String },
    Resend,
    Cancel,
    Link { url: String },
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// `phone` and `code` accept an empty argument so the session can report
/// the missing value itself.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "countries" => Command::Countries {
            query: rest.to_string(),
        },
        "country" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("country <dial code | ISO code>"));
            }
            Command::Country {
                code: rest.to_string(),
            }
        }
        "phone" => Command::Phone {
            number: rest.to_string(),
        },
        "code" => Command::Code {
            code: rest.to_string(),
        },
        "resend" => Command::Resend,
        "cancel" => Command::Cancel,
        "link" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("link <url>"));
            }
            Command::Link {
                url: rest.to_string(),
            }
        }
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            parse("phone (012) 345-6789").unwrap(),
            Some(Command::Phone {
                number: "(012) 345-6789".to_string()
            })
        );
        assert_eq!(
            parse("  CODE 123456 ").unwrap(),
            Some(Command::Code {
                code: "123456".to_string()
            })
        );
        assert_eq!(
            parse("link telesign://verify?123456").unwrap(),
            Some(Command::Link {
                url: "telesign://verify?123456".to_string()
            })
        );
        assert_eq!(
            parse("countries united").unwrap(),
            Some(Command::Countries {
                query: "united".to_string()
            })
        );
    }

    #[test]
    fn test_parse_allows_empty_phone_and_code() {
        assert_eq!(
            parse("phone").unwrap(),
            Some(Command::Phone {
                number: String::new()
            })
        );
        assert_eq!(parse("code").unwrap(), Some(Command::Code { code: String::new() }));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("link"), Err(CommandError::Usage("link <url>")));
        assert!(matches!(parse("country"), Err(CommandError::Usage(_))));
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".to_string())));
        assert_eq!(parse("exit").unwrap(), Some(Command::Quit));
    }
}
