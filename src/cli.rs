use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand, ValueEnum};

pub const BIN_NAME: &str = "ti";

/// timeME - simple time tracker
///
/// Put DROPBOX_ACCESS_TOKEN in config.env next to the program to back the
/// sheet up to Dropbox after every change.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = BIN_NAME,
    version,
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Don't color the output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start working on something
    #[command(visible_alias = "o")]
    On {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        name: String,
        /// When you started: `now` (default) or e.g. `5 minutes ago`
        time: Vec<String>,
    },
    /// Stop the current work, resuming whatever it interrupted
    #[command(visible_alias = "f")]
    Fin {
        /// When you stopped: `now` (default) or e.g. `an hour ago`
        time: Vec<String>,
    },
    /// Show what you are working on and for how long
    #[command(visible_alias = "s")]
    Status,
    /// Tag the current work
    #[command(visible_alias = "t")]
    Tag {
        /// Any characters work, but whitespace is best avoided
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Add a note to the current work
    #[command(visible_alias = "n")]
    Note {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Time spent per task
    #[command(visible_alias = "l")]
    Log { period: Option<Period> },
    /// Put the current work aside to handle something else
    #[command(visible_alias = "i")]
    Interrupt {
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        name: String,
        time: Vec<String>,
    },
    /// Upload the sheet to Dropbox
    #[command(visible_alias = "c")]
    Comm,
    /// Show this help
    #[command(visible_alias = "h")]
    Help,
}

impl Command {
    /// Whether the command changes the sheet.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::On { .. }
                | Command::Fin { .. }
                | Command::Tag { .. }
                | Command::Note { .. }
                | Command::Interrupt { .. }
        )
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once(BIN_NAME).chain(args.iter().copied()))
    }

    #[test]
    fn aliases_and_time_words() {
        let cli = parse(&["o", "writing", "5", "minutes", "ago"]).unwrap();
        assert_eq!(
            cli.command,
            Command::On {
                name: "writing".to_owned(),
                time: vec!["5".to_owned(), "minutes".to_owned(), "ago".to_owned()],
            }
        );
        assert_eq!(parse(&["f"]).unwrap().command, Command::Fin { time: vec![] });
        assert_eq!(parse(&["c"]).unwrap().command, Command::Comm);
        assert_eq!(parse(&["h"]).unwrap().command, Command::Help);
    }

    #[test]
    fn no_color_anywhere() {
        assert!(parse(&["--no-color", "status"]).unwrap().no_color);
        let cli = parse(&["note", "first", "--no-color", "pass"]).unwrap();
        assert!(cli.no_color);
        assert_eq!(
            cli.command,
            Command::Note {
                text: vec!["first".to_owned(), "pass".to_owned()]
            }
        );
    }

    #[test]
    fn log_period_is_optional() {
        assert_eq!(parse(&["log"]).unwrap().command, Command::Log { period: None });
        assert_eq!(
            parse(&["l", "today"]).unwrap().command,
            Command::Log {
                period: Some(Period::Today)
            }
        );
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(parse(&["on"]).is_err());
        assert!(parse(&["on", ""]).is_err());
        assert!(parse(&["tag"]).is_err());
        assert!(parse(&["note"]).is_err());
        assert!(parse(&["interrupt"]).is_err());
    }

    #[test]
    fn unknown_command_is_an_error_not_help() {
        let err = parse(&["bogus"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.use_stderr());
        assert!(!parse(&["--help"]).unwrap_err().use_stderr());
    }

    #[test]
    fn only_writes_mutate() {
        assert!(parse(&["t", "x"]).unwrap().command.mutates());
        assert!(!parse(&["s"]).unwrap().command.mutates());
        assert!(!parse(&["c"]).unwrap().command.mutates());
    }
}
