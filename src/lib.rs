//! Personal time tracker: what you work on, what interrupted it, and for how
//! long. The whole sheet lives in one JSON file that is loaded, changed and
//! written back once per invocation.

use const_format::concatcp;

mod cli;
mod config;
mod entry;
mod file_io;
mod humanize;
mod logging;
mod paint;
mod run;
mod status;
mod time_parse;
mod upload;
mod work_log;

pub use cli::{Cli, Command};
pub use config::{Config, UploadConfig};
pub use entry::Stamp;
pub use logging::init as init_logging;
pub use paint::Paint;
pub use run::run;
pub use upload::{Backup, Dropbox};


const START_HINT: &str =
    concatcp!("See `", cli::BIN_NAME, " -h` to know how to start working.");

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Work(#[from] work_log::Error),
    #[error(transparent)]
    Time(#[from] time_parse::Error),
    #[error(transparent)]
    Store(#[from] file_io::Error),
    #[error(transparent)]
    Upload(#[from] upload::Error),
    #[error("{0}")]
    UnknownCommand(#[from] clap::Error),
    #[error("Couldn't write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Upload failures get their own code: the local change did happen.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Upload(_) => 2,
            _ => 1,
        }
    }

    /// Message for stderr.
    pub fn report(&self, paint: Paint) -> String {
        match self {
            Error::Work(work_log::Error::AlreadyWorking(name)) => format!(
                "You are already working on {}. Stop it or use a different sheet.",
                paint.yellow(name)
            ),
            Error::Work(work_log::Error::NotWorking) => {
                format!("{self}\n{START_HINT}")
            }
            Error::UnknownCommand(err) => err.to_string().trim_end().to_owned(),
            other => other.to_string(),
        }
    }
}
