use std::env;
use std::io;
use std::path::{Path, PathBuf};

use color_eyre::{eyre::Context, Result};
use log::debug;

use crate::logging::log_error;

pub const SHEET_VAR: &str = "SHEET_FILE";
pub const TOKEN_VAR: &str = "DROPBOX_ACCESS_TOKEN";
pub const REMOTE_PATH_VAR: &str = "DROPBOX_SHEET_PATH";

const SHEET_FILE_NAME: &str = ".ti-sheet.json";
const DOTENV_FILE_NAME: &str = "config.env";
pub const DEFAULT_REMOTE_PATH: &str = "/.time-sheet.json";

/// Everything one invocation needs to know, built once in `main`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sheet_path: PathBuf,
    pub use_color: bool,
    /// `None` when no Dropbox token is configured.
    pub upload: Option<UploadConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    pub token: String,
    pub remote_path: String,
}

impl Config {
    /// Reads `config.env` next to the executable, then the environment.
    pub fn from_env(use_color: bool) -> Self {
        let program_dir = program_dir();
        if let Some(dir) = &program_dir {
            log_error(
                load_dotenv(&dir.join(DOTENV_FILE_NAME)),
                "Couldn't load config.env",
            );
        }

        Self::from_vars(use_color, program_dir.as_deref(), |key| {
            env::var(key).ok()
        })
    }

    pub(crate) fn from_vars(
        use_color: bool,
        program_dir: Option<&Path>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |key: &str| var(key).filter(|value| !value.is_empty());

        let sheet_path = match non_empty(SHEET_VAR) {
            Some(path) => PathBuf::from(path),
            None => program_dir
                .unwrap_or_else(|| Path::new("."))
                .join(SHEET_FILE_NAME),
        };
        debug!("Using sheet {sheet_path:?}");

        let upload = non_empty(TOKEN_VAR).map(|token| UploadConfig {
            token,
            remote_path: non_empty(REMOTE_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_REMOTE_PATH.to_owned()),
        });
        debug!("Upload configured: {}", upload.is_some());

        Self {
            sheet_path,
            use_color,
            upload,
        }
    }
}

fn program_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

/// Variables already set in the environment take precedence.
fn load_dotenv(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            debug!("No {path:?}, skipping");
            Ok(())
        }
        Err(err) => Err(err).wrap_err(format!("Couldn't parse {path:?}")),
    }
}
