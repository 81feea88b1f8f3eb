use log::debug;
use serde_json::json;

use crate::config::UploadConfig;

const UPLOAD_URL: &str = "https://content.dropboxapi.com/2/files/upload";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No Dropbox access token, set DROPBOX_ACCESS_TOKEN or put it in config.env")]
    NoToken,
    #[error("Couldn't read the sheet for upload: {0}")]
    Sheet(String),
    #[error("Dropbox upload failed: {0}")]
    Request(#[from] Box<ureq::Error>),
}

/// Somewhere to push a copy of the sheet after it changed.
pub trait Backup {
    fn push(&self, contents: &[u8]) -> Result<(), Error>;
}

pub struct Dropbox {
    config: UploadConfig,
}

impl Dropbox {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }
}

impl Backup for Dropbox {
    fn push(&self, contents: &[u8]) -> Result<(), Error> {
        let UploadConfig { token, remote_path } = &self.config;
        let arg = json!({
            "path": remote_path,
            "mode": "overwrite",
            "mute": true,
        });

        debug!("Uploading {} bytes to {remote_path}", contents.len());
        ureq::post(UPLOAD_URL)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Dropbox-API-Arg", &arg.to_string())
            .set("Content-Type", "application/octet-stream")
            .send_bytes(contents)
            .map_err(Box::new)?;

        Ok(())
    }
}
