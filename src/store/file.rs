//! Flat-file credential record.
//!
//! The record is two CR LF terminated text lines, network id first:
//!
//! ```text
//! home-network\r\n
//! hunter2\r\n
//! ```
//!
//! Lines terminated by a bare CR are accepted on read. Values containing CR
//! or LF cannot be represented and are rejected at save time. An empty
//! network id reads as "no record".

use super::{Credential, CredentialStore, StoreError};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Credential store over one file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store over the given file path. Nothing is read or written
    /// until `load`/`save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn decode(data: &str) -> Result<Option<Credential>, StoreError> {
        if data.is_empty() {
            return Ok(None);
        }
        let (network_id, rest) =
            split_line(data).ok_or(StoreError::Corrupt("network id line not terminated"))?;
        let (secret, _) =
            split_line(rest).ok_or(StoreError::Corrupt("secret line not terminated"))?;
        if network_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(Credential::new(network_id, secret)))
    }
}

/// Split one CR-terminated line (optional LF) off the front of `data`.
fn split_line(data: &str) -> Option<(&str, &str)> {
    let (line, rest) = data.split_once('\r')?;
    Some((line, rest.strip_prefix('\n').unwrap_or(rest)))
}

fn check_value(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.contains('\r') || value.contains('\n') {
        return Err(StoreError::InvalidValue {
            field,
            reason: "contains a line break",
        });
    }
    Ok(())
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No credential file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Self::decode(&data)
    }

    fn save(&mut self, credential: &Credential) -> Result<(), StoreError> {
        check_value("network id", &credential.network_id)?;
        check_value("secret", &credential.secret)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // One write replaces the whole record
        let record = format!("{}\r\n{}\r\n", credential.network_id, credential.secret);
        fs::write(&self.path, record)?;

        info!("Credentials saved to {:?}", self.path);
        Ok(())
    }
}
