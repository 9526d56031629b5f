//! Portal page assets.
//!
//! The portal serves two HTML documents: the credential form and the save
//! confirmation. [`EmbeddedPages`] compiles them into the firmware image;
//! [`DiskPages`] reads them from a directory on every fetch, which is what
//! the host binary uses so the pages can be edited live.

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Name of the credential form document.
pub const INDEX_PAGE: &str = "index.html";

/// Name of the save confirmation document.
pub const SAVE_PAGE: &str = "save.html";

/// Source of the portal's page bodies.
pub trait Pages {
    /// Fetch a page body by name, or `None` when the asset is unavailable.
    fn fetch(&self, name: &str) -> Option<String>;
}

/// Pages compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedPages;

const INDEX_HTML: &str = include_str!("../pages/index.html");
const SAVE_HTML: &str = include_str!("../pages/save.html");

impl Pages for EmbeddedPages {
    fn fetch(&self, name: &str) -> Option<String> {
        match name {
            INDEX_PAGE => Some(INDEX_HTML.to_string()),
            SAVE_PAGE => Some(SAVE_HTML.to_string()),
            _ => None,
        }
    }
}

/// Pages read from a directory.
#[derive(Debug)]
pub struct DiskPages {
    root: PathBuf,
}

impl DiskPages {
    /// Create a provider rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Pages for DiskPages {
    fn fetch(&self, name: &str) -> Option<String> {
        let path = self.root.join(name);
        match fs::read_to_string(&path) {
            Ok(body) => Some(body),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Page not found: {:?}", path);
                None
            }
            Err(e) => {
                warn!("Failed to read page {:?}: {}", path, e);
                None
            }
        }
    }
}
