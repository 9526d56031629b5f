//! Host-based portal device for development and testing.
//!
//! Runs the full provisioning loop on the host machine (not ESP32). The
//! button is simulated as held from startup through the hold threshold, so
//! the portal opens by itself a few seconds in; submitted credentials land
//! in a file under the system temp directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin host-portal
//! # then browse to http://127.0.0.1:8080/
//! ```

use config_portal_esp32::button::ButtonInput;
use config_portal_esp32::pages::{DiskPages, Pages, INDEX_PAGE};
use config_portal_esp32::radio::HostRadio;
use config_portal_esp32::store::FileStore;
use config_portal_esp32::{Device, LogLeds, PortalConfig, HOLD_THRESHOLD};
use log::{info, warn};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Port for the host portal (80 would need privileges).
const HOST_PORTAL_PORT: u16 = 8080;

/// Button stand-in: reads as held from startup until shortly past the hold
/// threshold, then as released.
struct AutoPressButton {
    release_at: Instant,
}

impl AutoPressButton {
    fn new() -> Self {
        Self {
            release_at: Instant::now() + HOLD_THRESHOLD + Duration::from_secs(1),
        }
    }
}

impl ButtonInput for AutoPressButton {
    fn is_pressed(&mut self) -> bool {
        Instant::now() < self.release_at
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Host portal starting ===");

    let store_path = std::env::temp_dir().join("config-portal-credentials.txt");
    info!("Credentials file: {}", store_path.display());
    let store = FileStore::new(&store_path);

    // Serves the page sources from the working directory so they can be
    // edited without rebuilding
    let pages = DiskPages::new("pages");
    if pages.fetch(INDEX_PAGE).is_none() {
        warn!("No pages/ directory in the working directory; the form will 500");
    }

    let mut device = Device::new(
        "PORTAL-HOST".to_string(),
        SocketAddr::from(([127, 0, 0, 1], HOST_PORTAL_PORT)),
        PortalConfig::default(),
        AutoPressButton::new(),
        HostRadio::new(),
        store,
        pages,
        LogLeds::new(),
    );

    info!(
        "Simulating a {}s button hold; the portal will open at http://127.0.0.1:{}/",
        HOLD_THRESHOLD.as_secs(),
        HOST_PORTAL_PORT
    );

    device.run()
}
