//! Captive configuration portal firmware library.
//!
//! This library contains platform-independent components that can be tested
//! on the host machine without ESP32 hardware. A long button press swaps
//! the WiFi radio from station service to an open access point hosting a
//! two-route HTTP portal; a submitted credential is persisted and the radio
//! rejoins the configured network.

pub mod button;
pub mod controller;
pub mod device;
#[cfg(feature = "esp32")]
pub mod hal;
pub mod indicator;
pub mod pages;
pub mod portal;
pub mod radio;
pub mod session;
pub mod store;

// Re-export commonly used items
pub use button::{ButtonInput, LongPressDetector, HOLD_THRESHOLD};
pub use controller::{ModeController, ModeEvent, RadioMode};
pub use device::{Device, TICK_INTERVAL};
pub use indicator::{LogLeds, StatusLeds};
pub use pages::{DiskPages, EmbeddedPages, Pages};
pub use portal::{PortalConfig, PortalServer, ServeOutcome, PORTAL_PORT};
pub use radio::{ap_ssid_for_mac, Radio, RadioError};
pub use session::{SessionTimer, SESSION_KEEPALIVE};
pub use store::{BlockStore, Credential, CredentialStore, FileStore, MemoryBlock, StoreError};
