//! Radio control surface.
//!
//! The mode controller drives the WiFi radio through the [`Radio`] trait so
//! the state machine can be exercised on the host. [`EspRadio`] implements
//! it over the ESP-IDF driver; [`HostRadio`] is the development stand-in.

#[cfg(feature = "esp32")]
pub mod esp;
pub mod host;

#[cfg(feature = "esp32")]
pub use esp::EspRadio;
pub use host::HostRadio;

use crate::store::Credential;

/// Prefix of the configuration access point's network name; a MAC-derived
/// suffix is appended so nearby devices stay distinguishable.
pub const AP_SSID_PREFIX: &str = "PORTAL";

/// Build the device-unique access point SSID from the station MAC.
pub fn ap_ssid_for_mac(mac: &[u8; 6]) -> String {
    format!(
        "{}-{:02X}{:02X}{:02X}",
        AP_SSID_PREFIX, mac[3], mac[4], mac[5]
    )
}

/// WiFi radio operations the mode controller needs.
pub trait Radio {
    /// Bring up the open configuration access point under the given SSID,
    /// dropping any station association first.
    fn start_access_point(&mut self, ssid: &str) -> Result<(), RadioError>;

    /// Tear the access point down, readying the radio for station use.
    fn stop_access_point(&mut self) -> Result<(), RadioError>;

    /// One blocking association attempt against the given credential.
    fn connect_station(&mut self, credential: &Credential) -> Result<(), RadioError>;

    /// True while the station association is up.
    fn is_connected(&self) -> bool;
}

/// Errors that can occur during radio operations.
#[derive(Debug)]
pub enum RadioError {
    /// SSID could not be encoded for the driver.
    InvalidSsid,
    /// Secret could not be encoded for the driver.
    InvalidSecret,
    /// The driver reported a failure.
    Failed(&'static str),
    /// Association attempt failed.
    #[cfg(feature = "esp32")]
    ConnectFailed(esp_idf_sys::EspError),
    /// Failed to obtain an IP address via DHCP.
    #[cfg(feature = "esp32")]
    DhcpFailed(esp_idf_sys::EspError),
    /// ESP-IDF error.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

impl std::fmt::Display for RadioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "invalid SSID"),
            Self::InvalidSecret => write!(f, "invalid secret"),
            Self::Failed(msg) => write!(f, "radio failure: {}", msg),
            #[cfg(feature = "esp32")]
            Self::ConnectFailed(e) => write!(f, "connection failed: {:?}", e),
            #[cfg(feature = "esp32")]
            Self::DhcpFailed(e) => write!(f, "DHCP failed: {:?}", e),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "ESP error: {:?}", e),
        }
    }
}

impl std::error::Error for RadioError {}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for RadioError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Esp(e)
    }
}
