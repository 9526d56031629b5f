//! Host radio stand-in.
//!
//! On the host there is no radio to drive; this implementation just tracks
//! what the controller asked for and reports association attempts as
//! immediately successful, so the full mode cycle can be watched in the
//! logs.

use super::{Radio, RadioError};
use crate::store::Credential;
use log::info;

/// Development stand-in for the WiFi radio.
#[derive(Debug, Default)]
pub struct HostRadio {
    connected: bool,
    ap_ssid: Option<String>,
}

impl HostRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// SSID of the simulated access point, while one is up.
    pub fn ap_ssid(&self) -> Option<&str> {
        self.ap_ssid.as_deref()
    }
}

impl Radio for HostRadio {
    fn start_access_point(&mut self, ssid: &str) -> Result<(), RadioError> {
        info!("Simulated access point up: {}", ssid);
        self.connected = false;
        self.ap_ssid = Some(ssid.to_string());
        Ok(())
    }

    fn stop_access_point(&mut self) -> Result<(), RadioError> {
        if let Some(ssid) = self.ap_ssid.take() {
            info!("Simulated access point down: {}", ssid);
        }
        Ok(())
    }

    fn connect_station(&mut self, credential: &Credential) -> Result<(), RadioError> {
        info!("Simulated association with: {}", credential.network_id);
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
