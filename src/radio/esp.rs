//! ESP-IDF radio driver.
//!
//! Wraps the blocking ESP-IDF WiFi driver behind the [`Radio`] trait. The
//! same driver serves both faces: an open soft-AP while the portal is up,
//! a WPA2 station association otherwise.

use super::{ap_ssid_for_mac, Radio, RadioError};
use crate::store::Credential;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};
use esp_idf_sys::EspError;
use log::info;

/// WiFi driver wrapper.
pub struct EspRadio<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> EspRadio<'a> {
    /// Create the radio over the modem peripheral.
    pub fn new(modem: Modem, sysloop: EspSystemEventLoop) -> Result<Self, EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        Ok(Self { wifi })
    }

    /// Device-unique portal SSID derived from the station MAC.
    pub fn ap_ssid(&self) -> Result<String, RadioError> {
        let mac = self.wifi.wifi().sta_netif().get_mac()?;
        Ok(ap_ssid_for_mac(&mac))
    }

    /// Current station IP address, if associated.
    pub fn ip(&self) -> Option<String> {
        if !self.is_connected() {
            return None;
        }
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| format!("{}", info.ip))
    }
}

impl Radio for EspRadio<'_> {
    fn start_access_point(&mut self, ssid: &str) -> Result<(), RadioError> {
        info!("Starting access point: {}", ssid);

        if self.is_connected() {
            self.wifi.disconnect()?;
        }

        // Open network: the portal is a local, short-lived setup surface
        let config = Configuration::AccessPoint(AccessPointConfiguration {
            ssid: ssid.try_into().map_err(|_| RadioError::InvalidSsid)?,
            auth_method: AuthMethod::None,
            max_connections: 4,
            ..Default::default()
        });

        self.wifi.set_configuration(&config)?;
        self.wifi.start()?;

        let ip_info = self.wifi.wifi().ap_netif().get_ip_info()?;
        info!("Access point up, gateway: {}", ip_info.ip);
        Ok(())
    }

    fn stop_access_point(&mut self) -> Result<(), RadioError> {
        info!("Stopping access point");
        self.wifi.stop()?;
        Ok(())
    }

    fn connect_station(&mut self, credential: &Credential) -> Result<(), RadioError> {
        info!("Connecting to WiFi: {}", credential.network_id);

        let auth_method = if credential.secret.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let config = Configuration::Client(ClientConfiguration {
            ssid: credential
                .network_id
                .as_str()
                .try_into()
                .map_err(|_| RadioError::InvalidSsid)?,
            password: credential
                .secret
                .as_str()
                .try_into()
                .map_err(|_| RadioError::InvalidSecret)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&config)?;

        // Start WiFi
        self.wifi.start()?;

        // Connect (relies on ESP-IDF's internal timeout mechanisms)
        self.wifi.connect().map_err(RadioError::ConnectFailed)?;

        // Wait for DHCP
        self.wifi.wait_netif_up().map_err(RadioError::DhcpFailed)?;

        let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
        info!("Connected to WiFi, IP: {}", ip_info.ip);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}
