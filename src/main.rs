//! Captive configuration portal firmware binary.
//!
//! Runs the provisioning loop on ESP32 hardware:
//! `cargo espflash flash --features esp32 --release`
//!
//! For development on the host use the `host-portal` binary instead.

#[cfg(feature = "esp32")]
fn main() {
    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();

    // Initialize ESP-IDF logger for log crate integration
    esp_idf_svc::log::EspLogger::initialize_default();

    if let Err(e) = run() {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(feature = "esp32")]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use config_portal_esp32::hal::{GpioButton, GpioLeds};
    use config_portal_esp32::pages::EmbeddedPages;
    use config_portal_esp32::radio::EspRadio;
    use config_portal_esp32::store::nvs::NvsBlock;
    use config_portal_esp32::{BlockStore, Device, PortalConfig, PORTAL_PORT};
    use esp_idf_hal::gpio::IOPin;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use std::net::SocketAddr;

    log::info!("=== Config portal starting ===");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let button = GpioButton::new(peripherals.pins.gpio0.downgrade())?;
    let leds = GpioLeds::new(
        peripherals.pins.gpio4.downgrade(),
        peripherals.pins.gpio5.downgrade(),
    )?;

    // The store claims the default NVS partition before the WiFi driver
    // initializes flash
    let store = BlockStore::new(NvsBlock::new()?);

    let radio = EspRadio::new(peripherals.modem, sysloop)?;
    let ap_ssid = radio.ap_ssid()?;
    log::info!("Portal SSID: {}", ap_ssid);

    let mut device = Device::new(
        ap_ssid,
        SocketAddr::from(([0, 0, 0, 0], PORTAL_PORT)),
        PortalConfig::default(),
        button,
        radio,
        store,
        EmbeddedPages,
        leds,
    );

    device.run()
}

#[cfg(not(feature = "esp32"))]
fn main() {
    println!("This binary requires the 'esp32' feature.");
    println!("Use 'cargo run --bin host-portal' for host development.");
}
