//! Mode switching between station service and the configuration portal.
//!
//! The controller owns the long-press detector and the session timer and
//! turns button, radio and store state into mode transitions. It never
//! touches sockets; the device layer opens and closes the portal listener
//! in response to the events returned here.

use crate::button::{ButtonInput, LongPressDetector};
use crate::indicator::StatusLeds;
use crate::radio::Radio;
use crate::session::SessionTimer;
use crate::store::CredentialStore;
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Pause between attempts to rejoin the stored network.
pub const STA_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// How often the retry pause rechecks the button.
pub const RETRY_POLL_SLICE: Duration = Duration::from_millis(100);

/// Which side of the radio is in charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    /// Normal service: joined (or rejoining) the stored network.
    Station,
    /// Configuration session: the device hosts its own network.
    AccessPoint,
}

/// A mode transition the device layer must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "mode changes drive the portal listener lifecycle"]
pub enum ModeEvent {
    /// A long press switched the radio to access point mode.
    ///
    /// `ap_started` is false when the radio refused to bring the network
    /// up; the session still runs so the timeout path stays uniform, but
    /// no portal listener should be opened.
    EnteredAccessPoint { ap_started: bool },
    /// The session ended and the radio is back in station mode.
    ReturnedToStation,
}

/// Drives the station/access-point mode machine.
pub struct ModeController {
    detector: LongPressDetector,
    session: SessionTimer,
    mode: RadioMode,
    ap_ssid: String,
    ap_started: bool,
    retry_interval: Duration,
    retry_slice: Duration,
}

impl ModeController {
    pub fn new(ap_ssid: String) -> Self {
        Self {
            detector: LongPressDetector::new(),
            session: SessionTimer::new(),
            mode: RadioMode::Station,
            ap_ssid,
            ap_started: false,
            retry_interval: STA_RETRY_INTERVAL,
            retry_slice: RETRY_POLL_SLICE,
        }
    }

    /// Controller with shrunk retry timing so failure paths run fast.
    #[cfg(test)]
    pub fn with_retry_timing(ap_ssid: String, interval: Duration, slice: Duration) -> Self {
        let mut controller = Self::new(ap_ssid);
        controller.retry_interval = interval;
        controller.retry_slice = slice;
        controller
    }

    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Collapse the session deadline after a credential submission.
    pub fn shorten_session(&mut self, now: Instant) {
        if let Some(deadline) = self.session.expire_soon(now) {
            debug!(
                "Session ends in {:?}",
                deadline.saturating_duration_since(now)
            );
        }
    }

    /// Advance the mode machine one tick.
    pub fn poll(
        &mut self,
        now: Instant,
        button: &mut dyn ButtonInput,
        radio: &mut dyn Radio,
        store: &mut dyn CredentialStore,
        leds: &mut dyn StatusLeds,
    ) -> Option<ModeEvent> {
        let pressed = button.is_pressed();
        if self.detector.poll(pressed, now) {
            return Some(self.enter_access_point(now, radio, leds));
        }

        match self.mode {
            RadioMode::AccessPoint => {
                if self.session.is_expired(now) {
                    return Some(self.return_to_station(radio, leds));
                }
                None
            }
            RadioMode::Station => {
                self.maintain_station(button, radio, store, leds);
                None
            }
        }
    }

    /// Start (or restart) the configuration session. A repeated long press
    /// while the session runs resets its deadline.
    fn enter_access_point(
        &mut self,
        now: Instant,
        radio: &mut dyn Radio,
        leds: &mut dyn StatusLeds,
    ) -> ModeEvent {
        self.session.extend(now);
        self.mode = RadioMode::AccessPoint;
        leds.set_sta_connected(false);

        match radio.start_access_point(&self.ap_ssid) {
            Ok(()) => {
                info!("Configuration session started");
                self.ap_started = true;
                leds.set_ap_active(true);
            }
            Err(e) => {
                warn!("Could not start the access point: {}", e);
                self.ap_started = false;
                leds.set_ap_active(false);
            }
        }

        ModeEvent::EnteredAccessPoint {
            ap_started: self.ap_started,
        }
    }

    fn return_to_station(
        &mut self,
        radio: &mut dyn Radio,
        leds: &mut dyn StatusLeds,
    ) -> ModeEvent {
        self.session.clear();
        self.mode = RadioMode::Station;
        self.ap_started = false;
        leds.set_ap_active(false);

        if let Err(e) = radio.stop_access_point() {
            warn!("Could not stop the access point: {}", e);
        }

        info!("Configuration session ended");
        ModeEvent::ReturnedToStation
    }

    /// Keep the station side joined to the stored network.
    fn maintain_station(
        &mut self,
        button: &mut dyn ButtonInput,
        radio: &mut dyn Radio,
        store: &mut dyn CredentialStore,
        leds: &mut dyn StatusLeds,
    ) {
        if radio.is_connected() {
            leds.set_sta_connected(true);
            return;
        }
        leds.set_sta_connected(false);

        let credential = match store.load() {
            Ok(Some(credential)) => credential,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not load stored credentials: {}", e);
                return;
            }
        };

        loop {
            if button.is_pressed() {
                info!("Reconnect interrupted by button press");
                return;
            }
            match radio.connect_station(&credential) {
                Ok(()) => {
                    leds.set_sta_connected(true);
                    return;
                }
                Err(e) => warn!("Could not join network: {}", e),
            }
            self.wait_retry_interval(button);
        }
    }

    /// Sleep out the retry pause in slices, bailing early when the button
    /// goes down so the press can reach the detector.
    fn wait_retry_interval(&self, button: &mut dyn ButtonInput) {
        let resume_at = Instant::now() + self.retry_interval;
        while Instant::now() < resume_at {
            if button.is_pressed() {
                return;
            }
            thread::sleep(self.retry_slice);
        }
    }
}
