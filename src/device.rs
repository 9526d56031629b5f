//! Top-level device assembly.
//!
//! [`Device`] owns the button, radio, credential store, page assets and
//! status lamps, and runs the tick loop that feeds them all through the
//! mode controller. The portal listener only exists while a configuration
//! session is running; the device opens it on entering access point mode
//! and drops it when the session ends.

use crate::button::ButtonInput;
use crate::controller::{ModeController, ModeEvent};
use crate::indicator::StatusLeds;
use crate::pages::Pages;
use crate::portal::{PortalConfig, PortalServer, ServeOutcome};
use crate::radio::Radio;
use crate::store::CredentialStore;
use log::warn;
use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

/// Pause between ticks of the main loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// The assembled device.
pub struct Device<B, R, S, P, L> {
    controller: ModeController,
    button: B,
    radio: R,
    store: S,
    pages: P,
    leds: L,
    portal_addr: SocketAddr,
    portal_config: PortalConfig,
    portal: Option<PortalServer>,
}

impl<B, R, S, P, L> Device<B, R, S, P, L>
where
    B: ButtonInput,
    R: Radio,
    S: CredentialStore,
    P: Pages,
    L: StatusLeds,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ap_ssid: String,
        portal_addr: SocketAddr,
        portal_config: PortalConfig,
        button: B,
        radio: R,
        store: S,
        pages: P,
        leds: L,
    ) -> Self {
        Self {
            controller: ModeController::new(ap_ssid),
            button,
            radio,
            store,
            pages,
            leds,
            portal_addr,
            portal_config,
            portal: None,
        }
    }

    /// Address the portal listener is bound to, while one is open.
    pub fn portal_addr(&self) -> Option<SocketAddr> {
        self.portal.as_ref().and_then(|p| p.local_addr().ok())
    }

    /// Advance the device one tick: mode machine first, then at most one
    /// portal client.
    pub fn tick(&mut self, now: Instant) {
        let event = self.controller.poll(
            now,
            &mut self.button,
            &mut self.radio,
            &mut self.store,
            &mut self.leds,
        );

        if let Some(event) = event {
            match event {
                ModeEvent::EnteredAccessPoint { ap_started: true } => self.open_portal(),
                ModeEvent::EnteredAccessPoint { ap_started: false } => {
                    // No network to reach a listener over
                    self.portal = None;
                }
                ModeEvent::ReturnedToStation => {
                    if let Some(portal) = self.portal.take() {
                        portal.shutdown();
                    }
                }
            }
        }

        if let Some(portal) = &mut self.portal {
            if let Some(outcome) = portal.poll(&self.pages, &mut self.store) {
                if outcome == ServeOutcome::CredentialsSaved {
                    self.controller.shorten_session(now);
                }
            }
        }
    }

    /// Run the tick loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick(Instant::now());
            thread::sleep(TICK_INTERVAL);
        }
    }

    fn open_portal(&mut self) {
        if self.portal.is_some() {
            return;
        }
        match PortalServer::bind(self.portal_addr, self.portal_config) {
            Ok(portal) => self.portal = Some(portal),
            Err(e) => warn!("Could not open the portal listener: {}", e),
        }
    }
}
