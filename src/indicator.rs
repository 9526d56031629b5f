//! Mode indicator lamps.
//!
//! Two lamps surface the device's network face: one lit while the
//! configuration access point is accepting clients, one lit while the
//! station association is up. [`LogLeds`] stands in on the host, where the
//! lamp changes show up as log lines instead of pin writes.

use log::info;

/// The status lamp pair driven by the mode controller.
pub trait StatusLeds {
    /// Lamp lit while the configuration access point is up.
    fn set_ap_active(&mut self, on: bool);

    /// Lamp lit while the station association is up.
    fn set_sta_connected(&mut self, on: bool);
}

/// Host stand-in that logs lamp changes.
#[derive(Debug, Default)]
pub struct LogLeds {
    ap: bool,
    sta: bool,
}

impl LogLeds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusLeds for LogLeds {
    fn set_ap_active(&mut self, on: bool) {
        if self.ap != on {
            info!("AP lamp {}", if on { "on" } else { "off" });
            self.ap = on;
        }
    }

    fn set_sta_connected(&mut self, on: bool) {
        if self.sta != on {
            info!("STA lamp {}", if on { "on" } else { "off" });
            self.sta = on;
        }
    }
}
