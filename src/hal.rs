//! GPIO bindings for the button and the status lamps.

use crate::button::ButtonInput;
use crate::indicator::StatusLeds;
use esp_idf_hal::gpio::{AnyIOPin, Input, Output, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_sys::EspError;
use log::warn;

/// Push button on a GPIO input, active low against the internal pull-up.
pub struct GpioButton<'d> {
    pin: PinDriver<'d, AnyIOPin, Input>,
}

impl<'d> GpioButton<'d> {
    pub fn new(pin: impl Peripheral<P = AnyIOPin> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Up)?;
        Ok(Self { pin })
    }
}

impl ButtonInput for GpioButton<'_> {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low()
    }
}

/// Status lamps on two GPIO outputs.
pub struct GpioLeds<'d> {
    ap: PinDriver<'d, AnyIOPin, Output>,
    sta: PinDriver<'d, AnyIOPin, Output>,
}

impl<'d> GpioLeds<'d> {
    pub fn new(
        ap: impl Peripheral<P = AnyIOPin> + 'd,
        sta: impl Peripheral<P = AnyIOPin> + 'd,
    ) -> Result<Self, EspError> {
        Ok(Self {
            ap: PinDriver::output(ap)?,
            sta: PinDriver::output(sta)?,
        })
    }
}

impl StatusLeds for GpioLeds<'_> {
    fn set_ap_active(&mut self, on: bool) {
        if let Err(e) = set_lamp(&mut self.ap, on) {
            warn!("Could not drive the AP lamp: {}", e);
        }
    }

    fn set_sta_connected(&mut self, on: bool) {
        if let Err(e) = set_lamp(&mut self.sta, on) {
            warn!("Could not drive the STA lamp: {}", e);
        }
    }
}

fn set_lamp(pin: &mut PinDriver<'_, AnyIOPin, Output>, on: bool) -> Result<(), EspError> {
    if on {
        pin.set_high()
    } else {
        pin.set_low()
    }
}
