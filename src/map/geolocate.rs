//! Continuous position watch over the browser geolocation capability.
//! Callbacks re-enter the app as messages; the watch owns its closures and
//! must be kept alive for as long as tracking is on.

use std::fmt;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Geolocation, Position, PositionError, PositionOptions};

use trip_data::model::Coordinate;

/// Error code raised when the user refuses the location permission
pub const PERMISSION_DENIED: u16 = 1;

const MAX_AGE_MS: u32 = 5_000;
const TIMEOUT_MS: u32 = 15_000;

/// One geolocation fix
pub struct Fix {
    pub coord: Coordinate,
    /// accuracy radius in metres
    pub accuracy: f64,
}

/// A running `watchPosition` subscription
pub struct Watch {
    geolocation: Geolocation,
    id: i32,
    _on_fix: Closure<dyn FnMut(Position)>,
    _on_error: Closure<dyn FnMut(PositionError)>,
}

impl Watch {
    pub fn start(
        mut on_fix: impl FnMut(Fix) + 'static,
        mut on_error: impl FnMut(u16, String) + 'static,
    ) -> Result<Watch, GeoError> {
        let geolocation = web_sys::window()
            .ok_or(GeoError::Unavailable)?
            .navigator()
            .geolocation()
            .map_err(|_| GeoError::Unavailable)?;

        let fix_callback = Closure::wrap(Box::new(move |position: Position| {
            let coords = position.coords();
            on_fix(Fix {
                coord: Coordinate::new(coords.latitude(), coords.longitude()),
                accuracy: coords.accuracy(),
            });
        }) as Box<dyn FnMut(Position)>);
        let error_callback = Closure::wrap(Box::new(move |error: PositionError| {
            on_error(error.code(), error.message());
        }) as Box<dyn FnMut(PositionError)>);

        let mut options = PositionOptions::new();
        options
            .enable_high_accuracy(true)
            .maximum_age(MAX_AGE_MS)
            .timeout(TIMEOUT_MS);

        let id = geolocation
            .watch_position_with_error_callback_and_options(
                fix_callback.as_ref().unchecked_ref(),
                Some(error_callback.as_ref().unchecked_ref()),
                &options,
            )
            .map_err(|_| GeoError::Unavailable)?;

        Ok(Watch {
            geolocation,
            id,
            _on_fix: fix_callback,
            _on_error: error_callback,
        })
    }

    /// Cancel the subscription; no further callbacks will fire
    pub fn stop(self) {
        self.geolocation.clear_watch(self.id);
    }
}

#[derive(Debug)]
pub enum GeoError {
    /// Geolocation is not exposed on this device / context
    Unavailable,
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::Unavailable => write!(f, "geolocation is not available on this device"),
        }
    }
}

impl std::error::Error for GeoError {}
