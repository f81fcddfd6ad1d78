//! Data model and pure logic for the trip guide frontend: the embedded trip
//! dataset, clock-time handling and temporal state of itinerary events, and
//! deep-link construction for the external map app.
//!
//! Everything here runs on the host as well as in the browser so the logic
//! can be unit tested without a DOM.

pub mod model;
pub mod navigation;
pub mod time;
