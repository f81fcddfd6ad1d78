//! Hand-written bindings for the parts of the Leaflet SDK this app touches.
//! The SDK is loaded from a CDN `<script>` tag; [`available`] checks whether
//! that load succeeded before any of these imports are used.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use trip_data::model::Coordinate;

#[wasm_bindgen]
extern "C" {
    pub type Map;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    pub fn map(container: &str, options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &Map, center: &JsValue, zoom: f64);

    #[wasm_bindgen(method, js_name = flyTo)]
    pub fn fly_to(this: &Map, center: &JsValue, zoom: f64, options: &JsValue);

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = getBounds)]
    pub fn get_bounds(this: &Map) -> LatLngBounds;

    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &Map, bounds: &LatLngBounds, options: &JsValue);

    #[wasm_bindgen(method, js_name = invalidateSize)]
    pub fn invalidate_size(this: &Map);

    #[wasm_bindgen(method, js_name = closePopup)]
    pub fn close_popup(this: &Map);

    #[wasm_bindgen(method, js_name = removeLayer)]
    pub fn remove_layer(this: &Map, layer: &JsValue);

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, handler: &js_sys::Function);

    pub type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &TileLayer, map: &Map);

    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    pub fn marker(latlng: &JsValue, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Marker, map: &Map);

    #[wasm_bindgen(method, js_name = setLatLng)]
    pub fn set_lat_lng(this: &Marker, latlng: &JsValue);

    #[wasm_bindgen(method, js_name = getLatLng)]
    pub fn get_lat_lng(this: &Marker) -> LatLng;

    #[wasm_bindgen(method)]
    pub fn on(this: &Marker, event: &str, handler: &js_sys::Function);

    pub type DivIcon;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &JsValue) -> DivIcon;

    pub type Popup;

    #[wasm_bindgen(js_namespace = L, js_name = popup)]
    pub fn popup(options: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setLatLng)]
    pub fn set_lat_lng(this: &Popup, latlng: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setContent)]
    pub fn set_content(this: &Popup, html: &str) -> Popup;

    #[wasm_bindgen(method, js_name = openOn)]
    pub fn open_on(this: &Popup, map: &Map);

    pub type Polyline;

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    pub fn polyline(latlngs: &JsValue, options: &JsValue) -> Polyline;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Polyline, map: &Map);

    pub type Circle;

    #[wasm_bindgen(js_namespace = L, js_name = circle)]
    pub fn circle(latlng: &JsValue, options: &JsValue) -> Circle;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Circle, map: &Map);

    #[wasm_bindgen(method, js_name = setLatLng)]
    pub fn set_lat_lng(this: &Circle, latlng: &JsValue);

    #[wasm_bindgen(method, js_name = setRadius)]
    pub fn set_radius(this: &Circle, radius: f64);

    pub type Control;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = zoom)]
    pub fn zoom_control(options: &JsValue) -> Control;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Control, map: &Map);

    pub type LatLng;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &LatLng) -> f64;

    pub type LatLngBounds;

    #[wasm_bindgen(js_namespace = L, js_name = latLngBounds)]
    pub fn lat_lng_bounds(latlngs: &JsValue) -> LatLngBounds;

    #[wasm_bindgen(method, js_name = getWest)]
    pub fn get_west(this: &LatLngBounds) -> f64;

    #[wasm_bindgen(method, js_name = getSouth)]
    pub fn get_south(this: &LatLngBounds) -> f64;

    #[wasm_bindgen(method, js_name = getEast)]
    pub fn get_east(this: &LatLngBounds) -> f64;

    #[wasm_bindgen(method, js_name = getNorth)]
    pub fn get_north(this: &LatLngBounds) -> f64;
}

// Extern types don't get Clone from wasm-bindgen; these hand over another
// handle to the same underlying widget object.
impl Clone for Map {
    fn clone(&self) -> Map {
        JsValue::clone(self.as_ref()).unchecked_into()
    }
}

impl Clone for Popup {
    fn clone(&self) -> Popup {
        JsValue::clone(self.as_ref()).unchecked_into()
    }
}

/// Whether the SDK script actually loaded; false when the CDN was unreachable
pub fn available() -> bool {
    Reflect::has(&js_sys::global(), &JsValue::from_str("L")).unwrap_or(false)
}

/// Leaflet accepts `[lat, lng]` arrays wherever a LatLng is expected
pub fn lat_lng(coord: Coordinate) -> JsValue {
    Array::of2(&coord.lat.into(), &coord.lng.into()).into()
}

pub fn lat_lngs(coords: impl Iterator<Item = Coordinate>) -> JsValue {
    coords.map(lat_lng).collect::<Array>().into()
}

/// Build a plain options object out of key/value pairs
pub fn options(entries: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value).unwrap();
    }
    object.into()
}

pub fn size(x: f64, y: f64) -> JsValue {
    Array::of2(&x.into(), &y.into()).into()
}

#[cfg(test)]
mod test {
    use super::*;

    fn cloneable<T: Clone>() {}

    // the delayed invalidate-size and popup-after-fly closures each carry
    // their own handle
    #[test]
    fn widget_handles_are_cloneable() {
        cloneable::<Map>();
        cloneable::<Popup>();
    }
}
