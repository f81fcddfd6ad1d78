//! Owns the Leaflet widget: category markers, the shared popup, route
//! overlays, geolocation tracking and the keyword search annotation. The
//! widget is initialised lazily the first time the map tab becomes visible,
//! because Leaflet cannot size itself inside a hidden container.

use enclose::enclose;
use gloo_timers::callback::Timeout;
use seed::{error, prelude::*};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

pub mod geolocate;
pub mod leaflet;
pub mod search;

use trip_data::model::{Coordinate, Filter, MarkerCategory, Stop, StopId, TripData};
use trip_data::navigation;

/// Mukho / Donghae area
pub const REGION_CENTER: Coordinate = Coordinate {
    lat: 37.54,
    lng: 129.11,
};
pub const REGION_ZOOM: f64 = 13.0;

const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";
const ROUTE_COLORS: [&str; 2] = ["#0ea5e9", "#22c55e"];
const SPOT_ZOOM: f64 = 16.0;
const LOCATION_ZOOM: f64 = 15.0;

pub struct Model {
    state: State,
    filter: Filter,
    tracking: Option<Tracking>,
    /// while on, every fix recentres the map; cancelled by a manual drag
    following: bool,
    last_fix: Option<Coordinate>,
    /// action requested before the widget was ready, replayed after init
    pending: Option<Pending>,
    search: search::Model,
}

impl Default for Model {
    fn default() -> Self {
        Model {
            state: State::Uninitialised,
            filter: Filter::All,
            tracking: None,
            following: false,
            last_fix: None,
            pending: None,
            search: search::Model::default(),
        }
    }
}

impl Model {
    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn last_fix(&self) -> Option<Coordinate> {
        self.last_fix
    }

    pub fn failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn has_search_annotation(&self) -> bool {
        match &self.state {
            State::Ready(ready) => ready.search_annotation.is_some(),
            _ => false,
        }
    }

    fn ready_mut(&mut self) -> Option<&mut Ready> {
        match &mut self.state {
            State::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}

enum State {
    Uninitialised,
    Ready(Box<Ready>),
    /// the SDK script failed to load; shown inline, never retried
    Failed,
}

struct Ready {
    map: leaflet::Map,
    markers: Vec<PlacedMarker>,
    popup: leaflet::Popup,
    search_annotation: Option<SearchAnnotation>,
    live_location: Option<LiveLocation>,
    // keeps the SDK event handlers alive
    _callbacks: Vec<Closure<dyn FnMut(JsValue)>>,
}

struct PlacedMarker {
    category: MarkerCategory,
    stop_id: Option<StopId>,
    coord: Coordinate,
    popup_html: String,
    marker: leaflet::Marker,
}

/// Dedicated marker/popup pair for a chosen search result, independent of
/// the category markers and cleared separately
struct SearchAnnotation {
    marker: leaflet::Marker,
    popup: leaflet::Popup,
}

struct LiveLocation {
    marker: leaflet::Marker,
    accuracy_circle: leaflet::Circle,
}

struct Tracking {
    watch: geolocate::Watch,
}

enum Pending {
    FlyTo(Coordinate, f64),
    OpenStop(StopId),
}

pub enum Msg {
    /// The map tab became visible
    Activated,
    Initialise,
    SetFilter(Filter),
    MarkerClicked(usize),
    OpenStopPopup(StopId),
    FlyTo(Coordinate, f64),
    FitAll,
    GoToRegion,
    ToggleTracking,
    GoToMyLocation,
    DragStarted,
    FixReceived(Coordinate, f64),
    WatchFailed(u16, String),
    Search(search::Msg),
}

pub fn update(msg: Msg, model: &mut Model, data: &TripData, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::Activated => match &model.state {
            State::Uninitialised => {
                // wait for the container to be laid out before sizing the map
                orders.after_next_render(|_| Msg::Initialise);
            }
            State::Ready(ready) => {
                Timeout::new(100, enclose!((ready.map => map) move || map.invalidate_size()))
                    .forget();
            }
            State::Failed => {}
        },

        Msg::Initialise => {
            if let State::Uninitialised = model.state {
                if !leaflet::available() {
                    error!("map SDK failed to load");
                    model.state = State::Failed;
                    return;
                }
                let ready = initialise(data, orders);
                model.state = State::Ready(Box::new(ready));
                apply_filter(model);
                if let Some(pending) = model.pending.take() {
                    match pending {
                        Pending::FlyTo(coord, zoom) => {
                            orders.send_msg(Msg::FlyTo(coord, zoom));
                        }
                        Pending::OpenStop(stop_id) => {
                            orders.send_msg(Msg::OpenStopPopup(stop_id));
                        }
                    }
                }
            }
        }

        Msg::SetFilter(filter) => {
            model.filter = filter;
            apply_filter(model);
        }

        Msg::MarkerClicked(index) => {
            if let Some(ready) = model.ready_mut() {
                if let Some(placed) = ready.markers.get(index) {
                    // one shared popup; opening it here implicitly closes the
                    // previously open one
                    ready
                        .popup
                        .set_lat_lng(&leaflet::lat_lng(placed.coord))
                        .set_content(&placed.popup_html)
                        .open_on(&ready.map);
                }
            }
        }

        Msg::OpenStopPopup(stop_id) => {
            if let Some(ready) = model.ready_mut() {
                if let Some(index) = ready
                    .markers
                    .iter()
                    .position(|placed| placed.stop_id.as_ref() == Some(&stop_id))
                {
                    let placed = &ready.markers[index];
                    ready.map.fly_to(
                        &leaflet::lat_lng(placed.coord),
                        SPOT_ZOOM,
                        &leaflet::options(&[("duration", 0.5.into())]),
                    );
                    // open the popup once the flight has settled
                    let coord = placed.coord;
                    Timeout::new(
                        600,
                        enclose!((ready.map => map, ready.popup => popup, placed.popup_html => html)
                            move || {
                                popup
                                    .set_lat_lng(&leaflet::lat_lng(coord))
                                    .set_content(&html)
                                    .open_on(&map);
                            }
                        ),
                    )
                    .forget();
                }
            } else {
                model.pending = Some(Pending::OpenStop(stop_id));
            }
        }

        Msg::FlyTo(coord, zoom) => {
            if let Some(ready) = model.ready_mut() {
                ready.map.fly_to(
                    &leaflet::lat_lng(coord),
                    zoom,
                    &leaflet::options(&[("duration", 1.0.into())]),
                );
            } else {
                model.pending = Some(Pending::FlyTo(coord, zoom));
            }
        }

        Msg::FitAll => {
            if let Some(ready) = model.ready_mut() {
                let coords = ready.markers.iter().map(|placed| placed.coord);
                let bounds = leaflet::lat_lng_bounds(&leaflet::lat_lngs(coords));
                ready
                    .map
                    .fit_bounds(&bounds, &leaflet::options(&[("padding", leaflet::size(30.0, 30.0))]));
            }
        }

        Msg::GoToRegion => {
            orders.send_msg(Msg::FlyTo(REGION_CENTER, REGION_ZOOM));
        }

        Msg::ToggleTracking => {
            if model.tracking.is_some() {
                stop_tracking(model);
            } else {
                start_tracking(model, orders);
            }
        }

        Msg::GoToMyLocation => {
            if let Some(coord) = model.last_fix {
                model.following = true;
                if let Some(ready) = model.ready_mut() {
                    ready
                        .map
                        .set_view(&leaflet::lat_lng(coord), LOCATION_ZOOM);
                }
            } else if model.tracking.is_none() {
                start_tracking(model, orders);
            }
        }

        Msg::DragStarted => {
            // a manual pan cancels follow mode but not the watch itself
            model.following = false;
        }

        Msg::FixReceived(coord, accuracy) => {
            model.last_fix = Some(coord);
            if model.tracking.is_none() {
                // a fix from an already-cancelled watch
                return;
            }
            let following = model.following;
            if let Some(ready) = model.ready_mut() {
                let latlng = leaflet::lat_lng(coord);
                match &ready.live_location {
                    Some(live) => {
                        live.marker.set_lat_lng(&latlng);
                        live.accuracy_circle.set_lat_lng(&latlng);
                        live.accuracy_circle.set_radius(accuracy);
                    }
                    None => {
                        ready.live_location =
                            Some(place_live_location(&ready.map, coord, accuracy));
                    }
                }
                if following {
                    let zoom = ready.map.get_zoom();
                    ready.map.set_view(&latlng, zoom);
                }
            }
        }

        Msg::WatchFailed(code, message) => {
            if code == geolocate::PERMISSION_DENIED {
                alert("위치 권한을 허용해주세요.\n설정 > 사이트 설정 > 위치");
                stop_tracking(model);
            } else {
                // timeouts and transient errors: keep the watch running
                error!(format!("geolocation error {} - {}", code, message));
                orders.skip();
            }
        }

        Msg::Search(search::Msg::Choose(index)) => {
            let chosen = model
                .search
                .results()
                .get(index)
                .map(|result| (result.display_name.clone(), result.coord()));
            if let Some((name, Some(coord))) = chosen {
                model.search.clear_results();
                annotate_search_result(model, &name, coord);
                orders.send_msg(Msg::FlyTo(coord, SPOT_ZOOM));
            }
        }

        Msg::Search(search::Msg::Clear) => {
            if let Some(ready) = model.ready_mut() {
                if let Some(annotation) = ready.search_annotation.take() {
                    ready.map.remove_layer(annotation.marker.as_ref());
                    ready.map.remove_layer(annotation.popup.as_ref());
                }
            }
        }

        Msg::Search(msg) => {
            let region = visible_region(model);
            search::update(msg, &mut model.search, region, &mut orders.proxy(Msg::Search));
        }
    }
}

/// Build the widget, its markers and route overlays
fn initialise(data: &TripData, orders: &mut impl Orders<Msg>) -> Ready {
    let map = leaflet::map(
        "map",
        &leaflet::options(&[
            ("center", leaflet::lat_lng(REGION_CENTER)),
            ("zoom", REGION_ZOOM.into()),
            ("zoomControl", false.into()),
            ("attributionControl", false.into()),
        ]),
    );
    leaflet::tile_layer(
        TILE_URL,
        &leaflet::options(&[("maxZoom", 19.0.into()), ("subdomains", "abcd".into())]),
    )
    .add_to(&map);
    leaflet::zoom_control(&leaflet::options(&[("position", "topright".into())])).add_to(&map);

    let mut callbacks = Vec::new();
    let mut markers = Vec::new();

    let mut add_marker = |category: MarkerCategory,
                          stop_id: Option<StopId>,
                          coord: Coordinate,
                          icon_glyph: &str,
                          popup_html: String| {
        let marker = leaflet::marker(
            &leaflet::lat_lng(coord),
            &leaflet::options(&[("icon", marker_icon(icon_glyph, category).into())]),
        );
        marker.add_to(&map);
        markers.push(PlacedMarker {
            category,
            stop_id,
            coord,
            popup_html,
            marker,
        });
    };

    let home = &data.home;
    add_marker(
        MarkerCategory::Home,
        None,
        home.coord,
        "🏠",
        place_popup_html("🏠", &home.name, home.address.as_deref()),
    );
    for station in &data.stations {
        add_marker(
            MarkerCategory::Station,
            None,
            station.coord,
            "🚉",
            place_popup_html("🚉", &station.name, None),
        );
    }
    let lodging = &data.accommodation;
    add_marker(
        MarkerCategory::Accommodation,
        None,
        lodging.coord,
        "🏨",
        place_popup_html("🏨", &lodging.name, lodging.address.as_deref()),
    );
    for (category, stop) in data.stops() {
        add_marker(
            category,
            Some(stop.id.clone()),
            stop.coord,
            &stop.icon,
            stop_popup_html(stop),
        );
    }

    // marker taps re-enter the app as messages
    for (index, placed) in markers.iter().enumerate() {
        let app = orders.clone_app();
        let msg_mapper = orders.msg_mapper();
        let on_click = Closure::wrap(Box::new(move |_: JsValue| {
            app.update(msg_mapper(Msg::MarkerClicked(index)));
        }) as Box<dyn FnMut(JsValue)>);
        placed.marker.on("click", on_click.as_ref().unchecked_ref());
        callbacks.push(on_click);
    }

    for (day, color) in data.itinerary.iter().zip(ROUTE_COLORS.iter().cycle()) {
        let coords: Vec<Coordinate> = day.route().collect();
        if coords.len() > 1 {
            leaflet::polyline(
                &leaflet::lat_lngs(coords.into_iter()),
                &leaflet::options(&[
                    ("color", (*color).into()),
                    ("weight", 3.0.into()),
                    ("opacity", 0.6.into()),
                    ("dashArray", "8, 8".into()),
                ]),
            )
            .add_to(&map);
        }
    }

    let app = orders.clone_app();
    let msg_mapper = orders.msg_mapper();
    let on_drag = Closure::wrap(Box::new(move |_: JsValue| {
        app.update(msg_mapper(Msg::DragStarted));
    }) as Box<dyn FnMut(JsValue)>);
    map.on("dragstart", on_drag.as_ref().unchecked_ref());
    callbacks.push(on_drag);

    Ready {
        map,
        markers,
        popup: leaflet::popup(&leaflet::options(&[("maxWidth", 260.0.into())])),
        search_annotation: None,
        live_location: None,
        _callbacks: callbacks,
    }
}

/// Show/hide markers to match the selected filter; never recreates them.
/// Closes any open popup so a hidden marker cannot keep one on screen.
fn apply_filter(model: &mut Model) {
    let filter = model.filter;
    if let Some(ready) = model.ready_mut() {
        for placed in &ready.markers {
            if filter.matches(placed.category) {
                placed.marker.add_to(&ready.map);
            } else {
                ready.map.remove_layer(placed.marker.as_ref());
            }
        }
        ready.map.close_popup();
    }
}

fn start_tracking(model: &mut Model, orders: &mut impl Orders<Msg>) {
    let app = orders.clone_app();
    let msg_mapper = orders.msg_mapper();
    let error_app = orders.clone_app();
    let error_msg_mapper = orders.msg_mapper();
    match geolocate::Watch::start(
        move |fix| app.update(msg_mapper(Msg::FixReceived(fix.coord, fix.accuracy))),
        move |code, message| error_app.update(error_msg_mapper(Msg::WatchFailed(code, message))),
    ) {
        Ok(watch) => {
            model.tracking = Some(Tracking { watch });
            model.following = true;
        }
        Err(err) => {
            error!(format!("{}", err));
            alert("이 기기에서 GPS를 사용할 수 없습니다.");
        }
    }
}

fn stop_tracking(model: &mut Model) {
    if let Some(tracking) = model.tracking.take() {
        tracking.watch.stop();
    }
    model.following = false;
    if let Some(ready) = model.ready_mut() {
        if let Some(live) = ready.live_location.take() {
            ready.map.remove_layer(live.marker.as_ref());
            ready.map.remove_layer(live.accuracy_circle.as_ref());
        }
    }
}

fn place_live_location(map: &leaflet::Map, coord: Coordinate, accuracy: f64) -> LiveLocation {
    let latlng = leaflet::lat_lng(coord);
    let icon = leaflet::div_icon(&leaflet::options(&[
        (
            "html",
            r#"<div class="my-location-ring"></div><div class="my-location-marker"></div>"#.into(),
        ),
        ("className", "".into()),
        ("iconSize", leaflet::size(20.0, 20.0)),
        ("iconAnchor", leaflet::size(10.0, 10.0)),
    ]));
    let marker = leaflet::marker(
        &latlng,
        &leaflet::options(&[("icon", icon.into()), ("zIndexOffset", 1000.0.into())]),
    );
    marker.add_to(map);
    let accuracy_circle = leaflet::circle(
        &latlng,
        &leaflet::options(&[
            ("radius", accuracy.into()),
            ("color", "#0ea5e9".into()),
            ("fillColor", "#0ea5e9".into()),
            ("fillOpacity", 0.1.into()),
            ("weight", 1.0.into()),
        ]),
    );
    accuracy_circle.add_to(map);
    LiveLocation {
        marker,
        accuracy_circle,
    }
}

fn annotate_search_result(model: &mut Model, name: &str, coord: Coordinate) {
    if let Some(ready) = model.ready_mut() {
        if let Some(previous) = ready.search_annotation.take() {
            ready.map.remove_layer(previous.marker.as_ref());
            ready.map.remove_layer(previous.popup.as_ref());
        }
        let marker = leaflet::marker(
            &leaflet::lat_lng(coord),
            &leaflet::options(&[(
                "icon",
                marker_icon("🔍", MarkerCategory::Sightseeing).into(),
            )]),
        );
        marker.add_to(&ready.map);
        let popup = leaflet::popup(&leaflet::options(&[("maxWidth", 260.0.into())]));
        popup
            .set_lat_lng(&leaflet::lat_lng(coord))
            .set_content(&format!(
                r#"<div class="popup-content"><h3>🔍 {}</h3></div>"#,
                name
            ))
            .open_on(&ready.map);
        ready.search_annotation = Some(SearchAnnotation { marker, popup });
    }
}

fn visible_region(model: &Model) -> Option<search::Region> {
    match &model.state {
        State::Ready(ready) => {
            let bounds = ready.map.get_bounds();
            Some(search::Region {
                west: bounds.get_west(),
                south: bounds.get_south(),
                east: bounds.get_east(),
                north: bounds.get_north(),
                center: Coordinate::new(
                    (bounds.get_south() + bounds.get_north()) / 2.0,
                    (bounds.get_west() + bounds.get_east()) / 2.0,
                ),
            })
        }
        _ => None,
    }
}

fn marker_icon(glyph: &str, category: MarkerCategory) -> leaflet::DivIcon {
    leaflet::div_icon(&leaflet::options(&[
        (
            "html",
            format!(
                r#"<div class="custom-marker marker-{}">{}</div>"#,
                category.as_str(),
                glyph
            )
            .into(),
        ),
        ("className", "".into()),
        ("iconSize", leaflet::size(36.0, 36.0)),
        ("iconAnchor", leaflet::size(18.0, 18.0)),
        ("popupAnchor", leaflet::size(0.0, -20.0)),
    ]))
}

fn stop_popup_html(stop: &Stop) -> String {
    let mut html = format!(
        r#"<div class="popup-content"><h3>{} {}</h3><p>{}</p>"#,
        stop.icon, stop.name, stop.description
    );
    for (glyph, detail) in &[
        ("🕐", &stop.hours),
        ("💰", &stop.fee),
        ("🍽️", &stop.menu),
        ("💵", &stop.price),
    ] {
        if let Some(detail) = detail {
            html.push_str(&format!("<p>{} {}</p>", glyph, detail));
        }
    }
    html.push_str(&format!(
        r#"<a class="popup-btn" href="{}" target="_blank">📍 네이버 지도</a></div>"#,
        navigation::place_link(&stop.name)
    ));
    html
}

fn place_popup_html(glyph: &str, name: &str, address: Option<&str>) -> String {
    match address {
        Some(address) => format!(
            r#"<div class="popup-content"><h3>{} {}</h3><p>{}</p></div>"#,
            glyph, name, address
        ),
        None => format!(
            r#"<div class="popup-content"><h3>{} {}</h3></div>"#,
            glyph, name
        ),
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        window.alert_with_message(message).ok();
    }
}

pub fn search_view(model: &Model) -> Node<Msg> {
    search::view(&model.search).map_msg(Msg::Search)
}
