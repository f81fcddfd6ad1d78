//! A client-only trip guide: itinerary timeline, stop listings and a map
//! overlay for a short Mukho / Donghae trip. The dataset is embedded and
//! immutable; every view re-derives its display state from it.

use chrono::NaiveDate;
use seed::{prelude::*, *};

mod info;
mod itinerary;
mod map;
mod storage;

use trip_data::model::{DataError, Filter, MarkerCategory, StopId, TripData};
use trip_data::time::Time;

#[wasm_bindgen(start)]
pub fn render() {
    App::start("app", init, update, view);
}

fn init(_url: Url, orders: &mut impl Orders<Msg>) -> Model {
    let data = TripData::load();
    let day_index = data
        .as_ref()
        .map(|data| data.auto_day_index(today()))
        .unwrap_or(0);
    orders.after_next_render(|_| Msg::FirstRender);
    Model {
        data,
        unlocked: storage::is_unlocked(),
        pin_entry: String::new(),
        theme: storage::theme(),
        tab: Tab::Itinerary,
        day_index,
        selected_stop: None,
        map: map::Model::default(),
    }
}

struct Model {
    data: Result<TripData, DataError>,
    unlocked: bool,
    pin_entry: String,
    theme: storage::Theme,
    tab: Tab,
    day_index: usize,
    /// stop shown in the detail sheet
    selected_stop: Option<StopId>,
    map: map::Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Itinerary,
    Map,
    Info,
}

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Tab::Itinerary => "📅 일정",
            Tab::Map => "🗺️ 지도",
            Tab::Info => "ℹ️ 정보",
        }
    }
}

const TABS: [Tab; 3] = [Tab::Itinerary, Tab::Map, Tab::Info];

enum Msg {
    FirstRender,
    SelectTab(Tab),
    SelectDay(usize),
    EventClicked(usize),
    ShowStop(StopId),
    ViewStopOnMap(StopId),
    CloseModal,
    ToggleTheme,
    PinInput(String),
    SubmitPin,
    Map(map::Msg),
}

fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::FirstRender => {
            itinerary::scroll_current_into_view();
        }

        Msg::SelectTab(tab) => {
            model.tab = tab;
            if tab == Tab::Map {
                orders.send_msg(Msg::Map(map::Msg::Activated));
            }
        }

        Msg::SelectDay(day_index) => {
            model.day_index = day_index;
            itinerary::scroll_current_into_view();
        }

        Msg::EventClicked(index) => {
            let event = model
                .data
                .as_ref()
                .ok()
                .and_then(|data| data.itinerary.get(model.day_index))
                .and_then(|day| day.events.get(index));
            if let Some(event) = event {
                if let Some(stop_id) = &event.spot_id {
                    orders.send_msg(Msg::ShowStop(stop_id.clone()));
                } else if let Some(coord) = event.coord {
                    orders.send_msg(Msg::SelectTab(Tab::Map));
                    orders.send_msg(Msg::Map(map::Msg::FlyTo(coord, 16.0)));
                }
                // events without a coordinate have no map affordance
            }
        }

        Msg::ShowStop(stop_id) => {
            // unknown ids silently render nothing
            if let Ok(data) = &model.data {
                if data.find_stop(&stop_id).is_some() {
                    model.selected_stop = Some(stop_id);
                }
            }
        }

        Msg::ViewStopOnMap(stop_id) => {
            model.selected_stop = None;
            orders.send_msg(Msg::SelectTab(Tab::Map));
            orders.send_msg(Msg::Map(map::Msg::OpenStopPopup(stop_id)));
        }

        Msg::CloseModal => {
            model.selected_stop = None;
        }

        Msg::ToggleTheme => {
            model.theme = model.theme.toggled();
            storage::store_theme(model.theme);
        }

        Msg::PinInput(entry) => {
            model.pin_entry = entry;
        }

        Msg::SubmitPin => {
            if storage::pin_matches(&model.pin_entry) {
                model.unlocked = true;
                storage::store_unlocked();
            } else {
                model.pin_entry.clear();
            }
        }

        Msg::Map(msg) => {
            if let Ok(data) = &model.data {
                map::update(msg, &mut model.map, data, &mut orders.proxy(Msg::Map));
            }
        }
    }
}

fn view(model: &Model) -> Node<Msg> {
    let data = match &model.data {
        Ok(data) => data,
        Err(err) => {
            return div![C!["app-error"], format!("{}", err)];
        }
    };
    if !model.unlocked {
        return lock_view(model);
    }
    div![
        C![model.theme.class()],
        header(data, model),
        section![
            C!["tab-content-holder"],
            div![
                C![
                    "tab-content",
                    IF!(model.tab == Tab::Itinerary => "active")
                ],
                day_selector(data, model.day_index),
                itinerary_view(data, model.day_index),
            ],
            div![
                C!["tab-content", IF!(model.tab == Tab::Map => "active")],
                map_view(model),
            ],
            div![
                C!["tab-content", IF!(model.tab == Tab::Info => "active")],
                info::view(data),
            ],
        ],
        nav![
            C!["tab-bar"],
            TABS.iter().map(|&tab| {
                button![
                    C!["tab-item", IF!(model.tab == tab => "active")],
                    ev(Ev::Click, move |_| Msg::SelectTab(tab)),
                    tab.label(),
                ]
            }),
        ],
        match &model.selected_stop {
            Some(stop_id) => {
                info::modal_view(data, &data.itinerary[model.day_index], model.map.last_fix(), stop_id)
            }
            None => empty![],
        },
    ]
}

fn header(data: &TripData, model: &Model) -> Node<Msg> {
    div![
        C!["header"],
        div![
            div![C!["trip-name"], &data.trip.name],
            div![C!["trip-dates"], &data.trip.dates],
        ],
        div![
            C!["header-status"],
            span![
                C!["gps-dot", IF!(model.map.is_tracking() => "gps-active")],
            ],
            span![
                C!["gps-text"],
                if model.map.is_tracking() {
                    "GPS 추적 중"
                } else {
                    "GPS 꺼짐"
                },
            ],
            button![
                C!["theme-btn"],
                ev(Ev::Click, |_| Msg::ToggleTheme),
                match model.theme {
                    storage::Theme::Dark => "🌙",
                    storage::Theme::Light => "☀️",
                },
            ],
        ],
    ]
}

fn day_selector(data: &TripData, selected: usize) -> Node<Msg> {
    div![
        C!["day-selector"],
        data.itinerary.iter().enumerate().map(|(index, day)| {
            button![
                C!["day-btn", IF!(index == selected => "active")],
                ev(Ev::Click, move |_| Msg::SelectDay(index)),
                format!("Day {} · {}", day.day, day.date_label),
            ]
        }),
    ]
}

fn itinerary_view(data: &TripData, day_index: usize) -> Node<Msg> {
    match data.itinerary.get(day_index) {
        Some(day) => itinerary::view(day, today(), now()),
        None => empty![],
    }
}

fn map_view(model: &Model) -> Node<Msg> {
    div![
        C!["map-holder"],
        div![
            C!["filter-chips"],
            filter_chips(model.map.filter()),
        ],
        map::search_view(&model.map).map_msg(Msg::Map),
        IF!(model.map.has_search_annotation() => button![
            C!["search-clear-btn"],
            ev(Ev::Click, |_| Msg::Map(map::Msg::Search(map::search::Msg::Clear))),
            "검색 표시 지우기",
        ]),
        div![
            C!["map-controls"],
            map_button("📡", IF!(model.map.is_tracking() => "gps-active"), || Msg::Map(
                map::Msg::ToggleTracking
            )),
            map_button("🎯", None, || Msg::Map(map::Msg::GoToMyLocation)),
            map_button("🗺️", None, || Msg::Map(map::Msg::FitAll)),
            map_button("🌊", None, || Msg::Map(map::Msg::GoToRegion)),
        ],
        if model.map.failed() {
            div![
                C!["map-error"],
                "지도를 불러오지 못했습니다. 네트워크 연결을 확인해주세요.",
            ]
        } else {
            div![id!("map"), C!["map-container"]]
        },
    ]
}

// a fn pointer keeps the click handler cloneable, which `ev` requires
fn map_button(glyph: &str, extra_class: Option<&str>, msg: fn() -> Msg) -> Node<Msg> {
    button![
        C!["map-btn", extra_class],
        ev(Ev::Click, move |_| msg()),
        glyph,
    ]
}

fn filter_chips(active: Filter) -> Vec<Node<Msg>> {
    const CHIPS: [(Filter, &str); 6] = [
        (Filter::All, "전체"),
        (Filter::Only(MarkerCategory::Sightseeing), "관광"),
        (Filter::Only(MarkerCategory::Food), "맛집"),
        (Filter::Only(MarkerCategory::Cafe), "카페"),
        (Filter::Only(MarkerCategory::Station), "역"),
        (Filter::Only(MarkerCategory::Accommodation), "숙소"),
    ];
    CHIPS
        .iter()
        .map(|&(filter, label)| {
            button![
                C!["filter-chip", IF!(filter == active => "active")],
                ev(Ev::Click, move |_| Msg::Map(map::Msg::SetFilter(filter))),
                label,
            ]
        })
        .collect()
}

fn lock_view(model: &Model) -> Node<Msg> {
    div![
        C!["lock-screen", model.theme.class()],
        div![C!["lock-title"], "여행 가이드"],
        input![
            attrs! {
                At::Type => "password",
                At::Placeholder => "PIN",
                At::Value => &model.pin_entry,
            },
            input_ev(Ev::Input, Msg::PinInput),
            keyboard_ev(Ev::KeyDown, |event| {
                IF!(event.key() == "Enter" => Msg::SubmitPin)
            }),
        ],
        button![ev(Ev::Click, |_| Msg::SubmitPin), "열기"],
    ]
}

fn today() -> NaiveDate {
    let date = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        date.get_full_year() as i32,
        date.get_month() + 1,
        date.get_date(),
    )
    .expect("browser date is a valid calendar date")
}

fn now() -> Time {
    let date = js_sys::Date::new_0();
    Time::from_hm(date.get_hours(), date.get_minutes())
}

#[cfg(test)]
mod test {
    use super::*;

    // click handlers passed to `ev` must stay cloneable; building the
    // controls exercises that bound
    #[test]
    fn map_control_buttons_build() {
        let buttons = [
            map_button("📡", Some("gps-active"), || Msg::Map(map::Msg::ToggleTracking)),
            map_button("🎯", None, || Msg::Map(map::Msg::GoToMyLocation)),
            map_button("🗺️", None, || Msg::Map(map::Msg::FitAll)),
            map_button("🌊", None, || Msg::Map(map::Msg::GoToRegion)),
        ];
        for button in &buttons {
            assert!(matches!(button, Node::Element(_)));
        }
    }

    #[test]
    fn one_filter_chip_per_category_plus_all() {
        let chips = filter_chips(Filter::All);
        assert_eq!(chips.len(), 6);
        assert!(chips.iter().all(|chip| matches!(chip, Node::Element(_))));
    }
}
