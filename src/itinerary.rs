//! Renders one day of the itinerary as a timeline of event cards annotated
//! with their temporal state against wall-clock time.

use chrono::NaiveDate;
use gloo_timers::callback::Timeout;
use seed::{prelude::*, *};

use trip_data::model::{Day, TimelineEvent};
use trip_data::time::{TemporalState, Time};

use crate::Msg;

pub fn view(day: &Day, today: NaiveDate, now: Time) -> Node<Msg> {
    div![
        C!["timeline"],
        day.events.iter().enumerate().map(|(index, event)| {
            event_card(event, index, day.state_of(index, today, now))
        }),
    ]
}

fn event_card(event: &TimelineEvent, index: usize, state: TemporalState) -> Node<Msg> {
    let state_class = match state {
        TemporalState::Current => Some("current"),
        TemporalState::Past => Some("past"),
        TemporalState::Future => None,
    };
    let type_tag = event.event_type.as_str();
    div![
        C!["event-card", format!("type-{}", type_tag), state_class],
        ev(Ev::Click, move |_| Msg::EventClicked(index)),
        div![
            C!["event-time"],
            match event.end_time {
                Some(end) => format!("{} ~ {}", event.time, end),
                None => event.time.to_string(),
            },
            span![
                C!["badge", format!("badge-{}", type_tag)],
                event.event_type.to_string(),
            ],
            IF!(state == TemporalState::Current => span![C!["badge", "badge-arrival"], "진행 중"]),
        ],
        div![C!["event-title"], format!("{} {}", event.icon, event.title)],
        div![C!["event-desc"], &event.description],
        IF!(event.coord.is_some() => div![
            C!["event-meta"],
            span!["📍 지도에서 보기"],
            IF!(event.spot_id.is_some() => span!["ℹ️ 상세정보"]),
        ]),
    ]
}

/// Centre the card of the ongoing event, once layout has settled
pub fn scroll_current_into_view() {
    Timeout::new(300, || {
        if let Ok(Some(element)) = document().query_selector(".event-card.current") {
            let mut options = web_sys::ScrollIntoViewOptions::new();
            options
                .behavior(web_sys::ScrollBehavior::Smooth)
                .block(web_sys::ScrollLogicalPosition::Center);
            element.scroll_into_view_with_scroll_into_view_options(&options);
        }
    })
    .forget();
}
