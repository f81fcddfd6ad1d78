//! Static listing fragments for the info tab (tickets and the three stop
//! collections) and the detail sheet for a selected stop.

use seed::{prelude::*, *};

use trip_data::model::{Coordinate, Day, Stop, Ticket, TripData};
use trip_data::navigation::{self, Waypoint};

use crate::Msg;

pub fn view(data: &TripData) -> Node<Msg> {
    div![
        section(
            "🚅 승차권",
            data.tickets.iter().map(ticket_card).collect::<Vec<_>>()
        ),
        section(
            "📍 관광지",
            data.spots.iter().map(|s| stop_card(s, "sightseeing")).collect()
        ),
        section(
            "🍽️ 맛집",
            data.restaurants.iter().map(|s| stop_card(s, "food")).collect()
        ),
        section(
            "☕ 카페",
            data.cafes.iter().map(|s| stop_card(s, "cafe")).collect()
        ),
    ]
}

fn section(title: &str, cards: Vec<Node<Msg>>) -> Node<Msg> {
    div![
        C!["info-section"],
        div![C!["info-section-title"], title],
        cards,
    ]
}

fn ticket_card(ticket: &Ticket) -> Node<Msg> {
    div![
        C!["ticket-card"],
        div![
            C!["ticket-label"],
            format!("{} · {}", ticket.label, ticket.kind),
        ],
        div![
            C!["ticket-route"],
            &ticket.from.name,
            span![C!["arrow"], "→"],
            &ticket.to.name,
        ],
        div![
            C!["ticket-details"],
            ticket_detail("날짜", &ticket.date_label),
            ticket_detail("시간", &ticket.time.to_string()),
            ticket_detail("좌석", &ticket.seat),
        ],
    ]
}

fn ticket_detail(name: &str, value: &str) -> Node<Msg> {
    div![C!["ticket-detail"], label![name], span![value]]
}

fn stop_card(stop: &Stop, type_tag: &str) -> Node<Msg> {
    let stop_id = stop.id.clone();
    div![
        C!["spot-card"],
        ev(Ev::Click, move |_| Msg::ShowStop(stop_id)),
        div![
            C!["spot-card-header"],
            div![C!["spot-icon", type_tag], &stop.icon],
            div![
                div![C!["spot-name"], &stop.name],
                div![C!["spot-category"], &stop.category],
            ],
        ],
        div![C!["spot-desc"], &stop.description],
        div![
            C!["spot-tags"],
            tags(stop).into_iter().map(|tag| span![C!["spot-tag"], tag]),
            a![
                C!["navi-btn"],
                attrs! {
                    At::Href => navigation::place_link(&stop.name),
                    At::Target => "_blank",
                },
                // keep the card's detail sheet from opening as well
                ev(Ev::Click, |event| event.stop_propagation()),
                "📍 길찾기",
            ],
        ],
    ]
}

fn tags(stop: &Stop) -> Vec<String> {
    let mut tags = Vec::new();
    if let Some(hours) = &stop.hours {
        tags.push(format!("🕐 {}", hours));
    }
    if let Some(fee) = &stop.fee {
        tags.push(format!("💰 {}", fee));
    }
    if let Some(price) = &stop.price {
        tags.push(format!("💵 {}", price));
    }
    if let Some(menu) = &stop.menu {
        tags.push(format!("🍽️ {}", menu));
    }
    tags
}

/// Detail sheet for one stop. An unknown id renders nothing, the only
/// accepted error path here.
pub fn modal_view(
    data: &TripData,
    day: &Day,
    last_fix: Option<Coordinate>,
    stop_id: &str,
) -> Node<Msg> {
    let stop = match data.find_stop(stop_id) {
        Some(stop) => stop,
        None => return empty![],
    };
    let destination = Waypoint::new(&stop.name, stop.coord);
    let origin = route_origin(day, stop_id, last_fix);
    let route_url = navigation::route_link(&destination, origin.as_ref());
    let stop_id = stop.id.clone();

    div![
        C!["modal-overlay", "show"],
        ev(Ev::Click, |_| Msg::CloseModal),
        div![
            C!["modal-sheet"],
            ev(Ev::Click, |event| event.stop_propagation()),
            div![C!["modal-handle"]],
            div![C!["modal-title"], format!("{} {}", stop.icon, stop.name)],
            div![
                C!["modal-subtitle"],
                format!("{} · {}", stop.category, stop.address),
            ],
            info_row("📝 설명", Some(&stop.description)),
            info_row("🕐 시간", stop.hours.as_deref()),
            info_row("💰 요금", stop.fee.as_deref()),
            info_row("🍽️ 메뉴", stop.menu.as_deref()),
            info_row("💵 가격", stop.price.as_deref()),
            info_row("💡 팁", stop.tips.as_deref()),
            div![
                C!["modal-actions"],
                button![
                    C!["modal-action-btn", "primary"],
                    ev(Ev::Click, move |_| Msg::ViewStopOnMap(stop_id)),
                    "📍 지도에서 보기",
                ],
                a![
                    C!["modal-action-btn", "secondary"],
                    attrs! {
                        At::Href => route_url,
                        At::Target => "_blank",
                    },
                    "🗺️ 길찾기",
                ],
            ],
        ],
    ]
}

fn info_row(label: &str, value: Option<&str>) -> Node<Msg> {
    match value {
        Some(value) => div![
            C!["modal-info-row"],
            span![C!["modal-info-label"], label],
            span![C!["modal-info-value"], value],
        ],
        None => empty![],
    }
}

/// Origin for the external route link: the nearest prior event with a
/// coordinate on the same day, falling back to the last known device
/// location, falling back to nothing
fn route_origin<'a>(
    day: &'a Day,
    stop_id: &str,
    last_fix: Option<Coordinate>,
) -> Option<Waypoint<'a>> {
    day.event_for_stop(stop_id)
        .and_then(|index| day.previous_waypoint(index))
        .and_then(|event| event.coord.map(|coord| Waypoint::new(&event.title, coord)))
        .or_else(|| last_fix.map(|coord| Waypoint::new("현재 위치", coord)))
}
