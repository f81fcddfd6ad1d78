use chrono::NaiveDate;
use geo::algorithm::haversine_distance::HaversineDistance;
use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::{temporal_state, TemporalState, Time};

pub type StopId = String;

/// Geographic coordinate as written in the dataset, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    /// As a geo point, x is longitude and y latitude
    pub fn point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    /// Great-circle distance in metres, used to rank search results around
    /// the map centre
    pub fn distance_m(self, other: Coordinate) -> f64 {
        self.point().haversine_distance(&other.point())
    }
}

/// Tag of one itinerary entry, drives the badge label and card styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Move,
    Transport,
    Food,
    Sightseeing,
    Cafe,
    Rest,
    Arrival,
}

impl EventType {
    /// Stable lower-case tag used in css class names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Sightseeing => "sightseeing",
            Self::Cafe => "cafe",
            Self::Rest => "rest",
            Self::Arrival => "arrival",
        }
    }
}

impl fmt::Display for EventType {
    /// Badge label shown on the event card
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Move => "이동",
            Self::Transport => "교통",
            Self::Food => "맛집",
            Self::Sightseeing => "관광",
            Self::Cafe => "카페",
            Self::Rest => "숙소",
            Self::Arrival => "도착",
        })
    }
}

/// One scheduled entry in a day's itinerary. Events without a coordinate get
/// no map affordance; events with a stop reference open the stop detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub time: Time,
    pub end_time: Option<Time>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub icon: String,
    pub description: String,
    pub spot_id: Option<StopId>,
    pub coord: Option<Coordinate>,
}

impl TimelineEvent {
    /// State against wall-clock time, only meaningful on the event's own day
    pub fn state_at(&self, now: Time) -> TemporalState {
        temporal_state(self.time, self.end_time, now)
    }
}

/// A calendar day of the trip with its ordered events. Events are stored in
/// nondecreasing start-time order and never sorted at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day: u8,
    pub date: NaiveDate,
    pub date_label: String,
    pub title: String,
    pub events: Vec<TimelineEvent>,
}

impl Day {
    /// Temporal state of the event at `index`; neutral unless the day is today
    pub fn state_of(&self, index: usize, today: NaiveDate, now: Time) -> TemporalState {
        if self.date == today {
            self.events[index].state_at(now)
        } else {
            TemporalState::Future
        }
    }

    /// Coordinates of the day's route, skipping events without one
    pub fn route(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.events.iter().filter_map(|event| event.coord)
    }

    /// Index of the first event referencing the given stop
    pub fn event_for_stop(&self, stop_id: &str) -> Option<usize> {
        self.events
            .iter()
            .position(|event| event.spot_id.as_deref() == Some(stop_id))
    }

    /// The nearest event before `index` that has a coordinate, the origin for
    /// turn-by-turn handoff to the external map app
    pub fn previous_waypoint(&self, index: usize) -> Option<&TimelineEvent> {
        self.events[..index].iter().rev().find(|event| event.coord.is_some())
    }
}

/// A point of interest: sight, restaurant or cafe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub category: String,
    pub icon: String,
    pub description: String,
    pub address: String,
    pub coord: Coordinate,
    pub hours: Option<String>,
    pub fee: Option<String>,
    pub price: Option<String>,
    pub menu: Option<String>,
    pub tips: Option<String>,
}

/// One end of a booked train leg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEndpoint {
    pub name: String,
    pub coord: Coordinate,
}

/// A train booking record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub from: TicketEndpoint,
    pub to: TicketEndpoint,
    pub date: NaiveDate,
    pub date_label: String,
    pub time: Time,
    pub arrival_time: Time,
    pub seat: String,
    pub label: String,
}

/// A named fixed point rendered as a marker: home, a station or the lodging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub coord: Coordinate,
}

/// Trip header metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripInfo {
    pub name: String,
    pub dates: String,
    pub duration: String,
    pub travelers: u8,
    pub theme: Vec<String>,
}

/// The whole dataset, loaded once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripData {
    pub trip: TripInfo,
    pub home: Place,
    pub accommodation: Place,
    pub stations: Vec<Place>,
    pub tickets: Vec<Ticket>,
    pub spots: Vec<Stop>,
    pub restaurants: Vec<Stop>,
    pub cafes: Vec<Stop>,
    pub itinerary: Vec<Day>,
}

impl TripData {
    /// Parse the embedded dataset
    pub fn load() -> Result<TripData, DataError> {
        Ok(serde_json::from_str(include_str!("../data/trip.json"))?)
    }

    /// All points of interest across the three collections, with the marker
    /// category each belongs to
    pub fn stops(&self) -> impl Iterator<Item = (MarkerCategory, &Stop)> {
        (self.spots.iter().map(|s| (MarkerCategory::Sightseeing, s)))
            .chain(self.restaurants.iter().map(|s| (MarkerCategory::Food, s)))
            .chain(self.cafes.iter().map(|s| (MarkerCategory::Cafe, s)))
    }

    /// Linear scan across the union of the three collections. `None` for an
    /// unknown id, which callers treat as a silent no-op.
    pub fn find_stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops().map(|(_, stop)| stop).find(|stop| stop.id == stop_id)
    }

    /// Startup day selection: the second day only on an exact date match,
    /// any other date falls back to the first day
    pub fn auto_day_index(&self, today: NaiveDate) -> usize {
        if self.itinerary.get(1).map_or(false, |day| day.date == today) {
            1
        } else {
            0
        }
    }
}

#[derive(Debug)]
pub enum DataError {
    Parse(serde_json::Error),
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> DataError {
        DataError::Parse(err)
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Parse(err) => write!(f, "trip dataset is malformed: {}", err),
        }
    }
}

impl std::error::Error for DataError {}

/// Category tag carried by every map marker, matched by the filter chips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerCategory {
    Home,
    Station,
    Accommodation,
    Sightseeing,
    Food,
    Cafe,
}

impl MarkerCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Station => "station",
            Self::Accommodation => "accommodation",
            Self::Sightseeing => "sightseeing",
            Self::Food => "food",
            Self::Cafe => "cafe",
        }
    }
}

/// Marker filter selected by the chips above the map. Filtering only toggles
/// marker visibility, markers are never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Only(MarkerCategory),
}

impl Filter {
    pub fn matches(self, category: MarkerCategory) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(only) => only == category,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn data() -> TripData {
        TripData::load().expect("embedded dataset parses")
    }

    #[test]
    fn stop_ids_unique_across_collections() {
        let data = data();
        let mut seen = HashSet::new();
        for (_, stop) in data.stops() {
            assert!(seen.insert(stop.id.clone()), "duplicate stop id {}", stop.id);
        }
    }

    #[test]
    fn every_event_stop_reference_resolves() {
        let data = data();
        for day in &data.itinerary {
            for event in &day.events {
                if let Some(spot_id) = &event.spot_id {
                    let hits = data
                        .stops()
                        .filter(|(_, stop)| &stop.id == spot_id)
                        .count();
                    assert_eq!(hits, 1, "stop reference {} in {:?}", spot_id, event.title);
                }
            }
        }
    }

    #[test]
    fn events_stored_in_start_time_order() {
        let data = data();
        for day in &data.itinerary {
            for pair in day.events.windows(2) {
                assert!(
                    pair[0].time <= pair[1].time,
                    "day {} events out of order at {}",
                    day.day,
                    pair[1].time
                );
            }
        }
    }

    #[test]
    fn unknown_stop_lookup_is_none() {
        assert!(data().find_stop("nope").is_none());
    }

    #[test]
    fn auto_day_selection() {
        let data = data();
        let day1 = data.itinerary[0].date;
        let day2 = data.itinerary[1].date;
        assert_eq!(data.auto_day_index(day2), 1);
        // any date other than day 2 falls back to the first day
        assert_eq!(data.auto_day_index(day1), 0);
        assert_eq!(
            data.auto_day_index(day2 + chrono::Duration::days(10)),
            0
        );
        assert_eq!(
            data.auto_day_index(day1 - chrono::Duration::days(1)),
            0
        );
    }

    #[test]
    fn exactly_one_current_event() {
        let data = data();
        let day = &data.itinerary[0];
        // 12:05 lies inside the arrival event [12:00, 12:15) only
        let now = Time::from_hm(12, 5);
        let current: Vec<usize> = (0..day.events.len())
            .filter(|&i| day.state_of(i, day.date, now) == TemporalState::Current)
            .collect();
        assert_eq!(current.len(), 1);
        assert_eq!(day.events[current[0]].time, Time::from_hm(12, 0));
    }

    #[test]
    fn neutral_state_on_other_days() {
        let data = data();
        let day = &data.itinerary[0];
        let other_date = day.date + chrono::Duration::days(1);
        let now = Time::from_hm(12, 5);
        for i in 0..day.events.len() {
            assert_eq!(day.state_of(i, other_date, now), TemporalState::Future);
        }
    }

    #[test]
    fn previous_waypoint_scans_backwards() {
        let data = data();
        let day = &data.itinerary[0];
        // the KTX leg (index 1) has no coordinate, so the waypoint before the
        // lunch stop (index 3) is the arrival event, not the train
        let index = day.event_for_stop("r1").expect("lunch references r1");
        let previous = day.previous_waypoint(index).expect("prior event with coords");
        assert!(previous.coord.is_some());
        assert_eq!(previous.time, Time::from_hm(12, 0));
        // nothing before the first event
        assert!(day.previous_waypoint(0).is_none());
    }

    #[test]
    fn events_without_coordinates_have_no_map_affordance() {
        let data = data();
        let day = &data.itinerary[0];
        let train = &day.events[1];
        assert!(train.coord.is_none());
        assert!(train.spot_id.is_none());
    }

    #[test]
    fn filter_matching() {
        for &category in &[
            MarkerCategory::Home,
            MarkerCategory::Station,
            MarkerCategory::Accommodation,
            MarkerCategory::Sightseeing,
            MarkerCategory::Food,
            MarkerCategory::Cafe,
        ] {
            assert!(Filter::All.matches(category));
        }
        assert!(Filter::Only(MarkerCategory::Food).matches(MarkerCategory::Food));
        assert!(!Filter::Only(MarkerCategory::Food).matches(MarkerCategory::Cafe));
        assert!(!Filter::Only(MarkerCategory::Station).matches(MarkerCategory::Home));
    }

    #[test]
    fn distances_are_plausible() {
        // Deokso to Mukho is roughly 170km as the crow flies
        let deokso = Coordinate::new(37.5918, 127.1628);
        let mukho = Coordinate::new(37.5536, 129.1133);
        let d = deokso.distance_m(mukho);
        assert!(d > 150_000.0 && d < 200_000.0, "got {}", d);
    }
}
