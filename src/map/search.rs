//! Keyword search against the external geocoding service, scoped to the
//! visible map region. Input is debounced; responses are applied whenever
//! they arrive, so a slow response can overwrite a newer one
//! (last-write-wins, matching the rest of the app's async handling).

use futures::prelude::*;
use gloo_timers::callback::Timeout;
use seed::{error, fetch, prelude::*, *};
use serde::{Deserialize, Serialize};

use trip_data::model::Coordinate;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEBOUNCE_MS: u32 = 400;
const MIN_QUERY_LEN: usize = 2;
pub const MAX_RESULTS: usize = 5;

#[derive(Default)]
pub struct Model {
    query: String,
    results: Vec<SearchResult>,
    // dropping the previous timeout cancels it
    debounce: Option<Timeout>,
}

impl Model {
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.query.clear();
    }
}

#[derive(Deserialize, Clone)]
pub struct SearchResult {
    pub display_name: String,
    lat: String,
    lon: String,
}

impl SearchResult {
    /// The service serialises coordinates as strings
    pub fn coord(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat.parse().ok()?, self.lon.parse().ok()?))
    }
}

/// The visible map region a query is bounded to
#[derive(Clone, Copy)]
pub struct Region {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub center: Coordinate,
}

pub enum Msg {
    Input(String),
    DebounceElapsed,
    ResultsFetched(Result<Vec<SearchResult>, LoadError>),
    /// A result was picked from the list
    Choose(usize),
    /// Remove the search annotation from the map
    Clear,
}

pub fn update(
    msg: Msg,
    model: &mut Model,
    region: Option<Region>,
    orders: &mut impl Orders<Msg>,
) {
    match msg {
        Msg::Choose(_) => panic!("search::Msg::Choose should be handled by parent"),
        Msg::Clear => panic!("search::Msg::Clear should be handled by parent"),

        Msg::Input(query) => {
            model.query = query;
            if model.query.trim().len() >= MIN_QUERY_LEN {
                let app = orders.clone_app();
                let msg_mapper = orders.msg_mapper();
                model.debounce = Some(Timeout::new(DEBOUNCE_MS, move || {
                    app.update(msg_mapper(Msg::DebounceElapsed));
                }));
            } else {
                model.debounce = None;
                model.results.clear();
            }
            orders.skip();
        }

        Msg::DebounceElapsed => {
            model.debounce = None;
            if let Some(region) = region {
                let query = serde_urlencoded::to_string(Params {
                    q: model.query.trim(),
                    format: "jsonv2",
                    limit: MAX_RESULTS,
                    viewbox: format!(
                        "{},{},{},{}",
                        region.west, region.south, region.east, region.north
                    ),
                    bounded: 1,
                })
                .unwrap();
                let url = format!("{}?{}", SEARCH_URL, query);
                orders.perform_cmd(request(url).map(move |result| {
                    Msg::ResultsFetched(result.map(|results| rank(results, region.center)))
                }));
            }
            orders.skip();
        }

        Msg::ResultsFetched(Ok(results)) => {
            model.results = results;
        }

        Msg::ResultsFetched(Err(fail_reason)) => {
            error!(format!("keyword search failed - {:#?}", fail_reason));
            model.results.clear();
            orders.skip();
        }
    }
}

/// Nearest results from the map centre first, at most [`MAX_RESULTS`]
fn rank(mut results: Vec<SearchResult>, center: Coordinate) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        let da = a.coord().map(|c| c.distance_m(center));
        let db = b.coord().map(|c| c.distance_m(center));
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(MAX_RESULTS);
    results
}

pub fn view(model: &Model) -> Node<Msg> {
    div![
        C!["map-search"],
        input![
            attrs! {
                At::Type => "search",
                At::Placeholder => "장소 검색",
                At::Value => &model.query,
            },
            input_ev(Ev::Input, Msg::Input),
        ],
        IF!(!model.results.is_empty() => div![
            C!["search-results"],
            model.results.iter().enumerate().map(|(index, result)| div![
                C!["search-result"],
                &result.display_name,
                ev(Ev::Click, move |_| Msg::Choose(index)),
            ]),
        ]),
    ]
}

async fn request(url: String) -> Result<Vec<SearchResult>, LoadError> {
    let response = fetch::fetch(url).await?;
    Ok(response.check_status()?.json().await?)
}

#[derive(Debug)]
pub enum LoadError {
    FetchError(fetch::FetchError),
}

impl From<fetch::FetchError> for LoadError {
    fn from(error: fetch::FetchError) -> Self {
        Self::FetchError(error)
    }
}

#[derive(Serialize)]
struct Params<'a> {
    q: &'a str,
    format: &'static str,
    limit: usize,
    viewbox: String,
    bounded: u8,
}

#[cfg(test)]
mod test {
    use super::*;

    fn result(name: &str, lat: f64, lon: f64) -> SearchResult {
        SearchResult {
            display_name: name.to_string(),
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    #[test]
    fn ranking_is_nearest_first_and_capped() {
        let center = Coordinate::new(37.54, 129.11);
        let results = vec![
            result("far", 37.9, 129.5),
            result("near", 37.55, 129.11),
            result("mid", 37.6, 129.2),
            result("a", 38.0, 129.6),
            result("b", 38.1, 129.7),
            result("c", 38.2, 129.8),
        ];
        let ranked = rank(results, center);
        assert_eq!(ranked.len(), MAX_RESULTS);
        assert_eq!(ranked[0].display_name, "near");
        assert_eq!(ranked[1].display_name, "mid");
    }

    #[test]
    fn coordinates_parse_from_strings() {
        let good = result("ok", 37.5, 129.1);
        let coord = good.coord().unwrap();
        assert!((coord.lat - 37.5).abs() < 1e-9);
        let bad = SearchResult {
            display_name: "bad".to_string(),
            lat: "not-a-number".to_string(),
            lon: "129.1".to_string(),
        };
        assert!(bad.coord().is_none());
    }
}
