//! Deep links into the external map application. These are plain URLs opened
//! in a new browsing context, fire-and-forget.

use urlencoding::encode;

use crate::model::Coordinate;

/// A named point passed to the external map app
#[derive(Debug, Clone, Copy)]
pub struct Waypoint<'a> {
    pub name: &'a str,
    pub coord: Coordinate,
}

impl<'a> Waypoint<'a> {
    pub fn new(name: &'a str, coord: Coordinate) -> Waypoint<'a> {
        Waypoint { name, coord }
    }

    fn segment(&self) -> String {
        format!(
            "{},{},{}",
            encode(self.name),
            self.coord.lat,
            self.coord.lng
        )
    }
}

/// Route link for the external map app. With an origin the link carries both
/// segments in origin→destination order, without one only the destination.
///
/// Origin priority is decided by the caller: explicit previous stop, then
/// last known device location, then none.
pub fn route_link(destination: &Waypoint, origin: Option<&Waypoint>) -> String {
    match origin {
        Some(origin) => format!(
            "https://map.kakao.com/link/from/{}/to/{}",
            origin.segment(),
            destination.segment()
        ),
        None => format!("https://map.kakao.com/link/to/{}", destination.segment()),
    }
}

/// Keyword search link for a named place, used from the listing cards
pub fn place_link(name: &str) -> String {
    format!("https://map.naver.com/v5/search/{}", encode(name))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn destination_only_has_no_origin_segment() {
        let dest = Waypoint::new("묵호등대", Coordinate::new(37.5567, 129.1178));
        let link = route_link(&dest, None);
        assert!(link.starts_with("https://map.kakao.com/link/to/"));
        assert!(!link.contains("/from/"));
        assert!(link.ends_with(",37.5567,129.1178"));
    }

    #[test]
    fn origin_comes_before_destination() {
        let origin = Waypoint::new("묵호역", Coordinate::new(37.5536, 129.1133));
        let dest = Waypoint::new("묵호등대", Coordinate::new(37.5567, 129.1178));
        let link = route_link(&dest, Some(&origin));
        let from = link.find("/from/").expect("origin segment");
        let to = link.find("/to/").expect("destination segment");
        assert!(from < to);
        assert!(link.contains("37.5536,129.1133"));
        assert!(link.contains("37.5567,129.1178"));
    }

    #[test]
    fn names_are_percent_encoded() {
        let dest = Waypoint::new("추암 촛대바위", Coordinate::new(37.4793, 129.1528));
        let link = route_link(&dest, None);
        assert!(!link.contains(' '));
        assert!(link.contains("%20"));
    }

    #[test]
    fn place_links_encode_the_name() {
        assert_eq!(
            place_link("동해 중앙시장"),
            format!(
                "https://map.naver.com/v5/search/{}",
                urlencoding::encode("동해 중앙시장")
            )
        );
    }
}
