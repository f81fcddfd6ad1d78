use std::fmt;

use serde::{de, ser};

/// Clock time within a day at minute precision, as written in the itinerary
/// (`"09:51"`). Events never cross midnight so no over-24h handling is needed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Time {
    minutes_since_midnight: u32,
}

impl Time {
    pub fn from_hm(hours: u32, minutes: u32) -> Time {
        Time {
            minutes_since_midnight: hours * 60 + minutes,
        }
    }

    pub fn minutes_since_midnight(self) -> u32 {
        self.minutes_since_midnight
    }

    fn hour(self) -> u32 {
        self.minutes_since_midnight / 60
    }

    fn minute(self) -> u32 {
        self.minutes_since_midnight % 60
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// # String representations
/// ```rust
/// use trip_data::time::Time;
/// let time: Time = "0:00".parse().unwrap();
/// let time: Time = "09:51".parse().unwrap();
/// let time: Time = "23:59".parse().unwrap();
/// ```
impl std::str::FromStr for Time {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        let (hh, mm) = if s.len() == 5 {
            if s[2] != b':' {
                return Err(TimeParseError::InvalidFormat);
            }
            (&s[0..2], &s[3..5])
        } else if s.len() == 4 {
            if s[1] != b':' {
                return Err(TimeParseError::InvalidFormat);
            }
            (&s[0..1], &s[2..4])
        } else {
            return Err(TimeParseError::InvalidFormat);
        };
        use std::str::from_utf8;
        let hours: u32 = from_utf8(hh)?.parse()?;
        let minutes: u32 = from_utf8(mm)?.parse()?;
        if minutes > 59 || hours > 23 {
            return Err(TimeParseError::OutOfRange);
        }
        Ok(Time {
            minutes_since_midnight: hours * 60 + minutes,
        })
    }
}

impl ser::Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> de::Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Time, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let s: String = de::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    InvalidFormat,
    OutOfRange,
    ParseIntError(std::num::ParseIntError),
}

impl From<std::num::ParseIntError> for TimeParseError {
    fn from(err: std::num::ParseIntError) -> TimeParseError {
        TimeParseError::ParseIntError(err)
    }
}

impl From<std::str::Utf8Error> for TimeParseError {
    fn from(_err: std::str::Utf8Error) -> TimeParseError {
        TimeParseError::InvalidFormat
    }
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimeParseError::*;
        match self {
            InvalidFormat => write!(f, "Time should use format eg. 09:51"),
            OutOfRange => write!(f, "Maximum hours is 23, maximum minutes is 59"),
            ParseIntError(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TimeParseError {}

/// Classification of a scheduled event against wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalState {
    Past,
    Current,
    Future,
}

/// State of an event spanning `[start, end)` at `now`. A missing end time is
/// an open interval: once started the event stays current for the rest of
/// the day.
pub fn temporal_state(start: Time, end: Option<Time>, now: Time) -> TemporalState {
    match end {
        Some(end) if now >= end => TemporalState::Past,
        _ if now >= start => TemporalState::Current,
        _ => TemporalState::Future,
    }
}

#[cfg(test)]
mod test {
    use super::{temporal_state, TemporalState, Time};

    #[test]
    fn hm_times() {
        assert_eq!(Time::from_hm(12, 59), "12:59".parse().unwrap());
        assert_eq!(Time::from_hm(9, 5), "9:05".parse().unwrap());
    }

    #[test]
    fn parse_and_to_string() {
        assert_eq!("00:00".parse::<Time>().unwrap().to_string(), "00:00");
        assert_eq!("09:51".parse::<Time>().unwrap().to_string(), "09:51");
        assert_eq!("23:59".parse::<Time>().unwrap().to_string(), "23:59");
        assert_eq!("5:00".parse::<Time>().unwrap().to_string(), "05:00");
    }

    #[test]
    fn invalid_parses() {
        assert!("".parse::<Time>().is_err());
        assert!("%%:%%".parse::<Time>().is_err());
        assert!("24:00".parse::<Time>().is_err());
        assert!("12:60".parse::<Time>().is_err());
        assert!("12:0".parse::<Time>().is_err());
        assert!("12:000".parse::<Time>().is_err());
        assert!("1200".parse::<Time>().is_err());
    }

    #[test]
    fn bounded_event() {
        let start = Time::from_hm(12, 0);
        let end = Some(Time::from_hm(12, 15));
        assert_eq!(
            temporal_state(start, end, Time::from_hm(11, 0)),
            TemporalState::Future
        );
        assert_eq!(
            temporal_state(start, end, Time::from_hm(12, 10)),
            TemporalState::Current
        );
        assert_eq!(
            temporal_state(start, end, Time::from_hm(12, 20)),
            TemporalState::Past
        );
    }

    #[test]
    fn interval_is_closed_open() {
        let start = Time::from_hm(12, 0);
        let end = Some(Time::from_hm(12, 15));
        assert_eq!(temporal_state(start, end, start), TemporalState::Current);
        assert_eq!(
            temporal_state(start, end, Time::from_hm(12, 15)),
            TemporalState::Past
        );
    }

    #[test]
    fn open_ended_event_stays_current() {
        let start = Time::from_hm(20, 30);
        assert_eq!(
            temporal_state(start, None, Time::from_hm(20, 29)),
            TemporalState::Future
        );
        assert_eq!(
            temporal_state(start, None, Time::from_hm(20, 30)),
            TemporalState::Current
        );
        assert_eq!(
            temporal_state(start, None, Time::from_hm(23, 59)),
            TemporalState::Current
        );
    }
}
