//! The two flags persisted across sessions: the unlock flag written by the
//! PIN check and the theme preference. Storage failures (private browsing,
//! disabled storage) degrade to defaults.

use seed::browser::web_storage::{LocalStorage, WebStorage};
use serde::{Deserialize, Serialize};

const THEME_KEY: &str = "trip-guide-theme";
const UNLOCK_KEY: &str = "trip-guide-unlocked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn class(self) -> &'static str {
        match self {
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

pub fn theme() -> Theme {
    LocalStorage::get(THEME_KEY).unwrap_or(Theme::Dark)
}

pub fn store_theme(theme: Theme) {
    LocalStorage::insert(THEME_KEY, &theme).ok();
}

pub fn is_unlocked() -> bool {
    LocalStorage::get(UNLOCK_KEY).unwrap_or(false)
}

pub fn store_unlocked() {
    LocalStorage::insert(UNLOCK_KEY, &true).ok();
}

// The gate compares a digest of the entry against a constant; it keeps the
// itinerary from casual eyes and is not a security boundary.
const PIN_DIGEST: u64 = digest(b"0216");

pub fn pin_matches(entry: &str) -> bool {
    digest(entry.trim().as_bytes()) == PIN_DIGEST
}

/// djb2
const fn digest(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 5381;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_mul(33).wrapping_add(bytes[i] as u64);
        i += 1;
    }
    hash
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pin_accepts_the_trip_date() {
        assert!(pin_matches("0216"));
        assert!(pin_matches(" 0216 "));
    }

    #[test]
    fn pin_rejects_everything_else() {
        assert!(!pin_matches(""));
        assert!(!pin_matches("0000"));
        assert!(!pin_matches("02160"));
        assert!(!pin_matches("216"));
    }

    #[test]
    fn theme_toggles_between_the_two() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_ne!(Theme::Dark.class(), Theme::Light.class());
    }
}
