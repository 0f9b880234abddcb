//! Location identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an empty location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: {reason}")]
pub struct InvalidLocation {
    reason: &'static str,
}

/// An opaque origin or destination, as resolved by the caller.
///
/// Usually a formatted street address or a provider place id. The planner
/// never interprets it; it is handed to the routing oracle verbatim. The
/// only guarantee is that it is non-empty after trimming.
///
/// # Examples
///
/// ```
/// use itinerary_server::domain::Location;
///
/// let home = Location::parse("  1 Queen St, Auckland ").unwrap();
/// assert_eq!(home.as_str(), "1 Queen St, Auckland");
///
/// assert!(Location::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// Parse a location, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidLocation> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidLocation {
                reason: "must not be empty",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the location as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Location {
    type Error = InvalidLocation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:?})", self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
