//! Supported Census geographies.
//!
//! A [`Geography`] is the spatial unit a table is tabulated at. The set is
//! closed: every variant must have a fetch routine registered with the
//! dispatcher before a full run starts. [`Geography::ALL`] fixes the
//! iteration order of `download_everything`.

mod dispatcher;

pub use dispatcher::{DispatchError, Dispatcher};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A geography identifier named something the dispatcher does not support.
#[derive(Debug, Error)]
#[error("invalid geography type: {input}")]
pub struct GeographyParseError {
    /// The unrecognized identifier.
    pub input: String,
}

/// The 14 geographies ACS tables can be downloaded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geography {
    /// The single nationwide total.
    Nationwide,
    /// All states.
    States,
    /// All Congressional districts.
    CongressionalDistricts,
    /// All counties.
    Counties,
    /// All Census designated places.
    Places,
    /// All urban areas.
    UrbanAreas,
    /// Metropolitan statistical areas.
    Msas,
    /// Combined statistical areas.
    Csas,
    /// Public use microdata areas.
    Pumas,
    /// American Indian, Alaska Native and Native Hawaiian homelands.
    AiannhHomelands,
    /// ZIP code tabulation areas.
    Zctas,
    /// Upper chambers of state legislatures.
    StateLegislativeUpperDistricts,
    /// Lower chambers of state legislatures.
    StateLegislativeLowerDistricts,
    /// All Census tracts.
    Tracts,
}

impl Geography {
    /// Every supported geography, in the order `download_everything` visits
    /// them.
    pub const ALL: [Geography; 14] = [
        Geography::Nationwide,
        Geography::States,
        Geography::CongressionalDistricts,
        Geography::Counties,
        Geography::Places,
        Geography::UrbanAreas,
        Geography::Msas,
        Geography::Csas,
        Geography::Pumas,
        Geography::AiannhHomelands,
        Geography::Zctas,
        Geography::StateLegislativeUpperDistricts,
        Geography::StateLegislativeLowerDistricts,
        Geography::Tracts,
    ];

    /// Stable identifier used on the CLI and in output filenames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nationwide => "nationwide",
            Self::States => "states",
            Self::CongressionalDistricts => "congressional_districts",
            Self::Counties => "counties",
            Self::Places => "places",
            Self::UrbanAreas => "urban_areas",
            Self::Msas => "msas",
            Self::Csas => "csas",
            Self::Pumas => "pumas",
            Self::AiannhHomelands => "aiannh_homelands",
            Self::Zctas => "zctas",
            Self::StateLegislativeUpperDistricts => "state_legislative_upper_districts",
            Self::StateLegislativeLowerDistricts => "state_legislative_lower_districts",
            Self::Tracts => "tracts",
        }
    }

    /// Geography name the Census API expects in the `for=` clause.
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Nationwide => "us",
            Self::States => "state",
            Self::CongressionalDistricts => "congressional district",
            Self::Counties => "county",
            Self::Places => "place",
            Self::UrbanAreas => "urban area",
            Self::Msas => "metropolitan statistical area/micropolitan statistical area",
            Self::Csas => "combined statistical area",
            Self::Pumas => "public use microdata area",
            Self::AiannhHomelands => {
                "american indian area/alaska native area/hawaiian home land"
            }
            Self::Zctas => "zip code tabulation area",
            Self::StateLegislativeUpperDistricts => "state legislative district (upper chamber)",
            Self::StateLegislativeLowerDistricts => "state legislative district (lower chamber)",
            Self::Tracts => "tract",
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Geography {
    type Err = GeographyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|geo| geo.as_str() == input)
            .ok_or_else(|| GeographyParseError {
                input: input.to_owned(),
            })
    }
}
