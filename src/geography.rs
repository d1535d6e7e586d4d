//! Geography resolution.
//!
//! Maps a coverage descriptor (a country token or a list of local authority
//! names) plus a resolution label onto the provider's area codes. Country
//! tokens and resolution labels live in a single lookup table; adding a
//! census vintage is a new row.

use crate::api::{AreaCodeList, CensusApi};
use crate::error::{CensusError, Result};
use std::fmt;
use tracing::debug;

/// Geographic granularity of the output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    LocalAuthority,
    Msoa2011,
    Lsoa2011,
    OutputArea2011,
    Msoa2001,
    Lsoa2001,
    OutputArea2001,
}

struct ResolutionEntry {
    resolution: Resolution,
    label: &'static str,
    synonyms: &'static [&'static str],
    nomis_type: &'static str,
}

static RESOLUTIONS: &[ResolutionEntry] = &[
    ResolutionEntry {
        resolution: Resolution::LocalAuthority,
        label: "LA",
        synonyms: &["LAD"],
        nomis_type: "TYPE464",
    },
    ResolutionEntry {
        resolution: Resolution::Msoa2011,
        label: "MSOA11",
        synonyms: &["MSOA"],
        nomis_type: "TYPE297",
    },
    ResolutionEntry {
        resolution: Resolution::Lsoa2011,
        label: "LSOA11",
        synonyms: &["LSOA"],
        nomis_type: "TYPE298",
    },
    ResolutionEntry {
        resolution: Resolution::OutputArea2011,
        label: "OA11",
        synonyms: &["OA"],
        nomis_type: "TYPE299",
    },
    ResolutionEntry {
        resolution: Resolution::Msoa2001,
        label: "MSOA01",
        synonyms: &[],
        nomis_type: "TYPE305",
    },
    ResolutionEntry {
        resolution: Resolution::Lsoa2001,
        label: "LSOA01",
        synonyms: &[],
        nomis_type: "TYPE304",
    },
    ResolutionEntry {
        resolution: Resolution::OutputArea2001,
        label: "OA01",
        synonyms: &[],
        nomis_type: "TYPE310",
    },
];

impl Resolution {
    /// Row of `RESOLUTIONS` describing this resolution.
    fn entry(self) -> &'static ResolutionEntry {
        let index = match self {
            Self::LocalAuthority => 0,
            Self::Msoa2011 => 1,
            Self::Lsoa2011 => 2,
            Self::OutputArea2011 => 3,
            Self::Msoa2001 => 4,
            Self::Lsoa2001 => 5,
            Self::OutputArea2001 => 6,
        };
        &RESOLUTIONS[index]
    }

    /// Parses a canonical resolution label (e.g. `LA`, `MSOA11`).
    pub fn parse(label: &str) -> Option<Self> {
        RESOLUTIONS
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.resolution)
    }

    /// Expands a user-typed resolution to its canonical label.
    ///
    /// Synonyms such as `MSOA` become `MSOA11`. Anything unrecognised is
    /// returned unchanged so the resolver can reject it.
    pub fn canonical_label(input: &str) -> &str {
        RESOLUTIONS
            .iter()
            .find(|e| e.synonyms.contains(&input))
            .map(|e| e.label)
            .unwrap_or(input)
    }

    /// Returns the canonical label.
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Returns the Nomisweb geography type code (e.g. `TYPE464`).
    pub fn nomis_type(self) -> &'static str {
        self.entry().nomis_type
    }

    /// Iterates all supported resolutions in table order.
    pub fn all() -> impl Iterator<Item = Resolution> {
        RESOLUTIONS.iter().map(|e| e.resolution)
    }

    /// Returns the canonical labels joined with `/`, for prompts.
    pub fn labels() -> String {
        RESOLUTIONS
            .iter()
            .map(|e| e.label)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Country-level coverage with a fixed provider code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    England,
    EnglandWales,
    GreatBritain,
    UnitedKingdom,
}

const COUNTRIES: &[(Country, &str, &str)] = &[
    (Country::England, "E", "2092957699"),
    (Country::EnglandWales, "EW", "2092957703"),
    (Country::GreatBritain, "GB", "2092957698"),
    (Country::UnitedKingdom, "UK", "2092957697"),
];

impl Country {
    /// Matches a coverage token exactly (`E`, `EW`, `GB`, `UK`).
    pub fn parse(token: &str) -> Option<Self> {
        COUNTRIES
            .iter()
            .find(|(_, t, _)| *t == token)
            .map(|(c, _, _)| *c)
    }

    /// Returns the provider area code for the whole country or group.
    pub fn nomis_code(self) -> &'static str {
        COUNTRIES
            .iter()
            .find(|(c, _, _)| *c == self)
            .map(|(_, _, code)| *code)
            .unwrap_or_default()
    }

    /// Returns the coverage tokens joined with `/`, for prompts.
    pub fn tokens() -> String {
        COUNTRIES
            .iter()
            .map(|(_, t, _)| *t)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Resolves geography descriptors through the accessor's lookups.
pub struct GeographyResolver<'a, A: CensusApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: CensusApi + ?Sized> GeographyResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Resolves `coverage` at `resolution_token` into area codes.
    ///
    /// An unknown resolution is a fatal error and is reported before any
    /// lookup is made.
    pub async fn resolve(&self, coverage: &str, resolution_token: &str) -> Result<AreaCodeList> {
        let resolution = parse_resolution(resolution_token)?;

        let coverage_codes = match Country::parse(coverage) {
            Some(country) => vec![country.nomis_code().to_string()],
            None => {
                let names = split_names(coverage);
                debug!(?names, "Looking up local authority codes");
                self.api.get_lad_codes(&names).await?
            }
        };

        self.expand(&coverage_codes, resolution).await
    }

    /// Resolves already-known coverage codes without a name lookup.
    pub async fn resolve_codes(
        &self,
        coverage_codes: &[String],
        resolution_token: &str,
    ) -> Result<AreaCodeList> {
        let resolution = parse_resolution(resolution_token)?;
        self.expand(coverage_codes, resolution).await
    }

    async fn expand(&self, coverage_codes: &[String], resolution: Resolution) -> Result<AreaCodeList> {
        debug!(?coverage_codes, %resolution, "Expanding coverage");
        self.api.get_geo_codes(coverage_codes, resolution).await
    }
}

fn parse_resolution(token: &str) -> Result<Resolution> {
    Resolution::parse(token).ok_or_else(|| CensusError::invalid_resolution(token))
}

fn split_names(coverage: &str) -> Vec<String> {
    coverage
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
