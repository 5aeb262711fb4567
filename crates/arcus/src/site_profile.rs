//! Per-site acquisition profiles and their structural validation.
//!
//! Profiles are parsed from a configuration document elsewhere (or with the
//! JSON helpers below); [`validate_site_profiles`] only checks that every
//! site carries the required fields. Field payloads are opaque.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields every site profile must define.
pub const REQUIRED_FIELDS: [&str; 3] = ["site_name", "scanner_info", "protocol_ranges"];

/// Configuration record for one clinical site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteProfile {
    fields: serde_json::Map<String, Value>,
}

impl SiteProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Required fields absent from this profile, in [`REQUIRED_FIELDS`] order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|k| !self.contains(k))
            .collect()
    }
}

/// Mapping from site identifier to its profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteProfileSet {
    sites: BTreeMap<String, SiteProfile>,
}

impl SiteProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site: impl Into<String>, profile: SiteProfile) {
        self.sites.insert(site.into(), profile);
    }

    pub fn get(&self, site: &str) -> Option<&SiteProfile> {
        self.sites.get(site)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sites in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SiteProfile)> + '_ {
        self.sites.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a JSON object of `{ site_id: { field: value, ... }, ... }`.
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Load a profile set from a JSON file. Does not validate.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&data)?)
    }
}

impl FromIterator<(String, SiteProfile)> for SiteProfileSet {
    fn from_iter<I: IntoIterator<Item = (String, SiteProfile)>>(iter: I) -> Self {
        Self {
            sites: iter.into_iter().collect(),
        }
    }
}

/// One offending site in a [`ConfigValidationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields {
    pub site: String,
    pub fields: Vec<&'static str>,
}

/// One or more site profiles lack required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Every offending site, in site identifier order.
    pub sites: Vec<MissingFields>,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid site profiles")?;
        for (i, m) in self.sites.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(
                f,
                "{}site '{}' missing required keys [{}]",
                sep,
                m.site,
                m.fields.join(", ")
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

/// Check that every site defines all [`REQUIRED_FIELDS`].
///
/// All sites are scanned before failing, so the error lists every offending
/// site together with its missing fields.
pub fn validate_site_profiles(profiles: &SiteProfileSet) -> Result<(), ConfigValidationError> {
    let sites: Vec<MissingFields> = profiles
        .iter()
        .filter_map(|(site, profile)| {
            let fields = profile.missing_fields();
            if fields.is_empty() {
                return None;
            }
            tracing::warn!("Site '{}' missing required keys: {:?}", site, fields);
            Some(MissingFields {
                site: site.to_string(),
                fields,
            })
        })
        .collect();

    if sites.is_empty() {
        tracing::debug!("{} site profile(s) validated", profiles.len());
        Ok(())
    } else {
        Err(ConfigValidationError { sites })
    }
}
