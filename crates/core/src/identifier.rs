use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ClientError;

/// Reserved prefix marking a profile identifier that points at a dataset row.
pub const DATASET_PREFIX: &str = "dataset-";

/// A profile as the rest of the client sees it. Decoded once from the string
/// form used in view addresses; every consumer routes through [`ProfileId::route`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileId {
    Live(String),
    DatasetBacked(String),
}

/// Which family of backend calls a profile is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRoute<'a> {
    ByProfile { profile_id: &'a str },
    ByDatasetKey { dataset_key: &'a str },
}

impl<'a> ProfileRoute<'a> {
    pub fn recommend_path(&self) -> &'static str {
        match self {
            ProfileRoute::ByProfile { .. } => "/recommend/by_profile",
            ProfileRoute::ByDatasetKey { .. } => "/recommend/by_resume_id",
        }
    }

    /// Query parameter naming the profile on both recommend and gap calls.
    pub fn query_pair(&self) -> (&'static str, &'a str) {
        match self {
            ProfileRoute::ByProfile { profile_id } => ("profile_id", *profile_id),
            ProfileRoute::ByDatasetKey { dataset_key } => ("resume_id", *dataset_key),
        }
    }
}

impl ProfileId {
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ClientError::InvalidArgument("profile id is empty".to_string()));
        }
        match raw.strip_prefix(DATASET_PREFIX) {
            Some("") => Err(ClientError::InvalidArgument(format!(
                "dataset profile id has no row key: {raw}"
            ))),
            Some(key) => Ok(ProfileId::DatasetBacked(key.to_string())),
            None => Ok(ProfileId::Live(raw.to_string())),
        }
    }

    pub fn dataset(resume_id: impl Into<String>) -> Self {
        ProfileId::DatasetBacked(resume_id.into())
    }

    pub fn live(profile_id: impl Into<String>) -> Self {
        ProfileId::Live(profile_id.into())
    }

    pub fn is_dataset_backed(&self) -> bool {
        matches!(self, ProfileId::DatasetBacked(_))
    }

    pub fn route(&self) -> ProfileRoute<'_> {
        match self {
            ProfileId::Live(profile_id) => ProfileRoute::ByProfile { profile_id },
            ProfileId::DatasetBacked(dataset_key) => ProfileRoute::ByDatasetKey { dataset_key },
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileId::Live(id) => f.write_str(id),
            ProfileId::DatasetBacked(key) => write!(f, "{DATASET_PREFIX}{key}"),
        }
    }
}

impl FromStr for ProfileId {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProfileId::parse(value)
    }
}

impl TryFrom<String> for ProfileId {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ProfileId::parse(&value)
    }
}

impl From<ProfileId> for String {
    fn from(value: ProfileId) -> Self {
        value.to_string()
    }
}
