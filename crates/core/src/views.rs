use crate::{ClientError, ProfileId};
use std::fmt;

/// The navigable screens of the client and their addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    Candidate(ProfileId),
    Evaluation,
}

impl View {
    pub fn parse(path: &str) -> Result<Self, ClientError> {
        let trimmed = path.trim();
        let trimmed = trimmed.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|part| !part.is_empty()).collect();

        match segments.as_slice() {
            [] => Ok(View::Home),
            ["eval"] => Ok(View::Evaluation),
            ["candidate", id] => Ok(View::Candidate(ProfileId::parse(id)?)),
            _ => Err(ClientError::InvalidView(path.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            View::Home => "/".to_string(),
            View::Candidate(profile) => format!("/candidate/{profile}"),
            View::Evaluation => "/eval".to_string(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
