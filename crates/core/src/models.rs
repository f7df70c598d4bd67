use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ClientError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ScoringMode {
    #[serde(rename = "baseline")]
    Baseline,
    #[serde(rename = "embed")]
    Embedding,
    #[default]
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl ScoringMode {
    /// Row order of the evaluation table.
    pub const ALL: [ScoringMode; 3] = [ScoringMode::Baseline, ScoringMode::Embedding, ScoringMode::Hybrid];

    pub fn as_query(self) -> &'static str {
        match self {
            ScoringMode::Baseline => "baseline",
            ScoringMode::Embedding => "embed",
            ScoringMode::Hybrid => "hybrid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoringMode::Baseline => "Baseline",
            ScoringMode::Embedding => "Embedding",
            ScoringMode::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for ScoringMode {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "baseline" => Ok(ScoringMode::Baseline),
            "embed" | "embedding" => Ok(ScoringMode::Embedding),
            "hybrid" => Ok(ScoringMode::Hybrid),
            other => Err(ClientError::InvalidArgument(format!("unknown scoring mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Persona {
    #[default]
    #[serde(rename = "Fresh Grad")]
    FreshGrad,
    #[serde(rename = "Mid-Career Switcher")]
    MidCareerSwitcher,
    #[serde(rename = "Job-Seeker Retraining")]
    JobSeekerRetraining,
}

impl Persona {
    pub const ALL: [Persona; 3] = [
        Persona::FreshGrad,
        Persona::MidCareerSwitcher,
        Persona::JobSeekerRetraining,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Persona::FreshGrad => "Fresh Grad",
            Persona::MidCareerSwitcher => "Mid-Career Switcher",
            Persona::JobSeekerRetraining => "Job-Seeker Retraining",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Persona {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Persona::ALL
            .into_iter()
            .find(|persona| persona.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ClientError::InvalidArgument(format!("unknown persona: {wanted}")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub embed: f64,
    #[serde(default)]
    pub skill: f64,
    #[serde(default)]
    pub exp: f64,
    #[serde(default)]
    pub kw: f64,
}

/// A ranked job. `job_id` is `None` when upstream data carried no usable
/// identifier; job-specific actions are unavailable for such rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawRecommendation")]
pub struct Recommendation {
    pub job_id: Option<String>,
    pub title: String,
    pub experience_level: Option<String>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

impl Recommendation {
    pub fn can_view_gaps(&self) -> bool {
        self.job_id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
        }
    }
}

fn non_empty(value: Option<Scalar>) -> Option<String> {
    value
        .map(Scalar::into_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[serde_as]
#[derive(Deserialize)]
struct RawRecommendation {
    #[serde(default)]
    job_id: Option<Scalar>,
    #[serde(default, rename = "jobId")]
    job_id_camel: Option<Scalar>,
    #[serde(default)]
    title: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    experience_level: Option<String>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    breakdown: ScoreBreakdown,
}

impl From<RawRecommendation> for Recommendation {
    fn from(raw: RawRecommendation) -> Self {
        Self {
            job_id: non_empty(raw.job_id).or_else(|| non_empty(raw.job_id_camel)),
            title: raw.title.unwrap_or_default(),
            experience_level: raw.experience_level,
            score: raw.score,
            breakdown: raw.breakdown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub results: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseSuggestion {
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub hours: String,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

/// Skill to course list, in the order the backend listed the skills.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedSuggestions(pub Vec<(String, Vec<CourseSuggestion>)>);

impl OrderedSuggestions {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CourseSuggestion])> {
        self.0
            .iter()
            .map(|(skill, courses)| (skill.as_str(), courses.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OrderedSuggestions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (skill, courses) in &self.0 {
            map.serialize_entry(skill, courses)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderedSuggestions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SuggestionsVisitor;

        impl<'de> Visitor<'de> for SuggestionsVisitor {
            type Value = OrderedSuggestions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping skills to course lists")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((skill, courses)) =
                    access.next_entry::<String, Option<Vec<CourseSuggestion>>>()?
                {
                    entries.push((skill, courses.unwrap_or_default()));
                }
                Ok(OrderedSuggestions(entries))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OrderedSuggestions::default())
            }
        }

        deserializer.deserialize_any(SuggestionsVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GapReport {
    #[serde(default)]
    pub present: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub weak: Vec<String>,
    #[serde(default)]
    pub suggestions: OrderedSuggestions,
    #[serde(default, rename = "roadmap_3mo", alias = "roadmap")]
    pub roadmap: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetCandidate {
    #[serde(deserialize_with = "text_or_number")]
    pub resume_id: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatesResponse {
    #[serde(default)]
    pub candidates: Vec<DatasetCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub profile_id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub persona: Option<String>,
}

pub type Metrics = BTreeMap<String, f64>;

pub const PRECISION_AT_K: &str = "precision@k";
pub const RECALL_AT_K: &str = "recall@k";
pub const NDCG_AT_K: &str = "ndcg@k";

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub mode: ScoringMode,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
