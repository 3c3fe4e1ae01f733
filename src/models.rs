use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// A posting as delivered by the search provider, kept exactly as supplied.
///
/// The tracker never reshapes the snapshot: absent fields stay absent and
/// `null` or odd-typed values are written back as they came. The accessors
/// below are read-only views used for ids and display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPosting(Map<String, Value>);

impl JobPosting {
    pub fn new(title: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self::default()
            .with("title", Value::String(title.into()))
            .with("company_name", Value::String(company_name.into()))
    }

    /// Sets (or replaces) one field of the snapshot.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Text view of a field: strings as-is, missing or `null` as empty,
    /// other values in their JSON form.
    pub fn text(&self, key: &str) -> Cow<'_, str> {
        text_view(self.0.get(key))
    }

    pub fn title(&self) -> Cow<'_, str> {
        self.text("title")
    }

    pub fn company_name(&self) -> Cow<'_, str> {
        self.text("company_name")
    }

    pub fn location(&self) -> Cow<'_, str> {
        self.text("location")
    }

    pub fn via(&self) -> Cow<'_, str> {
        self.text("via")
    }

    pub fn description(&self) -> Cow<'_, str> {
        self.text("description")
    }

    /// Entries of `related_links` that are objects; anything else is skipped.
    pub fn related_links(&self) -> Vec<RelatedLink> {
        let Some(Value::Array(items)) = self.0.get("related_links") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|link| RelatedLink {
                link: text_view(link.get("link")).into_owned(),
                text: text_view(link.get("text")).into_owned(),
            })
            .collect()
    }
}

fn text_view(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedLink {
    pub link: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplicationStatus {
    #[default]
    NotApplied,
    Applied,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::NotApplied => "Not Applied",
            ApplicationStatus::Applied => "Applied",
        }
    }

    /// Maps a stored status string onto the enum. Case, spaces, dashes and
    /// underscores are ignored; `None` for anything unrecognized.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "notapplied" => Some(ApplicationStatus::NotApplied),
            "applied" => Some(ApplicationStatus::Applied),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match Self::parse_lenient(&raw) {
            Some(status) => Ok(status),
            None => {
                tracing::warn!(
                    status = %raw,
                    "unrecognized application status, treating as Not Applied"
                );
                Ok(ApplicationStatus::NotApplied)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJobRecord {
    pub job: JobPosting,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    // Older stores predate this field.
    #[serde(default)]
    pub application_status: ApplicationStatus,
}

impl SavedJobRecord {
    pub fn new(job: JobPosting) -> Self {
        Self {
            job,
            saved_at: Utc::now(),
            notes: String::new(),
            application_status: ApplicationStatus::NotApplied,
        }
    }
}

/// Derives the record id for a posting: `title_company` with every space
/// replaced by an underscore. No other characters are touched.
pub fn job_id(job: &JobPosting) -> String {
    format!("{}_{}", job.title(), job.company_name()).replace(' ', "_")
}
