use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const MIN_BUDGET_INR: u32 = 1300;
pub const MIN_DURATION_DAYS: u8 = 1;
pub const MAX_DURATION_DAYS: u8 = 7;
pub const DEFAULT_DURATION_DAYS: u8 = 3;

/// State filter value meaning "do not filter by state".
pub const ALL_STATES: &str = "all";

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One candidate adventure returned by the recommendation service.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecommendationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub mood_tags: Vec<String>,
    pub avg_budget_per_day_inr: u32,
    #[serde(default, alias = "sample_itinerary")]
    pub itinerary: Vec<String>,
    #[serde(default = "default_best_months")]
    pub best_months: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

fn default_best_months() -> String {
    "Any".to_string()
}

impl RecommendationItem {
    /// Key joining this item to its itinerary cache entry.
    ///
    /// A non-empty service-provided `id` wins. Otherwise the key is derived
    /// from the title (lowercased, whitespace runs collapsed to `-`), which is
    /// stable across renders but not guaranteed unique.
    pub fn item_id(&self) -> String {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => derive_item_id(&self.title),
        }
    }
}

pub fn derive_item_id(title: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&title.to_lowercase(), "-")
        .into_owned()
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TravelGroup {
    Solo,
    Couples,
    Friends,
    Family,
}

impl TravelGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelGroup::Solo => "solo",
            TravelGroup::Couples => "couples",
            TravelGroup::Friends => "friends",
            TravelGroup::Family => "family",
        }
    }
}

impl fmt::Display for TravelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdventureType {
    Camp,
    Trek,
}

impl AdventureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdventureType::Camp => "camp",
            AdventureType::Trek => "trek",
        }
    }
}

/// Travel preferences as entered on the explore form.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlannerForm {
    pub mood: String,
    pub budget: u32,
    pub group: TravelGroup,
    #[serde(rename = "type", default, deserialize_with = "adventure_type_or_blank")]
    pub kind: Option<AdventureType>,
    #[serde(default = "default_duration")]
    pub duration: u8,
}

fn default_duration() -> u8 {
    DEFAULT_DURATION_DAYS
}

// The form posts "" for "no type selected".
fn adventure_type_or_blank<'de, D>(deserializer: D) -> Result<Option<AdventureType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "camp" => Ok(Some(AdventureType::Camp)),
            "trek" => Ok(Some(AdventureType::Trek)),
            other => Err(de::Error::unknown_variant(other, &["camp", "trek"])),
        },
    }
}

#[derive(Debug, PartialEq)]
pub enum FormError {
    MissingMood,
    BudgetTooLow(u32),
    DurationOutOfRange(u8),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingMood => write!(f, "Mood is required"),
            FormError::BudgetTooLow(budget) => write!(
                f,
                "Budget per person must be at least {} INR (got {})",
                MIN_BUDGET_INR, budget
            ),
            FormError::DurationOutOfRange(days) => write!(
                f,
                "Trip duration must be between {} and {} days (got {})",
                MIN_DURATION_DAYS, MAX_DURATION_DAYS, days
            ),
        }
    }
}

impl std::error::Error for FormError {}

impl PlannerForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.mood.trim().is_empty() {
            return Err(FormError::MissingMood);
        }
        if self.budget < MIN_BUDGET_INR {
            return Err(FormError::BudgetTooLow(self.budget));
        }
        if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&self.duration) {
            return Err(FormError::DurationOutOfRange(self.duration));
        }
        Ok(())
    }

    /// Type filter implied by the form: empty when no type was chosen.
    pub fn type_filter(&self) -> &'static str {
        self.kind.map(|kind| kind.as_str()).unwrap_or("")
    }
}

/// Body sent to the recommendation service. Every value travels as a string.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub mood: String,
    pub budget: String,
    pub group: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
    pub state: String,
}

impl From<&PlannerForm> for RecommendationRequest {
    fn from(form: &PlannerForm) -> Self {
        Self {
            mood: form.mood.trim().to_string(),
            budget: form.budget.to_string(),
            group: form.group.as_str().to_string(),
            kind: form.type_filter().to_string(),
            duration: form.duration.to_string(),
            state: ALL_STATES.to_string(),
        }
    }
}

/// The service answers either with an error object or with the ordered list.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RecommendationResponse {
    Failure { error: String },
    Items(Vec<RecommendationItem>),
}
