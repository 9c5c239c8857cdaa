use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A saved social-media post as returned by the post source.
///
/// Immutable once fetched; the cache owns the canonical copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Provider-assigned numeric key, serialized as a string
    pub pk: String,
    /// Short shareable code
    pub code: String,
    #[serde(default)]
    pub caption_text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
}

/// An ordered list of post keys belonging to one saved collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    #[serde(default)]
    pub post_pks: Vec<String>,
    /// High-water mark for incremental fetch resumption
    #[serde(default)]
    pub last_media_pk: u64,
}

impl Collection {
    pub fn new(id: i64) -> Self {
        Collection {
            id,
            post_pks: Vec::new(),
            last_media_pk: 0,
        }
    }

    /// Append newly fetched posts and advance the high-water mark.
    pub fn append_posts(&mut self, posts: &[Post]) {
        self.post_pks.extend(posts.iter().map(|p| p.pk.clone()));
        if let Some(last) = posts.last() {
            if let Ok(pk) = last.pk.parse::<u64>() {
                self.last_media_pk = pk;
            }
        }
    }
}

/// Lifecycle states of an asynchronous batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Validating,
    InProgress,
    Finalizing,
    Completed,
    Failed,
    Cancelled,
    Expired,
    /// Any status this crate does not know about; treated as in flight
    #[serde(other)]
    Other,
}

impl JobStatus {
    /// True if no further progress updates will occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled | JobStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Validating => "validating",
            JobStatus::InProgress => "in_progress",
            JobStatus::Finalizing => "finalizing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Expired => "expired",
            JobStatus::Other => "other",
        }
    }
}

/// Per-request progress counters reported while a job runs.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RequestCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
}

/// Provider-side view of a submitted batch job.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub output_file_id: Option<String>,
    #[serde(default)]
    pub error_file_id: Option<String>,
    #[serde(default)]
    pub request_counts: Option<RequestCounts>,
}

/// Structured recipe data extracted from a caption.
///
/// Every field is required so the schema passes the provider's strict mode;
/// the model fills "unknown" or an empty list when a caption lacks the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,

    // Primary classifications
    pub cuisine_type: String,
    pub difficulty: String,
    pub meal_type: String,

    // Ingredient breakdown
    pub proteins: Vec<String>,
    pub vegetables: Vec<String>,
    pub grains_starches: Vec<String>,
    pub herbs_spices: Vec<String>,

    // Cooking details
    pub cooking_methods: Vec<String>,
    pub equipment: Vec<String>,

    // Time and serving
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub servings: String,

    // Experience tags
    pub temperature: String,
    pub texture: Vec<String>,
    pub flavor_profile: Vec<String>,

    // Dietary and lifestyle
    pub dietary_tags: Vec<String>,
    pub health_tags: Vec<String>,

    // Context and occasion
    pub season: Vec<String>,
    pub occasion: Vec<String>,
    pub skill_level: String,

    // Special characteristics
    pub style_tags: Vec<String>,
    pub prep_style: Vec<String>,
}

/// A [`Recipe`] bound back to the post it was extracted from.
///
/// Created by the reconciler (or the live classifier) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub post_pk: String,
    pub code: String,
    pub caption: String,
    pub is_recipe: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(flatten)]
    pub recipe: Option<Recipe>,
}

/// Model response for the recipe detection pass of the live path.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Detection {
    pub is_recipe: bool,
    pub confidence: f64,
    pub reasoning: String,
}
