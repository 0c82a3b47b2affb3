use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Name fragments that mark a home-schooling cohort.
pub const HOME_SCHOOLING_MARKERS: [&str; 2] = ["Home", "المنازل"];

/// A class (grade section) as stored in `grades`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Grade {
    #[schema(example = "G5-A")]
    pub id: String,
    #[schema(example = "Grade 5 A", nullable = true)]
    pub name: Option<String>,
}

impl Grade {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Home-schooling cohorts are left out of roll calls and reports.
    pub fn is_trackable(&self) -> bool {
        match &self.name {
            Some(name) => !HOME_SCHOOLING_MARKERS
                .iter()
                .any(|marker| name.contains(marker)),
            None => true,
        }
    }
}
