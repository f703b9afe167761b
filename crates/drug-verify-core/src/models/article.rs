//! Drug-safety educational content.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationalArticle {
    pub title: String,
    pub summary: String,
}

impl EducationalArticle {
    pub fn new(title: &str, summary: &str) -> Self {
        Self {
            title: title.to_string(),
            summary: summary.to_string(),
        }
    }
}
