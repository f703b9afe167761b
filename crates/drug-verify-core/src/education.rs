//! Drug-safety educational content.

use drug_verify_llm::{
    educational_articles_schema, parse_articles_response, LlmClient, LlmResult, EDUCATION_PROMPT,
};

use crate::models::EducationalArticle;

/// Shown whenever generation fails or returns nothing usable.
pub fn fallback_articles() -> Vec<EducationalArticle> {
    vec![
        EducationalArticle::new(
            "The Dangers of Counterfeit Medication",
            "Learn how to identify and avoid fake drugs that can pose serious health risks.",
        ),
        EducationalArticle::new(
            "How to Properly Store Your Medicines",
            "Ensure your medications remain effective and safe by following correct storage guidelines.",
        ),
        EducationalArticle::new(
            "Understanding and Reporting Drug Side Effects",
            "Know the common side effects and how to report adverse reactions to protect yourself and others.",
        ),
    ]
}

/// Three short drug-safety article summaries. Never fails.
pub fn educational_articles(client: &dyn LlmClient) -> Vec<EducationalArticle> {
    match generate(client) {
        Ok(articles) if !articles.is_empty() => articles,
        Ok(_) => {
            tracing::warn!("Educational content came back empty, using fallback");
            fallback_articles()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch educational content");
            fallback_articles()
        }
    }
}

fn generate(client: &dyn LlmClient) -> LlmResult<Vec<EducationalArticle>> {
    let text = client.generate_json(EDUCATION_PROMPT, &educational_articles_schema())?;
    Ok(parse_articles_response(&text)?
        .into_iter()
        .filter(|a| !a.title.trim().is_empty())
        .map(|a| EducationalArticle {
            title: a.title.trim().to_string(),
            summary: a.summary.trim().to_string(),
        })
        .collect())
}
