//! Top-1 product selection per routine stage

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::{
    error::AppResult,
    models::{Product, Recommendation},
    services::{scorer::TrainedStage, tokenizer::Tokenize},
};

/// Highest-scoring product; ties keep the earliest entry
pub fn pick_top(mut scored: Vec<(Product, f64)>) -> Option<Product> {
    // sort_by is stable, so equal scores keep accumulation order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().next().map(|(product, _)| product)
}

/// Scores every candidate against every planned stage that has a model and
/// keeps the best candidate per stage
///
/// Stages that end up with no candidates are left out of the result.
pub fn select(
    candidates: &[Product],
    planned_steps: &[String],
    trained: &BTreeMap<String, TrainedStage>,
    tokenizer: &dyn Tokenize,
    max_len: usize,
) -> AppResult<Recommendation> {
    let planned: HashSet<&str> = planned_steps.iter().map(String::as_str).collect();
    let mut scored: BTreeMap<&str, Vec<(Product, f64)>> = BTreeMap::new();

    for candidate in candidates {
        for (stage, model) in trained {
            if !planned.contains(stage.as_str()) {
                continue;
            }
            let vector = model.vocabulary.vectorize(candidate, tokenizer, max_len)?;
            let score = model.score(&vector);
            scored
                .entry(stage.as_str())
                .or_default()
                .push((candidate.clone(), score));
        }
    }

    let mut recommendation = Recommendation::new();
    for (stage, entries) in scored {
        let count = entries.len();
        if let Some(product) = pick_top(entries) {
            tracing::debug!(
                stage = %stage,
                candidates = count,
                selected = %product.name,
                "Stage product selected"
            );
            recommendation.insert(stage.to_string(), product);
        }
    }

    Ok(recommendation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApprovedProducts;
    use crate::services::scorer::{train_stages, LogisticRanker};
    use crate::services::tokenizer::BasicTokenizer;

    fn product(name: &str, ingredients: &[&str]) -> Product {
        Product::new(name, ingredients.iter().map(|s| s.to_string()).collect())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn trained() -> BTreeMap<String, TrainedStage> {
        let mut approved = ApprovedProducts::new();
        approved.insert(
            "moisturizers".to_string(),
            vec![
                product("Vanicream", &["glycerin", "squalane"]),
                product("Eucerin", &["urea", "ceramides"]),
            ],
        );
        approved.insert(
            "sunscreens".to_string(),
            vec![product("Anthelios", &["avobenzone", "octocrylene"])],
        );
        approved.insert(
            "serums".to_string(),
            vec![product("Serum", &["niacinamide"])],
        );
        train_stages(&approved, &BasicTokenizer, &LogisticRanker::new(5, 0.5), 16).unwrap()
    }

    #[test]
    fn test_pick_top_prefers_strict_maximum() {
        let top = pick_top(vec![
            (product("a", &[]), 0.2),
            (product("b", &[]), 0.9),
            (product("c", &[]), 0.5),
        ]);
        assert_eq!(top.unwrap().name, "b");
    }

    #[test]
    fn test_pick_top_tie_keeps_first() {
        let top = pick_top(vec![
            (product("first", &[]), 0.7),
            (product("second", &[]), 0.7),
            (product("low", &[]), 0.1),
        ]);
        assert_eq!(top.unwrap().name, "first");
        assert!(pick_top(Vec::new()).is_none());
    }

    #[test]
    fn test_select_best_per_planned_stage() {
        let candidates = vec![
            product("Sunblock", &["avobenzone", "octocrylene"]),
            product("Rich Cream", &["glycerin", "squalane", "urea"]),
        ];
        let steps = strings(&["moisturizers", "sunscreens"]);

        let result = select(&candidates, &steps, &trained(), &BasicTokenizer, 16).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result["moisturizers"].name, "Rich Cream");
        assert_eq!(result["sunscreens"].name, "Sunblock");
    }

    #[test]
    fn test_select_ignores_unplanned_stages() {
        let candidates = vec![product("Any", &["niacinamide"])];
        let steps = strings(&["moisturizers", "toners"]);

        let result = select(&candidates, &steps, &trained(), &BasicTokenizer, 16).unwrap();

        assert!(!result.contains_key("serums"));
        assert!(!result.contains_key("toners"));
        assert!(result.keys().all(|stage| steps.contains(stage)));
    }

    #[test]
    fn test_select_equal_scores_earlier_candidate_wins() {
        let candidates = vec![
            product("Earlier", &["urea", "ceramides"]),
            product("Later", &["urea", "ceramides"]),
        ];
        let steps = strings(&["moisturizers"]);

        let result = select(&candidates, &steps, &trained(), &BasicTokenizer, 16).unwrap();
        assert_eq!(result["moisturizers"].name, "Earlier");
    }

    #[test]
    fn test_select_without_candidates_is_empty() {
        let steps = strings(&["moisturizers", "sunscreens"]);
        let result = select(&[], &steps, &trained(), &BasicTokenizer, 16).unwrap();
        assert!(result.is_empty());
    }
}
