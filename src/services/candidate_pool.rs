//! Approved-product pool per routine stage
//!
//! Starts from the catalog's approved products for the taxonomy code and adds
//! the synthetic stages that mirror the planner's dynamic steps.

use crate::{
    error::AppResult,
    models::{ApprovedProducts, Product},
    services::{catalog::CatalogProvider, knowledge_graph::KnowledgeGraph, planner},
};

/// Tokens appended for retinol-dosage codes
pub const RETINOL_TOKENS: [&str; 2] = ["retinol", "retynol"];

/// Stage carrying the general skin-health exemplar
pub const GENERAL_CARE_STAGE: &str = "subsanamiento";

/// General skin-health ingredients, as named in the approved-products catalog
pub const GENERAL_SKIN_HEALTH: [&str; 14] = [
    "glicerina",
    "hialuronato de sodio",
    "dexpantenol",
    "ethylhexylglycerin",
    "dimeticona",
    "tocoferol",
    "alfa tocoferol acetato",
    "ascorbil palmitato",
    "carbómero",
    "goma xantana",
    "fenoxietanol",
    "potasio sorbato y ácido sórbico",
    "benzoato de sodio",
    "edta disódico",
];

/// Fetches the approved set for `code` and injects the synthetic stages
pub async fn build(
    catalog: &dyn CatalogProvider,
    graph: &KnowledgeGraph,
    code: &str,
    conditions: &[String],
) -> AppResult<ApprovedProducts> {
    let approved = catalog.fetch_approved(code).await?;
    Ok(inject_synthetic_stages(approved, graph, code, conditions))
}

/// Adds retinol, per-condition and general-care exemplars to a fetched pool
pub fn inject_synthetic_stages(
    mut approved: ApprovedProducts,
    graph: &KnowledgeGraph,
    code: &str,
    conditions: &[String],
) -> ApprovedProducts {
    if planner::needs_retinol(code) {
        for product in approved.values_mut().flatten() {
            product
                .ingredients
                .extend(RETINOL_TOKENS.iter().map(|t| t.to_string()));
        }
        approved.insert(
            planner::RETINOL_STAGE.to_string(),
            vec![Product::placeholder(RETINOL_TOKENS)],
        );
    }

    for condition in conditions {
        let ingredients = graph.ingredients_for(condition);
        if ingredients.is_empty() {
            tracing::debug!(condition = %condition, "Condition has no graph ingredients");
        }
        approved.insert(condition.clone(), vec![Product::placeholder(ingredients)]);
    }

    if conditions.len() <= 1 {
        approved.insert(
            GENERAL_CARE_STAGE.to_string(),
            vec![Product::placeholder(GENERAL_SKIN_HEALTH)],
        );
    }

    approved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::catalog::MockCatalogProvider;
    use crate::services::knowledge_graph::NodeKind;

    fn graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_node("acne_scar", NodeKind::Condition);
        graph.add_node("niacinamide", NodeKind::Ingredient);
        graph.add_node("azelaic acid", NodeKind::Ingredient);
        graph.add_edge("acne_scar", "niacinamide");
        graph.add_edge("acne_scar", "azelaic acid");
        graph
    }

    fn catalog() -> ApprovedProducts {
        let mut approved = ApprovedProducts::new();
        approved.insert(
            "cleansers".to_string(),
            vec![
                Product::new("CeraVe", vec!["ceramides".into(), "hyaluronic acid".into()]),
                Product::new("Cetaphil", vec!["glycerin".into()]),
            ],
        );
        approved.insert(
            "sunscreens".to_string(),
            vec![Product::new("La Roche", vec!["avobenzone".into()])],
        );
        approved
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_conditions_adds_general_care() {
        let pool = inject_synthetic_stages(catalog(), &graph(), "drnt", &[]);

        assert_eq!(pool.len(), 3);
        let general = &pool[GENERAL_CARE_STAGE];
        assert_eq!(general.len(), 1);
        assert_eq!(general[0].name, "name");
        assert_eq!(general[0].ingredients, strings(&GENERAL_SKIN_HEALTH));
        assert_eq!(pool["cleansers"], catalog()["cleansers"]);
    }

    #[test]
    fn test_condition_stage_uses_graph_ingredients() {
        let pool = inject_synthetic_stages(catalog(), &graph(), "drnt", &strings(&["acne_scar"]));

        assert_eq!(
            pool["acne_scar"],
            vec![Product::placeholder(graph().ingredients_for("acne_scar"))]
        );
        assert_eq!(
            pool["acne_scar"][0].ingredients,
            strings(&["niacinamide", "azelaic acid"])
        );
        assert!(pool.contains_key(GENERAL_CARE_STAGE));
    }

    #[test]
    fn test_unknown_condition_gets_empty_exemplar() {
        let pool = inject_synthetic_stages(
            catalog(),
            &graph(),
            "drnt",
            &strings(&["rosacea", "dark_spot"]),
        );

        assert_eq!(pool["rosacea"].len(), 1);
        assert!(pool["rosacea"][0].ingredients.is_empty());
        assert!(!pool.contains_key(GENERAL_CARE_STAGE));
    }

    #[test]
    fn test_retinol_codes_extend_every_product() {
        for code in planner::RETINOL_DOSAGE_CODES {
            let before = catalog();
            let pool = inject_synthetic_stages(catalog(), &graph(), code, &strings(&["a", "b"]));

            for (stage, products) in &before {
                for (original, extended) in products.iter().zip(&pool[stage]) {
                    assert_eq!(extended.ingredients.len(), original.ingredients.len() + 2);
                    assert_eq!(
                        &extended.ingredients[original.ingredients.len()..],
                        &strings(&RETINOL_TOKENS)[..]
                    );
                }
            }

            assert_eq!(pool["retinol"], vec![Product::placeholder(RETINOL_TOKENS)]);
        }
    }

    #[test]
    fn test_non_retinol_code_leaves_products_untouched() {
        let pool = inject_synthetic_stages(catalog(), &graph(), "drnt", &strings(&["a", "b"]));
        assert_eq!(pool["cleansers"], catalog()["cleansers"]);
        assert!(!pool.contains_key("retinol"));
    }

    #[tokio::test]
    async fn test_build_fetches_by_code() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_approved()
            .withf(|code| code == "drnt")
            .times(1)
            .returning(|_| Ok(catalog()));

        let pool = build(&mock, &graph(), "drnt", &[]).await.unwrap();
        assert!(pool.contains_key("cleansers"));
        assert!(pool.contains_key(GENERAL_CARE_STAGE));
    }

    #[tokio::test]
    async fn test_build_propagates_catalog_failure() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_approved()
            .returning(|_| Err(AppError::CatalogUnavailable("timeout".to_string())));

        let result = build(&mock, &graph(), "drnt", &[]).await;
        assert!(matches!(result, Err(AppError::CatalogUnavailable(_))));
    }
}
