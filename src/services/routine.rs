use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::ProductStore,
    error::{AppError, AppResult},
    models::{PlanResponse, Product, RoutineResponse, SkinProfile},
    services::{
        candidate_pool,
        catalog::CatalogProvider,
        knowledge_graph::KnowledgeGraph,
        planner,
        scorer::{train_stages, Ranker},
        selector,
        taxonomy,
        tokenizer::Tokenize,
    },
};

/// Assembles a skincare routine from classified skin attributes
///
/// Holds the process-wide read-only artifacts; everything derived from a
/// profile (plan, approved pool, stage models) lives for one call.
#[derive(Clone)]
pub struct RoutineEngine {
    catalog: Arc<dyn CatalogProvider>,
    graph: Arc<KnowledgeGraph>,
    store: Arc<ProductStore>,
    tokenizer: Arc<dyn Tokenize>,
    ranker: Arc<dyn Ranker>,
    max_len: usize,
}

impl RoutineEngine {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        graph: Arc<KnowledgeGraph>,
        store: Arc<ProductStore>,
        tokenizer: Arc<dyn Tokenize>,
        ranker: Arc<dyn Ranker>,
        max_len: usize,
    ) -> Self {
        Self {
            catalog,
            graph,
            store,
            tokenizer,
            ranker,
            max_len,
        }
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    /// Taxonomy code and planned steps, without catalog access
    pub fn plan(&self, profile: &SkinProfile) -> AppResult<PlanResponse> {
        let code = taxonomy::encode(profile);
        let steps = planner::plan_routine(&code.to_string(), &profile.conditions)?;
        Ok(PlanResponse {
            taxonomy_code: code,
            steps,
        })
    }

    /// Graph candidates for every detected condition, in condition order
    pub fn candidates_for(&self, conditions: &[String]) -> Vec<Product> {
        conditions
            .iter()
            .flat_map(|c| self.graph.products_and_ingredients_for(c, &self.store))
            .collect()
    }

    /// Full routine: plan, approved pool, per-stage models, selection
    pub async fn recommend(&self, profile: &SkinProfile) -> AppResult<RoutineResponse> {
        let start = Instant::now();
        let PlanResponse {
            taxonomy_code,
            steps,
        } = self.plan(profile)?;
        let code = taxonomy_code.to_string();

        tracing::info!(
            code = %code,
            steps = steps.len(),
            conditions = profile.conditions.len(),
            "Planning routine"
        );

        let approved =
            candidate_pool::build(self.catalog.as_ref(), &self.graph, &code, &profile.conditions)
                .await?;
        let candidates = self.candidates_for(&profile.conditions);

        tracing::info!(
            code = %code,
            approved_stages = approved.len(),
            candidates = candidates.len(),
            "Approved pool and candidates gathered"
        );

        let tokenizer = Arc::clone(&self.tokenizer);
        let ranker = Arc::clone(&self.ranker);
        let max_len = self.max_len;
        let planned = steps.clone();

        let recommendations = tokio::task::spawn_blocking(move || {
            let trained = train_stages(&approved, tokenizer.as_ref(), ranker.as_ref(), max_len)?;
            selector::select(&candidates, &planned, &trained, tokenizer.as_ref(), max_len)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Routine scoring task failed: {}", e)))??;

        tracing::info!(
            code = %code,
            selected = recommendations.len(),
            planned = steps.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "Routine recommended"
        );

        Ok(RoutineResponse {
            taxonomy_code,
            steps,
            recommendations,
        })
    }
}
