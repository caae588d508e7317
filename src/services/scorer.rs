//! Per-stage affinity models
//!
//! Each routine stage gets a model trained only on that stage's approved
//! products. Every example is a positive: the approved set defines the region
//! a stage's products live in, and candidates are ranked by how close they
//! fall to it. Models live for one request.

use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    models::{ApprovedProducts, Product},
    services::{tokenizer::Tokenize, vectorizer::Vocabulary},
};

/// Weight of the positive class in the training loss
const POSITIVE_WEIGHT: f64 = 2.0;

/// Steepness of the centroid model's squashing function
const CENTROID_GAIN: f64 = 10.0;

/// A trained stage model
pub trait StageModel: Send + Sync {
    /// Affinity in `[0, 1]`
    fn score(&self, vector: &[u32]) -> f64;
}

/// Trains stage models from positive exemplars
pub trait Ranker: Send + Sync {
    fn train(&self, stage: &str, positives: &[Vec<u32>], vocab_size: usize) -> Box<dyn StageModel>;

    fn name(&self) -> &'static str;
}

/// Builds the ranker named in configuration
pub fn ranker_from_name(
    name: &str,
    epochs: usize,
    learning_rate: f64,
) -> anyhow::Result<Box<dyn Ranker>> {
    match name {
        "logistic" => Ok(Box::new(LogisticRanker::new(epochs, learning_rate))),
        "centroid" => Ok(Box::new(CentroidRanker)),
        other => anyhow::bail!("Unknown ranker: {}", other),
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// L2-normalized bag of vocabulary indices; padding and unknown tokens drop out
fn features(vector: &[u32], vocab_size: usize) -> Vec<f64> {
    let mut counts = vec![0.0; vocab_size + 1];
    for &idx in vector {
        let idx = idx as usize;
        if idx != 0 && idx <= vocab_size {
            counts[idx] += 1.0;
        }
    }

    let norm = counts.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm > 0.0 {
        counts.iter_mut().for_each(|c| *c /= norm);
    }
    counts
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ============================================================================
// Logistic affinity
// ============================================================================

/// Single-class logistic model trained by full-batch gradient descent
///
/// Zero-initialized, fixed epoch count, no validation or early stopping.
#[derive(Debug, Clone)]
pub struct LogisticRanker {
    epochs: usize,
    learning_rate: f64,
}

impl LogisticRanker {
    pub fn new(epochs: usize, learning_rate: f64) -> Self {
        Self {
            epochs,
            learning_rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticModel {
    fn logit(&self, x: &[f64]) -> f64 {
        dot(&self.weights, x) + self.bias
    }
}

impl StageModel for LogisticModel {
    fn score(&self, vector: &[u32]) -> f64 {
        let x = features(vector, self.weights.len() - 1);
        sigmoid(self.logit(&x))
    }
}

impl Ranker for LogisticRanker {
    fn train(&self, stage: &str, positives: &[Vec<u32>], vocab_size: usize) -> Box<dyn StageModel> {
        let mut model = LogisticModel {
            weights: vec![0.0; vocab_size + 1],
            bias: 0.0,
        };
        if positives.is_empty() {
            return Box::new(model);
        }

        let examples: Vec<Vec<f64>> = positives.iter().map(|v| features(v, vocab_size)).collect();
        let n = examples.len() as f64;

        for epoch in 0..self.epochs {
            let mut grad_w = vec![0.0; vocab_size + 1];
            let mut grad_b = 0.0;
            let mut loss = 0.0;

            for x in &examples {
                let p = sigmoid(model.logit(x));
                // d/dz of -w * ln(sigmoid(z)) for a positive label
                let g = POSITIVE_WEIGHT * (1.0 - p);
                loss += -POSITIVE_WEIGHT * p.max(f64::MIN_POSITIVE).ln();
                grad_b += g;
                for (gw, xi) in grad_w.iter_mut().zip(x) {
                    *gw += g * xi;
                }
            }

            for (w, gw) in model.weights.iter_mut().zip(&grad_w) {
                *w += self.learning_rate * gw / n;
            }
            model.bias += self.learning_rate * grad_b / n;

            tracing::debug!(stage = %stage, epoch, loss = loss / n, "Stage model epoch");
        }

        Box::new(model)
    }

    fn name(&self) -> &'static str {
        "logistic"
    }
}

// ============================================================================
// Centroid affinity
// ============================================================================

/// Cosine affinity to the mean of the positive exemplars
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidRanker;

#[derive(Debug, Clone)]
pub struct CentroidModel {
    centroid: Vec<f64>,
}

impl StageModel for CentroidModel {
    fn score(&self, vector: &[u32]) -> f64 {
        let x = features(vector, self.centroid.len() - 1);
        sigmoid(CENTROID_GAIN * (dot(&x, &self.centroid) - 0.5))
    }
}

impl Ranker for CentroidRanker {
    fn train(&self, stage: &str, positives: &[Vec<u32>], vocab_size: usize) -> Box<dyn StageModel> {
        let mut centroid = vec![0.0; vocab_size + 1];
        for vector in positives {
            for (c, x) in centroid.iter_mut().zip(features(vector, vocab_size)) {
                *c += x;
            }
        }

        let norm = centroid.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm > 0.0 {
            centroid.iter_mut().for_each(|c| *c /= norm);
        }

        tracing::debug!(stage = %stage, exemplars = positives.len(), "Stage centroid built");
        Box::new(CentroidModel { centroid })
    }

    fn name(&self) -> &'static str {
        "centroid"
    }
}

// ============================================================================
// Per-stage training
// ============================================================================

/// Frozen vocabulary and trained model for one stage
pub struct TrainedStage {
    pub vocabulary: Vocabulary,
    pub model: Box<dyn StageModel>,
}

impl TrainedStage {
    pub fn score(&self, vector: &[u32]) -> f64 {
        self.model.score(vector)
    }
}

/// Trains one model per non-empty stage, stages in parallel
///
/// Stages without approved products get no model.
pub fn train_stages(
    approved: &ApprovedProducts,
    tokenizer: &dyn Tokenize,
    ranker: &dyn Ranker,
    max_len: usize,
) -> AppResult<BTreeMap<String, TrainedStage>> {
    let stages: Vec<(&String, &Vec<Product>)> = approved
        .iter()
        .filter(|(stage, products)| {
            if products.is_empty() {
                tracing::debug!(stage = %stage, "Skipping stage without approved products");
            }
            !products.is_empty()
        })
        .collect();

    let trained = stages
        .par_iter()
        .map(|(stage, products)| {
            let vocabulary = Vocabulary::build(products, tokenizer)?;
            let positives = products
                .iter()
                .map(|p| vocabulary.vectorize(p, tokenizer, max_len))
                .collect::<AppResult<Vec<_>>>()?;
            let model = ranker.train(stage, &positives, vocabulary.len());

            Ok(((*stage).clone(), TrainedStage { vocabulary, model }))
        })
        .collect::<AppResult<Vec<_>>>()?;

    tracing::info!(
        stages = trained.len(),
        ranker = ranker.name(),
        "Stage models trained"
    );
    Ok(trained.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tokenizer::BasicTokenizer;

    fn product(name: &str, ingredients: &[&str]) -> Product {
        Product::new(name, ingredients.iter().map(|s| s.to_string()).collect())
    }

    fn moisturizers() -> Vec<Product> {
        vec![
            product("Vanicream", &["glycerin", "squalane"]),
            product("Eucerin", &["urea", "ceramides", "glycerin"]),
        ]
    }

    fn score_with(ranker: &dyn Ranker, candidate: &Product) -> f64 {
        let products = moisturizers();
        let vocab = Vocabulary::build(&products, &BasicTokenizer).unwrap();
        let positives: Vec<Vec<u32>> = products
            .iter()
            .map(|p| vocab.vectorize(p, &BasicTokenizer, 16).unwrap())
            .collect();
        let model = ranker.train("moisturizers", &positives, vocab.len());
        model.score(&vocab.vectorize(candidate, &BasicTokenizer, 16).unwrap())
    }

    #[test]
    fn test_scores_are_probabilities() {
        let rankers: Vec<Box<dyn Ranker>> =
            vec![Box::new(LogisticRanker::new(5, 0.5)), Box::new(CentroidRanker)];
        let candidates = vec![
            product("empty", &[]),
            product("unknown", &["alcohol denat"]),
            product("close", &["glycerin", "squalane"]),
        ];

        for ranker in &rankers {
            for candidate in &candidates {
                let score = score_with(ranker.as_ref(), candidate);
                assert!((0.0..=1.0).contains(&score), "{} out of range", score);
            }
        }
    }

    #[test]
    fn test_overlap_ranks_above_unrelated() {
        let rankers: Vec<Box<dyn Ranker>> =
            vec![Box::new(LogisticRanker::new(5, 0.5)), Box::new(CentroidRanker)];

        for ranker in &rankers {
            let close = score_with(ranker.as_ref(), &product("close", &["glycerin", "ceramides"]));
            let far = score_with(ranker.as_ref(), &product("far", &["fragrance", "alcohol"]));
            assert!(close > far, "{}: {} <= {}", ranker.name(), close, far);
        }
    }

    #[test]
    fn test_logistic_training_is_deterministic() {
        let candidate = product("c", &["urea", "glycerin"]);
        let ranker = LogisticRanker::new(5, 0.5);
        assert_eq!(score_with(&ranker, &candidate), score_with(&ranker, &candidate));
    }

    #[test]
    fn test_zero_epochs_scores_half() {
        let ranker = LogisticRanker::new(0, 0.5);
        let score = score_with(&ranker, &product("c", &["glycerin"]));
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_train_stages_skips_empty_stages() {
        let mut approved = ApprovedProducts::new();
        approved.insert("moisturizers".to_string(), moisturizers());
        approved.insert("toners".to_string(), Vec::new());

        let ranker = LogisticRanker::new(3, 0.5);
        let trained = train_stages(&approved, &BasicTokenizer, &ranker, 16).unwrap();

        assert_eq!(trained.len(), 1);
        assert!(trained.contains_key("moisturizers"));
        assert_eq!(trained["moisturizers"].vocabulary.len(), 4);
    }

    #[test]
    fn test_ranker_from_name() {
        assert_eq!(ranker_from_name("logistic", 5, 0.5).unwrap().name(), "logistic");
        assert_eq!(ranker_from_name("centroid", 5, 0.5).unwrap().name(), "centroid");
        assert!(ranker_from_name("transformer", 5, 0.5).is_err());
    }
}
