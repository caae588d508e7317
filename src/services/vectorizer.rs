//! Ingredient lists to fixed-length index vectors

use std::collections::HashMap;

use crate::{error::AppResult, models::Product, services::tokenizer::Tokenize};

/// Index reserved for padding and out-of-vocabulary tokens
pub const UNKNOWN_INDEX: u32 = 0;

/// Token stream of a product: each ingredient lowercased, trimmed and
/// tokenized, concatenated in ingredient order
pub fn product_tokens(product: &Product, tokenizer: &dyn Tokenize) -> AppResult<Vec<String>> {
    let mut tokens = Vec::new();
    for ingredient in &product.ingredients {
        let clean = ingredient.trim().to_lowercase();
        tokens.extend(tokenizer.tokenize(&clean)?);
    }
    Ok(tokens)
}

/// Per-stage token vocabulary
///
/// Indices start at 1 and follow first appearance in the stage's approved
/// products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    index: HashMap<String, u32>,
}

impl Vocabulary {
    pub fn build(products: &[Product], tokenizer: &dyn Tokenize) -> AppResult<Self> {
        let mut vocabulary = Self::default();
        for product in products {
            for token in product_tokens(product, tokenizer)? {
                vocabulary.insert(token);
            }
        }
        Ok(vocabulary)
    }

    fn insert(&mut self, token: String) {
        let next = self.index.len() as u32 + 1;
        self.index.entry(token).or_insert(next);
    }

    pub fn index_of(&self, token: &str) -> u32 {
        self.index.get(token).copied().unwrap_or(UNKNOWN_INDEX)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maps tokens to indices, truncated or zero-padded to exactly `max_len`
    pub fn encode(&self, tokens: &[String], max_len: usize) -> Vec<u32> {
        let mut vector: Vec<u32> = tokens
            .iter()
            .take(max_len)
            .map(|t| self.index_of(t))
            .collect();
        vector.resize(max_len, UNKNOWN_INDEX);
        vector
    }

    pub fn vectorize(
        &self,
        product: &Product,
        tokenizer: &dyn Tokenize,
        max_len: usize,
    ) -> AppResult<Vec<u32>> {
        let tokens = product_tokens(product, tokenizer)?;
        Ok(self.encode(&tokens, max_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tokenizer::BasicTokenizer;

    fn product(ingredients: &[&str]) -> Product {
        Product::new("p", ingredients.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_tokens_are_normalized_and_concatenated() {
        let tokens =
            product_tokens(&product(&["  Hyaluronic Acid ", "GLYCERIN"]), &BasicTokenizer).unwrap();
        assert_eq!(tokens, vec!["hyaluronic", "acid", "glycerin"]);
    }

    #[test]
    fn test_vocabulary_indices_start_at_one_in_encounter_order() {
        let products = vec![
            product(&["ceramides", "hyaluronic acid"]),
            product(&["glycerin", "ceramides"]),
        ];
        let vocab = Vocabulary::build(&products, &BasicTokenizer).unwrap();

        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.index_of("ceramides"), 1);
        assert_eq!(vocab.index_of("hyaluronic"), 2);
        assert_eq!(vocab.index_of("acid"), 3);
        assert_eq!(vocab.index_of("glycerin"), 4);
        assert_eq!(vocab.index_of("retinol"), UNKNOWN_INDEX);
    }

    #[test]
    fn test_vector_length_is_always_max_len() {
        let vocab =
            Vocabulary::build(&[product(&["a b c d e f g h"])], &BasicTokenizer).unwrap();
        let inputs = vec![
            product(&[]),
            product(&["a"]),
            product(&["a b c d e f g h", "a b c d e f g h"]),
        ];

        for max_len in [0, 1, 3, 8, 100] {
            for input in &inputs {
                let vector = vocab.vectorize(input, &BasicTokenizer, max_len).unwrap();
                assert_eq!(vector.len(), max_len);
            }
        }
    }

    #[test]
    fn test_truncates_and_pads() {
        let vocab = Vocabulary::build(&[product(&["a b c"])], &BasicTokenizer).unwrap();

        assert_eq!(
            vocab.vectorize(&product(&["c zz a"]), &BasicTokenizer, 5).unwrap(),
            vec![3, 0, 1, 0, 0]
        );
        assert_eq!(
            vocab.vectorize(&product(&["a b c a"]), &BasicTokenizer, 2).unwrap(),
            vec![1, 2]
        );
    }
}
