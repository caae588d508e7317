use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name given to synthetic exemplar products injected into the approved set
pub const PLACEHOLDER_NAME: &str = "name";

/// A skincare product and its ingredient list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub ingredients: Vec<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ingredients,
        }
    }

    /// Synthetic exemplar carrying only an ingredient signal
    pub fn placeholder<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

/// Routine stage -> positive exemplar products for that stage
pub type ApprovedProducts = BTreeMap<String, Vec<Product>>;

/// Routine stage -> selected product
pub type Recommendation = BTreeMap<String, Product>;
