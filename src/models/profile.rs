use serde::{Deserialize, Serialize};

use super::{Product, TaxonomyCode};
use crate::error::{AppError, AppResult};
use std::collections::BTreeMap;

/// Sensitivity indicator as reported by the upstream classifiers
///
/// Only the literal string `"true"` marks sensitive skin; a JSON boolean
/// `true` does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sensitivity {
    Text(String),
    Flag(bool),
}

impl Sensitivity {
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Sensitivity::Text(value) if value == "true")
    }
}

/// Already-classified skin attributes for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinProfile {
    pub skin_type: String,
    pub sensitivity: Sensitivity,
    /// Detected condition tags, in classifier order
    pub conditions: Vec<String>,
}

impl SkinProfile {
    pub fn has_condition(&self, tag: &str) -> bool {
        self.conditions.iter().any(|c| c == tag)
    }
}

/// Inbound routine request
///
/// Every field is optional at the wire level so that missing attributes can
/// be reported by name instead of as a generic body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutineRequest {
    #[serde(default, alias = "skyn_type")]
    pub skin_type: Option<String>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default, alias = "sensitivity")]
    pub is_sensitive: Option<Sensitivity>,
}

impl RoutineRequest {
    /// Validates presence of every attribute and builds the profile
    pub fn into_profile(self) -> AppResult<SkinProfile> {
        let mut missing = Vec::new();
        if self.skin_type.is_none() {
            missing.push("skin_type");
        }
        if self.conditions.is_none() {
            missing.push("conditions");
        }
        if self.is_sensitive.is_none() {
            missing.push("is_sensitive");
        }

        match (self.skin_type, self.conditions, self.is_sensitive) {
            (Some(skin_type), Some(conditions), Some(sensitivity)) => Ok(SkinProfile {
                skin_type,
                sensitivity,
                conditions,
            }),
            _ => Err(AppError::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Planned routine without product selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanResponse {
    pub taxonomy_code: TaxonomyCode,
    pub steps: Vec<String>,
}

/// Full routine with one selected product per scored stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineResponse {
    pub taxonomy_code: TaxonomyCode,
    pub steps: Vec<String>,
    pub recommendations: BTreeMap<String, Product>,
}
