//! Routine step planning
//!
//! A static template maps each taxonomy code to its base stage list. Callers
//! always receive an owned copy and extend it per request; the template itself
//! is never mutated.

use crate::error::{AppError, AppResult};

/// Stage appended for codes that get a retinol dose
pub const RETINOL_STAGE: &str = "retinol";
/// Stage appended alongside `acne_scar`
pub const ACNE_TREATMENTS_STAGE: &str = "acne_treatments";
/// Stage appended when at most one condition was detected
pub const GENERAL_STAGE: &str = "general";
/// Condition that also pulls in acne treatments
pub const ACNE_SCAR_CONDITION: &str = "acne_scar";

/// Codes whose routine includes a retinol dose
pub const RETINOL_DOSAGE_CODES: [&str; 3] = ["orpt", "ornt", "ornw"];

static STEPS_BY_TYPE: &[(&str, &[&str])] = &[
    (
        "ospw",
        &["cleansers", "eye_creams", "skin_lightenerv", "sunscreens", "serums", "moisturizers"],
    ),
    (
        "ospt",
        &["cleansers", "toners", "skin_lightener", "acne_treatments", "eye_creams", "sunscreens"],
    ),
    (
        "dspw",
        &["cleansers", "facial_waters", "skin_lightener", "moisturizers", "sunscreens"],
    ),
    ("drnt", &["cleansers", "eye_creams", "sunscreens", "moisturizers"]),
    (
        "osnw",
        &["cleansers", "serums", "oil_control_products", "acne_treatments", "sunscreens"],
    ),
    ("osnt", &["cleansers", "sunscreens", "oil_control_products"]),
    (
        "orpw",
        &[
            "oil_control_products",
            "toners",
            "skin_lightener",
            "sunscreens",
            "moisturizers",
            "wrinkle_prevention",
        ],
    ),
    ("orpt", &["cleansers", "toners", "sunscreens", "skin_lightener"]),
    ("ornw", &["cleansers", "toners", "wrinkle_prevention", "facial_waters"]),
    ("ornt", &["cleansers", "oil_control_products", "sunscreens"]),
    (
        "dspt",
        &["cleansers", "facial_waters", "eye_creams", "skin_lightener", "moisturizers", "eye_cream"],
    ),
    (
        "dsnw",
        &[
            "cleansers",
            "moisturizers",
            "skin_lightener",
            "dark_spot_treatments",
            "sunscreens",
            "eye_creams",
        ],
    ),
    (
        "dsnt",
        &["cleansers", "eye_creams", "facial_waters", "sunscreens", "moisturizers"],
    ),
    (
        "drpw",
        &["cleansers", "eye_creams", "moisturizers", "serums", "moisturizers_night", "sunscreens"],
    ),
    (
        "drpt",
        &["cleansers", "facial_waters", "moisturizers", "sunscreens", "skin_lightener", "eye_creams"],
    ),
    (
        "drnw",
        &["cleansers", "antioxidant_serums", "moisturizers", "eye_creams", "sunscreens"],
    ),
];

/// All codes the template knows about, in declaration order
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    STEPS_BY_TYPE.iter().map(|(code, _)| *code)
}

/// Base stage list for `code`, as a fresh copy
pub fn plan(code: &str) -> AppResult<Vec<String>> {
    STEPS_BY_TYPE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, stages)| stages.iter().map(|s| s.to_string()).collect())
        .ok_or_else(|| AppError::UnknownTaxonomy(code.to_string()))
}

pub fn needs_retinol(code: &str) -> bool {
    RETINOL_DOSAGE_CODES.contains(&code)
}

/// Appends the request-specific stages to a planned list
///
/// Order: retinol dose, then per condition (`acne_treatments` before
/// `acne_scar`, then the condition itself), then `general` when at most one
/// condition was detected.
pub fn apply_dynamic_steps(steps: &mut Vec<String>, code: &str, conditions: &[String]) {
    if needs_retinol(code) {
        steps.push(RETINOL_STAGE.to_string());
    }

    for condition in conditions {
        if condition == ACNE_SCAR_CONDITION {
            steps.push(ACNE_TREATMENTS_STAGE.to_string());
        }
        steps.push(condition.clone());
    }

    if conditions.len() <= 1 {
        steps.push(GENERAL_STAGE.to_string());
    }
}

/// Base plan plus dynamic stages
pub fn plan_routine(code: &str, conditions: &[String]) -> AppResult<Vec<String>> {
    let mut steps = plan(code)?;
    apply_dynamic_steps(&mut steps, code, conditions);
    Ok(steps)
}
