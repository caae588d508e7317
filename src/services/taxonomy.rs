use crate::models::{Oiliness, Pigmentation, SensitivityAxis, SkinProfile, TaxonomyCode, Texture};

/// Condition tags that mark pigmented skin
const PIGMENTATION_MARKERS: [&str; 2] = ["freckle", "skinredness"];

/// Condition tag that marks wrinkled skin
///
/// Matches the classifier vocabulary as currently wired, which never emits it.
const WRINKLE_MARKER: &str = "wrinke";

/// Derives the 4-axis taxonomy code for a profile
///
/// The oiliness axis is always `Dry`: oily and mixed skin currently share the
/// dry routines. Pure function.
pub fn encode(profile: &SkinProfile) -> TaxonomyCode {
    let oiliness = Oiliness::Dry;

    let sensitivity = if profile.sensitivity.is_sensitive() {
        SensitivityAxis::Sensitive
    } else {
        SensitivityAxis::Resistant
    };

    let pigmentation = if PIGMENTATION_MARKERS
        .iter()
        .any(|marker| profile.has_condition(marker))
    {
        Pigmentation::Pigmented
    } else {
        Pigmentation::NonPigmented
    };

    let texture = if profile.has_condition(WRINKLE_MARKER) {
        Texture::Wrinkled
    } else {
        Texture::Tight
    };

    let code = TaxonomyCode::new(oiliness, sensitivity, pigmentation, texture);
    tracing::debug!(
        skin_type = %profile.skin_type,
        conditions = profile.conditions.len(),
        code = %code,
        "Encoded skin taxonomy"
    );
    code
}
