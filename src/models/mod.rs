use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod product;
mod profile;
mod taxonomy;

pub use product::{ApprovedProducts, Product, Recommendation};
pub use profile::{PlanResponse, RoutineRequest, RoutineResponse, Sensitivity, SkinProfile};
pub use taxonomy::{Oiliness, Pigmentation, SensitivityAxis, TaxonomyCode, Texture};

// ============================================================================
// Catalog API Types
// ============================================================================

/// Raw response from the approved-products catalog (`GET ?skyn_type4={code}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCatalogResponse {
    pub data: BTreeMap<String, Vec<ApiCatalogProduct>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCatalogProduct {
    pub name: String,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
}

impl From<ApiCatalogProduct> for Product {
    fn from(api: ApiCatalogProduct) -> Self {
        Product::new(api.name, api.ingredients.unwrap_or_default())
    }
}

impl From<ApiCatalogResponse> for ApprovedProducts {
    fn from(response: ApiCatalogResponse) -> Self {
        response
            .data
            .into_iter()
            .map(|(stage, products)| (stage, products.into_iter().map(Product::from).collect()))
            .collect()
    }
}
