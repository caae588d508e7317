//! Personalized skincare routine assembly.
//!
//! Derives a taxonomy code from classified skin attributes, plans the routine
//! stages, trains a throwaway affinity model per stage on the catalog's
//! approved products, and picks the best knowledge-graph candidate for each
//! stage.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
