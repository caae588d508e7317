pub mod candidate_pool;
pub mod catalog;
pub mod knowledge_graph;
pub mod planner;
pub mod routine;
pub mod scorer;
pub mod selector;
pub mod taxonomy;
pub mod tokenizer;
pub mod vectorizer;

pub use catalog::{CatalogProvider, HttpCatalogProvider};
pub use knowledge_graph::KnowledgeGraph;
pub use routine::RoutineEngine;
