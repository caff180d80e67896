mod inference;
mod merge;
mod store;

pub mod export;
pub mod render;

pub use export::{export, GraphExport, RenderData};
pub use inference::{relation_for, InferenceMode, InferenceReport};
pub use merge::MergeReport;
pub use render::{render_html, write_html};
pub use store::{GraphStats, KnowledgeGraph};
