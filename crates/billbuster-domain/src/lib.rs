//! BillBuster Domain Layer
//!
//! Core value types shared by every other crate in the workspace, plus the
//! trait seam behind which the point extraction service lives.
//!
//! ## Key Concepts
//!
//! - **Chunk**: A bounded, contiguous slice of a document with overlapping edges
//! - **Point**: A single extracted, attributed legislative provision
//! - **Confidence**: The extractor's own rating of a point (high, medium, low)
//! - **RunId**: Identifier for one pass of the pipeline over one document
//!
//! ## Architecture
//!
//! This crate holds no I/O. Provider implementations live in `billbuster-llm`
//! and the processing pipeline in `billbuster-extractor`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod confidence;
pub mod point;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use confidence::Confidence;
pub use point::{Point, PointType};
pub use run::RunId;
