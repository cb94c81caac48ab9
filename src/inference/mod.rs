//! Document inference: extract metadata from the text of an invoice,
//! receipt or payslip, classify the operation and propose a balanced entry.
//!
//! ```rust
//! use compta_core::inference::DocumentInferenceEngine;
//! use compta_core::EngineConfig;
//!
//! let engine = DocumentInferenceEngine::new(EngineConfig::default());
//! let outcome = engine.infer("Facture Client ABC\nTotal HT 100 000\nTVA 18 000", None, None);
//! assert_eq!(outcome.lines.len(), 3);
//! ```

pub mod classify;
pub mod engine;
pub mod metadata;
pub mod proposal;
pub mod text;

pub use classify::{classify, OperationType};
pub use engine::{DocumentInferenceEngine, InferenceOutcome};
pub use metadata::{extract_metadata, DocType, DocumentMetadata, LineItem, Totals};
pub use proposal::ProposedLine;
