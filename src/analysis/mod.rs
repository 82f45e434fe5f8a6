//! Tiered document analysis.

mod dispatcher;
pub mod parser;

pub use dispatcher::AnalysisDispatcher;
pub use parser::parse_structured;
