//! Record behaviors driven by the query boundary.

pub mod guid;

pub use guid::GuidBehavior;
