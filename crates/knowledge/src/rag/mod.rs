//! Grounded answer synthesis.
//!
//! Every stage except retrieval and generation is a pure function, so
//! stages can be tested without any backend.

pub mod ask;
pub mod citations;
pub mod context;
pub mod definition;
pub mod generate;
pub mod privacy;
pub mod retrieve;
pub mod text;
pub mod types;

pub use ask::AnswerEngine;
pub use generate::DraftState;
pub use types::{
    AllowedCitationSet, AnswerResult, AskParams, EvidencePreview, HealthStatus, RetrievedHit,
    ABSTAIN,
};
