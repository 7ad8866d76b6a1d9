//! Error types for model construction, quantification and coverage.

use thiserror::Error;

use crate::element::ElementKind;

/// Errors raised by the modeling engine.
///
/// Every variant is a caller-input defect; nothing here is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An entity of a kind the graph does not store was passed to `update`.
    #[error("graph cannot store {kind} `{name}`: only actors, stores and flows are accepted")]
    UnsupportedKind {
        /// Kind of the rejected entity.
        kind: &'static str,
        /// Display name of the rejected entity.
        name: String,
    },

    /// A reliability figure outside `[0, 1]` or with a zero denominator.
    #[error("invalid reliability {0}: must be an exact fraction in [0, 1]")]
    InvalidReliability(String),

    /// A requirement demanded no security property and the coverage
    /// policy rejects such requirements.
    #[error("requirement #{index} demands no security property")]
    EmptyRequirementTypes {
        /// Position of the requirement in the graph.
        index: usize,
    },

    /// A bound variable has no range to instantiate over.
    #[error("no range supplied for quantified variable `{variable}`")]
    MissingRange {
        /// Name of the variable.
        variable: String,
    },

    /// A range value does not match the variable's declared element type.
    #[error("variable `{variable}` ranges over {expected} but was given {found}")]
    KindMismatch {
        /// Name of the variable.
        variable: String,
        /// Declared element type.
        expected: ElementKind,
        /// Kind of the offending value.
        found: ElementKind,
    },
}
