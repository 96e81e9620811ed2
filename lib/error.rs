//! Error types.

use thiserror::Error;

/// Returned when a derived operator needs a construction parameter that was
/// never supplied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum HamiltonianError {
    /// A dipole operator was requested, but no transition dipoles were given.
    #[error("transition dipoles undefined")]
    MissingDipoles,

    /// System-bath coupling operators were requested, but no bath was given.
    #[error("bath undefined")]
    MissingBath,
}

/// Returned when a manifold, transition, or polarization label cannot be
/// parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid manifold tag '{0}': expected one of 'g', 'e', 'f'")]
    ManifoldTag(char),

    #[error("empty manifold")]
    EmptyManifold,

    #[error("invalid transition tag '{0}': expected '-' or '+'")]
    TransitionTag(char),

    #[error("empty transition set")]
    EmptyTransitions,

    #[error("invalid polarization '{0}': expected 'x', 'y', or 'z'")]
    Polarization(String),
}
