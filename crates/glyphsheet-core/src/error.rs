use std::fmt;

/// Which side of a [`Correspondence`](crate::Correspondence) a quad belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadRole {
    /// Corners picked on the scanned page.
    Source,
    /// Reference corners in the canonical sheet frame.
    Target,
}

impl fmt::Display for QuadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadRole::Source => f.write_str("source"),
            QuadRole::Target => f.write_str("target"),
        }
    }
}

/// Errors raised while deriving the page rectification.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{role} quadrilateral is degenerate (three corners are collinear or coincide)")]
    DegenerateQuad { role: QuadRole },
    #[error("projective system is singular")]
    Singular,
    #[error("projective transform contains non-finite coefficients")]
    NonFinite,
}
