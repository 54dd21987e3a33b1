//! Decomposes interval exchange transformations into the dynamically
//! meaningful pieces they are built from: periodic cylinders and minimal
//! ("Keane") components with no periodic trajectory, found by accelerated
//! Zorich induction.

pub mod affine;
pub mod decomposition;
pub mod iet;
pub mod label;
pub mod lengths;

pub use affine::{AffineSubspaceError, RationalAffineSubspace};
pub use decomposition::{
    Component, Connection, Contour, DecompositionStep, DynamicalDecomposition, HalfEdge, Orientation, Separatrix, Side, Tribool,
};
pub use iet::{InductionStep, IntervalExchangeTransformation};
pub use label::{Label, LabelAllocator};
pub use lengths::Lengths;
