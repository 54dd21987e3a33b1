use std::ops::Neg;

use crate::label::Label;
use crate::lengths::Lengths;

use super::half_edge::Contour;
use super::state::DecompositionState;

/// Whether a separatrix runs the same way around its component as the
/// connection it terminates (`Parallel`) or the opposite way
/// (`Antiparallel`). Negating a connection swaps its endpoints, each
/// keeping its own orientation, so the two ends need not agree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    Parallel,
    Antiparallel,
}

impl Orientation {
    fn flip(self) -> Orientation {
        match self {
            Orientation::Parallel => Orientation::Antiparallel,
            Orientation::Antiparallel => Orientation::Parallel,
        }
    }
}

/// A separatrix: a vertical trajectory emanating from a singularity,
/// identified by the label it currently starts from and the direction it
/// leaves in. Unlike a [`super::HalfEdge`], a separatrix is not tied to any
/// particular component: following the connections already registered at a
/// label can walk it across component boundaries created by earlier
/// induction steps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Separatrix {
    pub(crate) label: Label,
    pub(crate) orientation: Orientation,
}

impl Separatrix {
    pub(crate) fn new(label: Label, orientation: Orientation) -> Self {
        Separatrix { label, orientation }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn parallel(&self) -> bool {
        self.orientation == Orientation::Parallel
    }

    /// The separatrix leaving the top of `label`, found by walking the
    /// connections already registered to the right of `label` on top,
    /// from the outermost inward.
    pub(crate) fn at_top<L: Lengths>(state: &DecompositionState<L>, label: Label) -> Separatrix {
        let mut separatrix = Separatrix::new(label, Orientation::Antiparallel);
        for connection in state.right_at(Contour::Top, label).into_iter().rev() {
            separatrix.label = connection.source.label;
        }
        separatrix
    }

    /// The separatrix leaving the bottom of `label`, found by walking the
    /// connections already registered to the right of `label` on bottom.
    pub(crate) fn at_bottom<L: Lengths>(state: &DecompositionState<L>, label: Label) -> Separatrix {
        let mut separatrix = Separatrix::new(label, Orientation::Parallel);
        for connection in state.right_at(Contour::Bottom, label).into_iter() {
            separatrix.label = connection.target.label;
        }
        separatrix
    }
}

impl Neg for Separatrix {
    type Output = Separatrix;

    /// The same singularity approached from the other side.
    fn neg(self) -> Separatrix {
        Separatrix { label: self.label, orientation: self.orientation.flip() }
    }
}
