use std::ops::Neg;

use crate::label::Label;
use crate::lengths::Lengths;

use super::connection::Connection;
use super::separatrix::Separatrix;
use super::state::DecompositionState;

/// Which occurrence of a label a [`HalfEdge`] names.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Contour {
    Top,
    Bottom,
}

impl Contour {
    fn flip(self) -> Contour {
        match self {
            Contour::Top => Contour::Bottom,
            Contour::Bottom => Contour::Top,
        }
    }
}

/// One item of a component's perimeter: either a live interval occurrence
/// ([`HalfEdge`]) or a saddle connection already registered between two
/// components.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    HalfEdge(HalfEdge),
    Connection(Connection),
}

impl From<HalfEdge> for Side {
    fn from(half_edge: HalfEdge) -> Side {
        Side::HalfEdge(half_edge)
    }
}

impl From<Connection> for Side {
    fn from(connection: Connection) -> Side {
        Side::Connection(connection)
    }
}

/// A position in a component's current top or bottom sequence: the interval
/// occurrence of `label` on `contour`, within the component at `component`.
///
/// Negation crosses to the twin occurrence of the same label on the other
/// contour, matching the reference library's half-edge pairing convention.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct HalfEdge {
    pub(crate) component: usize,
    pub(crate) label: Label,
    pub(crate) contour: Contour,
}

impl HalfEdge {
    pub(crate) fn new(component: usize, label: Label, contour: Contour) -> Self {
        HalfEdge { component, label, contour }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn contour(&self) -> Contour {
        self.contour
    }

    /// The connections already registered to the left of this half-edge.
    pub fn left<L: Lengths>(&self, state: &DecompositionState<L>) -> Vec<Connection> {
        state.left_at(self.contour, self.label)
    }

    /// The connections already registered to the right of this half-edge.
    pub fn right<L: Lengths>(&self, state: &DecompositionState<L>) -> Vec<Connection> {
        state.right_at(self.contour, self.label)
    }

    /// The counter-clockwise chain of sides obtained by crossing this
    /// half-edge: the connections already registered to one side, this
    /// half-edge itself, then the connections registered to the other side
    /// in reverse.
    pub fn cross<L: Lengths>(&self, state: &DecompositionState<L>) -> Vec<Side> {
        let left: Vec<Side> = self.left(state).into_iter().rev().map(Side::from).collect();
        let right: Vec<Side> = self.right(state).into_iter().map(Side::from).collect();
        match self.contour {
            Contour::Top => {
                let mut chain = right;
                chain.push(Side::HalfEdge(*self));
                chain.extend(left);
                chain
            }
            Contour::Bottom => {
                let mut chain = left;
                chain.push(Side::HalfEdge(*self));
                chain.extend(right);
                chain
            }
        }
    }

    /// The next half-edge along the same contour, or `None` at the end.
    pub fn next<L: Lengths>(&self, state: &DecompositionState<L>) -> Option<HalfEdge> {
        let component = &state.components[self.component];
        let labels = match self.contour {
            Contour::Top => component.iet.top(),
            Contour::Bottom => component.iet.bottom(),
        };
        let position = labels.iter().position(|&label| label == self.label)?;
        labels.get(position + 1).map(|&label| HalfEdge::new(self.component, label, self.contour))
    }

    /// The previous half-edge along the same contour, or `None` at the start.
    pub fn previous<L: Lengths>(&self, state: &DecompositionState<L>) -> Option<HalfEdge> {
        let component = &state.components[self.component];
        let labels = match self.contour {
            Contour::Top => component.iet.top(),
            Contour::Bottom => component.iet.bottom(),
        };
        let position = labels.iter().position(|&label| label == self.label)?;
        if position == 0 {
            return None;
        }
        labels.get(position - 1).map(|&label| HalfEdge::new(self.component, label, self.contour))
    }

    /// The separatrix leaving the singularity at the far end of this
    /// half-edge, or `None` if this half-edge is at the end of its contour
    /// (no singularity to leave from yet).
    pub fn separatrix<L: Lengths>(&self, state: &DecompositionState<L>) -> Option<Separatrix> {
        self.next(state)?;
        Some(match self.contour {
            Contour::Top => Separatrix::at_top(state, self.label),
            Contour::Bottom => Separatrix::at_bottom(state, self.label),
        })
    }
}

impl Neg for HalfEdge {
    type Output = HalfEdge;

    /// The twin occurrence of the same label, on the other contour.
    fn neg(self) -> HalfEdge {
        HalfEdge { component: self.component, label: self.label, contour: self.contour.flip() }
    }
}
