//! Decomposes an interval exchange transformation into the periodic
//! cylinders and minimal components it is built from, tracking the saddle
//! connections discovered along the way.

mod adapter;
mod component;
mod connection;
mod half_edge;
mod separatrix;
mod state;

use std::cell::RefCell;
use std::rc::Rc;

use crate::iet::IntervalExchangeTransformation;
use crate::label::Label;
use crate::lengths::Lengths;

use adapter::LengthsWithConnections;
use state::{ComponentState, ConnectionsAtLabel, DecompositionState};

pub use component::{Component, DecompositionStep};
pub use connection::Connection;
pub use half_edge::{Contour, HalfEdge, Side};
pub use separatrix::{Orientation, Separatrix};
pub use state::Tribool;

/// Owns every component an interval exchange transformation has been split
/// into so far, and the connection bookkeeping between them.
pub struct DynamicalDecomposition<L: Lengths> {
    state: Rc<RefCell<DecompositionState<L>>>,
}

impl<L: Lengths> DynamicalDecomposition<L> {
    /// Starts a decomposition from a single component over `top`/`bottom`
    /// with the given `lengths`.
    pub fn new(lengths: L, top: Vec<Label>, bottom: Vec<Label>) -> Self {
        let state = Rc::new(RefCell::new(DecompositionState::new()));
        let adapter = LengthsWithConnections::new(lengths, Rc::downgrade(&state));
        let iet = IntervalExchangeTransformation::new(Rc::new(RefCell::new(adapter)), top.clone(), bottom.clone());

        let mut initial = state.borrow_mut();
        initial.components.push(ComponentState::new(iet));
        for &label in top.iter().chain(bottom.iter()) {
            initial.top.entry(label).or_insert_with(ConnectionsAtLabel::default);
            initial.bottom.entry(label).or_insert_with(ConnectionsAtLabel::default);
        }
        drop(initial);

        DynamicalDecomposition { state }
    }

    /// Every component created so far, in creation order.
    pub fn components(&self) -> Vec<Component<L>> {
        let count = self.state.borrow().components.len();
        (0..count).map(|i| Component::new(Rc::clone(&self.state), i)).collect()
    }

    /// Decomposes every component (including ones discovered along the way)
    /// up to `limit` induction steps each. Returns `false` if any component's
    /// step budget ran out before it could be classified.
    pub fn decompose(&self, limit: Option<u32>) -> bool {
        let mut i = 0;
        loop {
            let count = self.state.borrow().components.len();
            if i >= count {
                return true;
            }
            let component = Component::new(Rc::clone(&self.state), i);
            if !component.decompose(limit) {
                return false;
            }
            i += 1;
        }
    }
}
