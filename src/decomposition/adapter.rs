use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Weak;

use num_rational::BigRational;

use crate::label::Label;
use crate::lengths::Lengths;

use super::state::{ConnectionsAtLabel, DecompositionState};

/// Wraps a caller-supplied [`Lengths`] so that whenever induction merges the
/// label `minuend` away, the connections registered at its endpoints move
/// over to whichever label absorbed it.
///
/// Mirrors the accumulator of the wrapped backend so it can tell, once a
/// `subtract`/`subtract_repeated` call lands, which label was first pushed
/// (the one `minuend` is being merged into).
pub struct LengthsWithConnections<L: Lengths> {
    inner: L,
    stack: Vec<Label>,
    decomposition: Weak<RefCell<DecompositionState<L>>>,
}

impl<L: Lengths> LengthsWithConnections<L> {
    pub(crate) fn new(inner: L, decomposition: Weak<RefCell<DecompositionState<L>>>) -> Self {
        LengthsWithConnections { inner, stack: Vec::new(), decomposition }
    }

    /// Whether some live component currently has `label` as the very first
    /// (leftmost) label on its top, unswapped. Determines which endpoint map
    /// (top or bottom) the connections at `label` live in.
    fn label_leads_on_top(&self, label: Label) -> bool {
        let decomposition = match self.decomposition.upgrade() {
            Some(d) => d,
            None => return false,
        };
        let state = decomposition.borrow();
        state
            .components
            .iter()
            .any(|c| !c.iet.swapped() && c.iet.top().first() == Some(&label))
    }

    /// Transplants the connections registered at `minuend`'s endpoints onto
    /// `subtrahend`, the label that is taking over as the active boundary.
    /// Both of `minuend`'s `left` lists (top and bottom) move into whichever
    /// of `subtrahend`'s `left` lists matches `minuend`'s current role:
    /// `bottom.left` if `minuend` currently leads on top, `top.left`
    /// otherwise, appended when `minuend` leads on top and prepended when it
    /// does not, so the lists stay read in the same rotational direction as
    /// the perimeter they describe.
    fn move_connections(&mut self, minuend: Label, subtrahend: Label) {
        let decomposition = match self.decomposition.upgrade() {
            Some(d) => d,
            None => return,
        };
        let minuend_on_top = self.label_leads_on_top(minuend);
        let mut state = decomposition.borrow_mut();

        let top_minuend = state.top.remove(&minuend).unwrap_or_default();
        let bottom_minuend = state.bottom.remove(&minuend).unwrap_or_default();

        let target_map = if minuend_on_top { &mut state.bottom } else { &mut state.top };
        let target = target_map.entry(subtrahend).or_insert_with(ConnectionsAtLabel::default);
        if minuend_on_top {
            target.left.extend(top_minuend.left);
            target.left.extend(bottom_minuend.left);
        } else {
            let mut left = top_minuend.left;
            left.extend(bottom_minuend.left);
            left.extend(std::mem::take(&mut target.left));
            target.left = left;
        }
    }
}

impl<L: Lengths> Lengths for LengthsWithConnections<L> {
    type Value = L::Value;
    type Forgotten = L::Forgotten;

    fn push(&mut self, label: Label) {
        self.stack.push(label);
        self.inner.push(label);
    }

    fn pop(&mut self) {
        self.stack.pop();
        self.inner.pop();
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.inner.clear();
    }

    fn cmp_accumulator(&self, label: Label) -> Ordering {
        self.inner.cmp_accumulator(label)
    }

    fn cmp(&self, a: Label, b: Label) -> Ordering {
        self.inner.cmp(a, b)
    }

    fn subtract(&mut self, minuend: Label) {
        self.inner.subtract(minuend);
        if let Some(&subtrahend) = self.stack.first() {
            self.move_connections(minuend, subtrahend);
        }
        self.stack.clear();
    }

    fn subtract_repeated(&mut self, minuend: Label) -> Label {
        let stop = self.inner.subtract_repeated(minuend);
        if let Some(&first) = self.stack.first() {
            if first != stop {
                self.move_connections(minuend, first);
            }
        }
        self.stack.clear();
        stop
    }

    fn coefficients(&self, labels: &[Label]) -> Vec<Vec<BigRational>> {
        self.inner.coefficients(labels)
    }

    fn get(&self, label: Label) -> Self::Value {
        self.inner.get(label)
    }

    fn only(&self, labels: &HashSet<Label>) -> Self::Forgotten {
        self.inner.only(labels)
    }

    fn forget(&self) -> Self::Forgotten {
        self.inner.forget()
    }

    fn similar(&self, a: Label, b: Label, other: &Self::Forgotten, aa: Label, bb: Label) -> bool {
        self.inner.similar(a, b, other, aa, bb)
    }

    fn render(&self, label: Label) -> String {
        self.inner.render(label)
    }
}
