use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use crate::iet::InductionStep;
use crate::label::Label;
use crate::lengths::Lengths;

use super::half_edge::{Contour, HalfEdge, Side};
use super::separatrix::{Orientation, Separatrix};
use super::state::{ComponentState, DecompositionState, Tribool};
use super::Connection;

// TODO: replace with a real heuristic; the reference implementation leaves
// this as a placeholder too.
const BOSHERNITZAN_COST: u32 = 1;

/// The outcome of one call to [`Component::decomposition_step`].
pub enum DecompositionStep {
    LimitReached,
    Cylinder,
    SeparatingConnection { connection: Connection },
    NonSeparatingConnection { connection: Connection },
    Keane,
    WithoutPeriodicTrajectoryBoshernitzan,
    WithoutPeriodicTrajectoryAutoSimilar,
}

/// A handle to one component of a [`super::DynamicalDecomposition`]: either a
/// periodic cylinder, a minimal ("Keane") component, or a component not yet
/// fully classified.
pub struct Component<L: Lengths> {
    pub(crate) decomposition: Rc<RefCell<DecompositionState<L>>>,
    pub(crate) index: usize,
}

impl<L: Lengths> Clone for Component<L> {
    fn clone(&self) -> Self {
        Component { decomposition: Rc::clone(&self.decomposition), index: self.index }
    }
}

impl<L: Lengths> PartialEq for Component<L> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.decomposition, &other.decomposition) && self.index == other.index
    }
}

impl<L: Lengths> Component<L> {
    pub(crate) fn new(decomposition: Rc<RefCell<DecompositionState<L>>>, index: usize) -> Self {
        Component { decomposition, index }
    }

    pub fn top(&self) -> Vec<Label> {
        self.decomposition.borrow().components[self.index].iet.top()
    }

    pub fn bottom(&self) -> Vec<Label> {
        self.decomposition.borrow().components[self.index].iet.bottom()
    }

    pub fn cylinder(&self) -> Tribool {
        self.decomposition.borrow().components[self.index].cylinder
    }

    pub fn without_periodic_trajectory(&self) -> Tribool {
        self.decomposition.borrow().components[self.index].without_periodic_trajectory
    }

    pub fn keane(&self) -> Tribool {
        self.decomposition.borrow().components[self.index].keane
    }

    /// The component's boundary path on top, read left to right.
    pub fn top_contour(&self) -> Vec<HalfEdge> {
        self.top().into_iter().map(|label| HalfEdge::new(self.index, label, Contour::Top)).collect()
    }

    /// The component's boundary path on bottom, read left to right.
    pub fn bottom_contour(&self) -> Vec<HalfEdge> {
        self.bottom().into_iter().map(|label| HalfEdge::new(self.index, label, Contour::Bottom)).collect()
    }

    /// The left boundary of the component: the connections already
    /// registered to the left of its leftmost bottom and top labels, read
    /// top to bottom.
    pub fn left(&self) -> Vec<Side> {
        let state = self.decomposition.borrow();
        let first_bottom = self.bottom()[0];
        let first_top = self.top()[0];
        let mut connections = state.left_at(Contour::Bottom, first_bottom);
        connections.extend(state.left_at(Contour::Top, first_top));
        connections.reverse();
        connections.into_iter().map(Side::from).collect()
    }

    /// The right boundary of the component: the connections already
    /// registered to the right of its rightmost bottom and top labels, read
    /// bottom to top.
    pub fn right(&self) -> Vec<Side> {
        let state = self.decomposition.borrow();
        let last_bottom = *self.bottom().last().unwrap();
        let last_top = *self.top().last().unwrap();
        let mut connections = state.right_at(Contour::Bottom, last_bottom);
        connections.extend(state.right_at(Contour::Top, last_top));
        connections.into_iter().map(Side::from).collect()
    }

    /// One contour (top or bottom) of the perimeter: the contour's
    /// half-edges, interleaved with the connections already registered at
    /// their interior endpoints (the first and last labels are left to
    /// [`Component::left`]/[`Component::right`]). Adjacent connections that
    /// are each other's negation cancel, since the trajectory doubles back
    /// on itself there.
    fn interior(&self, top: bool) -> Vec<Side> {
        let state = self.decomposition.borrow();
        let contour = if top { Contour::Top } else { Contour::Bottom };
        let half_edges = if top { self.top_contour() } else { self.bottom_contour() };

        fn add(result: &mut Vec<Side>, connection: Connection) {
            if let Some(&Side::Connection(last)) = result.last() {
                if last == -connection {
                    result.pop();
                    return;
                }
            }
            result.push(Side::Connection(connection));
        }

        let mut result = Vec::new();
        let last = half_edges.len().saturating_sub(1);
        for (i, edge) in half_edges.iter().enumerate() {
            if i != 0 {
                for connection in state.left_at(contour, edge.label()).into_iter().rev() {
                    add(&mut result, connection);
                }
            }
            result.push(Side::HalfEdge(*edge));
            if i != last {
                for connection in state.right_at(contour, edge.label()) {
                    add(&mut result, connection);
                }
            }
        }
        if top {
            result.reverse();
        }
        result
    }

    /// The full perimeter, read counter-clockwise starting at the bottom
    /// left: bottom contour, right boundary, top contour, left boundary.
    pub fn perimeter(&self) -> Vec<Side> {
        let mut sides = self.interior(false);
        sides.extend(self.right());
        sides.extend(self.interior(true));
        sides.extend(self.left());
        sides
    }

    /// Splices freshly discovered connections into a half-edge's currently
    /// empty left and/or right slots. `left`/`right` are `(source, target)`
    /// label pairs, read in the order they border `at`; each produces a
    /// connection oriented the way that slot requires.
    ///
    /// Precondition: a slot already carrying connections cannot be injected
    /// into again.
    pub fn inject(&self, at: HalfEdge, left: Vec<(Label, Label)>, right: Vec<(Label, Label)>) {
        self.decomposition.borrow().check();

        let top = at.contour() == Contour::Top;
        let mut left = left;
        let mut right = right;
        if top {
            left.reverse();
            right.reverse();
        }

        let mut state = self.decomposition.borrow_mut();
        {
            let existing = state.entry(at.contour(), at.label());
            assert!(left.is_empty() || existing.left.is_empty(), "cannot inject into a side with existing connections");
        }
        for (source, target) in left {
            let first = if top { target } else { source };
            let second = if top { source } else { target };
            let connection =
                Connection::new(Separatrix::new(first, Orientation::Antiparallel), Separatrix::new(second, Orientation::Parallel));
            state.entry(at.contour(), at.label()).left.push(connection);
        }

        {
            let existing = state.entry(at.contour(), at.label());
            assert!(right.is_empty() || existing.right.is_empty(), "cannot inject into a side with existing connections");
        }
        for (source, target) in right {
            let first = if top { target } else { source };
            let second = if top { source } else { target };
            let connection =
                Connection::new(Separatrix::new(first, Orientation::Parallel), Separatrix::new(second, Orientation::Antiparallel));
            state.entry(at.contour(), at.label()).right.push(connection);
        }
        drop(state);

        self.decomposition.borrow().check();
    }

    fn register_separating(&self, right: &Component<L>, bottom_label: Label, top_label: Label) -> Connection {
        let source = {
            let state = self.decomposition.borrow();
            Separatrix::at_bottom(&state, bottom_label)
        };
        let target = {
            let state = self.decomposition.borrow();
            Separatrix::at_top(&state, top_label)
        };
        let connection = Connection::new(source, target);

        let right_bottom_label = right.bottom()[0];
        let mut state = self.decomposition.borrow_mut();
        state.entry(Contour::Bottom, bottom_label).right.push(connection);
        state.entry(Contour::Bottom, right_bottom_label).left.push(-connection);
        drop(state);

        self.decomposition.borrow().check();
        connection
    }

    fn register_non_separating(&self, bottom_label: Label, top_label: Label) -> Connection {
        let source = {
            let state = self.decomposition.borrow();
            Separatrix::at_bottom(&state, bottom_label)
        };
        let target = {
            let state = self.decomposition.borrow();
            Separatrix::at_top(&state, top_label)
        };
        let connection = Connection::new(source, target);

        let first_top = self.top()[0];
        let mut state = self.decomposition.borrow_mut();
        state.entry(Contour::Bottom, bottom_label).right.push(connection);
        state.entry(Contour::Top, first_top).left.insert(0, -connection);

        // `top_label` no longer occurs anywhere in the component's labels
        // once this connection has been registered; fold its connection
        // history into the label that absorbed it.
        let dropped_top = state.remove(Contour::Top, top_label);
        let dropped_bottom = state.remove(Contour::Bottom, top_label);
        let survivor = state.entry(Contour::Bottom, bottom_label);
        survivor.left.extend(dropped_top.left);
        survivor.right.extend(dropped_top.right);
        survivor.left.extend(dropped_bottom.left);
        survivor.right.extend(dropped_bottom.right);
        drop(state);

        self.decomposition.borrow().check();
        connection
    }

    /// Runs up to `limit` rounds of induction, updating this component's
    /// classification flags and registering any saddle connection found.
    ///
    /// Induction proceeds in chunks of [`BOSHERNITZAN_COST`] steps at a time
    /// rather than all at once, retrying until classified or `limit` is spent.
    pub fn decomposition_step(&self, limit: Option<u32>) -> DecompositionStep {
        let step = {
            let mut state = self.decomposition.borrow_mut();
            let iet = &mut state.components[self.index].iet;
            let mut remaining = limit;
            loop {
                let chunk = match remaining {
                    None => BOSHERNITZAN_COST,
                    Some(n) if n < 2 * BOSHERNITZAN_COST => n,
                    Some(_) => BOSHERNITZAN_COST,
                };
                let step = iet.induce(Some(chunk));
                if !matches!(step, InductionStep::LimitReached) {
                    break step;
                }
                match remaining {
                    None => continue,
                    Some(n) if chunk < n => {
                        remaining = Some(n - chunk);
                        continue;
                    }
                    _ => break step,
                }
            }
        };

        match step {
            InductionStep::LimitReached => DecompositionStep::LimitReached,
            InductionStep::Cylinder => {
                let mut state = self.decomposition.borrow_mut();
                let component = &mut state.components[self.index];
                component.cylinder = Tribool::True;
                component.without_periodic_trajectory = Tribool::False;
                component.keane = Tribool::False;
                info!("component decomposed into a cylinder");
                DecompositionStep::Cylinder
            }
            InductionStep::SeparatingConnection { bottom_label, top_label, right } => {
                let right_index = {
                    let mut state = self.decomposition.borrow_mut();
                    state.components.push(ComponentState::new(right));
                    state.components.len() - 1
                };
                let right_component = Component::new(Rc::clone(&self.decomposition), right_index);
                let connection = self.register_separating(&right_component, bottom_label, top_label);
                info!("separating connection split off a new component");
                DecompositionStep::SeparatingConnection { connection }
            }
            InductionStep::NonSeparatingConnection { bottom_label, top_label } => {
                let connection = self.register_non_separating(bottom_label, top_label);
                DecompositionStep::NonSeparatingConnection { connection }
            }
            InductionStep::WithoutPeriodicTrajectoryBoshernitzan | InductionStep::WithoutPeriodicTrajectoryAutoSimilar => {
                let keane = {
                    let state = self.decomposition.borrow();
                    state.components[self.index].iet.boshernitzan_no_saddle_connection_any()
                };
                let mut state = self.decomposition.borrow_mut();
                let component = &mut state.components[self.index];
                component.cylinder = Tribool::False;
                component.without_periodic_trajectory = Tribool::True;
                component.keane = if keane { Tribool::True } else { Tribool::False };
                drop(state);
                if keane {
                    info!("component is minimal (Keane)");
                    DecompositionStep::Keane
                } else if matches!(step, InductionStep::WithoutPeriodicTrajectoryBoshernitzan) {
                    DecompositionStep::WithoutPeriodicTrajectoryBoshernitzan
                } else {
                    DecompositionStep::WithoutPeriodicTrajectoryAutoSimilar
                }
            }
        }
    }

    /// Whether this component's classification is settled: a cylinder or
    /// known to have no periodic trajectory. The default target of
    /// [`Component::decompose`].
    pub fn is_settled(&self) -> bool {
        self.cylinder().is_true() || self.without_periodic_trajectory().is_true()
    }

    /// Keeps decomposing this component until its classification is settled
    /// or the step budget runs out. Returns `false` only in the latter case.
    ///
    /// Newly spawned components from a separating connection are not
    /// recursed into here; they are picked up by
    /// [`super::DynamicalDecomposition::decompose`]'s own worklist.
    pub fn decompose(&self, limit: Option<u32>) -> bool {
        self.decompose_until(Self::is_settled, limit)
    }

    /// Like [`Component::decompose`], but with a caller-chosen termination
    /// predicate in place of [`Component::is_settled`].
    pub fn decompose_until(&self, target: impl Fn(&Component<L>) -> bool, limit: Option<u32>) -> bool {
        while !target(self) {
            if let DecompositionStep::LimitReached = self.decomposition_step(limit) {
                return false;
            }
        }
        true
    }
}
