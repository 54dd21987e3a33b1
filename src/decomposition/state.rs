use std::collections::HashMap;

use crate::iet::IntervalExchangeTransformation;
use crate::label::Label;
use crate::lengths::Lengths;

use super::adapter::LengthsWithConnections;
use super::connection::Connection;
use super::half_edge::Contour;
use super::separatrix::Separatrix;

/// A three-valued classification flag: known true, known false, or not yet
/// determined.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tribool {
    True,
    False,
    Unknown,
}

impl Tribool {
    pub fn is_true(self) -> bool {
        self == Tribool::True
    }

    pub fn is_known(self) -> bool {
        self != Tribool::Unknown
    }
}

/// The connections touching one label's left and right endpoint, on one
/// contour (top or bottom) of a component.
#[derive(Default, Clone)]
pub(crate) struct ConnectionsAtLabel {
    pub left: Vec<Connection>,
    pub right: Vec<Connection>,
}

/// Per-component bookkeeping: its IET over the connection-tracking adapter,
/// and the three dynamical classification flags.
pub(crate) struct ComponentState<L: Lengths> {
    pub iet: IntervalExchangeTransformation<LengthsWithConnections<L>>,
    pub cylinder: Tribool,
    pub without_periodic_trajectory: Tribool,
    pub keane: Tribool,
}

impl<L: Lengths> ComponentState<L> {
    pub(crate) fn new(iet: IntervalExchangeTransformation<LengthsWithConnections<L>>) -> Self {
        ComponentState { iet, cylinder: Tribool::Unknown, without_periodic_trajectory: Tribool::Unknown, keane: Tribool::Unknown }
    }
}

/// The arena backing an entire dynamical decomposition: every component ever
/// created, plus the connection bookkeeping at every label's endpoints.
pub(crate) struct DecompositionState<L: Lengths> {
    pub components: Vec<ComponentState<L>>,
    pub top: HashMap<Label, ConnectionsAtLabel>,
    pub bottom: HashMap<Label, ConnectionsAtLabel>,
}

impl<L: Lengths> DecompositionState<L> {
    pub(crate) fn new() -> Self {
        DecompositionState { components: Vec::new(), top: HashMap::new(), bottom: HashMap::new() }
    }

    fn map(&self, contour: Contour) -> &HashMap<Label, ConnectionsAtLabel> {
        match contour {
            Contour::Top => &self.top,
            Contour::Bottom => &self.bottom,
        }
    }

    fn map_mut(&mut self, contour: Contour) -> &mut HashMap<Label, ConnectionsAtLabel> {
        match contour {
            Contour::Top => &mut self.top,
            Contour::Bottom => &mut self.bottom,
        }
    }

    /// The connections already registered to the left of `label` on
    /// `contour`, or an empty list if `label` has none.
    pub(crate) fn left_at(&self, contour: Contour, label: Label) -> Vec<Connection> {
        self.map(contour).get(&label).map(|c| c.left.clone()).unwrap_or_default()
    }

    /// The connections already registered to the right of `label` on
    /// `contour`, or an empty list if `label` has none.
    pub(crate) fn right_at(&self, contour: Contour, label: Label) -> Vec<Connection> {
        self.map(contour).get(&label).map(|c| c.right.clone()).unwrap_or_default()
    }

    pub(crate) fn entry(&mut self, contour: Contour, label: Label) -> &mut ConnectionsAtLabel {
        self.map_mut(contour).entry(label).or_insert_with(ConnectionsAtLabel::default)
    }

    pub(crate) fn remove(&mut self, contour: Contour, label: Label) -> ConnectionsAtLabel {
        self.map_mut(contour).remove(&label).unwrap_or_default()
    }

    /// Integrity check: every connection's source/target orientation
    /// matches whether it sits in a `left` (antiparallel) or `right`
    /// (parallel) slot, and every separatrix carries at most two
    /// connections, the second always the first's negation.
    pub(crate) fn check(&self) {
        for contour in [Contour::Top, Contour::Bottom] {
            for connections in self.map(contour).values() {
                for &connection in connections.left.iter() {
                    assert!(!connection.parallel(), "a left-slot connection must be antiparallel");
                }
                for &connection in connections.right.iter() {
                    assert!(connection.parallel(), "a right-slot connection must be parallel");
                }
            }
        }

        let mut at_separatrix: HashMap<Separatrix, Vec<Connection>> = HashMap::new();
        for contour in [Contour::Top, Contour::Bottom] {
            for connections in self.map(contour).values() {
                for &connection in connections.left.iter().chain(connections.right.iter()) {
                    at_separatrix.entry(connection.source()).or_default().push(connection);
                    at_separatrix.entry(connection.target()).or_default().push(connection);
                }
            }
        }
        for group in at_separatrix.values() {
            assert!(group.len() <= 2, "a separatrix cannot carry more than two connections");
            if group.len() == 2 {
                assert_eq!(group[0], -group[1], "two connections at the same separatrix must be negations of each other");
            }
        }
    }
}
