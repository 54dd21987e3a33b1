use std::ops::Neg;

use super::separatrix::Separatrix;

/// A saddle connection: a straight segment between two singularities,
/// identified by the separatrices whose endpoints it joins.
///
/// Whether the connection is registered in a `left` or `right` slot is
/// determined by its `source` separatrix's own orientation: a connection is
/// `parallel` iff its source is. Negation swaps the endpoints, yielding the
/// same segment traversed the other way; each endpoint keeps its own
/// orientation, so no separate flip is needed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Connection {
    pub(crate) source: Separatrix,
    pub(crate) target: Separatrix,
}

impl Connection {
    pub(crate) fn new(source: Separatrix, target: Separatrix) -> Self {
        Connection { source, target }
    }

    pub fn parallel(&self) -> bool {
        self.source.parallel()
    }

    pub fn source(&self) -> Separatrix {
        self.source
    }

    pub fn target(&self) -> Separatrix {
        self.target
    }
}

impl Neg for Connection {
    type Output = Connection;

    fn neg(self) -> Connection {
        Connection { source: self.target, target: self.source }
    }
}
