use std::collections::HashSet;

use log::debug;

use crate::label::Label;
use crate::lengths::Lengths;

/// Detects loops in the induction sequence once the SAF invariant vanishes,
/// certifying that an IET has no periodic trajectory without ever finding a
/// saddle connection.
///
/// Holds a snapshot `(bottom positions into top, lengths restricted to the
/// snapshot's labels, period bound, time-to-live)`, per the design note in
/// the specification.
pub(crate) struct SimilarityTracker<L: Lengths> {
    bottom_positions: Vec<usize>,
    lengths: Option<L::Forgotten>,
    ttl: i64,
    period_bound: i64,
}

impl<L: Lengths> SimilarityTracker<L> {
    pub(crate) fn new() -> Self {
        SimilarityTracker {
            bottom_positions: Vec::new(),
            lengths: None,
            ttl: 0,
            period_bound: 1,
        }
    }

    /// Returns `true` iff `(top, bottom)` under `live_lengths` repeats the
    /// last snapshot exactly, up to length ratios. Resets the snapshot and
    /// returns `false` whenever the time-to-live expires.
    pub(crate) fn check_loop(&mut self, top: &[Label], bottom: &[Label], live_lengths: &L) -> bool {
        self.ttl -= 1;
        if self.ttl < 0 {
            self.reset(top, bottom, live_lengths);
            return false;
        }

        if top.len() != self.bottom_positions.len() {
            return false;
        }

        for (i, &b) in bottom.iter().enumerate() {
            match top.iter().position(|&l| l == b) {
                Some(p) if p == self.bottom_positions[i] => {}
                _ => return false,
            }
        }

        let snapshot = match &self.lengths {
            Some(snapshot) => snapshot,
            None => return false,
        };

        for i in 1..top.len() {
            let (a, b) = (top[i - 1], top[i]);
            if !live_lengths.similar(a, b, snapshot, a, b) {
                return false;
            }
        }

        true
    }

    fn reset(&mut self, top: &[Label], bottom: &[Label], live_lengths: &L) {
        debug!("similarity tracker reset, doubling period bound to {}", self.period_bound * 2);
        let labels: HashSet<Label> = top.iter().cloned().collect();
        self.lengths = Some(live_lengths.only(&labels));
        self.bottom_positions = bottom
            .iter()
            .map(|&b| {
                top.iter()
                    .position(|&l| l == b)
                    .expect("bottom label must appear in the matching top permutation")
            })
            .collect();
        self.ttl = self.period_bound;
        self.period_bound *= 2;
    }
}
