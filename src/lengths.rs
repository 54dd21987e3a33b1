use std::cmp::Ordering;
use std::collections::HashSet;

use num_rational::BigRational;

use crate::label::Label;

/// The length backend an [`crate::iet::IntervalExchangeTransformation`] is built on.
///
/// Implementations are supplied by the caller: this crate never constructs
/// one itself, only the adapter in [`crate::decomposition::adapter`] wraps one.
/// All mutating operations act on an internal accumulator stack of pushed
/// labels, whose logical value is the sum of their lengths.
pub trait Lengths {
    /// The opaque, value-comparable length type returned by [`Lengths::get`].
    type Value: PartialEq + Clone;

    /// The type produced by [`Lengths::forget`] and [`Lengths::only`]: the
    /// same backend with any wrapper state stripped away. Implementations
    /// that are not themselves wrappers set `Forgotten = Self`.
    type Forgotten: Lengths<Value = Self::Value>;

    /// Pushes `label` onto the accumulator.
    fn push(&mut self, label: Label);

    /// Pops the top label off the accumulator. Precondition: non-empty.
    fn pop(&mut self);

    /// Empties the accumulator.
    fn clear(&mut self);

    /// Sign of `sum(accumulator) - length(label)`.
    fn cmp_accumulator(&self, label: Label) -> Ordering;

    /// Sign of `length(a) - length(b)`.
    fn cmp(&self, a: Label, b: Label) -> Ordering;

    /// `length(label) -= sum(accumulator)`, then clears the accumulator.
    /// Postcondition: the result is strictly positive.
    fn subtract(&mut self, label: Label);

    /// Floor-divides `length(label)` by `sum(accumulator)` and subtracts that
    /// many whole copies of the accumulator's sum from `length(label)`.
    /// Then, without subtracting anything further, scans the accumulator
    /// from its first pushed label and returns the first one whose inclusion
    /// would make the running sum exceed the new (residual) `length(label)`.
    /// Clears the accumulator.
    fn subtract_repeated(&mut self, label: Label) -> Label;

    /// Each label's length as a rational-coefficient vector in a common basis.
    fn coefficients(&self, labels: &[Label]) -> Vec<Vec<BigRational>>;

    /// The length of `label`.
    fn get(&self, label: Label) -> Self::Value;

    /// A copy retaining only the given labels (others zeroed).
    fn only(&self, labels: &HashSet<Label>) -> Self::Forgotten;

    /// A copy without any wrapper state, used to break reference cycles when
    /// snapshotting (see [`crate::iet::similarity::SimilarityTracker`]).
    fn forget(&self) -> Self::Forgotten;

    /// Projective equality: `length(a) * other.length(bb) == length(b) * other.length(aa)`.
    fn similar(&self, a: Label, b: Label, other: &Self::Forgotten, aa: Label, bb: Label) -> bool;

    /// A short textual name for `label`, used only for display.
    fn render(&self, label: Label) -> String;
}
