use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::HashSet;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use intervalxt::{DynamicalDecomposition, Label, LabelAllocator, Lengths, Tribool};

/// A [`Lengths`] backend over fixed rational constants, used to drive whole
/// decompositions end to end without committing to any particular
/// polynomial or algebraic length representation.
#[derive(Clone)]
struct ConstantLengths {
    values: HashMap<Label, BigRational>,
    accumulator: Vec<Label>,
}

impl ConstantLengths {
    fn new(values: HashMap<Label, BigRational>) -> Self {
        ConstantLengths { values, accumulator: Vec::new() }
    }

    fn accumulated(&self) -> BigRational {
        self.accumulator.iter().map(|l| self.values[l].clone()).sum()
    }
}

impl Lengths for ConstantLengths {
    type Value = BigRational;
    type Forgotten = ConstantLengths;

    fn push(&mut self, label: Label) {
        self.accumulator.push(label);
    }

    fn pop(&mut self) {
        self.accumulator.pop();
    }

    fn clear(&mut self) {
        self.accumulator.clear();
    }

    fn cmp_accumulator(&self, label: Label) -> Ordering {
        self.accumulated().cmp(&self.values[&label])
    }

    fn cmp(&self, a: Label, b: Label) -> Ordering {
        self.values[&a].cmp(&self.values[&b])
    }

    fn subtract(&mut self, label: Label) {
        let acc = self.accumulated();
        *self.values.get_mut(&label).unwrap() -= acc;
        self.accumulator.clear();
    }

    fn subtract_repeated(&mut self, label: Label) -> Label {
        let period = self.accumulated();
        let floor = (&self.values[&label] / &period).trunc();
        *self.values.get_mut(&label).unwrap() -= &floor * &period;

        let mut running = BigRational::zero();
        for l in self.accumulator.clone() {
            let next = &running + &self.values[&l];
            if next > self.values[&label] {
                self.accumulator.clear();
                return l;
            }
            running = next;
        }
        unreachable!("accumulator must exceed the residual length by construction")
    }

    fn coefficients(&self, labels: &[Label]) -> Vec<Vec<BigRational>> {
        labels.iter().map(|l| vec![self.values[l].clone()]).collect()
    }

    fn get(&self, label: Label) -> BigRational {
        self.values[&label].clone()
    }

    fn only(&self, labels: &HashSet<Label>) -> Self {
        ConstantLengths::new(
            self.values
                .iter()
                .map(|(l, v)| (*l, if labels.contains(l) { v.clone() } else { BigRational::zero() }))
                .collect(),
        )
    }

    fn forget(&self) -> Self {
        ConstantLengths::new(self.values.clone())
    }

    fn similar(&self, a: Label, b: Label, other: &Self, aa: Label, bb: Label) -> bool {
        &self.values[&a] * &other.values[&bb] == &self.values[&b] * &other.values[&aa]
    }

    fn render(&self, label: Label) -> String {
        format!("{:?}={}", label, self.values[&label])
    }
}

fn rat(n: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(1))
}

fn sqrt2_approx() -> BigRational {
    BigRational::new(BigInt::from(14142135623730951i64), BigInt::from(10000000000000000i64))
}

/// A [`Lengths`] backend over the rank-2 field `Q(sqrt(2))`: each length is
/// an exact `(p, q)` pair meaning `p + q*sqrt(2)`. Used to drive a
/// decomposition whose SAF invariant genuinely lives in a two-dimensional
/// coefficient space, unlike [`ConstantLengths`]'s single rational per label.
#[derive(Clone)]
struct QuadraticLengths {
    values: HashMap<Label, (BigRational, BigRational)>,
    accumulator: Vec<Label>,
}

impl QuadraticLengths {
    fn new(values: HashMap<Label, (BigRational, BigRational)>) -> Self {
        QuadraticLengths { values, accumulator: Vec::new() }
    }

    fn embed(pair: &(BigRational, BigRational)) -> BigRational {
        &pair.0 + &pair.1 * sqrt2_approx()
    }

    fn accumulated(&self) -> (BigRational, BigRational) {
        let mut sum = (BigRational::zero(), BigRational::zero());
        for l in &self.accumulator {
            let v = &self.values[l];
            sum.0 += &v.0;
            sum.1 += &v.1;
        }
        sum
    }
}

impl Lengths for QuadraticLengths {
    type Value = BigRational;
    type Forgotten = QuadraticLengths;

    fn push(&mut self, label: Label) {
        self.accumulator.push(label);
    }

    fn pop(&mut self) {
        self.accumulator.pop();
    }

    fn clear(&mut self) {
        self.accumulator.clear();
    }

    fn cmp_accumulator(&self, label: Label) -> Ordering {
        Self::embed(&self.accumulated()).cmp(&Self::embed(&self.values[&label]))
    }

    fn cmp(&self, a: Label, b: Label) -> Ordering {
        Self::embed(&self.values[&a]).cmp(&Self::embed(&self.values[&b]))
    }

    fn subtract(&mut self, label: Label) {
        let acc = self.accumulated();
        let v = self.values.get_mut(&label).unwrap();
        v.0 -= acc.0;
        v.1 -= acc.1;
        self.accumulator.clear();
    }

    fn subtract_repeated(&mut self, label: Label) -> Label {
        let period = self.accumulated();
        let period_value = Self::embed(&period);
        let floor = (Self::embed(&self.values[&label]) / &period_value).trunc();
        {
            let v = self.values.get_mut(&label).unwrap();
            v.0 -= &floor * &period.0;
            v.1 -= &floor * &period.1;
        }
        let residual = Self::embed(&self.values[&label]);
        let mut running = BigRational::zero();
        for l in self.accumulator.clone() {
            running += Self::embed(&self.values[&l]);
            if running > residual {
                self.accumulator.clear();
                return l;
            }
        }
        unreachable!("accumulator must exceed the residual length by construction")
    }

    fn coefficients(&self, labels: &[Label]) -> Vec<Vec<BigRational>> {
        labels
            .iter()
            .map(|l| {
                let v = &self.values[l];
                vec![v.0.clone(), v.1.clone()]
            })
            .collect()
    }

    fn get(&self, label: Label) -> BigRational {
        Self::embed(&self.values[&label])
    }

    fn only(&self, labels: &HashSet<Label>) -> Self {
        QuadraticLengths::new(
            self.values
                .iter()
                .map(|(l, v)| (*l, if labels.contains(l) { v.clone() } else { (BigRational::zero(), BigRational::zero()) }))
                .collect(),
        )
    }

    fn forget(&self) -> Self {
        QuadraticLengths::new(self.values.clone())
    }

    fn similar(&self, a: Label, b: Label, other: &Self, aa: Label, bb: Label) -> bool {
        Self::embed(&self.values[&a]) * Self::embed(&other.values[&bb]) == Self::embed(&self.values[&b]) * Self::embed(&other.values[&aa])
    }

    fn render(&self, label: Label) -> String {
        let v = &self.values[&label];
        format!("{:?}={}+{}*sqrt2", label, v.0, v.1)
    }
}

#[test]
fn quadratic_lengths_settle_every_component_with_independent_total_lengths() {
    let mut alloc = LabelAllocator::new();
    let a = alloc.next();
    let b = alloc.next();
    let c = alloc.next();
    let mut values = HashMap::new();
    values.insert(a, (rat(1), rat(0)));
    values.insert(b, (rat(0), rat(1)));
    values.insert(c, (rat(1), rat(1)));
    let lengths = QuadraticLengths::new(values);

    // A full reversal: no two consecutive prefixes ever coincide as sets
    // before the whole component does, so this never splits; its fate is
    // decided entirely by induction against genuinely two-dimensional
    // lengths.
    let decomposition = DynamicalDecomposition::new(lengths, vec![a, b, c], vec![c, b, a]);
    assert!(decomposition.decompose(Some(500)));

    let components = decomposition.components();
    for component in &components {
        assert!(component.is_settled());
        assert_ne!(component.cylinder().is_true(), component.without_periodic_trajectory().is_true());
    }
}

#[test]
fn identity_permutation_decomposes_into_two_cylinders() {
    let mut alloc = LabelAllocator::new();
    let a = alloc.next();
    let b = alloc.next();
    let mut values = HashMap::new();
    values.insert(a, rat(2));
    values.insert(b, rat(5));
    let lengths = ConstantLengths::new(values);

    let decomposition = DynamicalDecomposition::new(lengths, vec![a, b], vec![a, b]);
    assert!(decomposition.decompose(None));

    let components = decomposition.components();
    assert_eq!(components.len(), 2);
    for component in &components {
        assert_eq!(component.cylinder(), Tribool::True);
        assert_eq!(component.top().len(), 1);
    }
}

#[test]
fn two_interval_swap_with_equal_total_length_is_a_single_cylinder() {
    let mut alloc = LabelAllocator::new();
    let a = alloc.next();
    let b = alloc.next();
    let mut values = HashMap::new();
    values.insert(a, rat(3));
    values.insert(b, rat(3));
    let lengths = ConstantLengths::new(values);

    let decomposition = DynamicalDecomposition::new(lengths, vec![a, b], vec![b, a]);
    assert!(decomposition.decompose(None));

    let components = decomposition.components();
    assert!(components.iter().any(|c| c.cylinder() == Tribool::True));
    for component in &components {
        assert_ne!(component.cylinder(), Tribool::Unknown);
    }
}

#[test]
fn three_interval_identity_decomposes_into_three_cylinders() {
    let mut alloc = LabelAllocator::new();
    let a = alloc.next();
    let b = alloc.next();
    let c = alloc.next();
    let mut values = HashMap::new();
    values.insert(a, rat(1));
    values.insert(b, rat(4));
    values.insert(c, rat(9));
    let lengths = ConstantLengths::new(values);

    let decomposition = DynamicalDecomposition::new(lengths, vec![a, b, c], vec![a, b, c]);
    assert!(decomposition.decompose(Some(100)));

    let components = decomposition.components();
    assert_eq!(components.len(), 3);
    assert!(components.iter().all(|c| c.cylinder() == Tribool::True));
}
