//! Linear system interface used by the layout compiler
//!
//! The compiler only talks to [`LinearSystem`]. Backends implement the
//! handful of primitive methods; every higher level primitive (centering,
//! ratio, barriers, weighted match dimensions) is a provided method that
//! builds [`Row`]s, so all backends share the same arithmetic.

mod cassowary;

use std::fmt;

use thiserror::Error;

use super::types::AnchorRef;

pub use cassowary::CassowarySystem;

/// Handle of a variable inside a [`LinearSystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Priority of a row when rows conflict, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Strength {
    #[default]
    None,
    Low,
    Medium,
    High,
    Highest,
    Equality,
    Barrier,
    Centering,
    /// Must hold
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `terms + constant == 0`
    Eq,
    /// `terms + constant >= 0`
    Ge,
    /// `terms + constant <= 0`
    Le,
}

/// One linear relation over solver variables
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
    pub relation: Relation,
}

impl Row {
    pub fn new(relation: Relation) -> Self {
        Self {
            terms: Vec::new(),
            constant: 0.0,
            relation,
        }
    }

    pub fn term(mut self, var: VarId, coefficient: f64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    pub fn constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Left-hand side under a given assignment
    pub fn evaluate(&self, value: impl Fn(VarId) -> f64) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * value(*var))
            .sum::<f64>()
            + self.constant
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (var, coefficient)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(if *coefficient < 0.0 { " - " } else { " + " })?;
            } else if *coefficient < 0.0 {
                f.write_str("-")?;
            }
            write!(f, "{}*{}", coefficient.abs(), var)?;
        }
        if self.constant != 0.0 {
            let sign = if self.constant < 0.0 { "-" } else { "+" };
            write!(f, " {} {}", sign, self.constant.abs())?;
        }
        let relation = match self.relation {
            Relation::Eq => "==",
            Relation::Ge => ">=",
            Relation::Le => "<=",
        };
        write!(f, " {} 0", relation)
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("unsatisfiable constraint: {row}")]
    Unsatisfiable { row: String },

    #[error("internal solver error: {0}")]
    Internal(String),
}

/// The solver contract consumed by the layout compiler
pub trait LinearSystem {
    /// Drop every row and variable
    fn reset(&mut self);

    /// The variable of an anchor, created on first use
    fn anchor_variable(&mut self, anchor: AnchorRef) -> VarId;

    /// An anonymous variable
    fn create_variable(&mut self) -> VarId;

    fn add_row(&mut self, row: Row, strength: Strength);

    /// Pin a variable to a known value
    fn set_final(&mut self, var: VarId, value: i32);

    fn is_final(&self, var: VarId) -> bool;

    fn minimize(&mut self) -> Result<(), SolverError>;

    /// Solved value rounded to the nearest integer
    fn value(&self, var: VarId) -> i32;

    /// Number of rows accepted since the last reset
    fn row_count(&self) -> usize;

    /// `a == b + margin`
    fn add_equality(&mut self, a: VarId, b: VarId, margin: i32, strength: Strength) {
        let row = Row::new(Relation::Eq)
            .term(a, 1.0)
            .term(b, -1.0)
            .constant(-f64::from(margin));
        self.add_row(row, strength);
    }

    /// `a == value`, always required
    fn add_equality_constant(&mut self, a: VarId, value: i32) {
        let row = Row::new(Relation::Eq)
            .term(a, 1.0)
            .constant(-f64::from(value));
        self.add_row(row, Strength::Fixed);
    }

    /// `a >= b + margin`
    fn add_greater_than(&mut self, a: VarId, b: VarId, margin: i32, strength: Strength) {
        let row = Row::new(Relation::Ge)
            .term(a, 1.0)
            .term(b, -1.0)
            .constant(-f64::from(margin));
        self.add_row(row, strength);
    }

    /// `a <= b + margin`
    fn add_lower_than(&mut self, a: VarId, b: VarId, margin: i32, strength: Strength) {
        let row = Row::new(Relation::Le)
            .term(a, 1.0)
            .term(b, -1.0)
            .constant(-f64::from(margin));
        self.add_row(row, strength);
    }

    /// Place `begin` between `begin_target` and `end_target` so that
    /// `(1 - bias) * (begin - begin_target - m1) == bias * (end_target - end - m2)`.
    #[allow(clippy::too_many_arguments)]
    fn add_centering(
        &mut self,
        begin: VarId,
        begin_target: VarId,
        begin_margin: i32,
        bias: f32,
        end_target: VarId,
        end: VarId,
        end_margin: i32,
        strength: Strength,
    ) {
        let m1 = f64::from(begin_margin);
        let m2 = f64::from(end_margin);
        let bias = f64::from(bias);
        let row = if begin_target == end_target {
            // centered on a single position
            Row::new(Relation::Eq)
                .term(begin, 1.0)
                .term(end, 1.0)
                .term(begin_target, -2.0)
        } else if bias <= 0.0 {
            Row::new(Relation::Eq)
                .term(begin, 1.0)
                .term(begin_target, -1.0)
                .constant(-m1)
        } else if bias >= 1.0 {
            Row::new(Relation::Eq)
                .term(end_target, 1.0)
                .term(end, -1.0)
                .constant(-m2)
        } else {
            Row::new(Relation::Eq)
                .term(begin, 1.0 - bias)
                .term(begin_target, -(1.0 - bias))
                .term(end_target, -bias)
                .term(end, bias)
                .constant(-m1 * (1.0 - bias) + m2 * bias)
        };
        self.add_row(row, strength);
    }

    /// `a - b == ratio * (c - d)`
    fn add_ratio(&mut self, a: VarId, b: VarId, c: VarId, d: VarId, ratio: f32, strength: Strength) {
        let ratio = f64::from(ratio);
        let row = Row::new(Relation::Eq)
            .term(a, 1.0)
            .term(b, -1.0)
            .term(c, -ratio)
            .term(d, ratio);
        self.add_row(row, strength);
    }

    /// Share space between two match-constraint widgets by weight:
    /// `(end - begin) / current == (next_end - next_begin) / next`.
    #[allow(clippy::too_many_arguments)]
    fn add_equal_match_dimensions(
        &mut self,
        current_weight: f32,
        total_weight: f32,
        next_weight: f32,
        begin: VarId,
        end: VarId,
        next_begin: VarId,
        next_end: VarId,
        strength: Strength,
    ) {
        let row = Row::new(Relation::Eq);
        let row = if total_weight == 0.0 || current_weight == next_weight {
            row.term(begin, 1.0)
                .term(end, -1.0)
                .term(next_end, 1.0)
                .term(next_begin, -1.0)
        } else if current_weight == 0.0 {
            row.term(begin, 1.0).term(end, -1.0)
        } else if next_weight == 0.0 {
            row.term(next_begin, 1.0).term(next_end, -1.0)
        } else {
            let cw = f64::from(current_weight / total_weight);
            let nw = f64::from(next_weight / total_weight);
            let w = cw / nw;
            row.term(begin, 1.0)
                .term(end, -1.0)
                .term(next_end, w)
                .term(next_begin, -w)
        };
        self.add_row(row, strength);
    }

    /// `end - begin == percent * (parent_end - parent_begin)`
    fn add_percent_dimension(
        &mut self,
        end: VarId,
        begin: VarId,
        parent_end: VarId,
        parent_begin: VarId,
        percent: f32,
        strength: Strength,
    ) {
        let percent = f64::from(percent);
        let row = Row::new(Relation::Eq)
            .term(end, 1.0)
            .term(begin, -1.0)
            .term(parent_end, -percent)
            .term(parent_begin, percent);
        self.add_row(row, strength);
    }

    /// `var == percent * parent_end`
    fn add_percent_of(&mut self, var: VarId, parent_end: VarId, percent: f32, strength: Strength) {
        let row = Row::new(Relation::Eq)
            .term(var, 1.0)
            .term(parent_end, -f64::from(percent));
        self.add_row(row, strength);
    }

    /// `barrier <= var + margin`
    fn add_lower_barrier(&mut self, barrier: VarId, var: VarId, margin: i32, has_match: bool) {
        let strength = if has_match { Strength::Barrier } else { Strength::Fixed };
        self.add_lower_than(barrier, var, margin, strength);
    }

    /// `barrier >= var + margin`
    fn add_greater_barrier(&mut self, barrier: VarId, var: VarId, margin: i32, has_match: bool) {
        let strength = if has_match { Strength::Barrier } else { Strength::Fixed };
        self.add_greater_than(barrier, var, margin, strength);
    }

    /// Put the center of `edges` (left, top, right, bottom) on a circle of
    /// `radius` around the center of `target`. 0 degrees is straight up.
    fn add_center_point(&mut self, edges: [VarId; 4], target: [VarId; 4], angle: f32, radius: i32) {
        let radians = f64::from(angle).to_radians();
        let radius = f64::from(radius);
        let [left, top, right, bottom] = edges;
        let [t_left, t_top, t_right, t_bottom] = target;
        let horizontal = Row::new(Relation::Eq)
            .term(left, 0.5)
            .term(right, 0.5)
            .term(t_left, -0.5)
            .term(t_right, -0.5)
            .constant(-radius * radians.sin());
        self.add_row(horizontal, Strength::Fixed);
        let vertical = Row::new(Relation::Eq)
            .term(top, 0.5)
            .term(bottom, 0.5)
            .term(t_top, -0.5)
            .term(t_bottom, -0.5)
            .constant(radius * radians.cos());
        self.add_row(vertical, Strength::Fixed);
    }
}
