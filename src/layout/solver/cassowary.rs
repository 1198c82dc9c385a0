//! Cassowary backend for [`LinearSystem`]
//!
//! Wraps the kasuari solver. Strengths map onto a fixed ladder of kasuari
//! weights; only [`Strength::Fixed`] rows are required.

use std::collections::HashMap;

use kasuari::{
    AddConstraintError, Expression, Solver as KasuariSolver, Strength as KasuariStrength,
    Variable as KasuariVariable, WeightedRelation::*,
};

use super::{LinearSystem, Relation, Row, SolverError, Strength, VarId};
use crate::layout::types::AnchorRef;

/// Weight used when a required row turns out to be unsatisfiable
const RELAXED: KasuariStrength = KasuariStrength::STRONG.mul_f64(100.0);

fn kasuari_strength(strength: Strength) -> KasuariStrength {
    match strength {
        Strength::None => KasuariStrength::WEAK,
        Strength::Low => KasuariStrength::WEAK.mul_f64(10.0),
        Strength::Medium => KasuariStrength::WEAK.mul_f64(100.0),
        Strength::High => KasuariStrength::MEDIUM,
        Strength::Highest => KasuariStrength::MEDIUM.mul_f64(10.0),
        Strength::Equality => KasuariStrength::MEDIUM.mul_f64(100.0),
        Strength::Barrier => KasuariStrength::STRONG,
        Strength::Centering => KasuariStrength::STRONG.mul_f64(10.0),
        Strength::Fixed => KasuariStrength::REQUIRED,
    }
}

/// [`LinearSystem`] backed by the kasuari Cassowary solver
pub struct CassowarySystem {
    solver: KasuariSolver,
    variables: Vec<KasuariVariable>,
    /// Reverse lookup for solver change sets
    lookup: HashMap<KasuariVariable, VarId>,
    anchors: HashMap<AnchorRef, VarId>,
    finals: HashMap<VarId, i32>,
    values: HashMap<VarId, f64>,
    /// First failure since the last minimize
    pending: Option<SolverError>,
    rows: usize,
}

impl CassowarySystem {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: Vec::new(),
            lookup: HashMap::new(),
            anchors: HashMap::new(),
            finals: HashMap::new(),
            values: HashMap::new(),
            pending: None,
            rows: 0,
        }
    }

    /// The anchor variable if one was created this pass
    pub fn find_anchor(&self, anchor: AnchorRef) -> Option<VarId> {
        self.anchors.get(&anchor).copied()
    }

    fn expression(&self, row: &Row) -> Expression {
        let mut expression = Expression::from_constant(row.constant);
        for (var, coefficient) in &row.terms {
            expression = expression + self.variables[var.0] * *coefficient;
        }
        expression
    }

    fn try_add(&mut self, row: &Row, strength: KasuariStrength) -> Result<(), AddConstraintError> {
        let expression = self.expression(row);
        let constraint = match row.relation {
            Relation::Eq => expression | EQ(strength) | 0.0,
            Relation::Ge => expression | GE(strength) | 0.0,
            Relation::Le => expression | LE(strength) | 0.0,
        };
        self.solver.add_constraint(constraint)
    }

    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(e: AddConstraintError, row: &Row) -> SolverError {
        match e {
            AddConstraintError::UnsatisfiableConstraint => SolverError::Unsatisfiable {
                row: row.to_string(),
            },
            AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("duplicate constraint: {}", row))
            }
            AddConstraintError::InternalSolverError(msg) => {
                SolverError::Internal(format!("{} while adding {}", msg, row))
            }
        }
    }

    fn record(&mut self, error: SolverError) {
        if self.pending.is_none() {
            self.pending = Some(error);
        }
    }
}

impl Default for CassowarySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSystem for CassowarySystem {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn anchor_variable(&mut self, anchor: AnchorRef) -> VarId {
        if let Some(&var) = self.anchors.get(&anchor) {
            return var;
        }
        let var = self.create_variable();
        self.anchors.insert(anchor, var);
        var
    }

    fn create_variable(&mut self) -> VarId {
        let var = VarId(self.variables.len());
        let kvar = KasuariVariable::new();
        self.variables.push(kvar);
        self.lookup.insert(kvar, var);
        var
    }

    fn add_row(&mut self, row: Row, strength: Strength) {
        log::trace!("{:?}: {}", strength, row);
        match self.try_add(&row, kasuari_strength(strength)) {
            Ok(()) => self.rows += 1,
            Err(AddConstraintError::UnsatisfiableConstraint) if strength == Strength::Fixed => {
                log::warn!("required row is unsatisfiable, relaxing: {}", row);
                match self.try_add(&row, RELAXED) {
                    Ok(()) => self.rows += 1,
                    Err(e) => self.record(Self::convert_kasuari_error(e, &row)),
                }
            }
            Err(e) => self.record(Self::convert_kasuari_error(e, &row)),
        }
    }

    fn set_final(&mut self, var: VarId, value: i32) {
        self.finals.insert(var, value);
        self.add_equality_constant(var, value);
    }

    fn is_final(&self, var: VarId) -> bool {
        self.finals.contains_key(&var)
    }

    /// Fetch the solution. Rows that were rejected since the last call are
    /// reported afterwards; the values of the accepted rows stay readable.
    fn minimize(&mut self) -> Result<(), SolverError> {
        let changes = self.solver.fetch_changes();
        for (kvar, value) in changes {
            if let Some(var) = self.lookup.get(kvar) {
                self.values.insert(*var, *value);
            }
        }
        match self.pending.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn value(&self, var: VarId) -> i32 {
        let value = self.values.get(&var).copied().unwrap_or(0.0);
        (value + 0.5).floor() as i32
    }

    fn row_count(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved(system: &mut CassowarySystem) {
        system.minimize().unwrap();
    }

    #[test]
    fn test_fixed_constraint() {
        let mut system = CassowarySystem::new();
        let width = system.create_variable();
        system.add_equality_constant(width, 100);
        solved(&mut system);
        assert_eq!(system.value(width), 100);
    }

    #[test]
    fn test_equal_constraint() {
        let mut system = CassowarySystem::new();
        let a = system.create_variable();
        let b = system.create_variable();
        // a = b + 20
        system.add_equality(a, b, 20, Strength::Fixed);
        system.set_final(b, 50);
        solved(&mut system);
        assert_eq!(system.value(a), 70);
        assert!(system.is_final(b));
        assert!(!system.is_final(a));
    }

    #[test]
    fn test_inequality_beats_weaker_equality() {
        let mut system = CassowarySystem::new();
        let width = system.create_variable();
        // width >= 50
        let zero = system.create_variable();
        system.set_final(zero, 0);
        system.add_greater_than(width, zero, 50, Strength::Fixed);
        system.add_equality(width, zero, 30, Strength::Highest);
        solved(&mut system);
        assert_eq!(system.value(width), 50);
    }

    #[test]
    fn test_stronger_row_wins() {
        let mut system = CassowarySystem::new();
        let x = system.create_variable();
        let origin = system.create_variable();
        system.set_final(origin, 0);
        system.add_equality(x, origin, 10, Strength::Low);
        system.add_equality(x, origin, 40, Strength::Equality);
        solved(&mut system);
        assert_eq!(system.value(x), 40);
    }

    #[test]
    fn test_centering_with_bias() {
        for (bias, expected) in [(0.5, 40), (0.25, 20), (0.0, 0), (1.0, 80)] {
            let mut system = CassowarySystem::new();
            let left = system.create_variable();
            let right = system.create_variable();
            let parent_left = system.create_variable();
            let parent_right = system.create_variable();
            system.set_final(parent_left, 0);
            system.set_final(parent_right, 100);
            system.add_equality(right, left, 20, Strength::Fixed);
            system.add_centering(left, parent_left, 0, bias, parent_right, right, 0, Strength::Fixed);
            solved(&mut system);
            assert_eq!(system.value(left), expected, "bias {}", bias);
        }
    }

    #[test]
    fn test_ratio_row() {
        let mut system = CassowarySystem::new();
        let [l, t, r, b] = [(); 4].map(|_| system.create_variable());
        system.set_final(l, 0);
        system.set_final(t, 0);
        system.set_final(b, 50);
        // width = 2 * height
        system.add_ratio(r, l, b, t, 2.0, Strength::Fixed);
        solved(&mut system);
        assert_eq!(system.value(r), 100);
    }

    #[test]
    fn test_center_point_on_circle() {
        let mut system = CassowarySystem::new();
        let edges = [(); 4].map(|_| system.create_variable());
        let target = [(); 4].map(|_| system.create_variable());
        for (var, value) in target.iter().zip([100, 100, 120, 120]) {
            system.set_final(*var, value);
        }
        system.add_equality(edges[2], edges[0], 10, Strength::Fixed);
        system.add_equality(edges[3], edges[1], 10, Strength::Fixed);
        system.add_center_point(edges, target, 90.0, 50);
        solved(&mut system);
        // target center (110, 110), 50 to the right
        assert_eq!(system.value(edges[0]), 155);
        assert_eq!(system.value(edges[1]), 105);
    }

    #[test]
    fn test_anchor_variables_are_stable() {
        use crate::layout::types::{AnchorType, WidgetId};
        let mut system = CassowarySystem::new();
        let anchor = AnchorRef::new(WidgetId(3), AnchorType::Left);
        let first = system.anchor_variable(anchor);
        assert_eq!(system.anchor_variable(anchor), first);
        assert_eq!(system.find_anchor(anchor), Some(first));
        system.reset();
        assert_eq!(system.find_anchor(anchor), None);
    }

    #[test]
    fn test_conflicting_required_rows_are_relaxed() {
        let mut system = CassowarySystem::new();
        let x = system.create_variable();
        system.add_equality_constant(x, 100);
        system.add_equality_constant(x, 200);
        solved(&mut system);
        assert_eq!(system.value(x), 100);
        assert_eq!(system.row_count(), 2);
    }
}
