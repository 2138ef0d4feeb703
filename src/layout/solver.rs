//! Constraint solver integration for the superview
//!
//! This module provides a wrapper around the kasuari Cassowary constraint solver,
//! translating compiled VFL constraints into the solver's format and caching the
//! solved values.

use std::collections::HashMap;

use kasuari::{
    Expression, Solver as KasuariSolver, Strength, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;

use crate::parser::ast::{Relation, Span};

use super::types::Geometry;

/// Owner of a solver variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewRef {
    /// The root of the constraint tree
    Superview,
    /// A named sub-view
    Named(String),
    /// Shared gap of the `~` connections on one line
    Spacer(usize),
}

impl ViewRef {
    pub fn named(name: impl Into<String>) -> Self {
        ViewRef::Named(name.into())
    }
}

impl std::fmt::Display for ViewRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewRef::Superview => write!(f, "|"),
            ViewRef::Named(name) => write!(f, "{}", name),
            ViewRef::Spacer(line) => write!(f, "~{}", line),
        }
    }
}

/// Properties that can be constrained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutProperty {
    Left,
    Top,
    Width,
    Height,
    /// Right = Left + Width (derived property)
    Right,
    /// Bottom = Top + Height (derived property)
    Bottom,
}

impl LayoutProperty {
    /// Get all base properties (not derived)
    pub fn base_properties() -> &'static [LayoutProperty] {
        &[Self::Left, Self::Top, Self::Width, Self::Height]
    }
}

/// A variable in the constraint system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutVariable {
    pub view: ViewRef,
    pub property: LayoutProperty,
}

impl LayoutVariable {
    pub fn new(view: ViewRef, property: LayoutProperty) -> Self {
        Self { view, property }
    }

    fn base(&self, property: LayoutProperty) -> Self {
        Self::new(self.view.clone(), property)
    }
}

impl std::fmt::Display for LayoutVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:?}", self.view, self.property)
    }
}

/// `constant + sum(coefficient * variable)`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    pub terms: Vec<(LayoutVariable, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn variable(var: LayoutVariable) -> Self {
        Self::term(var, 1.0)
    }

    pub fn term(var: LayoutVariable, coefficient: f64) -> Self {
        Self {
            terms: vec![(var, coefficient)],
            constant: 0.0,
        }
    }

    /// Add a constant offset
    pub fn plus(mut self, offset: f64) -> Self {
        self.constant += offset;
        self
    }

    /// Add another expression
    pub fn add(mut self, other: LinearExpr) -> Self {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }
}

impl std::fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self
            .terms
            .iter()
            .map(|(var, k)| {
                if *k == 1.0 {
                    var.to_string()
                } else {
                    format!("{}*{}", k, var)
                }
            })
            .collect();
        if self.constant != 0.0 || parts.is_empty() {
            parts.push(self.constant.to_string());
        }
        write!(f, "{}", parts.join(" + "))
    }
}

/// Tracks where a constraint came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSource {
    /// Index of the VFL line, None for constraints the superview adds itself
    pub line: Option<usize>,
    /// Byte range in the line
    pub span: Span,
    /// Human-readable description
    pub description: String,
}

impl ConstraintSource {
    pub fn vfl(line: usize, span: Span, description: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            span,
            description: description.into(),
        }
    }

    pub fn intrinsic(description: impl Into<String>) -> Self {
        Self {
            line: None,
            span: 0..0,
            description: description.into(),
        }
    }
}

/// A linear constraint `lhs <relation> rhs` with a VFL priority (1..=1000)
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConstraint {
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: LinearExpr,
    pub priority: f64,
    pub source: ConstraintSource,
}

impl LayoutConstraint {
    /// Priority that makes a constraint required
    pub const REQUIRED: f64 = 1000.0;

    pub fn new(lhs: LinearExpr, relation: Relation, rhs: LinearExpr, source: ConstraintSource) -> Self {
        Self {
            lhs,
            relation,
            rhs,
            priority: Self::REQUIRED,
            source,
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_required(&self) -> bool {
        self.priority >= Self::REQUIRED
    }

    /// Human-readable form, used in diagnostics
    pub fn describe(&self) -> String {
        let op = match self.relation {
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
            Relation::LessOrEqual => "<=",
        };
        format!("{} {} {} @{}", self.lhs, op, self.rhs, self.priority)
    }
}

/// Map a VFL priority onto a solver strength
pub fn strength_for(priority: f64) -> Strength {
    if priority >= LayoutConstraint::REQUIRED {
        Strength::REQUIRED
    } else if priority >= 750.0 {
        Strength::STRONG
    } else if priority >= 250.0 {
        Strength::MEDIUM
    } else {
        Strength::WEAK
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("Unsatisfiable constraint {constraint}: {reason}")]
    Unsatisfiable {
        constraint: String,
        origin: ConstraintSource,
        reason: String,
    },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps our variables to kasuari variables
    variables: HashMap<LayoutVariable, KasuariVariable>,
    /// Reverse of `variables`, for reading back solver changes
    names: HashMap<KasuariVariable, LayoutVariable>,
    /// Last solved value of every base variable that has changed at least once
    values: HashMap<LayoutVariable, f64>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            names: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Get or create a kasuari variable for a base property (Left, Top, Width, Height)
    fn get_or_create_var(&mut self, var: &LayoutVariable) -> KasuariVariable {
        if let Some(&kvar) = self.variables.get(var) {
            kvar
        } else {
            let kvar = KasuariVariable::new();
            self.variables.insert(var.clone(), kvar);
            self.names.insert(kvar, var.clone());
            kvar
        }
    }

    /// Kasuari expression for a layout variable, expanding derived properties
    fn property_expression(&mut self, var: &LayoutVariable) -> Expression {
        match var.property {
            LayoutProperty::Left
            | LayoutProperty::Top
            | LayoutProperty::Width
            | LayoutProperty::Height => self.get_or_create_var(var).into(),
            LayoutProperty::Right => {
                let left = self.get_or_create_var(&var.base(LayoutProperty::Left));
                let width = self.get_or_create_var(&var.base(LayoutProperty::Width));
                left + width * 1.0
            }
            LayoutProperty::Bottom => {
                let top = self.get_or_create_var(&var.base(LayoutProperty::Top));
                let height = self.get_or_create_var(&var.base(LayoutProperty::Height));
                top + height * 1.0
            }
        }
    }

    /// Make sure the four base variables of a view exist
    pub fn register_view(&mut self, view: &ViewRef) {
        for property in LayoutProperty::base_properties() {
            self.get_or_create_var(&LayoutVariable::new(view.clone(), *property));
        }
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSolver {
    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(
        &self,
        e: kasuari::AddConstraintError,
        constraint: &LayoutConstraint,
    ) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => SolverError::Unsatisfiable {
                constraint: constraint.describe(),
                origin: constraint.source.clone(),
                reason: "conflicts with existing required constraints".to_string(),
            },
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("Duplicate constraint: {}", constraint.describe()))
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => SolverError::Internal(
                format!("Internal solver error for {}: {}", constraint.describe(), msg),
            ),
        }
    }

    /// Add a constraint at the strength matching its priority
    pub fn add_constraint(&mut self, constraint: &LayoutConstraint) -> Result<(), SolverError> {
        self.add_constraint_with_strength(constraint, strength_for(constraint.priority))
    }

    /// Add a constraint at an explicit strength
    pub fn add_constraint_with_strength(
        &mut self,
        constraint: &LayoutConstraint,
        strength: Strength,
    ) -> Result<(), SolverError> {
        // Move every term to the left and every constant to the right
        let terms = constraint.lhs.terms.iter().cloned().chain(
            constraint
                .rhs
                .terms
                .iter()
                .map(|(var, coefficient)| (var.clone(), -coefficient)),
        );
        let constant = constraint.rhs.constant - constraint.lhs.constant;

        let mut expr: Option<Expression> = None;
        for (var, coefficient) in terms {
            let term = coefficient * self.property_expression(&var);
            expr = Some(match expr {
                Some(acc) => acc + term,
                None => term,
            });
        }
        let Some(expr) = expr else {
            return Err(SolverError::Internal(format!(
                "Constraint without variables: {}",
                constraint.describe()
            )));
        };

        let kconstraint = match constraint.relation {
            Relation::Equal => expr | EQ(strength) | constant,
            Relation::GreaterOrEqual => expr | GE(strength) | constant,
            Relation::LessOrEqual => expr | LE(strength) | constant,
        };
        self.solver
            .add_constraint(kconstraint)
            .map_err(|e| self.convert_kasuari_error(e, constraint))
    }

    /// Register a variable whose value is driven by `suggest_value`
    pub fn add_edit_variable(&mut self, var: &LayoutVariable, strength: Strength) -> Result<(), SolverError> {
        let kvar = self.get_or_create_var(var);
        self.solver
            .add_edit_variable(kvar, strength)
            .map_err(|e| SolverError::Internal(format!("Failed to add edit variable {}: {:?}", var, e)))
    }

    /// Suggest a value for an edit variable
    pub fn suggest_value(&mut self, var: &LayoutVariable, value: f64) -> Result<(), SolverError> {
        let kvar = self.get_or_create_var(var);
        self.solver
            .suggest_value(kvar, value)
            .map_err(|e| SolverError::Internal(format!("Failed to suggest value for {}: {:?}", var, e)))
    }

    /// Pull changed values out of kasuari into the value cache
    pub fn refresh(&mut self) {
        let changes: Vec<(KasuariVariable, f64)> = self.solver.fetch_changes().to_vec();
        for (kvar, value) in changes {
            if let Some(var) = self.names.get(&kvar) {
                self.values.insert(var.clone(), value);
            }
        }
    }

    /// Solved value of a variable. Variables that never changed are 0.
    pub fn value(&self, var: &LayoutVariable) -> f64 {
        let base = |property| self.values.get(&var.base(property)).copied().unwrap_or(0.0);
        match var.property {
            LayoutProperty::Left
            | LayoutProperty::Top
            | LayoutProperty::Width
            | LayoutProperty::Height => base(var.property),
            LayoutProperty::Right => base(LayoutProperty::Left) + base(LayoutProperty::Width),
            LayoutProperty::Bottom => base(LayoutProperty::Top) + base(LayoutProperty::Height),
        }
    }

    /// Geometry of a view from the value cache
    pub fn geometry(&self, view: &ViewRef) -> Geometry {
        let get = |property| self.value(&LayoutVariable::new(view.clone(), property));
        Geometry::new(
            get(LayoutProperty::Left),
            get(LayoutProperty::Top),
            get(LayoutProperty::Width),
            get(LayoutProperty::Height),
        )
    }
}
