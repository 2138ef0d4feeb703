//! The constraint tree: a root superview and its named sub-views

use indexmap::IndexMap;
use kasuari::Strength;

use crate::parser::ast::{Relation, VflSource};

use super::compile::{parse_vfl, ConstraintSet};
use super::config::LayoutConfig;
use super::error::LayoutError;
use super::solver::{
    ConstraintSolver, ConstraintSource, LayoutConstraint, LayoutProperty, LayoutVariable,
    LinearExpr, SolverError, ViewRef,
};
use super::types::{Geometry, Size};
use super::view::ConstraintView;

/// Root of a constraint tree.
///
/// The root is anchored at the origin and sized through [`Superview::set_size`].
/// Sub-views are created the first time a constraint set names them and keep
/// that order.
pub struct Superview {
    solver: ConstraintSolver,
    sub_views: IndexMap<String, Geometry>,
    size: Option<Size>,
    /// Offset applied to `~` spacers so separate constraint sets never share one
    spacer_offset: usize,
}

impl Superview {
    pub fn new() -> Self {
        let mut solver = ConstraintSolver::new();
        solver.register_view(&ViewRef::Superview);

        let anchors = [LayoutProperty::Left, LayoutProperty::Top].map(|property| {
            LayoutConstraint::new(
                LinearExpr::variable(root(property)),
                Relation::Equal,
                LinearExpr::constant(0.0),
                ConstraintSource::intrinsic("superview origin"),
            )
        });
        for anchor in &anchors {
            if let Err(e) = solver.add_constraint(anchor) {
                tracing::error!(error = %e, "failed to anchor superview");
            }
        }
        for property in [LayoutProperty::Width, LayoutProperty::Height] {
            if let Err(e) = solver.add_edit_variable(&root(property), Strength::STRONG) {
                tracing::error!(error = %e, "failed to register superview size");
            }
        }

        Self {
            solver,
            sub_views: IndexMap::new(),
            size: None,
            spacer_offset: 0,
        }
    }

    /// Add a compiled constraint set.
    ///
    /// A required constraint that conflicts with the constraints already in
    /// the tree is re-added at strong strength. Any other solver failure stops
    /// the set; constraints added before it stay in place.
    pub fn add_constraints(&mut self, set: ConstraintSet) -> Result<(), SolverError> {
        for name in &set.views {
            let view = ViewRef::named(name.as_str());
            self.solver.register_view(&view);
            self.sub_views.entry(name.clone()).or_default();
        }

        let offset = self.spacer_offset;
        self.spacer_offset += set.lines;

        for mut constraint in set.constraints {
            shift_spacers(&mut constraint, offset);
            match self.solver.add_constraint(&constraint) {
                Ok(()) => {}
                Err(SolverError::Unsatisfiable { constraint: text, .. })
                    if constraint.is_required() =>
                {
                    tracing::warn!(
                        constraint = %text,
                        line = ?constraint.source.line,
                        "required constraint conflicts, adding it as strong"
                    );
                    self.solver
                        .add_constraint_with_strength(&constraint, Strength::STRONG)?;
                }
                Err(e) => return Err(e),
            }
        }

        self.update();
        Ok(())
    }

    /// Parse `vfl` and add the resulting constraints
    pub fn add_vfl(&mut self, vfl: &VflSource, config: &LayoutConfig) -> Result<(), LayoutError> {
        let set = parse_vfl(vfl, config).map_err(LayoutError::Parse)?;
        self.add_constraints(set)?;
        Ok(())
    }

    /// Set the root size and recompute every sub-view.
    ///
    /// Non-finite sizes are ignored.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if !width.is_finite() || !height.is_finite() {
            tracing::warn!(width, height, "ignoring non-finite superview size");
            return;
        }
        for (property, value) in [(LayoutProperty::Width, width), (LayoutProperty::Height, height)] {
            if let Err(e) = self.solver.suggest_value(&root(property), value) {
                tracing::warn!(error = %e, "failed to size superview");
            }
        }
        self.size = Some(Size::new(width, height));
        self.update();
    }

    /// Size last passed to [`Superview::set_size`]
    pub fn size(&self) -> Option<Size> {
        self.size
    }

    /// Solved size of the root, which may differ from the requested size
    /// when required constraints outweigh it
    pub fn solved_size(&self) -> Size {
        self.solver.geometry(&ViewRef::Superview).bounds().size()
    }

    pub fn sub_view(&self, name: &str) -> Option<Geometry> {
        self.sub_views.get(name).copied()
    }

    /// Sub-views in order of first appearance
    pub fn sub_views(&self) -> impl Iterator<Item = (&str, Geometry)> + '_ {
        self.sub_views.iter().map(|(name, g)| (name.as_str(), *g))
    }

    pub fn len(&self) -> usize {
        self.sub_views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_views.is_empty()
    }

    fn update(&mut self) {
        self.solver.refresh();
        for (name, geometry) in self.sub_views.iter_mut() {
            *geometry = self.solver.geometry(&ViewRef::named(name.as_str()));
        }
    }
}

impl Default for Superview {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Superview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Superview")
            .field("size", &self.size)
            .field("sub_views", &self.sub_views)
            .finish()
    }
}

impl ConstraintView for Superview {
    fn add_vfl(&mut self, vfl: &VflSource, config: &LayoutConfig) -> Result<(), LayoutError> {
        Superview::add_vfl(self, vfl, config)
    }

    fn set_size(&mut self, width: f64, height: f64) {
        Superview::set_size(self, width, height)
    }

    fn sub_views(&self) -> impl Iterator<Item = (&str, Geometry)> + '_ {
        Superview::sub_views(self)
    }

    fn geometry(&self, name: &str) -> Option<Geometry> {
        self.sub_view(name)
    }
}

fn root(property: LayoutProperty) -> LayoutVariable {
    LayoutVariable::new(ViewRef::Superview, property)
}

fn shift_spacers(constraint: &mut LayoutConstraint, offset: usize) {
    if offset == 0 {
        return;
    }
    for (var, _) in constraint.lhs.terms.iter_mut().chain(constraint.rhs.terms.iter_mut()) {
        if let ViewRef::Spacer(line) = &mut var.view {
            *line += offset;
        }
    }
}
