//! Compilation of parsed VFL lines into linear constraints

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::error::ParseError;
use crate::parser::{self, ast::*};

use super::config::LayoutConfig;
use super::solver::{ConstraintSource, LayoutConstraint, LayoutProperty, LayoutVariable, LinearExpr, ViewRef};

/// Constraints parsed from a VFL source, ready for a superview
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstraintSet {
    pub constraints: Vec<LayoutConstraint>,
    /// Sub-view names in order of first appearance
    pub views: Vec<String>,
    /// Number of VFL lines compiled; `~` spacers are numbered by line
    pub lines: usize,
}

/// Parse a VFL source into a constraint set.
///
/// Either every line parses and compiles, or all errors are returned and no
/// constraints are produced.
pub fn parse_vfl(source: &VflSource, config: &LayoutConfig) -> Result<ConstraintSet, Vec<ParseError>> {
    let lines = parser::parse(source)?;
    let mut compiler = Compiler::new(config);
    for (index, line) in lines.iter().enumerate() {
        compiler.compile_line(index, line);
    }
    compiler.finish(lines.len())
}

/// Properties a line constrains along its axis
#[derive(Debug, Clone, Copy)]
struct Axis {
    leading: LayoutProperty,
    trailing: LayoutProperty,
    size: LayoutProperty,
}

impl Axis {
    fn of(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self {
                leading: LayoutProperty::Left,
                trailing: LayoutProperty::Right,
                size: LayoutProperty::Width,
            },
            Orientation::Vertical => Self {
                leading: LayoutProperty::Top,
                trailing: LayoutProperty::Bottom,
                size: LayoutProperty::Height,
            },
        }
    }
}

struct Compiler<'c> {
    config: &'c LayoutConfig,
    constraints: Vec<LayoutConstraint>,
    views: IndexSet<String>,
    spacers: HashSet<usize>,
    errors: Vec<ParseError>,
}

impl<'c> Compiler<'c> {
    fn new(config: &'c LayoutConfig) -> Self {
        Self {
            config,
            constraints: Vec::new(),
            views: IndexSet::new(),
            spacers: HashSet::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self, lines: usize) -> Result<ConstraintSet, Vec<ParseError>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        Ok(ConstraintSet {
            constraints: self.constraints,
            views: self.views.into_iter().collect(),
            lines,
        })
    }

    fn compile_line(&mut self, line_no: usize, line: &VflLine) {
        let axis = Axis::of(line.orientation);

        for item in line.items() {
            if let Item::View { name, predicates } = &item.node {
                self.views.insert(name.node.0.clone());
                for predicate in predicates {
                    self.view_predicate(line_no, name.node.as_str(), axis, predicate);
                }
            }
        }

        let mut previous = &line.head;
        for (connection, next) in &line.tail {
            self.connection(line_no, axis, previous, connection, next);
            previous = next;
        }
    }

    /// `[name(pred)]`: constrain the view's size along the axis
    fn view_predicate(&mut self, line_no: usize, view: &str, axis: Axis, predicate: &Spanned<Predicate>) {
        self.check_extended(line_no, predicate);
        let Some(priority) = self.priority(line_no, predicate) else {
            return;
        };

        let p = &predicate.node;
        let multiplier = p.multiplier.unwrap_or(1.0);
        let constant = p.constant.unwrap_or(0.0);
        let rhs = match &p.object {
            Operand::Constant(n) => LinearExpr::constant(n * multiplier + constant),
            Operand::Named(id) => match self.config.metric(id.as_str()) {
                Some(m) => LinearExpr::constant(m * multiplier + constant),
                None => {
                    self.views.insert(id.0.clone());
                    LinearExpr::term(var(id.as_str(), axis.size), multiplier).plus(constant)
                }
            },
        };

        let source = ConstraintSource::vfl(
            line_no,
            predicate.span.clone(),
            format!("size of '{}'", view),
        );
        self.constraints.push(
            LayoutConstraint::new(LinearExpr::variable(var(view, axis.size)), p.relation, rhs, source)
                .with_priority(priority),
        );
    }

    /// Gap between two neighbouring items
    fn connection(
        &mut self,
        line_no: usize,
        axis: Axis,
        previous: &Spanned<Item>,
        connection: &Spanned<Connection>,
        next: &Spanned<Item>,
    ) {
        let from = match &previous.node {
            Item::Superview => LayoutVariable::new(ViewRef::Superview, axis.leading),
            Item::View { name, .. } => var(name.node.as_str(), axis.trailing),
        };
        let to = match &next.node {
            Item::Superview => LayoutVariable::new(ViewRef::Superview, axis.trailing),
            Item::View { name, .. } => var(name.node.as_str(), axis.leading),
        };
        let span = previous.span.start..next.span.end;
        let description = format!("gap {} .. {}", from, to);
        let gap = |value: f64, relation: Relation, priority: f64| {
            LayoutConstraint::new(
                LinearExpr::variable(to.clone()),
                relation,
                LinearExpr::variable(from.clone()).plus(value),
                ConstraintSource::vfl(line_no, span.clone(), description.clone()),
            )
            .with_priority(priority)
        };

        match &connection.node {
            Connection::Flush => self.constraints.push(gap(0.0, Relation::Equal, LayoutConstraint::REQUIRED)),
            Connection::Standard => self.constraints.push(gap(
                self.config.spacing,
                Relation::Equal,
                LayoutConstraint::REQUIRED,
            )),
            Connection::Predicates(predicates) => {
                for predicate in predicates {
                    self.check_extended(line_no, predicate);
                    let Some(priority) = self.priority(line_no, predicate) else {
                        continue;
                    };
                    let Some(value) = self.gap_value(line_no, predicate) else {
                        continue;
                    };
                    self.constraints.push(gap(value, predicate.node.relation, priority));
                }
            }
            Connection::Equal => {
                if !self.config.extended {
                    self.errors.push(ParseError::ExtendedSyntax {
                        line: line_no,
                        span: connection.span.clone(),
                        feature: "equal spacing '~'".to_string(),
                    });
                    return;
                }
                let spacer = LayoutVariable::new(ViewRef::Spacer(line_no), LayoutProperty::Width);
                if self.spacers.insert(line_no) {
                    self.constraints.push(LayoutConstraint::new(
                        LinearExpr::variable(spacer.clone()),
                        Relation::GreaterOrEqual,
                        LinearExpr::constant(0.0),
                        ConstraintSource::vfl(line_no, connection.span.clone(), "equal spacing"),
                    ));
                }
                self.constraints.push(LayoutConstraint::new(
                    LinearExpr::variable(to.clone()),
                    Relation::Equal,
                    LinearExpr::variable(from.clone()).add(LinearExpr::variable(spacer)),
                    ConstraintSource::vfl(line_no, span.clone(), description.clone()),
                ));
            }
        }
    }

    /// Value of a gap predicate; names must be metrics
    fn gap_value(&mut self, line_no: usize, predicate: &Spanned<Predicate>) -> Option<f64> {
        let p = &predicate.node;
        let base = match &p.object {
            Operand::Constant(n) => *n,
            Operand::Named(id) => match self.config.metric(id.as_str()) {
                Some(m) => m,
                None => {
                    self.errors.push(ParseError::UnknownMetric {
                        line: line_no,
                        span: predicate.span.clone(),
                        name: id.0.clone(),
                    });
                    return None;
                }
            },
        };
        Some(base * p.multiplier.unwrap_or(1.0) + p.constant.unwrap_or(0.0))
    }

    /// Priority of a predicate, 1 to 1000. Required when none is given.
    fn priority(&mut self, line_no: usize, predicate: &Spanned<Predicate>) -> Option<f64> {
        let value = match &predicate.node.priority {
            None => return Some(LayoutConstraint::REQUIRED),
            Some(Priority::Value(v)) => *v,
            Some(Priority::Metric(id)) => match self.config.metric(id.as_str()) {
                Some(v) => v,
                None => {
                    self.errors.push(ParseError::UnknownMetric {
                        line: line_no,
                        span: predicate.span.clone(),
                        name: id.0.clone(),
                    });
                    return None;
                }
            },
        };
        if !(1.0..=LayoutConstraint::REQUIRED).contains(&value) {
            self.errors.push(ParseError::InvalidPriority {
                line: line_no,
                span: predicate.span.clone(),
                value,
            });
            return None;
        }
        Some(value)
    }

    fn check_extended(&mut self, line_no: usize, predicate: &Spanned<Predicate>) {
        if !self.config.extended && predicate.node.is_extended() {
            self.errors.push(ParseError::ExtendedSyntax {
                line: line_no,
                span: predicate.span.clone(),
                feature: "predicate arithmetic".to_string(),
            });
        }
    }
}

fn var(view: &str, property: LayoutProperty) -> LayoutVariable {
    LayoutVariable::new(ViewRef::named(view), property)
}
