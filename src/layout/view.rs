//! The seam between the layout adapter and a constraint backend

use crate::parser::ast::VflSource;

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::types::Geometry;

/// A constraint tree that can be driven by [`Layout`](super::Layout).
///
/// [`Superview`](super::Superview) is the bundled implementation.
pub trait ConstraintView {
    /// Parse `vfl` and add its constraints. On error nothing is added.
    fn add_vfl(&mut self, vfl: &VflSource, config: &LayoutConfig) -> Result<(), LayoutError>;

    /// Set the root size and recompute every sub-view's geometry
    fn set_size(&mut self, width: f64, height: f64);

    /// Named sub-views with their current geometry
    fn sub_views(&self) -> impl Iterator<Item = (&str, Geometry)> + '_;

    fn geometry(&self, name: &str) -> Option<Geometry>;
}
