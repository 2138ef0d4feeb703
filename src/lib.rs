//! VFL Layout - constraint-based layout of 2D scene nodes
//!
//! This library parses the Visual Format Language into a constraint tree,
//! solves it with a Cassowary solver, and positions the scene nodes whose
//! names match the sub-views of the tree.
//!
//! # Example
//!
//! ```rust
//! use vfl_layout::{Graphics, Layout, Surface};
//!
//! let mut surface = Surface::new(300.0, 200.0);
//! let id = surface.add(Graphics::new("box")).unwrap();
//!
//! let mut layout = Layout::new(["H:|-[box(100)]-|", "V:|-[box(50)]-|"], &surface, None);
//! layout.render(&mut surface);
//!
//! let size = surface.scene().size(id).unwrap();
//! assert!((size.width - 100.0).abs() < 1e-6);
//! assert!((size.height - 50.0).abs() < 1e-6);
//! ```

pub mod error;
pub mod layout;
pub mod parser;
pub mod scene;

pub use error::{format_parse_errors, ParseError};
pub use layout::{
    apply_geometry, parse_vfl, ConfigError, ConstraintSet, ConstraintView, Geometry, Layout,
    LayoutConfig, LayoutError, SolverError, Superview,
};
pub use parser::{VflLine, VflSource};
pub use scene::{
    Container, Graphics, NodeId, Resizable, Scene, SceneError, SceneNode, Sprite,
    Surface, Text,
};

/// Solve a VFL source for a fixed root size
///
/// # Example
///
/// ```rust
/// use vfl_layout::{solve, LayoutConfig};
///
/// let view = solve("H:|-[a]-|", 200.0, 100.0, &LayoutConfig::default()).unwrap();
/// let a = view.sub_view("a").unwrap();
/// assert!((a.width - 184.0).abs() < 1e-6);
/// ```
pub fn solve(
    vfl: impl Into<VflSource>,
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> Result<Superview, LayoutError> {
    let mut view = Superview::new();
    view.add_vfl(&vfl.into(), config)?;
    view.set_size(width, height);
    Ok(view)
}
