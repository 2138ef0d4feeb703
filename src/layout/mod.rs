//! Constraint layout for scene nodes
//!
//! A [`Layout`] parses VFL into a constraint tree, associates each named
//! sub-view with the scene node of the same name, and on every
//! [`render`](Layout::render) sizes the tree and pushes the solved geometry
//! onto those nodes.

pub mod apply;
pub mod compile;
pub mod config;
pub mod error;
pub mod solver;
pub mod superview;
pub mod types;
pub mod view;

pub use apply::apply_geometry;
pub use compile::{parse_vfl, ConstraintSet};
pub use config::{ConfigError, LayoutConfig};
pub use error::LayoutError;
pub use solver::SolverError;
pub use superview::Superview;
pub use types::*;
pub use view::ConstraintView;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::parser::ast::VflSource;
use crate::scene::{NodeId, Surface};

/// Binds a constraint tree to scene nodes.
///
/// Associations between sub-view names and nodes are resolved once, at
/// construction. Nodes added to the scene afterwards are not picked up.
#[derive(Debug)]
pub struct Layout<V: ConstraintView = Superview> {
    view: V,
    parent: Option<NodeId>,
    children: HashMap<String, NodeId>,
    config: LayoutConfig,
    vfl: VflSource,
}

impl Layout<Superview> {
    /// Build a layout with the default configuration.
    ///
    /// Never fails: a VFL error is logged and leaves the layout without
    /// constraints.
    pub fn new(vfl: impl Into<VflSource>, surface: &Surface, parent: Option<NodeId>) -> Self {
        Self::with_config(vfl, surface, parent, LayoutConfig::default())
    }

    pub fn with_config(
        vfl: impl Into<VflSource>,
        surface: &Surface,
        parent: Option<NodeId>,
        config: LayoutConfig,
    ) -> Self {
        Self::with_view(Superview::new(), vfl, surface, parent, config)
    }

    /// Build a layout, returning VFL, solver and parent errors instead of
    /// logging them
    pub fn try_new(
        vfl: impl Into<VflSource>,
        surface: &Surface,
        parent: Option<NodeId>,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        match Self::assemble(Superview::new(), vfl.into(), surface, parent, config) {
            (layout, None) => Ok(layout),
            (_, Some(e)) => Err(e),
        }
    }
}

impl<V: ConstraintView> Layout<V> {
    /// Build a layout over any constraint backend. Errors are logged.
    pub fn with_view(
        view: V,
        vfl: impl Into<VflSource>,
        surface: &Surface,
        parent: Option<NodeId>,
        config: LayoutConfig,
    ) -> Self {
        let (layout, error) = Self::assemble(view, vfl.into(), surface, parent, config);
        if let Some(e) = error {
            layout.report(&e);
        }
        layout
    }

    fn assemble(
        mut view: V,
        vfl: VflSource,
        surface: &Surface,
        parent: Option<NodeId>,
        config: LayoutConfig,
    ) -> (Self, Option<LayoutError>) {
        let mut error = view.add_vfl(&vfl, &config).err();
        if let Some(p) = parent.filter(|p| !surface.scene().contains(*p)) {
            error = error.or(Some(LayoutError::StaleParent(p)));
        }
        let children = resolve_children(&view, surface, parent);

        let layout = Self {
            view,
            parent,
            children,
            config,
            vfl,
        };
        (layout, error)
    }

    fn report(&self, error: &LayoutError) {
        warn!(error = %error, "layout constraints could not be fully built");
        if let Some(errors) = error.parse_errors() {
            let lines = self.vfl.lines();
            for e in errors {
                if let Some(line) = lines.get(e.line()) {
                    debug!("{}", e.format(line, "vfl"));
                }
            }
        }
    }

    /// Size the constraint tree and move every associated node.
    ///
    /// The tree is sized from the parent container when one was given,
    /// otherwise from the surface. A parent without a fixed size is measured
    /// without the nodes this layout moves. Calling this twice without
    /// changes in between leaves the scene unchanged.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn render(&mut self, surface: &mut Surface) {
        let size = match self.parent {
            Some(parent) => {
                let own: Vec<NodeId> = self.children.values().copied().collect();
                match surface.scene().size_excluding(parent, &own) {
                    Some(size) => size,
                    None => {
                        warn!(parent = %parent, "layout parent is no longer in the scene, skipping frame");
                        return;
                    }
                }
            }
            None => surface.size(),
        };
        self.view.set_size(size.width, size.height);

        let scene = surface.scene_mut();
        for (name, geometry) in self.view.sub_views() {
            let Some(&id) = self.children.get(name) else {
                continue;
            };
            match scene.node_mut(id) {
                Some(node) => apply_geometry(node, &geometry),
                None => warn!(view = name, node = %id, "scene node for sub-view was removed"),
            }
        }
    }

    /// Resolved associations, sub-view name to node
    pub fn children(&self) -> &HashMap<String, NodeId> {
        &self.children
    }

    pub fn node_for(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn vfl(&self) -> &VflSource {
        &self.vfl
    }
}

/// Associate every sub-view with the first node of the same name under the
/// parent, or under the stage when there is no parent
fn resolve_children(
    view: &impl ConstraintView,
    surface: &Surface,
    parent: Option<NodeId>,
) -> HashMap<String, NodeId> {
    let scene = surface.scene();
    let root = parent.unwrap_or_else(|| surface.stage());

    let mut children = HashMap::new();
    let mut missing = Vec::new();
    for (name, _) in view.sub_views() {
        match scene.find_by_name(root, name) {
            Some(id) => {
                children.insert(name.to_string(), id);
            }
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        let known: HashSet<String> = scene.descendant_names(root).into_iter().collect();
        for name in missing {
            let suggestions = find_similar(&known, &name, 2);
            debug!(view = %name, ?suggestions, "no scene node for sub-view");
        }
    }
    children
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut row = vec![0usize; n + 1];
    for i in 1..=m {
        row[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev[n]
}

/// Node names within `max_distance` edits of `target`, closest first
fn find_similar(known: &HashSet<String>, target: &str, max_distance: usize) -> Vec<String> {
    let mut candidates: Vec<(&String, usize)> = known
        .iter()
        .map(|name| (name, levenshtein_distance(name, target)))
        .filter(|(_, dist)| *dist > 0 && *dist <= max_distance)
        .collect();

    candidates.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
    candidates
        .into_iter()
        .map(|(name, _)| name.clone())
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Container, Graphics};

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("button", "button"), 0);
        assert_eq!(levenshtein_distance("button", "buton"), 1);
        assert_eq!(levenshtein_distance("header", "haeder"), 2);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_find_similar() {
        let known: HashSet<String> = ["sidebar", "content", "footer"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(find_similar(&known, "sidebr", 2), vec!["sidebar"]);
        assert!(find_similar(&known, "toolbar", 2).is_empty());
    }

    #[test]
    fn test_resolution_searches_parent_only() {
        let mut surface = Surface::new(300.0, 200.0);
        let panel = surface.add(Container::new("panel")).unwrap();
        surface.add(Graphics::new("outside")).unwrap();
        let inside = surface
            .scene_mut()
            .add_child(panel, Graphics::new("inside"))
            .unwrap();

        let layout = Layout::new("H:|[inside][outside]|", &surface, Some(panel));
        assert_eq!(layout.node_for("inside"), Some(inside));
        assert_eq!(layout.node_for("outside"), None);
        assert_eq!(layout.children().len(), 1);
    }

    #[test]
    fn test_try_new_rejects_stale_parent() {
        let mut surface = Surface::new(300.0, 200.0);
        let panel = surface.add(Container::new("panel")).unwrap();
        surface.scene_mut().remove(panel);

        let result = Layout::try_new("H:|[a]|", &surface, Some(panel), LayoutConfig::default());
        assert!(matches!(result, Err(LayoutError::StaleParent(id)) if id == panel));
    }

    #[test]
    fn test_new_keeps_source_and_config() {
        let surface = Surface::new(100.0, 100.0);
        let config = LayoutConfig::default().with_spacing(4.0);
        let layout = Layout::with_config(vec!["H:|-[a]-|"], &surface, None, config.clone());
        assert_eq!(layout.vfl(), &VflSource::from(vec!["H:|-[a]-|"]));
        assert_eq!(layout.config(), &config);
        assert_eq!(layout.parent(), None);
        assert_eq!(layout.view().len(), 1);
    }
}
