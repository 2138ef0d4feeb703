//! Integration tests for binding a constraint layout to scene nodes:
//! association, sizing source, geometry application and degradation when
//! nodes or constraints are missing.

use pretty_assertions::assert_eq;
use vfl_layout::layout::{Point, Size};
use vfl_layout::{
    ConstraintView, Container, Geometry, Graphics, Layout, LayoutConfig, LayoutError, NodeId,
    SceneNode, Sprite, Surface, Text, VflSource,
};

const TOLERANCE: f64 = 0.001;

fn position(surface: &Surface, id: NodeId) -> Point {
    surface
        .scene()
        .node(id)
        .map(|n| n.position())
        .unwrap_or_else(|| panic!("node {} not in scene", id))
}

fn size(surface: &Surface, id: NodeId) -> Size {
    surface
        .scene()
        .size(id)
        .unwrap_or_else(|| panic!("node {} not in scene", id))
}

fn assert_rect(surface: &Surface, id: NodeId, expected: (f64, f64, f64, f64)) {
    let p = position(surface, id);
    let s = size(surface, id);
    let actual = (p.x, p.y, s.width, s.height);
    assert!(
        (actual.0 - expected.0).abs() < TOLERANCE
            && (actual.1 - expected.1).abs() < TOLERANCE
            && (actual.2 - expected.2).abs() < TOLERANCE
            && (actual.3 - expected.3).abs() < TOLERANCE,
        "node {}: expected {:?}, got {:?}",
        id,
        expected,
        actual
    );
}

#[test]
fn test_box_within_surface() {
    let mut surface = Surface::new(300.0, 200.0);
    let id = surface.add(Graphics::new("box")).unwrap();

    let mut layout = Layout::new(
        vec!["H:|-[box(100)]-|", "V:|-[box(50)]-|"],
        &surface,
        None,
    );
    layout.render(&mut surface);

    let p = position(&surface, id);
    let s = size(&surface, id);
    assert!((s.width - 100.0).abs() < TOLERANCE);
    assert!((s.height - 50.0).abs() < TOLERANCE);
    assert!(p.x >= 0.0 && p.x + s.width <= 300.0);
    assert!(p.y >= 0.0 && p.y + s.height <= 200.0);
}

#[test]
fn test_each_node_gets_its_own_sub_view() {
    let mut surface = Surface::new(200.0, 100.0);
    let a = surface.add(Graphics::new("a")).unwrap();
    let b = surface.add(Graphics::new("b")).unwrap();

    let mut layout = Layout::new("H:|[a][b(==a)]|\nV:|[a]|\nV:|[b]|", &surface, None);
    layout.render(&mut surface);

    assert_eq!(layout.node_for("a"), Some(a));
    assert_eq!(layout.node_for("b"), Some(b));
    assert_rect(&surface, a, (0.0, 0.0, 100.0, 100.0));
    assert_rect(&surface, b, (100.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_sub_view_without_node_is_skipped() {
    let mut surface = Surface::new(200.0, 100.0);
    let a = surface.add(Graphics::new("a")).unwrap();

    let mut layout = Layout::new("H:|[a(50)][ghost]|", &surface, None);
    assert_eq!(layout.children().len(), 1);
    assert_eq!(layout.node_for("ghost"), None);

    layout.render(&mut surface);
    assert!((size(&surface, a).width - 50.0).abs() < TOLERANCE);
}

#[test]
fn test_node_names_are_case_sensitive() {
    let mut surface = Surface::new(200.0, 100.0);
    surface.add(Graphics::new("Header")).unwrap();

    let layout = Layout::new("H:|[header]|", &surface, None);
    assert!(layout.children().is_empty());
}

#[test]
fn test_parent_size_takes_precedence() {
    let mut surface = Surface::new(300.0, 200.0);
    let panel = surface.add(Container::new("panel").with_size(120.0, 60.0)).unwrap();
    let a = surface
        .scene_mut()
        .add_child(panel, Graphics::new("a"))
        .unwrap();

    let mut layout = Layout::new(["H:|[a]|", "V:|[a]|"], &surface, Some(panel));
    layout.render(&mut surface);

    assert_rect(&surface, a, (0.0, 0.0, 120.0, 60.0));
}

#[test]
fn test_content_sized_parent_ignores_laid_out_nodes() {
    let mut surface = Surface::new(300.0, 200.0);
    let panel = surface.add(Container::new("panel")).unwrap();
    surface
        .scene_mut()
        .add_child(panel, Graphics::new("bg").with_size(200.0, 100.0))
        .unwrap();
    let a = surface
        .scene_mut()
        .add_child(panel, Graphics::new("a"))
        .unwrap();

    let mut layout = Layout::new(["H:|-[a]-|", "V:|-[a]-|"], &surface, Some(panel));
    for _ in 0..4 {
        layout.render(&mut surface);
        assert_rect(&surface, a, (8.0, 8.0, 184.0, 84.0));
    }
    assert_eq!(size(&surface, panel), Size::new(200.0, 100.0));
}

#[test]
fn test_content_sized_parent_renders_stably() {
    let mut surface = Surface::new(300.0, 200.0);
    let panel = surface.add(Container::new("panel")).unwrap();
    let a = surface
        .scene_mut()
        .add_child(panel, Graphics::new("a"))
        .unwrap();

    let mut layout = Layout::new(["H:|-[a]-|", "V:|-[a]-|"], &surface, Some(panel));
    layout.render(&mut surface);
    let first = (position(&surface, a), size(&surface, a));
    for _ in 0..3 {
        layout.render(&mut surface);
        assert_eq!((position(&surface, a), size(&surface, a)), first);
    }
}

#[test]
fn test_surface_resize_is_picked_up() {
    let mut surface = Surface::new(300.0, 200.0);
    let a = surface.add(Graphics::new("a")).unwrap();

    let mut layout = Layout::new(["H:|-[a]-|", "V:|-[a]-|"], &surface, None);
    layout.render(&mut surface);
    assert_rect(&surface, a, (8.0, 8.0, 284.0, 184.0));

    surface.resize(100.0, 50.0);
    layout.render(&mut surface);
    assert_rect(&surface, a, (8.0, 8.0, 84.0, 34.0));
}

#[test]
fn test_fixed_size_nodes_are_only_moved() {
    let mut surface = Surface::new(300.0, 200.0);
    let icon = surface
        .add(Sprite::new("icon", Size::new(16.0, 16.0)))
        .unwrap();
    let label = surface
        .add(Text::new("label", "Save").with_font_size(10.0))
        .unwrap();
    let label_size = size(&surface, label);

    let mut layout = Layout::new(
        ["H:|-[icon(40)]-[label(200)]", "V:|-[icon(40)]", "V:|-[label(30)]"],
        &surface,
        None,
    );
    layout.render(&mut surface);

    assert_rect(&surface, icon, (8.0, 8.0, 16.0, 16.0));
    assert_eq!(size(&surface, icon), Size::new(16.0, 16.0));
    assert_rect(&surface, label, (56.0, 8.0, label_size.width, label_size.height));
    assert_eq!(size(&surface, label), label_size);
}

#[test]
fn test_render_is_idempotent() {
    let mut surface = Surface::new(300.0, 200.0);
    let a = surface.add(Graphics::new("a")).unwrap();
    let b = surface.add(Graphics::new("b")).unwrap();

    let mut layout = Layout::new(
        ["H:|-[a]-[b(==a)]-|", "V:|-[a]-|", "V:|-[b(a)]"],
        &surface,
        None,
    );

    layout.render(&mut surface);
    let first = [a, b].map(|id| (position(&surface, id), size(&surface, id)));
    layout.render(&mut surface);
    let second = [a, b].map(|id| (position(&surface, id), size(&surface, id)));

    assert_eq!(first, second);
}

#[test]
fn test_removed_node_does_not_abort_frame() {
    let mut surface = Surface::new(200.0, 100.0);
    let a = surface.add(Graphics::new("a")).unwrap();
    let b = surface.add(Graphics::new("b")).unwrap();

    let mut layout = Layout::new(["H:|[a][b(==a)]|", "V:|[a]|"], &surface, None);
    surface.scene_mut().remove(a);
    layout.render(&mut surface);

    assert!(!surface.scene().contains(a));
    assert_eq!(layout.node_for("a"), Some(a));
    assert!((position(&surface, b).x - 100.0).abs() < TOLERANCE);
}

#[test]
fn test_removed_parent_skips_frame() {
    let mut surface = Surface::new(200.0, 100.0);
    let panel = surface.add(Container::new("panel").with_size(50.0, 50.0)).unwrap();
    let outside = surface.add(Graphics::new("a")).unwrap();
    surface
        .scene_mut()
        .node_mut(outside)
        .unwrap()
        .set_position(3.0, 4.0);

    let mut layout = Layout::new("H:|[a]|", &surface, Some(panel));
    surface.scene_mut().remove(panel);
    layout.render(&mut surface);

    assert_eq!(position(&surface, outside), Point::new(3.0, 4.0));
}

#[test]
fn test_malformed_vfl_leaves_scene_untouched() {
    let mut surface = Surface::new(200.0, 100.0);
    let a = surface.add(Graphics::new("a").with_size(10.0, 10.0)).unwrap();
    surface.scene_mut().node_mut(a).unwrap().set_position(5.0, 5.0);

    // The second line is broken, so the first one is dropped too
    let mut layout = Layout::new(["H:|[a]|", "V:|[a"], &surface, None);
    assert!(layout.view().is_empty());
    assert!(layout.children().is_empty());

    layout.render(&mut surface);
    assert_rect(&surface, a, (5.0, 5.0, 10.0, 10.0));
}

#[test]
fn test_try_new_returns_parse_errors() {
    let surface = Surface::new(200.0, 100.0);
    let result = Layout::try_new("H:|[a]-|-[b]", &surface, None, LayoutConfig::default());
    match result {
        Err(LayoutError::Parse(errors)) => assert_eq!(errors[0].line(), 0),
        other => panic!("Expected parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_try_new_with_strict_config() {
    let surface = Surface::new(200.0, 100.0);
    let config = LayoutConfig::default().with_extended(false);
    assert!(Layout::try_new("H:|~[a]~|", &surface, None, config.clone()).is_err());
    assert!(Layout::try_new("H:|-[a]-|", &surface, None, config).is_ok());
}

/// Backend that gives every sub-view the full root size
#[derive(Debug, Default)]
struct FillView {
    views: Vec<(String, Geometry)>,
}

impl ConstraintView for FillView {
    fn add_vfl(&mut self, vfl: &VflSource, config: &LayoutConfig) -> Result<(), LayoutError> {
        let set = vfl_layout::parse_vfl(vfl, config)?;
        self.views = set
            .views
            .into_iter()
            .map(|name| (name, Geometry::default()))
            .collect();
        Ok(())
    }

    fn set_size(&mut self, width: f64, height: f64) {
        for (_, g) in &mut self.views {
            *g = Geometry::new(0.0, 0.0, width, height);
        }
    }

    fn sub_views(&self) -> impl Iterator<Item = (&str, Geometry)> + '_ {
        self.views.iter().map(|(name, g)| (name.as_str(), *g))
    }

    fn geometry(&self, name: &str) -> Option<Geometry> {
        self.views.iter().find(|(n, _)| n == name).map(|(_, g)| *g)
    }
}

#[test]
fn test_custom_constraint_backend() {
    let mut surface = Surface::new(64.0, 32.0);
    let a = surface.add(Graphics::new("a")).unwrap();

    let mut layout = Layout::with_view(
        FillView::default(),
        "H:[a]",
        &surface,
        None,
        LayoutConfig::default(),
    );
    layout.render(&mut surface);

    assert_rect(&surface, a, (0.0, 0.0, 64.0, 32.0));
    assert_eq!(layout.view().geometry("a"), Some(Geometry::new(0.0, 0.0, 64.0, 32.0)));
}
