//! Pushing solved geometry onto scene nodes

use crate::scene::SceneNode;

use super::types::Geometry;

/// Write `geometry` to `node`.
///
/// Position is always set. Width and height are only set on nodes that
/// expose [`Resizable`](crate::scene::Resizable); other nodes keep their
/// intrinsic size.
pub fn apply_geometry(node: &mut dyn SceneNode, geometry: &Geometry) {
    let origin = geometry.origin();
    node.set_position(origin.x, origin.y);
    if let Some(resizable) = node.as_resizable() {
        resizable.set_width(geometry.width);
        resizable.set_height(geometry.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Point, Size};
    use crate::scene::{Graphics, Sprite, Text};

    #[test]
    fn test_resizable_node_gets_full_geometry() {
        let mut node = Graphics::new("box");
        apply_geometry(&mut node, &Geometry::new(8.0, 8.0, 100.0, 50.0));
        assert_eq!(node.position(), Point::new(8.0, 8.0));
        assert_eq!(node.size(), Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn test_fixed_size_node_only_moves() {
        let mut sprite = Sprite::new("icon", Size::new(16.0, 16.0));
        apply_geometry(&mut sprite, &Geometry::new(20.0, 30.0, 100.0, 50.0));
        assert_eq!(sprite.position(), Point::new(20.0, 30.0));
        assert_eq!(sprite.size(), Some(Size::new(16.0, 16.0)));

        let mut label = Text::new("label", "ok");
        let before = label.size();
        apply_geometry(&mut label, &Geometry::new(1.0, 2.0, 300.0, 300.0));
        assert_eq!(label.size(), before);
    }

    #[test]
    fn test_negative_geometry_passes_through() {
        let mut node = Graphics::new("box");
        apply_geometry(&mut node, &Geometry::new(-10.0, 0.0, -5.0, 0.0));
        assert_eq!(node.position(), Point::new(-10.0, 0.0));
        assert_eq!(node.size(), Some(Size::new(-5.0, 0.0)));
    }
}
