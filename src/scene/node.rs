//! Scene node types and the resizing capability

use crate::layout::types::{Point, Size};

/// A node that accepts an explicit width and height
pub trait Resizable {
    fn set_width(&mut self, width: f64);
    fn set_height(&mut self, height: f64);
}

/// A renderable element of the scene.
///
/// Every node can be positioned. Nodes that can also be sized return
/// themselves from [`SceneNode::as_resizable`].
pub trait SceneNode: std::fmt::Debug {
    fn name(&self) -> &str;

    /// Position of the top-left corner relative to the parent
    fn position(&self) -> Point;

    fn set_position(&mut self, x: f64, y: f64);

    /// Own size, if the node has one. Containers without a fixed size return
    /// None and are measured from their children by the scene.
    fn size(&self) -> Option<Size>;

    fn as_resizable(&mut self) -> Option<&mut dyn Resizable> {
        None
    }
}

/// Vector shape drawn into its own width and height
#[derive(Debug, Clone, PartialEq)]
pub struct Graphics {
    name: String,
    position: Point,
    size: Size,
}

impl Graphics {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point::default(),
            size: Size::default(),
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }
}

impl SceneNode for Graphics {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
    }

    fn size(&self) -> Option<Size> {
        Some(self.size)
    }

    fn as_resizable(&mut self) -> Option<&mut dyn Resizable> {
        Some(self)
    }
}

impl Resizable for Graphics {
    fn set_width(&mut self, width: f64) {
        self.size.width = width;
    }

    fn set_height(&mut self, height: f64) {
        self.size.height = height;
    }
}

/// Textured quad; its size is the size of its texture
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    name: String,
    position: Point,
    texture: Size,
}

impl Sprite {
    pub fn new(name: impl Into<String>, texture: Size) -> Self {
        Self {
            name: name.into(),
            position: Point::default(),
            texture,
        }
    }
}

impl SceneNode for Sprite {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
    }

    fn size(&self) -> Option<Size> {
        Some(self.texture)
    }
}

/// Single-line text label
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    name: String,
    position: Point,
    content: String,
    font_size: f64,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 14.0;

    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point::default(),
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }
}

impl SceneNode for Text {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
    }

    fn size(&self) -> Option<Size> {
        // Approximate width: ~0.6 * font_size per character
        let width = self.content.chars().count() as f64 * self.font_size * 0.6;
        Some(Size::new(width, self.font_size * 1.2))
    }
}

/// Groups child nodes. Sized explicitly or by its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    name: String,
    position: Point,
    fixed_size: Option<Size>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point::default(),
            fixed_size: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.fixed_size = Some(Size::new(width, height));
        self
    }
}

impl SceneNode for Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
    }

    fn size(&self) -> Option<Size> {
        self.fixed_size
    }
}
