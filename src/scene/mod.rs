//! Scene graph that layouts position nodes in.
//!
//! Nodes live in a [`Scene`] registry and are addressed by [`NodeId`], a
//! generational handle: removing a node bumps the generation of its slot, so
//! ids held elsewhere turn stale instead of pointing at whatever reuses the
//! slot.

pub mod node;

pub use node::{Container, Graphics, Resizable, SceneNode, Sprite, Text};

use thiserror::Error;

use crate::layout::types::{BoundingBox, Size};

/// Generational handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Errors from scene mutation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("node {0} is no longer in the scene")]
    StaleNode(NodeId),
}

#[derive(Debug)]
struct Entry {
    node: Box<dyn SceneNode>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Registry of scene nodes and their parent/child links
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node with no parent
    pub fn insert(&mut self, node: impl SceneNode + 'static) -> NodeId {
        self.insert_entry(Entry {
            node: Box::new(node),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Insert a node as the last child of `parent`
    pub fn add_child(
        &mut self,
        parent: NodeId,
        node: impl SceneNode + 'static,
    ) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::StaleNode(parent));
        }
        let id = self.insert_entry(Entry {
            node: Box::new(node),
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.push(id);
        }
        Ok(id)
    }

    fn insert_entry(&mut self, entry: Entry) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Remove a node and its whole subtree. Returns false for a stale id.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.entry(id).map(|e| e.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.entry_mut(p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(entry) = slot.entry.take() {
                pending.extend(entry.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn node(&self, id: NodeId) -> Option<&dyn SceneNode> {
        let entry = self.entry(id)?;
        Some(entry.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut dyn SceneNode> {
        let entry = self.entry_mut(id)?;
        Some(entry.node.as_mut())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id)?.parent
    }

    /// Direct children in insertion order; empty for a stale id
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Find a descendant of `root` by exact name.
    ///
    /// Direct children are checked before deeper descendants, so a name used
    /// at several depths resolves to the shallowest match.
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let mut level: Vec<NodeId> = self.children(root).to_vec();
        while !level.is_empty() {
            for id in &level {
                if self.node(*id).is_some_and(|n| n.name() == name) {
                    return Some(*id);
                }
            }
            level = level
                .iter()
                .flat_map(|id| self.children(*id).iter().copied())
                .collect();
        }
        None
    }

    /// Names of every descendant of `root`
    pub fn descendant_names(&self, root: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut pending: Vec<NodeId> = self.children(root).to_vec();
        while let Some(id) = pending.pop() {
            if let Some(node) = self.node(id) {
                names.push(node.name().to_string());
            }
            pending.extend_from_slice(self.children(id));
        }
        names
    }

    /// Current size of a node.
    ///
    /// A node without its own size (a container with no fixed size) measures
    /// the union of its children's bounds.
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.size_excluding(id, &[])
    }

    /// Current size of a node, leaving the subtrees of `exclude` out of any
    /// content measurement.
    pub fn size_excluding(&self, id: NodeId, exclude: &[NodeId]) -> Option<Size> {
        let entry = self.entry(id)?;
        if let Some(size) = entry.node.size() {
            return Some(size);
        }
        let bounds = entry
            .children
            .iter()
            .filter(|child| !exclude.contains(child))
            .filter_map(|child| self.bounds_excluding(*child, exclude))
            .reduce(|acc, b| acc.union(&b));
        Some(bounds.map(|b| b.size()).unwrap_or_default())
    }

    /// Bounds of a node in its parent's coordinate space
    pub fn bounds(&self, id: NodeId) -> Option<BoundingBox> {
        self.bounds_excluding(id, &[])
    }

    fn bounds_excluding(&self, id: NodeId, exclude: &[NodeId]) -> Option<BoundingBox> {
        let node = self.node(id)?;
        Some(BoundingBox::at(
            node.position(),
            self.size_excluding(id, exclude)?,
        ))
    }
}

/// Drawable target: owns the scene, its root stage and the drawable size
#[derive(Debug)]
pub struct Surface {
    scene: Scene,
    stage: NodeId,
    width: f64,
    height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        let mut scene = Scene::new();
        let stage = scene.insert(Container::new("stage"));
        Self {
            scene,
            stage,
            width,
            height,
        }
    }

    /// Root container of the scene
    pub fn stage(&self) -> NodeId {
        self.stage
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Drawable size
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Add a node to the stage. Fails only if the stage was removed.
    pub fn add(&mut self, node: impl SceneNode + 'static) -> Result<NodeId, SceneError> {
        self.scene.add_child(self.stage, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut scene = Scene::new();
        let id = scene.insert(Graphics::new("box"));
        assert!(scene.contains(id));
        assert_eq!(scene.node(id).map(|n| n.name()), Some("box"));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_removed_id_is_stale() {
        let mut scene = Scene::new();
        let id = scene.insert(Graphics::new("box"));
        assert!(scene.remove(id));
        assert!(!scene.contains(id));
        assert!(scene.node_mut(id).is_none());
        assert!(!scene.remove(id));

        // The slot is reused with a new generation
        let reused = scene.insert(Graphics::new("other"));
        assert_eq!(reused.index(), id.index());
        assert_ne!(reused, id);
        assert!(!scene.contains(id));
    }

    #[test]
    fn test_remove_subtree() {
        let mut scene = Scene::new();
        let root = scene.insert(Container::new("root"));
        let panel = scene.add_child(root, Container::new("panel")).unwrap();
        let leaf = scene.add_child(panel, Graphics::new("leaf")).unwrap();

        scene.remove(panel);
        assert!(!scene.contains(leaf));
        assert!(scene.children(root).is_empty());
        assert!(scene.contains(root));
    }

    #[test]
    fn test_add_child_to_stale_parent() {
        let mut scene = Scene::new();
        let parent = scene.insert(Container::new("gone"));
        scene.remove(parent);
        assert_eq!(
            scene.add_child(parent, Graphics::new("x")),
            Err(SceneError::StaleNode(parent))
        );
    }

    #[test]
    fn test_find_prefers_shallow_match() {
        let mut scene = Scene::new();
        let root = scene.insert(Container::new("root"));
        let panel = scene.add_child(root, Container::new("panel")).unwrap();
        let deep = scene.add_child(panel, Graphics::new("box")).unwrap();
        let shallow = scene.add_child(root, Graphics::new("box")).unwrap();

        assert_eq!(scene.find_by_name(root, "box"), Some(shallow));
        assert_eq!(scene.find_by_name(panel, "box"), Some(deep));
        assert_eq!(scene.find_by_name(root, "Box"), None);
        assert_eq!(scene.find_by_name(root, "root"), None);
    }

    #[test]
    fn test_container_measures_children() {
        let mut scene = Scene::new();
        let root = scene.insert(Container::new("root"));
        let a = scene
            .add_child(root, Graphics::new("a").with_size(50.0, 20.0))
            .unwrap();
        scene
            .add_child(root, Graphics::new("b").with_size(10.0, 10.0))
            .unwrap();
        scene.node_mut(a).unwrap().set_position(100.0, 40.0);

        assert_eq!(scene.size(root), Some(Size::new(150.0, 60.0)));
    }

    #[test]
    fn test_container_size_ignores_offset() {
        let mut scene = Scene::new();
        let panel = scene.insert(Container::new("panel"));
        let bg = scene
            .add_child(panel, Graphics::new("bg").with_size(100.0, 50.0))
            .unwrap();
        scene.node_mut(bg).unwrap().set_position(200.0, 0.0);

        assert_eq!(scene.size(panel), Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn test_size_excluding_skips_subtrees() {
        let mut scene = Scene::new();
        let panel = scene.insert(Container::new("panel"));
        scene
            .add_child(panel, Graphics::new("bg").with_size(200.0, 100.0))
            .unwrap();
        let group = scene.add_child(panel, Container::new("group")).unwrap();
        let a = scene
            .add_child(group, Graphics::new("a").with_size(500.0, 500.0))
            .unwrap();

        assert_eq!(scene.size(panel), Some(Size::new(500.0, 500.0)));
        assert_eq!(
            scene.size_excluding(panel, &[a]),
            Some(Size::new(200.0, 100.0))
        );
        assert_eq!(scene.size_excluding(group, &[a]), Some(Size::default()));
    }

    #[test]
    fn test_fixed_container_size_wins() {
        let mut scene = Scene::new();
        let root = scene.insert(Container::new("root").with_size(80.0, 30.0));
        scene
            .add_child(root, Graphics::new("big").with_size(500.0, 500.0))
            .unwrap();
        assert_eq!(scene.size(root), Some(Size::new(80.0, 30.0)));
    }

    #[test]
    fn test_surface_adds_to_stage() {
        let mut surface = Surface::new(300.0, 200.0);
        let id = surface.add(Graphics::new("box")).unwrap();
        assert_eq!(surface.scene().parent(id), Some(surface.stage()));
        assert_eq!(surface.size(), Size::new(300.0, 200.0));

        surface.resize(640.0, 480.0);
        assert_eq!(surface.size(), Size::new(640.0, 480.0));
    }
}
