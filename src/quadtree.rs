use std::fmt;

use tracing::{debug, trace, warn};

use crate::list::List;
use crate::{Bounded, QuadtreeConfig, QuadtreeError, QuadtreeVisitor, Rect};

/// Index of a node inside its [`Quadtree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a stored entity inside its [`Quadtree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Node {
    bounds: Rect,
    depth: u32,
    entities: Vec<EntityId>,
    children: Option<[NodeId; 4]>,
}

impl Node {
    fn leaf(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            entities: Vec::new(),
            children: None,
        }
    }
}

/// Recursively subdivided region storing entities by their rectangle.
///
/// Nodes and entities live in two arenas; a node refers to its children and
/// to its entities by index. Nodes are only ever added: once a node splits it
/// keeps its four children for the life of the tree.
pub struct Quadtree<E> {
    root: NodeId,
    config: QuadtreeConfig,
    nodes: List<Node>,
    entities: List<E>,
    dropped: usize,
}

impl<E> Quadtree<E> {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::with_config(Rect::new(x, y, width, height), QuadtreeConfig::default())
    }

    pub fn with_config(bounds: Rect, config: QuadtreeConfig) -> Self {
        let mut nodes = List::new();
        let root = NodeId(nodes.push(Node::leaf(bounds, 0)));
        Self {
            root,
            config,
            nodes,
            entities: List::new(),
            dropped: 0,
        }
    }

    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[self.root.0].bounds
    }

    pub fn root(&self) -> QuadNode<'_, E> {
        QuadNode {
            tree: self,
            id: self.root,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<QuadNode<'_, E>> {
        self.nodes.get(id.0).map(|_| QuadNode { tree: self, id })
    }

    pub fn entity(&self, id: EntityId) -> Option<&E> {
        self.entities.get(id.0)
    }

    /// Every stored entity, in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &E)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(idx, entity)| (EntityId(idx), entity))
    }

    /// Number of entities stored.
    pub fn len(&self) -> usize {
        self.entities.size()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.size()
    }

    /// How many inserts were ignored because the entity did not fit the root.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Bounds of every node, parent before children.
    pub fn collect_bounds(&self) -> Vec<Rect> {
        self.root().collect_bounds()
    }

    /// The deepest node whose bounds fully contain `rect`.
    pub fn find_smallest_containing(&self, rect: &Rect) -> Option<QuadNode<'_, E>> {
        self.root().find_smallest_containing(rect)
    }

    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: QuadtreeVisitor<E>,
    {
        self.traverse_from(self.root, visitor);
    }

    fn traverse_from<V>(&self, start: NodeId, visitor: &mut V)
    where
        V: QuadtreeVisitor<E>,
    {
        let mut to_process = vec![start];

        while let Some(id) = to_process.pop() {
            let node = &self.nodes[id.0];
            match node.children {
                Some(children) => {
                    // Reversed so the stack pops them top-left first.
                    to_process.extend(children.iter().rev());
                    visitor.branch(node.depth, node.bounds);
                }
                None => visitor.leaf(node.depth, node.bounds),
            }
            for &entity in &node.entities {
                visitor.entity(entity, &self.entities[entity.0]);
            }
        }
    }

    fn smallest_containing(&self, id: NodeId, rect: &Rect) -> Option<NodeId> {
        let node = &self.nodes[id.0];
        if !node.bounds.contains(rect) {
            return None;
        }

        let mut smallest = id;
        if let Some(children) = node.children {
            for child in children {
                if let Some(found) = self.smallest_containing(child, rect) {
                    smallest = found;
                }
            }
        }
        Some(smallest)
    }

    fn containing_child(&self, children: &[NodeId; 4], rect: &Rect) -> Option<NodeId> {
        children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].bounds.contains(rect))
    }
}

impl<E> Quadtree<E>
where
    E: Bounded,
{
    /// Stores `entity` at the deepest existing node that fully contains it,
    /// splitting the leaf it lands in when that leaf grows past the threshold.
    ///
    /// An entity that does not fit inside the tree bounds is dropped and
    /// `None` is returned.
    pub fn insert(&mut self, entity: E) -> Option<EntityId> {
        let rect = entity.rect();
        if !self.bounds().contains(&rect) {
            self.dropped += 1;
            trace!(?rect, bounds = ?self.bounds(), "entity outside the tree, dropped");
            return None;
        }

        let id = EntityId(self.entities.push(entity));
        self.node_insert(self.root, id, rect);
        Some(id)
    }

    /// Splits a leaf into four quadrants and pushes down every entity that one
    /// of them fully contains.
    ///
    /// Inserting already does this on its own; a node splits at most once, so
    /// asking again for a subdivided node is refused and leaves it untouched.
    pub fn subdivide(&mut self, id: NodeId) -> Result<(), QuadtreeError> {
        let node = self.nodes.get(id.0).ok_or(QuadtreeError::UnknownNode(id))?;
        if node.children.is_some() {
            warn!(node = %id, "refusing to subdivide a node twice");
            return Err(QuadtreeError::AlreadySubdivided(id));
        }
        if !is_divisible(&node.bounds) {
            return Err(QuadtreeError::Indivisible(id));
        }
        self.split(id);
        Ok(())
    }

    /// Every stored entity whose rectangle overlaps `area`.
    pub fn query(&self, area: &Rect) -> Vec<&E> {
        let mut out = Vec::new();
        let mut to_process = vec![self.root];

        while let Some(id) = to_process.pop() {
            let node = &self.nodes[id.0];
            if !node.bounds.intersects(area) {
                continue;
            }
            for &entity in &node.entities {
                let entity = &self.entities[entity.0];
                if entity.rect().intersects(area) {
                    out.push(entity);
                }
            }
            if let Some(children) = node.children {
                to_process.extend(children.iter().rev());
            }
        }
        out
    }

    // `node` must already contain `rect`.
    fn node_insert(&mut self, id: NodeId, entity: EntityId, rect: Rect) {
        match self.nodes[id.0].children {
            Some(children) => match self.containing_child(&children, &rect) {
                Some(child) => self.node_insert(child, entity, rect),
                None => self.nodes[id.0].entities.push(entity),
            },
            None => {
                let node = &mut self.nodes[id.0];
                node.entities.push(entity);
                if node.entities.len() > self.config.subdivide_threshold
                    && is_divisible(&node.bounds)
                {
                    self.split(id);
                }
            }
        }
    }

    fn split(&mut self, id: NodeId) {
        let Node { bounds, depth, .. } = self.nodes[id.0];
        let nodes = &mut self.nodes;
        let children = bounds
            .quadrants()
            .map(|quadrant| NodeId(nodes.push(Node::leaf(quadrant, depth + 1))));
        self.nodes[id.0].children = Some(children);

        let held = std::mem::take(&mut self.nodes[id.0].entities);
        let total = held.len();
        let mut kept = Vec::new();
        for entity in held {
            let rect = self.entities[entity.0].rect();
            match self.containing_child(&children, &rect) {
                Some(child) => self.node_insert(child, entity, rect),
                None => kept.push(entity),
            }
        }

        debug!(
            node = %id,
            ?bounds,
            depth,
            moved = total - kept.len(),
            kept = kept.len(),
            "subdivided node"
        );
        self.nodes[id.0].entities = kept;
    }
}

impl<E> fmt::Debug for Quadtree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quadtree")
            .field("bounds", &self.bounds())
            .field("nodes", &self.nodes.size())
            .field("entities", &self.entities.size())
            .field("dropped", &self.dropped)
            .finish()
    }
}

// Splitting anything narrower would yield zero-sized quadrants that overlap.
fn is_divisible(bounds: &Rect) -> bool {
    bounds.width >= 2 && bounds.height >= 2
}

/// Borrowed view of one node of a [`Quadtree`].
pub struct QuadNode<'a, E> {
    tree: &'a Quadtree<E>,
    id: NodeId,
}

impl<'a, E> Clone for QuadNode<'a, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, E> Copy for QuadNode<'a, E> {}

impl<'a, E> QuadNode<'a, E> {
    fn raw(&self) -> &'a Node {
        let tree = self.tree;
        &tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.raw().bounds
    }

    /// Distance from the root, which sits at depth zero.
    pub fn depth(&self) -> u32 {
        self.raw().depth
    }

    pub fn is_leaf(&self) -> bool {
        self.raw().children.is_none()
    }

    /// The four quadrants, top-left, top-right, bottom-left, bottom-right.
    pub fn children(&self) -> Option<[QuadNode<'a, E>; 4]> {
        let tree = self.tree;
        self.raw()
            .children
            .map(|children| children.map(|id| QuadNode { tree, id }))
    }

    /// Ids of the entities stored directly at this node.
    pub fn entity_ids(&self) -> &'a [EntityId] {
        &self.raw().entities
    }

    /// Entities stored directly at this node, not in its descendants.
    pub fn entities(&self) -> impl Iterator<Item = &'a E> + 'a {
        let tree = self.tree;
        self.raw()
            .entities
            .iter()
            .map(move |entity| &tree.entities[entity.0])
    }

    pub fn collect_bounds(&self) -> Vec<Rect> {
        let mut collector = BoundsCollector::default();
        self.tree.traverse_from(self.id, &mut collector);
        collector.bounds
    }

    pub fn find_smallest_containing(&self, rect: &Rect) -> Option<QuadNode<'a, E>> {
        let tree = self.tree;
        tree.smallest_containing(self.id, rect)
            .map(|id| QuadNode { tree, id })
    }

    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: QuadtreeVisitor<E>,
    {
        self.tree.traverse_from(self.id, visitor);
    }
}

impl<'a, E> fmt::Debug for QuadNode<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuadNode")
            .field("id", &self.id)
            .field("bounds", &self.bounds())
            .field("depth", &self.depth())
            .field("entities", &self.raw().entities.len())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}

#[derive(Default)]
struct BoundsCollector {
    bounds: Vec<Rect>,
}

impl<E> QuadtreeVisitor<E> for BoundsCollector {
    fn leaf(&mut self, _depth: u32, bounds: Rect) {
        self.bounds.push(bounds);
    }

    fn branch(&mut self, _depth: u32, bounds: Rect) {
        self.bounds.push(bounds);
    }
}
