#![forbid(unsafe_code)]

//! The retained node tree and its geometry environment.
//!
//! # Invariants
//!
//! - `NodeId`s are never reused; a removed node's id stays dead.
//! - A node has at most one parent; `append_child` re-parents.
//! - The root node cannot be removed or re-parented.
//! - Listener ids are never reused either.
//!
//! # Failure Modes
//!
//! - Operations on a missing node are no-ops (reads return defaults).
//!   Stale handles never panic.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::event::{EventKind, ListenerId, ListenerTarget};

/// Stable handle for a node in the surface tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A width/height pair in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A registered listener (target + kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub target: ListenerTarget,
    pub kind: EventKind,
}

#[derive(Debug, Default)]
struct Node {
    classes: Vec<String>,
    attrs: AHashMap<String, String>,
    text: Option<String>,
    children: SmallVec<[NodeId; 4]>,
    parent: Option<NodeId>,
    shown: bool,
    width: Option<u16>,
    overflow_scroll: bool,
    scroll_height: u16,
    scroll_top: u16,
    padding_left: u16,
    padding_right: u16,
}

impl Node {
    fn new() -> Self {
        Self {
            shown: true,
            ..Default::default()
        }
    }
}

/// An in-memory visual surface: node tree, viewport geometry, listeners.
#[derive(Debug)]
pub struct Surface {
    nodes: AHashMap<NodeId, Node>,
    root: NodeId,
    next_node: u64,
    listeners: AHashMap<ListenerId, Listener>,
    next_listener: u64,
    viewport: Size,
    content_width: u16,
    /// Ambient scrollbar thickness of the host environment.
    env_scrollbar: u16,
    pub(crate) scrollbar_cache: Option<u16>,
    reflows: u32,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// Create a surface with default geometry (1024x768 viewport, content
    /// exactly filling it, 15-unit ambient scrollbar).
    pub fn new() -> Self {
        Self::with_metrics(Size::new(1024, 768), 1024, 15)
    }

    /// Create a surface with explicit geometry.
    pub fn with_metrics(viewport: Size, content_width: u16, env_scrollbar: u16) -> Self {
        let root = NodeId(0);
        let mut nodes = AHashMap::new();
        nodes.insert(root, Node::new());
        Self {
            nodes,
            root,
            next_node: 1,
            listeners: AHashMap::new(),
            next_listener: 1,
            viewport,
            content_width,
            env_scrollbar,
            scrollbar_cache: None,
            reflows: 0,
        }
    }

    // --- Tree ---

    /// The root node (the "body" of the surface).
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node.
    pub fn create_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new());
        id
    }

    /// Create a detached node carrying one class.
    pub fn create_with_class(&mut self, class: &str) -> NodeId {
        let id = self.create_node();
        self.add_class(id, class);
        id
    }

    /// Whether the node still exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total live node count (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append `child` as the last child of `parent`, re-parenting if needed.
    ///
    /// No-op if either node is missing, if `child` is the root, or if the
    /// append would be a self-append.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || child == self.root {
            return;
        }
        if !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    /// Detach a node from its parent, leaving it (and its subtree) alive.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(&child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
    }

    /// Detach and destroy a node together with its whole subtree.
    ///
    /// Returns `false` if the node was missing or is the root.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(&id) {
            return false;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
        true
    }

    /// Children of a node, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| &n.children)
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    // --- Classes and attributes ---

    /// Add a class (idempotent).
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id)
            && !node.classes.iter().any(|c| c == class)
        {
            node.classes.push(class.to_string());
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.classes.retain(|c| c != class);
        }
    }

    /// Whether the node carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Set an attribute value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Read an attribute value.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    // --- Text ---

    /// Set the node's own text content.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = Some(text.to_string());
        }
    }

    /// The node's own text content.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.text.as_deref())
    }

    /// Concatenated text of the node and its whole subtree, depth-first.
    pub fn collect_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text_into(id, &mut out);
        out
    }

    fn collect_text_into(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let Some(text) = &node.text {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text_into(child, out);
        }
    }

    /// Display width of the subtree's text in terminal columns.
    ///
    /// Wide glyphs count as two columns, matching how a cell-based host
    /// would lay the text out.
    pub fn text_width(&self, id: NodeId) -> u16 {
        use unicode_width::UnicodeWidthStr;
        self.collect_text(id).width().min(u16::MAX as usize) as u16
    }

    // --- Inline style and geometry ---

    /// Show or hide the node (inline display toggle).
    pub fn set_shown(&mut self, id: NodeId, shown: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.shown = shown;
        }
    }

    /// Whether the node's inline display is on.
    pub fn is_shown(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.shown)
    }

    /// Set an explicit width.
    pub fn set_width(&mut self, id: NodeId, width: u16) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.width = Some(width);
        }
    }

    /// Force a scrollable overflow mode on the node.
    pub fn set_overflow_scroll(&mut self, id: NodeId, scroll: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.overflow_scroll = scroll;
        }
    }

    /// Measured width of the node.
    ///
    /// A node with an explicit width measures as that width. Otherwise it
    /// fills its parent, minus the ambient scrollbar when the parent is in
    /// forced-scroll overflow. Detached, width-less nodes measure as the
    /// content width of the surface.
    pub fn offset_width(&self, id: NodeId) -> u16 {
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        if let Some(width) = node.width {
            return width;
        }
        match node.parent.and_then(|p| self.nodes.get(&p)) {
            Some(parent) => {
                let base = parent
                    .width
                    .unwrap_or(self.content_width);
                if parent.overflow_scroll {
                    base.saturating_sub(self.env_scrollbar)
                } else {
                    base
                }
            }
            None => self.content_width,
        }
    }

    /// Read a layout-dependent property, committing pending style changes.
    ///
    /// The read itself is the point: toggling a transition class in the same
    /// frame as the style it transitions from needs a reflow in between for
    /// the transition to play. The surface counts these reads so tests can
    /// assert the ordering contract.
    pub fn force_reflow(&mut self, id: NodeId) -> u16 {
        self.reflows += 1;
        self.offset_width(id)
    }

    /// Number of forced reflows so far.
    pub fn reflow_count(&self) -> u32 {
        self.reflows
    }

    /// Set the node's scrollable content height.
    pub fn set_scroll_height(&mut self, id: NodeId, height: u16) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scroll_height = height;
        }
    }

    /// The node's scrollable content height.
    pub fn scroll_height(&self, id: NodeId) -> u16 {
        self.nodes.get(&id).map_or(0, |n| n.scroll_height)
    }

    /// Set the node's scroll offset.
    pub fn set_scroll_top(&mut self, id: NodeId, top: u16) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scroll_top = top;
        }
    }

    /// The node's scroll offset.
    pub fn scroll_top(&self, id: NodeId) -> u16 {
        self.nodes.get(&id).map_or(0, |n| n.scroll_top)
    }

    /// Set inline left padding.
    pub fn set_padding_left(&mut self, id: NodeId, pad: u16) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.padding_left = pad;
        }
    }

    /// Inline left padding.
    pub fn padding_left(&self, id: NodeId) -> u16 {
        self.nodes.get(&id).map_or(0, |n| n.padding_left)
    }

    /// Set inline right padding.
    pub fn set_padding_right(&mut self, id: NodeId, pad: u16) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.padding_right = pad;
        }
    }

    /// Inline right padding.
    pub fn padding_right(&self, id: NodeId) -> u16 {
        self.nodes.get(&id).map_or(0, |n| n.padding_right)
    }

    // --- Viewport metrics ---

    /// Current viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Update the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Width of the root content box (the "client width").
    pub fn content_width(&self) -> u16 {
        self.content_width
    }

    /// Update the root content box width.
    pub fn set_content_width(&mut self, width: u16) {
        self.content_width = width;
    }

    /// Ambient scrollbar thickness of the host environment.
    pub(crate) fn env_scrollbar(&self) -> u16 {
        self.env_scrollbar
    }

    // --- Selectors ---

    /// Resolve a selector against the tree.
    ///
    /// `#name` matches an `id` attribute, `.name` matches a class, anything
    /// else matches a class literally. First match in depth-first order.
    pub fn select(&self, selector: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.matches(id, selector) {
                return Some(id);
            }
            if let Some(node) = self.nodes.get(&id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        None
    }

    /// First descendant of `from` (excluding `from` itself) carrying a class.
    pub fn find_descendant_by_class(&self, from: NodeId, class: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(from).to_vec();
        while let Some(id) = stack.pop() {
            if self.has_class(id, class) {
                return Some(id);
            }
            if let Some(node) = self.nodes.get(&id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        None
    }

    fn matches(&self, id: NodeId, selector: &str) -> bool {
        if let Some(attr_id) = selector.strip_prefix('#') {
            self.attr(id, "id") == Some(attr_id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.has_class(id, class)
        } else {
            self.has_class(id, selector)
        }
    }

    // --- Listeners ---

    /// Register a listener; the surface only does bookkeeping.
    pub fn add_listener(&mut self, target: ListenerTarget, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Listener { target, kind });
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Whether a listener registration is still live.
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Look up a listener registration.
    pub fn listener(&self, id: ListenerId) -> Option<&Listener> {
        self.listeners.get(&id)
    }

    /// Number of live listener registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
