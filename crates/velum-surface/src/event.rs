#![forbid(unsafe_code)]

//! Input events and listener registrations.
//!
//! Listeners are plain registrations: the surface records *that* a listener
//! of a given kind is attached to a given target and hands back a stable
//! [`ListenerId`]. Routing an [`InputEvent`] to whoever registered the
//! listener is the caller's job — the surface only does the bookkeeping,
//! which is what makes "no listener leaks" checkable from the outside.

use crate::surface::NodeId;

/// A key identity, reduced to what overlay widgets care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The dismiss key.
    Escape,
    /// Activation key.
    Enter,
    /// Any printable character.
    Char(char),
}

/// Kind of listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Key press delivered to the surface root.
    Key,
    /// Pointer press delivered to a specific node.
    Pointer,
    /// Viewport geometry change.
    Resize,
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    /// The surface root (the "body").
    Root,
    /// A specific node.
    Node(NodeId),
    /// The viewport itself (resize only).
    Viewport,
}

/// Stable handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// An input event as delivered by the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press.
    Key(Key),
    /// A pointer press on a node.
    Pointer {
        /// The node that was hit.
        target: NodeId,
    },
    /// The viewport changed size.
    Resize {
        /// New viewport width.
        width: u16,
        /// New viewport height.
        height: u16,
    },
}

impl InputEvent {
    /// The listener kind this event is routed to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Key(_) => EventKind::Key,
            Self::Pointer { .. } => EventKind::Pointer,
            Self::Resize { .. } => EventKind::Resize,
        }
    }
}
