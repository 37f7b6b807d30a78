#![forbid(unsafe_code)]

//! Event wiring: attaching and detaching the modal's input listeners.
//!
//! The handler set is created when the backdrop transition completes and
//! torn down as soon as a hide is accepted, so a modal on its way out
//! never reacts to input. Detach is safe to call with or without the
//! optional keyboard listener.

use velum_surface::{EventKind, ListenerId, ListenerTarget, NodeId, Surface};

/// Listener handles owned by a shown modal.
#[derive(Debug)]
pub struct HandlerSet {
    /// Dismiss-key listener on the host root; wired only for a dynamic
    /// backdrop.
    pub keydown: Option<ListenerId>,
    /// Pointer listener on the container subtree.
    pub click: ListenerId,
    /// Viewport resize listener.
    pub resize: ListenerId,
}

impl HandlerSet {
    /// Register the modal's listeners on the surface.
    pub fn attach(surface: &mut Surface, container: NodeId, wire_keydown: bool) -> Self {
        let keydown = wire_keydown
            .then(|| surface.add_listener(ListenerTarget::Root, EventKind::Key));
        let click = surface.add_listener(ListenerTarget::Node(container), EventKind::Pointer);
        let resize = surface.add_listener(ListenerTarget::Viewport, EventKind::Resize);
        Self {
            keydown,
            click,
            resize,
        }
    }

    /// Remove every listener this set registered.
    pub fn detach(self, surface: &mut Surface) {
        if let Some(keydown) = self.keydown {
            surface.remove_listener(keydown);
        }
        surface.remove_listener(self.click);
        surface.remove_listener(self.resize);
    }

    /// Whether the dismiss key is wired.
    pub fn keydown_wired(&self) -> bool {
        self.keydown.is_some()
    }
}
