#![forbid(unsafe_code)]

//! Retained visual-surface abstraction for the velum modal kit.
//!
//! A [`Surface`] is an in-memory node tree standing in for the host
//! document of an interactive view: nodes carry classes, attributes, text,
//! inline padding/display style, and scroll metrics; the surface itself
//! carries viewport geometry and a listener registry. It is deterministic
//! and fully inspectable, which is what the modal lifecycle machinery in
//! `velum` needs to keep its invariants testable.
//!
//! The surface deliberately knows nothing about modals. It offers exactly
//! the primitives an overlay widget consumes: tree mutation, class/attr
//! manipulation, geometry reads (including [`Surface::force_reflow`], the
//! deliberate layout read that commits pending style changes), and listener
//! bookkeeping with stable [`ListenerId`]s.

pub mod event;
mod probe;
mod surface;

pub use event::{EventKind, InputEvent, Key, ListenerId, ListenerTarget};
pub use surface::{Listener, NodeId, Size, Surface};
