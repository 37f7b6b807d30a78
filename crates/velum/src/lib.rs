#![forbid(unsafe_code)]

//! Modal dialogs for retained visual surfaces.
//!
//! `velum` overlays a dialog on top of an existing view, blocks (or
//! selectively allows) interaction with the content underneath, and
//! announces its lifecycle to observers. The core is the show/hide
//! state machine in [`Modal`]: backdrop sequencing, timed transitions,
//! event wiring and scrollbar layout compensation, ordered so the modal
//! is never left visually or interactively inconsistent.
//!
//! Quick start:
//!
//! ```
//! use velum::surface::Surface;
//! use velum::{LifecycleEvent, Modal};
//!
//! let mut surface = Surface::new();
//! let mut modal = Modal::confirm(&mut surface, "Delete?").unwrap();
//! let _sub = modal.on(|event| {
//!     if let LifecycleEvent::Dismiss(Some(button)) = event {
//!         println!("answered {:?}", button.value);
//!     }
//! });
//! modal.show(&mut surface);
//! // Drive `modal.tick(&mut surface)` from the host loop and route
//! // input through `modal.dispatch(&mut surface, &event)`.
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod hooks;
pub mod layout;
pub mod modal;
pub mod structure;
pub mod wiring;

pub use velum_surface as surface;

pub use clock::{Clock, ManualClock, WallClock};
pub use config::{Backdrop, ButtonSpec, Content, Footer, ModalConfig};
pub use error::ModalError;
pub use hooks::{Hooks, LifecycleEvent, Subscription};
pub use modal::{LifecycleState, Modal};
