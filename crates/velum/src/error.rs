#![forbid(unsafe_code)]

//! Construction-time errors.
//!
//! Construction either yields a fully assembled modal or nothing at all;
//! no partially mounted structure is ever left behind. `show`, `hide`,
//! `tick`, and `dispatch` are infallible by design.

use thiserror::Error;

/// Errors raised while constructing a [`Modal`](crate::Modal).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    /// An explicit selector resolved to no node on the surface.
    #[error("selector `{selector}` did not match any node on the surface")]
    SelectorNotFound {
        /// The selector as given in the configuration.
        selector: String,
    },
}
