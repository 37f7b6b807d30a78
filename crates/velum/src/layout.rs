#![forbid(unsafe_code)]

//! Scrollbar layout compensation.
//!
//! When the modal opens, the host view loses its scrollbar (the open
//! marker suppresses host scrolling). To keep underlying content from
//! shifting sideways, the host root gains right padding equal to the
//! environment scrollbar thickness for the duration of the show cycle,
//! and the container itself is padded so the dialog stays centered
//! whichever of the two surfaces actually overflows.

use velum_surface::{NodeId, Surface};

/// Whether the host content is wider than the viewport, i.e. the host
/// currently shows a scrollbar. Sampled once per show and cached on the
/// modal; resize handling reuses the cached value.
pub fn check_scrollbar(surface: &Surface) -> bool {
    surface.content_width() < surface.viewport().width
}

/// Compensate the host root for the scrollbar that the open marker is
/// about to suppress. Returns the original padding so a completed hide
/// can restore it.
pub fn set_scrollbar(surface: &mut Surface, body_overflowing: bool) -> u16 {
    let root = surface.root();
    let original = surface.padding_right(root);
    if body_overflowing {
        let width = surface.scrollbar_width();
        surface.set_padding_right(root, original.saturating_add(width));
    }
    original
}

/// Restore the host root padding recorded by [`set_scrollbar`].
pub fn restore_scrollbar(surface: &mut Surface, original: u16) {
    let root = surface.root();
    surface.set_padding_right(root, original);
}

/// Re-balance container padding after a show or a viewport resize.
///
/// Exactly one side is padded when exactly one of the two surfaces
/// overflows; both sides are cleared otherwise.
pub fn resize(surface: &mut Surface, container: NodeId, body_overflowing: bool) {
    let modal_overflowing = surface.scroll_height(container) > surface.viewport().height;
    let width = surface.scrollbar_width();

    let left = if !body_overflowing && modal_overflowing {
        width
    } else {
        0
    };
    let right = if body_overflowing && !modal_overflowing {
        width
    } else {
        0
    };
    surface.set_padding_left(container, left);
    surface.set_padding_right(container, right);
}
