#![forbid(unsafe_code)]

//! One-time scrollbar thickness probe.
//!
//! Measures the width a forced-scroll overflow mode steals from a node's
//! content box: insert a probe of known width under the root, flip it to
//! scrolling overflow, measure the delta against a full-width inner node,
//! discard the probe. The result is cached per surface; the probe leaves
//! the node count exactly as it found it.

use crate::surface::Surface;

const PROBE_WIDTH: u16 = 100;

impl Surface {
    /// Ambient scrollbar thickness, measured once and cached.
    pub fn scrollbar_width(&mut self) -> u16 {
        if let Some(width) = self.scrollbar_cache {
            return width;
        }

        let outer = self.create_node();
        self.set_width(outer, PROBE_WIDTH);
        self.set_shown(outer, false);
        self.append_child(self.root(), outer);

        let outer_width = self.offset_width(outer);
        self.set_overflow_scroll(outer, true);

        let inner = self.create_node();
        self.append_child(outer, inner);
        let inner_width = self.offset_width(inner);

        self.remove(outer);

        let width = outer_width.saturating_sub(inner_width);
        self.scrollbar_cache = Some(width);
        width
    }
}
