//! Rebalancing after insertion and deletion.
//!
//! Both fixups are written once against a [`Side`] instead of twice as mirror images: `side` is
//! the side the interesting node hangs off of, and `side.opposite()` is where its sibling is.

use allocator_api2::alloc::Allocator;

use super::node::{Color, NodeId, Side};
use super::OrderedTree;


impl<K, V, C, A: Allocator> OrderedTree<K, V, C, A> {
    /// Which child of its parent `id` is. Must not be called on the root.
    fn side_of(&self, id: NodeId) -> Side {
        let parent = self.nodes[id].parent;
        if self.nodes[parent].left == id { Side::Left } else { Side::Right }
    }

    fn color_of(&self, id: NodeId) -> Color {
        self.nodes[id].color
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.nodes[id].color = color;
    }

    /// Restores the coloring rules after `z` was linked in as a red leaf.
    ///
    /// The only rule that can be broken is a red `z` under a red parent. Since the root is
    /// black, a red parent always has a parent of its own.
    pub(super) fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color_of(self.nodes[z].parent) == Color::Red {
            let mut p = self.nodes[z].parent;
            let g = self.nodes[p].parent;
            let side = self.side_of(p);
            let uncle = self.nodes[g].child(side.opposite());

            if self.color_of(uncle) == Color::Red {
                // red uncle: push the red up to the grandparent and keep going from there
                self.set_color(p, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(g, Color::Red);
                log::trace!("Insert fixup at {z:?}: recolored around {g:?}");
                z = g;
                continue
            }

            if self.nodes[p].child(side.opposite()) == z {
                // triangle: turn it into a line first
                z = p;
                self.rotate(z, side);
                p = self.nodes[z].parent;
                log::trace!("Insert fixup: straightened triangle at {z:?}");
            }

            // line
            self.set_color(p, Color::Black);
            self.set_color(g, Color::Red);
            self.rotate(g, side.opposite());
            log::trace!("Insert fixup: rotated {g:?} below {p:?}");
        }

        self.set_color(self.root, Color::Black);
    }

    /// Restores black-heights after a black node was spliced out from above `x`.
    ///
    /// `x` carries an extra black that gets pushed up the tree until it lands on a red node, the
    /// root, or is absorbed by a rotation.
    pub(super) fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color_of(x) == Color::Black {
            let p = self.nodes[x].parent;
            // `x` can be the sentinel, whose sibling is never the sentinel
            let side = if self.nodes[p].left == x { Side::Left } else { Side::Right };
            let mut w = self.nodes[p].child(side.opposite());

            if self.color_of(w) == Color::Red {
                self.set_color(w, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                w = self.nodes[p].child(side.opposite());
                log::trace!("Delete fixup at {x:?}: red sibling rotated away");
            }

            let near = self.nodes[w].child(side);
            let far = self.nodes[w].child(side.opposite());

            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                self.set_color(w, Color::Red);
                log::trace!("Delete fixup at {x:?}: moved the missing black up to {p:?}");
                x = p;
                continue
            }

            if self.color_of(far) == Color::Black {
                self.set_color(near, Color::Black);
                self.set_color(w, Color::Red);
                self.rotate(w, side.opposite());
                w = self.nodes[p].child(side.opposite());
                log::trace!("Delete fixup at {x:?}: moved the red nephew to the far side");
            }

            let far = self.nodes[w].child(side.opposite());
            self.set_color(w, self.color_of(p));
            self.set_color(p, Color::Black);
            self.set_color(far, Color::Black);
            self.rotate(p, side);
            log::trace!("Delete fixup at {x:?}: absorbed by rotating at {p:?}");
            x = self.root;
        }

        self.set_color(x, Color::Black);
    }
}
