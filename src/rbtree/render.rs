use std::fmt::{Display, Write};

use allocator_api2::alloc::Allocator;

use super::node::{Color, NodeId};
use super::OrderedTree;


impl<K: Display, V, C, A: Allocator> OrderedTree<K, V, C, A> {
    /// Draws the tree sideways, one node per line, root first and left children before right.
    ///
    /// ```text
    /// └──20 (B)
    ///     ├──10 (R)
    ///     │   ├──nil
    ///     │   └──nil
    ///     └──30 (R)
    ///         ├──nil
    ///         └──nil
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(&mut out, "", self.root, false);
        out
    }

    fn render_node(&self, out: &mut String, prefix: &str, id: NodeId, is_left: bool) {
        let connector = if is_left { "├──" } else { "└──" };
        let node = &self.nodes[id];
        // writing into a `String` can't fail
        let _ = match &node.entry {
            None => writeln!(out, "{prefix}{connector}nil"),
            Some((k, _)) => {
                let tag = match node.color {
                    Color::Red => 'R',
                    Color::Black => 'B',
                };
                writeln!(out, "{prefix}{connector}{k} ({tag})")
            }
        };
        if id.is_nil() {
            return
        }

        let prefix = format!("{prefix}{}", if is_left { "│   " } else { "    " });
        self.render_node(out, &prefix, node.left, true);
        self.render_node(out, &prefix, node.right, false);
    }
}


#[cfg(test)]
mod tests {
    use crate::rbtree::OrderedTree;

    #[test]
    fn test_render_three_nodes() {
        let mut tree = OrderedTree::new();
        for k in [10, 20, 30] {
            tree.insert(k, ()).unwrap();
        }
        let expected = "\
└──20 (B)
    ├──10 (R)
    │   ├──nil
    │   └──nil
    └──30 (R)
        ├──nil
        └──nil
";
        assert_eq!(tree.render(), expected);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(OrderedTree::<i32, ()>::new().render(), "└──nil\n");
    }
}
