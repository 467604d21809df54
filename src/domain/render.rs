/*
Workaround for error: https://doc.rust-lang.org/error_codes/E0116.html
Cannot define inherent `impl` for a type outside of the crate where the type is defined

define a trait that has the desired associated functions/types/constants and implement the trait for the type in question
 */
use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::TreeArena;

pub trait ToTermTree {
    fn to_tree_string(&self) -> Tree<String>;
}

impl ToTermTree for TreeArena {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(arena: &TreeArena, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.data.label.clone());
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        if let Some(root_idx) = self.root() {
            let label = self
                .get_node(root_idx)
                .map(|n| n.data.label.clone())
                .unwrap_or_default();
            let mut tree = Tree::new(label);
            build_tree(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}
