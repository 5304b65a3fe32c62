use crate::expr::Node;

/// Replace every occurrence of the free variable in `tree` with `replacement`.
pub fn substitute_variable(tree: &Node, replacement: &Node) -> Node {
    match tree {
        Node::Variable => replacement.clone(),
        _ => tree.map_children(|child| substitute_variable(child, replacement)),
    }
}
