//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::domain::node::TreeNode;

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print diff addition (green +)
pub fn diff_add(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "+".green(), msg);
}

/// Print diff removal (red -)
pub fn diff_remove(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "-".red(), msg);
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data/export statements)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Render the forest as an indented tree, one line per node, with
/// hierarchical identifiers as label prefixes.
pub fn render_forest<T>(forest: &[TreeNode<T>]) -> String {
    forest
        .iter()
        .map(|node| render_node(node).to_string())
        .collect::<Vec<_>>()
        .join("")
}

fn render_node<T>(node: &TreeNode<T>) -> Tree<String> {
    let label = match node.hierarchical_id.as_deref() {
        Some(path) => format!("{} {}", path, node.name),
        None => node.name.clone(),
    };
    Tree::new(label).with_leaves(node.child_nodes().iter().map(render_node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Payload;

    fn node(id: &str, hier: &str, children: Option<Vec<TreeNode>>) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            hierarchical_id: Some(hier.to_string()),
            name: id.to_uppercase(),
            description: None,
            data: Payload::new(),
            children,
        }
    }

    #[test]
    fn test_render_forest_includes_paths_and_children() {
        let forest = vec![
            node("a", "1", None),
            node("b", "2", Some(vec![node("c", "2.1", None)])),
        ];

        let rendered = render_forest(&forest);

        assert!(rendered.contains("1 A"));
        assert!(rendered.contains("2 B"));
        assert!(rendered.contains("2.1 C"));
    }
}
