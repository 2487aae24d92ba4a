//! Builds a small client index, prints it, removes a few clients and prints
//! the extremes.
//!
//! Run with `RUST_LOG=trace` to see every rotation.

use avl_index::{AvlError, AvlTree};

fn print_in_order(tree: &AvlTree) {
    for (id, name) in tree {
        println!("ID: {id}, Name: {name}");
    }
}

fn main() -> Result<(), AvlError> {
    pretty_env_logger::init();

    let mut tree = AvlTree::new();
    let clients = [
        (10, "Alice"),
        (70, "Grace"),
        (20, "Bob"),
        (50, "Eve"),
        (30, "Charlie"),
        (40, "Diana"),
        (60, "Frank"),
        (90, "Igor"),
        (85, "Paulo"),
    ];
    for (id, name) in clients {
        tree.insert(id, name)?;
    }

    println!("=== Clients in order ===\n");
    print_in_order(&tree);

    println!("\n=== Tree shape ===");
    print!("{}", tree.shape());

    for id in [20, 85] {
        println!("\n=== Removing client {id} ===\n");
        tree.remove(id);
        print_in_order(&tree);
        println!("\n=== Tree shape after removal ===");
        print!("{}", tree.shape());
    }

    let (min_id, min_name) = tree.find_min()?;
    let (max_id, max_name) = tree.find_max()?;
    println!("\nLowest ID: {min_id}, Name: {min_name}");
    println!("Highest ID: {max_id}, Name: {max_name}");

    Ok(())
}
