//! Expanding list arguments into `IN (...)` lists and rebinding for each
//! backend. Runs without a database.
//!
//! Run with: cargo run --example in_clause -p rowbind

use rowbind::{BindError, BindStyle, expand_in, rebind, register_driver};

fn main() -> Result<(), BindError> {
    let ids = vec![4i64, 8, 15, 16, 23, 42];
    let status = "active";

    let (query, args) = expand_in(
        "SELECT * FROM users WHERE status = ? AND id IN (?)",
        &[&status, &ids],
    )?;
    println!("{query}");
    println!("  {} args", args.len());

    for style in [BindStyle::Dollar, BindStyle::Named, BindStyle::At] {
        println!("{style:?}: {}", rebind(style, &query));
    }

    // backends not known up front can be registered by name
    register_driver("yugabyte", BindStyle::Dollar);
    println!(
        "yugabyte: {}",
        rebind(rowbind::bind_style("yugabyte"), &query)
    );

    match expand_in("SELECT * FROM users WHERE id IN (?)", &[&Vec::<i64>::new()]) {
        Err(e) => println!("empty list: {e}"),
        Ok(_) => unreachable!("empty lists are rejected"),
    }

    Ok(())
}
