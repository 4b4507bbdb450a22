//! Renders an imbalanced counter with the table and JSON observers.
//!
//! Run with:
//! ```bash
//! cargo run --example observers --features full
//! ```

use classref::observers::json::JsonObserver;
use classref::observers::table::{TableObserver, TableStyle};
use classref::refcount::{ClassKey, RefCount};
use classref::Result;

fn main() -> Result<()> {
    let rc = RefCount::builder()
        .with_name("socket")
        .with_imbalance_action(|key: &ClassKey, count: isize| {
            eprintln!("imbalance on {key}: class count {count}");
        })
        .build();

    let rx = rc.resolve("rx");
    let tx = rc.resolve("tx");
    rc.resolve("idle");

    rx.add(2);
    tx.inc();
    tx.dec();
    // One decrement too many on "tx": reported, global untouched.
    tx.dec();

    println!("{}", TableObserver::new().with_style(TableStyle::Rounded).render(&rc));
    println!();
    println!(
        "{}",
        TableObserver::new()
            .only_imbalanced(true)
            .with_global(false)
            .render(&rc)
    );
    println!();
    println!("{}", JsonObserver::new().pretty(true).to_json(&rc)?);

    Ok(())
}
