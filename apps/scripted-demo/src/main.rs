//! Scripted walkthrough of a counter built on the bridge.
//!
//! Drives a mock remote tree through a few update cycles and simulated
//! clicks, printing the op log after each step. Run with
//! `RUST_LOG=debug` to see the bridge's own tracing.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;

use treeline_core::{EventKind, EventPayload};
use treeline_host::{Bridge, BridgeError, Props};
use treeline_testing::MockTree;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), BridgeError> {
    let tree = MockTree::new().into_shared();
    let bridge = Bridge::with_remote(tree.clone());

    // Mount: a column holding a label and a button whose click handler
    // rewrites the label in a nested update cycle.
    let count = Rc::new(Cell::new(0u32));
    let root = bridge.create_instance(
        "column",
        Props::new().style(json!({ "padding": 16, "gap": 8 })),
    )?;
    let label = bridge.create_text_instance("count: 0")?;

    let bridge_in_handler = bridge.clone();
    let label_in_handler = label.clone();
    let count_in_handler = count.clone();
    let button = bridge.create_instance(
        "button",
        Props::new()
            .style(json!({ "width": 120 }))
            .custom("title", "increment")
            .on(EventKind::Click, move |_| {
                let next = count_in_handler.get() + 1;
                count_in_handler.set(next);
                let text = format!("count: {next}");
                if let Err(err) = bridge_in_handler
                    .commit_text_update(&label_in_handler, &text)
                    .and_then(|()| bridge_in_handler.commit())
                {
                    log::error!("update from click failed: {err}");
                }
            }),
    )?;

    bridge.append_child(&root, &label)?;
    bridge.append_child(&root, &button)?;
    bridge.set_root(&root)?;
    bridge.commit()?;
    dump("after mount", &tree);

    // Three clicks arrive from the remote side; each handler run flushes
    // its own cycle before the next event is dispatched.
    for _ in 0..3 {
        tree.borrow_mut()
            .emit(EventPayload::pointer(button.id(), EventKind::Click, 60.0, 20.0));
    }
    bridge.dispatch_pending()?;
    dump("after three clicks", &tree);

    // Tear down: destroying the root cascades to both children.
    bridge.destroy_instance(&root)?;
    bridge.commit()?;
    dump("after teardown", &tree);

    println!("final count: {}", count.get());
    Ok(())
}

fn dump(stage: &str, tree: &Rc<std::cell::RefCell<MockTree>>) {
    let mut tree = tree.borrow_mut();
    println!("== {stage} ==");
    for entry in tree.take_op_log() {
        println!("  {entry}");
    }
    println!("  nodes alive: {}, text: {:?}", tree.len(), tree.all_text());
}
