use twomerge_core::{Direction, Session, SessionConfig, Side};

fn main() -> anyhow::Result<()> {
    let a = r#"fn greet(name: &str) {
    println!("Hello {}", name);
}

fn main() {
    greet("world");
}
"#;

    let b = r#"fn greet(name: &str) {
    println!("Hello, {}!", name);
}

fn main() {
  greet("world");
    greet("rust");
}
"#;

    let mut session = Session::from_texts(a, b, &SessionConfig::default());
    println!("--- EDIT SCRIPT ---\n{}", session.script());

    for side in [Side::A, Side::B] {
        println!("--- BLOCKS {side} ---");
        for block in session.blocks_on_side(side)? {
            println!("{} {:<8} {} {:?}", block.id, block.kind, block.range, block.text);
        }
    }

    // browse in lockstep, then take all of B front to back
    session.advance(Side::A, Direction::Next)?;
    session.jump_linked(Side::A)?;
    println!("viewports: {:?}", session.sync_to_focus());

    // accepting keeps focus on the same slot, so the front drains in order
    session.set_focus(Side::B, 0)?;
    for _ in 0..session.blocks_on_side(Side::B)?.len() {
        session.accept(Side::B)?;
    }

    println!("--- MERGED ---\n{}", session.output_text());
    session.undo()?;
    println!("--- AFTER UNDO ---\n{}", session.output_text());
    Ok(())
}
