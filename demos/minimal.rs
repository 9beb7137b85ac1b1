use linecraft::Session;

/// Minimal REPL: read a line, print it back, repeat until EOF.
fn main() {
    env_logger::init();
    let mut session = Session::new();
    session.set_prompt("> ");
    loop {
        match session.read_line() {
            Ok(line) if line.is_empty() && !session.is_tty() => break,
            Ok(line) => println!("Line: {line}"),
            Err(_) => break,
        }
    }
}
