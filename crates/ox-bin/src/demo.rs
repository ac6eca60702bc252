//! Example callbacks wired into the REPL.

use core_render::Hint;
use core_session::EditorContext;

const COMMANDS: &[&str] = &[
    "hello",
    "hello there",
    "help",
    "/historylen",
    "/mask",
    "/unmask",
    "/multiline",
    "/singleline",
];

/// Legacy colour 2 (green) with the bold bit.
const CLASS_COMMAND: u8 = 2 | 8;
/// Legacy colour 3 (yellow).
const CLASS_NUMBER: u8 = 3;
const CLASS_HINT: u8 = 5;

pub(crate) fn install(ctx: &mut EditorContext) {
    ctx.set_completer(complete);
    ctx.set_hinter(hint);
    ctx.set_highlighter(highlight);
}

fn complete(line: &str) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    COMMANDS
        .iter()
        .filter(|c| c.starts_with(line) && **c != line)
        .map(|c| (*c).to_string())
        .collect()
}

fn hint(line: &str) -> Option<Hint> {
    match line {
        "hello" => Some(Hint::new(" World").with_color(CLASS_HINT)),
        "/historylen" => Some(Hint::new(" <n>").with_color(CLASS_HINT)),
        _ => None,
    }
}

/// Known commands at the start of the line, and ASCII digits anywhere.
fn highlight(line: &[u8]) -> Vec<u8> {
    let mut classes = vec![0u8; line.len()];
    let first_word = line.iter().position(|&b| b == b' ').unwrap_or(line.len());
    if COMMANDS.iter().any(|c| c.as_bytes() == &line[..first_word]) {
        classes[..first_word].fill(CLASS_COMMAND);
    }
    for (class, byte) in classes.iter_mut().zip(line) {
        if byte.is_ascii_digit() {
            *class = CLASS_NUMBER;
        }
    }
    classes
}
