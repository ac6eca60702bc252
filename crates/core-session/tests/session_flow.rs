use core_input::ScriptedSource;
use core_session::{EditError, EditSession, EditorContext, FeedOutcome, Hint, InputMode, Phase};
use core_terminal::{
    HeadlessTerminal, MOUSE_DISABLE, MOUSE_ENABLE, TerminalBackend, TerminalCapabilities,
};
use pretty_assertions::assert_eq;

fn line(s: &str) -> FeedOutcome {
    FeedOutcome::Line(s.to_string())
}

fn read_one(ctx: &mut EditorContext, term: &mut HeadlessTerminal, input: &[u8]) -> FeedOutcome {
    let mut session = EditSession::new(ctx, term, ScriptedSource::from_bytes(input), "> ");
    session.read_line().unwrap()
}

#[test]
fn typed_line_is_returned_and_recorded() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"hi\r"), line("hi"));
    assert_eq!(ctx.history.last(), Some("hi"));
    assert_eq!(ctx.history.len(), 1);
    assert_eq!(
        term.output_lossy(),
        "\r> \x1b[K\x1b[3Ghi\r> hi\x1b[K\x1b[5G\r\n"
    );
    assert!(!term.is_raw());
    assert_eq!(term.raw_transitions(), 2);
}

#[test]
fn tab_cycles_candidates_then_original() {
    let mut ctx = EditorContext::default();
    ctx.set_completer(|_: &str| vec!["c0".to_string(), "c1".to_string()]);
    let mut term = HeadlessTerminal::new(80);
    let mut session = EditSession::new(
        &mut ctx,
        &mut term,
        ScriptedSource::from_bytes(b"\t\t\t\t\r"),
        "> ",
    );
    session.start().unwrap();
    session.terminal_mut().take_output();

    let mut frames = Vec::new();
    for _ in 0..4 {
        assert_eq!(session.feed().unwrap(), FeedOutcome::Continue);
        frames.push(String::from_utf8(session.terminal_mut().take_output()).unwrap());
    }
    assert_eq!(
        frames,
        [
            "\r> c0\x1b[K\x1b[5G",
            "\r> c1\x1b[K\x1b[5G",
            "\x07\r> \x1b[K\x1b[3G",
            "\r> c0\x1b[K\x1b[5G",
        ]
    );
    assert!(session.state().unwrap().is_completing());
    assert_eq!(session.feed().unwrap(), line("c0"));
    session.stop().unwrap();
}

#[test]
fn escape_restores_original_during_completion() {
    let mut ctx = EditorContext::default();
    ctx.set_completer(|line: &str| vec![format!("{line}-long")]);
    let mut term = HeadlessTerminal::new(80);
    let mut src = ScriptedSource::from_bytes(b"ab\t\x1b");
    src.push_timeout().push_str("c\r");
    let mut session = EditSession::new(&mut ctx, &mut term, src, "> ");
    assert_eq!(session.read_line().unwrap(), line("abc"));
}

#[test]
fn accepted_completion_is_one_undo_step() {
    let mut ctx = EditorContext::default();
    ctx.set_completer(|_: &str| vec!["status".to_string()]);
    let mut term = HeadlessTerminal::new(80);
    // "st", Tab, Ctrl-E commits the candidate, Ctrl-Z undoes it.
    assert_eq!(read_one(&mut ctx, &mut term, b"st\t\x05\x1a\r"), line("st"));
}

#[test]
fn no_candidates_rings_bell() {
    let mut ctx = EditorContext::default();
    ctx.set_completer(|_: &str| Vec::new());
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"x\t\r"), line("x"));
    assert!(term.output_lossy().contains('\x07'));
}

#[test]
fn undo_and_redo_keys() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"abc\x1a\x1a\x19\r"), line("ab"));
}

#[test]
fn undo_history_does_not_leak_between_lines() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"abc\r"), line("abc"));
    assert_eq!(read_one(&mut ctx, &mut term, b"\x1a\x1a\r"), line(""));
}

#[test]
fn history_navigation_stashes_the_edited_line() {
    let mut ctx = EditorContext::default();
    ctx.history.add("first");
    ctx.history.add("second");
    let mut term = HeadlessTerminal::new(80);
    let mut session = EditSession::new(
        &mut ctx,
        &mut term,
        ScriptedSource::from_bytes(b"x\x1b[A\x1b[A\x1b[A\x1b[B\x1b[B\r"),
        "> ",
    );
    session.start().unwrap();
    let mut shown = Vec::new();
    for _ in 0..6 {
        assert_eq!(session.feed().unwrap(), FeedOutcome::Continue);
        shown.push(session.state().unwrap().buffer().as_str_lossy().into_owned());
    }
    assert_eq!(shown, ["x", "second", "first", "first", "second", "x"]);
    assert_eq!(session.feed().unwrap(), line("x"));
    session.stop().unwrap();
    drop(session);
    assert_eq!(ctx.history.iter().collect::<Vec<_>>(), ["first", "second", "x"]);
}

#[test]
fn ctrl_c_cancels_without_touching_history() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"ab\x03"), FeedOutcome::Cancelled);
    assert!(ctx.history.is_empty());
    assert!(!term.is_raw());
}

#[test]
fn cancelling_with_full_history_keeps_every_entry() {
    let mut ctx = EditorContext::default();
    assert!(ctx.set_history_max_len(2));
    ctx.history.add("a");
    ctx.history.add("b");
    let mut term = HeadlessTerminal::new(80);

    assert_eq!(read_one(&mut ctx, &mut term, b"x\x03"), FeedOutcome::Cancelled);
    assert_eq!(ctx.history.iter().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(read_one(&mut ctx, &mut term, b"\x04"), FeedOutcome::Eof);
    assert_eq!(ctx.history.iter().collect::<Vec<_>>(), ["a", "b"]);

    assert_eq!(read_one(&mut ctx, &mut term, b"\x1b[A\r"), line("b"));
    assert_eq!(read_one(&mut ctx, &mut term, b"c\r"), line("c"));
    assert_eq!(ctx.history.iter().collect::<Vec<_>>(), ["b", "c"]);
}

#[test]
fn ctrl_d_is_eof_only_on_empty_line() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"\x04"), FeedOutcome::Eof);
    assert_eq!(read_one(&mut ctx, &mut term, b"ab\x01\x04\r"), line("b"));
    assert_eq!(read_one(&mut ctx, &mut term, b""), FeedOutcome::Eof);
}

#[test]
fn piped_input_reads_plain_lines() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80).with_capabilities(TerminalCapabilities::piped());
    let mut session = EditSession::new(
        &mut ctx,
        &mut term,
        ScriptedSource::from_bytes(b"one\r\ntwo"),
        "> ",
    );
    assert_eq!(session.read_line().unwrap(), line("one"));
    assert_eq!(session.mode(), InputMode::Pipe);
    assert_eq!(session.read_line().unwrap(), line("two"));
    assert_eq!(session.read_line().unwrap(), FeedOutcome::Eof);
    assert_eq!(session.phase(), Phase::Done);
    drop(session);
    assert_eq!(term.raw_transitions(), 0);
    assert!(term.output().is_empty());
}

#[test]
fn dumb_terminal_gets_prompt_and_plain_read() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80)
        .with_capabilities(TerminalCapabilities::interactive(Some("dumb")));
    let mut session = EditSession::new(
        &mut ctx,
        &mut term,
        ScriptedSource::from_bytes(b"hello\n"),
        "> ",
    );
    assert_eq!(session.read_line().unwrap(), line("hello"));
    assert_eq!(session.mode(), InputMode::Dumb);
    drop(session);
    assert_eq!(term.output_lossy(), "> ");
    assert_eq!(term.raw_transitions(), 0);
}

#[test]
fn width_is_probed_when_backend_cannot_report_it() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::without_size();
    let mut session = EditSession::new(
        &mut ctx,
        &mut term,
        ScriptedSource::from_bytes(b"\x1b[5;3R\x1b[5;120Rhi\r"),
        "> ",
    );
    session.start().unwrap();
    assert_eq!(session.state().unwrap().columns(), 120);
    assert_eq!(session.feed().unwrap(), FeedOutcome::Continue);
    assert_eq!(session.feed().unwrap(), FeedOutcome::Continue);
    assert_eq!(session.feed().unwrap(), line("hi"));
    session.stop().unwrap();
    drop(session);
    assert!(term.output_lossy().starts_with("\x1b[6n\x1b[999C\x1b[6n\x1b[117D"));
}

#[test]
fn silent_probe_falls_back_to_80_columns() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::without_size();
    let mut src = ScriptedSource::new();
    src.push_timeout().push_str("x\r");
    let mut session = EditSession::new(&mut ctx, &mut term, src, "> ");
    session.start().unwrap();
    assert_eq!(session.state().unwrap().columns(), 80);
    assert_eq!(session.feed().unwrap(), FeedOutcome::Continue);
    assert_eq!(session.feed().unwrap(), line("x"));
}

#[test]
fn mouse_click_moves_cursor_to_column() {
    let mut ctx = EditorContext::default();
    ctx.set_mouse(true);
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(
        read_one(&mut ctx, &mut term, b"hello\x1b[<0;4;1MX\r"),
        line("hXello")
    );
    let out = term.output();
    assert!(out.starts_with(MOUSE_ENABLE));
    assert!(out.ends_with(MOUSE_DISABLE));
}

#[test]
fn click_columns_follow_drawn_widths() {
    let mut ctx = EditorContext::default();
    ctx.set_mouse(true);
    let mut term = HeadlessTerminal::new(80);
    let input = "漢字\x1b[<0;5;1MX\r".as_bytes();
    assert_eq!(read_one(&mut ctx, &mut term, input), line("漢X字"));

    // Masked, every cluster is one `*` wide.
    ctx.set_mask(true);
    assert_eq!(read_one(&mut ctx, &mut term, input), line("漢字X"));
}

#[test]
fn full_fixed_buffer_rings_bell_and_keeps_editing() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    let mut session =
        EditSession::new(&mut ctx, &mut term, ScriptedSource::from_bytes(b"abc\r"), "> ")
            .with_buffer_limit(2);
    assert_eq!(session.read_line().unwrap(), line("ab"));
    drop(session);
    assert!(term.output_lossy().contains('\x07'));
}

#[test]
fn lifecycle_misuse_reports_not_active() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    let mut session =
        EditSession::new(&mut ctx, &mut term, ScriptedSource::from_bytes(b"\r"), "> ");
    assert!(matches!(session.feed(), Err(EditError::NotActive)));
    assert!(matches!(session.stop(), Err(EditError::NotActive)));
    session.start().unwrap();
    assert_eq!(session.feed().unwrap(), line(""));
    assert!(matches!(session.feed(), Err(EditError::NotActive)));
    session.stop().unwrap();
    assert!(matches!(session.stop(), Err(EditError::NotActive)));
}

#[test]
fn dropping_an_active_session_restores_the_terminal() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    {
        let mut session = EditSession::new(&mut ctx, &mut term, ScriptedSource::new(), "> ");
        session.start().unwrap();
        assert!(session.terminal().is_raw());
    }
    assert!(!term.is_raw());
    assert!(ctx.history.is_empty());
}

#[test]
fn raw_mode_failure_is_a_terminal_error() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80).failing_raw_mode();
    let mut session = EditSession::new(&mut ctx, &mut term, ScriptedSource::new(), "> ");
    assert!(matches!(session.start(), Err(EditError::Terminal(_))));
    assert_eq!(session.phase(), Phase::NotStarted);
    drop(session);
    assert!(ctx.history.is_empty());
}

#[test]
fn hide_and_show_repaint_the_line() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    let mut session = EditSession::new(&mut ctx, &mut term, ScriptedSource::from_bytes(b"a"), "> ");
    session.start().unwrap();
    session.feed().unwrap();
    session.terminal_mut().take_output();
    session.hide().unwrap();
    assert_eq!(session.terminal_mut().take_output(), b"\r\x1b[K");
    session.show().unwrap();
    assert_eq!(session.terminal_mut().take_output(), b"\r> a\x1b[K\x1b[4G");
}

#[test]
fn alt_enter_inserts_newline_in_multiline_mode() {
    let mut ctx = EditorContext::default();
    ctx.set_multiline(true);
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"a\x1b\rb\r"), line("a\nb"));
}

#[test]
fn ctrl_l_clears_screen_and_redraws() {
    let mut ctx = EditorContext::default();
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"a\x0c\r"), line("a"));
    assert!(term.output_lossy().contains("\x1b[2J\x1b[1;1H\r> a\x1b[K\x1b[4G"));
}

#[test]
fn hint_is_shown_while_editing_and_dropped_on_submit() {
    let mut ctx = EditorContext::default();
    ctx.set_hinter(|line: &str| (line == "git").then(|| Hint::new(" commit")));
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"git\r"), line("git"));
    let out = term.output_lossy();
    assert!(out.contains("\r> git commit\x1b[K\x1b[6G"));
    assert!(out.ends_with("\r> git\x1b[K\x1b[6G\r\n"));
}

#[test]
fn highlighter_classes_become_colours() {
    let mut ctx = EditorContext::default();
    ctx.set_highlighter(|line: &[u8]| vec![1; line.len()]);
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"a\r"), line("a"));
    assert!(term.output_lossy().contains("\x1b[38;5;1ma\x1b[0m"));
}

#[test]
fn masked_input_never_reaches_the_screen() {
    let mut ctx = EditorContext::default();
    ctx.set_mask(true);
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"pw\r"), line("pw"));
    let out = term.output_lossy();
    assert!(out.contains("\r> **\x1b[K\x1b[5G"));
    assert!(!out.contains("pw"));
    assert!(ctx.history.is_empty());
}

#[test]
fn escape_then_arrow_recalls_history_instead_of_typing() {
    let mut ctx = EditorContext::default();
    ctx.history.add("prev");
    let mut term = HeadlessTerminal::new(80);
    assert_eq!(read_one(&mut ctx, &mut term, b"\x1b\x1b[A\r"), line("prev"));
}
