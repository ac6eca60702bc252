use std::io;
use std::sync::{Arc, Mutex};

use core_actions::{Action, EditKind, dispatch};
use core_state::UndoEngine;
use core_text::LineBuffer;
use smallvec::SmallVec;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = BufferWriter;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn edit_traces_carry_lengths_not_text() {
    let sink = BufferWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(sink.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut buf = LineBuffer::new();
        let mut undo = UndoEngine::default();
        for c in "hunter2".bytes() {
            let action = Action::Edit(EditKind::InsertText(SmallVec::from_slice(&[c])));
            dispatch(&action, &mut buf, &mut undo).unwrap();
        }
    });

    let logged = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    assert!(logged.contains("actions.dispatch"), "no dispatch events: {logged}");
    assert!(logged.contains("len=7"));
    assert!(!logged.contains("hunter"), "line content leaked: {logged}");
}
