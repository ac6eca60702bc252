//! Key → action table.
//!
//! Emacs-style control bindings plus the named keys terminals send. The
//! translation is stateless; modal behavior (completion cycling) lives in the
//! session, which sees every key before it is translated.

use crate::{Action, EditKind, HistoryDirection, MotionKind};
use core_events::{KeyEvent, KeyModifiers, NamedKey, ctrl};

/// Ctrl-_ (also sent by Ctrl-/ on many terminals).
const CTRL_UNDERSCORE: u8 = 0x1F;
const LINE_FEED: u8 = 0x0A;

/// Translate one key. `multiline` enables Alt+Enter as a literal newline.
pub fn translate_key(key: &KeyEvent, multiline: bool) -> Option<Action> {
    match key {
        KeyEvent::Char { raw } => Some(Action::Edit(EditKind::InsertText(raw.clone()))),
        KeyEvent::Control(code) => translate_control(*code),
        KeyEvent::Named { key, mods } => translate_named(*key, *mods, multiline),
        KeyEvent::Mouse(m) if m.is_left_press() => Some(Action::Click { column: m.column }),
        KeyEvent::Mouse(_) | KeyEvent::Unknown => None,
    }
}

fn translate_control(code: u8) -> Option<Action> {
    let action = match code {
        core_events::ENTER | LINE_FEED => Action::Submit,
        core_events::TAB => Action::Complete,
        core_events::CTRL_H => Action::Edit(EditKind::Backspace),
        c if c == ctrl(b'a') => Action::Motion(MotionKind::LineStart),
        c if c == ctrl(b'e') => Action::Motion(MotionKind::LineEnd),
        c if c == ctrl(b'b') => Action::Motion(MotionKind::Left),
        c if c == ctrl(b'f') => Action::Motion(MotionKind::Right),
        c if c == ctrl(b'p') => Action::History(HistoryDirection::Previous),
        c if c == ctrl(b'n') => Action::History(HistoryDirection::Next),
        c if c == ctrl(b'w') => Action::Edit(EditKind::DeleteWordBackward),
        c if c == ctrl(b'k') => Action::Edit(EditKind::KillToEnd),
        c if c == ctrl(b'u') => Action::Edit(EditKind::KillLine),
        c if c == ctrl(b't') => Action::Edit(EditKind::Transpose),
        c if c == ctrl(b'l') => Action::ClearScreen,
        c if c == ctrl(b'z') || c == CTRL_UNDERSCORE => Action::Undo,
        c if c == ctrl(b'y') => Action::Redo,
        c if c == ctrl(b'd') => Action::DeleteOrEof,
        c if c == ctrl(b'c') => Action::Cancel,
        _ => return None,
    };
    Some(action)
}

fn translate_named(key: NamedKey, mods: KeyModifiers, multiline: bool) -> Option<Action> {
    let word = mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT);
    let action = match key {
        NamedKey::Enter if mods.contains(KeyModifiers::ALT) => {
            if !multiline {
                return None;
            }
            Action::Edit(EditKind::InsertNewline)
        }
        NamedKey::Enter => Action::Submit,
        NamedKey::Escape => Action::Escape,
        NamedKey::Backspace => Action::Edit(EditKind::Backspace),
        NamedKey::Delete if word => Action::Edit(EditKind::DeleteWordForward),
        NamedKey::Delete => Action::Edit(EditKind::DeleteUnder),
        NamedKey::Tab if mods.contains(KeyModifiers::SHIFT) => return None,
        NamedKey::Tab => Action::Complete,
        NamedKey::Left if word => Action::Motion(MotionKind::WordBackward),
        NamedKey::Right if word => Action::Motion(MotionKind::WordForward),
        NamedKey::Left => Action::Motion(MotionKind::Left),
        NamedKey::Right => Action::Motion(MotionKind::Right),
        NamedKey::Home => Action::Motion(MotionKind::LineStart),
        NamedKey::End => Action::Motion(MotionKind::LineEnd),
        NamedKey::Up => Action::History(HistoryDirection::Previous),
        NamedKey::Down => Action::History(HistoryDirection::Next),
        NamedKey::WordLeft => Action::Motion(MotionKind::WordBackward),
        NamedKey::WordRight => Action::Motion(MotionKind::WordForward),
        NamedKey::DeleteWordLeft => Action::Edit(EditKind::DeleteWordBackward),
        NamedKey::DeleteWordRight => Action::Edit(EditKind::DeleteWordForward),
        NamedKey::Insert | NamedKey::PageUp | NamedKey::PageDown | NamedKey::F(_) => {
            return None;
        }
    };
    Some(action)
}
