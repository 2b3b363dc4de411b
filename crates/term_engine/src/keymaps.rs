//! Keyboard-to-byte encoding: a pure function from a key event to the
//! bytes written to the child process.

use crate::parser::ESC;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b001;
        const ALT = 0b010;
        const CONTROL = 0b100;
    }
}

/// Platform-agnostic key identifier. Anything that produces text arrives
/// as `Char`, with the host's text in the `text` argument of
/// [`encode_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Right,
    Left,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Enter,
    Backspace,
    Tab,
    Backtab,
    Escape,
    Char(char),
}

/// The two mode flags the encoder depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pub app_cursor_keys: bool,
    pub new_line_mode: bool,
}

/// Encode a key chord. An unmappable chord yields an empty vector.
pub fn encode_key(key: Key, modifiers: KeyModifiers, text: &str, keyboard: KeyboardState) -> Vec<u8> {
    let mut out = Vec::new();
    match key {
        Key::Char(ch) => encode_character(ch, modifiers, text, &mut out),
        _ => encode_special_key(key, modifiers, keyboard, &mut out),
    }
    out
}

fn modifier_code(modifiers: KeyModifiers) -> u8 {
    let mut code = 0;
    if modifiers.contains(KeyModifiers::SHIFT) {
        code |= 1;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        code |= 2;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        code |= 4;
    }
    code
}

/// xterm sequence fragments: the final letter for the `ESC [`/`ESC O`
/// family and the number for the `~`-terminated family.
fn special_key_code(key: Key) -> Option<(Option<u8>, Option<u8>)> {
    match key {
        Key::Up => Some((Some(b'A'), None)),
        Key::Down => Some((Some(b'B'), None)),
        Key::Right => Some((Some(b'C'), None)),
        Key::Left => Some((Some(b'D'), None)),
        Key::Home => Some((Some(b'H'), None)),
        Key::End => Some((Some(b'F'), None)),
        Key::F1 => Some((Some(b'P'), None)),
        Key::F2 => Some((Some(b'Q'), None)),
        Key::F3 => Some((Some(b'R'), None)),
        Key::F4 => Some((Some(b'S'), None)),
        Key::Insert => Some((None, Some(2))),
        Key::Delete => Some((None, Some(3))),
        Key::PageUp => Some((None, Some(5))),
        Key::PageDown => Some((None, Some(6))),
        Key::F5 => Some((None, Some(15))),
        Key::F6 => Some((None, Some(17))),
        Key::F7 => Some((None, Some(18))),
        Key::F8 => Some((None, Some(19))),
        Key::F9 => Some((None, Some(20))),
        Key::F10 => Some((None, Some(21))),
        Key::F11 => Some((None, Some(23))),
        Key::F12 => Some((None, Some(24))),
        _ => None,
    }
}

fn encode_special_key(key: Key, modifiers: KeyModifiers, keyboard: KeyboardState, out: &mut Vec<u8>) {
    let modcode = modifier_code(modifiers);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let control = modifiers.contains(KeyModifiers::CONTROL);

    match key {
        Key::Up | Key::Down | Key::Right | Key::Left | Key::PageUp | Key::PageDown | Key::Home | Key::End | Key::Insert | Key::Delete | Key::F1 | Key::F2
        | Key::F3 | Key::F4 | Key::F5 | Key::F6 | Key::F7 | Key::F8 | Key::F9 | Key::F10 | Key::F11 | Key::F12 => {
            let Some((letter, number)) = special_key_code(key) else {
                return;
            };
            if modcode == 0 {
                match (letter, number) {
                    (Some(letter), _) => {
                        // arrows follow DECCKM; Home/End and F1-F4 always
                        // use the SS3 form
                        let introducer = match key {
                            Key::Up | Key::Down | Key::Right | Key::Left => {
                                if keyboard.app_cursor_keys {
                                    b'O'
                                } else {
                                    b'['
                                }
                            }
                            _ => b'O',
                        };
                        out.extend([ESC as u8, introducer, letter]);
                    }
                    (None, Some(number)) => {
                        out.extend(format!("{ESC}[{number}~").into_bytes());
                    }
                    (None, None) => {}
                }
            } else {
                let mod_char = (b'1' + modcode) as char;
                match (letter, number) {
                    (Some(letter), _) => out.extend(format!("{ESC}[1;{mod_char}{}", letter as char).into_bytes()),
                    (None, Some(number)) => out.extend(format!("{ESC}[{number};{mod_char}~").into_bytes()),
                    (None, None) => {}
                }
            }
        }

        Key::Enter => {
            if shift && control {
                out.push(0x9E);
            } else if control {
                out.push(0x1E);
            } else if shift {
                out.push(b'\n');
            } else if keyboard.new_line_mode {
                out.extend(b"\r\n");
            } else {
                out.push(b'\r');
            }
        }

        Key::Backspace => {
            if shift && control {
                out.push(0x9F);
            } else if control {
                out.push(0x1F);
            } else {
                out.push(0x7F);
            }
        }

        Key::Tab | Key::Backtab => {
            let shift = shift || key == Key::Backtab;
            if control {
                let mod_char = (b'5' + if shift { 1 } else { 0 }) as char;
                out.extend(format!("{ESC}[1;{mod_char}I").into_bytes());
            } else if shift {
                out.extend(format!("{ESC}[Z").into_bytes());
            } else {
                out.push(b'\t');
            }
        }

        Key::Escape => {
            if shift {
                out.push(0x9B);
            } else {
                out.push(0x1B);
            }
        }

        Key::Char(_) => unreachable!("handled by encode_character"),
    }

    if out.is_empty() {
        log::debug!("unknown special key: {key:?}");
    }
}

fn encode_character(ch: char, modifiers: KeyModifiers, text: &str, out: &mut Vec<u8>) {
    let mut ch = ch;
    if ch.is_alphabetic() {
        ch = if modifiers.contains(KeyModifiers::SHIFT) {
            ch.to_uppercase().next().unwrap_or(ch)
        } else {
            ch.to_lowercase().next().unwrap_or(ch)
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        out.push(0x1B);
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        let upper = ch.to_ascii_uppercase();
        if ('@'..='_').contains(&upper) {
            out.push(upper as u8 ^ 0x40);
        } else {
            log::warn!("Ctrl+{ch} does not translate into a control code");
        }
    } else if text.is_empty() {
        let mut buf = [0u8; 4];
        out.extend(ch.encode_utf8(&mut buf).as_bytes());
    } else {
        out.extend(text.as_bytes());
    }
}
