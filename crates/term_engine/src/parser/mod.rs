// Sequence reference: https://vt100.net/docs/vt510-rm/chapter4.html
//                     https://invisible-island.net/xterm/ctlseqs/ctlseqs.html
use crate::{EngineResult, ParserError, TextScreen};

mod csi;
mod osc;
pub mod sgr;


pub const BEL: char = '\x07';
pub const BS: char = '\x08';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const VT: char = '\x0B';
pub const FF: char = '\x0C';
pub const CR: char = '\r';
pub const SO: char = '\x0E';
pub const SI: char = '\x0F';
pub const ESC: char = '\x1B';
pub const DEL: char = '\x7F';

/// Characters that open a two-character escape sequence.
const MULTI_CHAR_ESCAPES: &str = "().*+-/%#";

/// Where the escape accumulator currently stands. Reset to `Default`
/// after every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Default,
    ReadEscapeSequence,
    ReadCsiSequence,
    ReadOscSequence,
    ReadMultiCharEscape(char),
}

/// What a processed character asks the host to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackAction {
    Update,
    NoUpdate,
    Beep,
    /// Reply bytes for the child process (DA, DSR).
    SendString(String),
    ChangeWindowTitle(String),
    ChangeWorkingDirectory(String),
}

/// The control-sequence dispatcher. Feed it decoded characters one at a
/// time; it folds them into CSI/OSC/ESC sequences and applies them to the
/// screen.
pub struct Parser {
    state: EngineState,
    csi_sequence: String,
    osc_sequence: String,
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            state: EngineState::Default,
            csi_sequence: String::with_capacity(32),
            osc_sequence: String::with_capacity(64),
        }
    }
}

impl Parser {
    pub fn print_char(&mut self, screen: &mut TextScreen, ch: char) -> EngineResult<CallbackAction> {
        // C0 controls act immediately, even in the middle of a sequence.
        match ch {
            LF | VT | FF => {
                screen.lf();
                return Ok(CallbackAction::Update);
            }
            CR => {
                screen.cr();
                return Ok(CallbackAction::Update);
            }
            BS | DEL => {
                screen.bs();
                return Ok(CallbackAction::Update);
            }
            BEL => {
                // BEL also terminates an OSC
                if self.state == EngineState::ReadOscSequence {
                    self.state = EngineState::Default;
                    return self.dispatch_osc();
                }
                return Ok(CallbackAction::Beep);
            }
            TAB => {
                screen.tab_forward();
                return Ok(CallbackAction::Update);
            }
            SO | SI => {
                // character-set shifts, recognised and ignored
                return Ok(CallbackAction::NoUpdate);
            }
            _ => {}
        }

        match self.state {
            EngineState::ReadEscapeSequence => {
                self.state = EngineState::Default;
                match ch {
                    '[' => {
                        self.state = EngineState::ReadCsiSequence;
                        self.csi_sequence.clear();
                        self.csi_sequence.push('[');
                        Ok(CallbackAction::NoUpdate)
                    }
                    ']' => {
                        self.state = EngineState::ReadOscSequence;
                        self.osc_sequence.clear();
                        Ok(CallbackAction::NoUpdate)
                    }
                    '\\' => {
                        // string terminator: closes a pending OSC
                        self.dispatch_osc()
                    }
                    ESC => {
                        self.state = EngineState::ReadEscapeSequence;
                        Ok(CallbackAction::NoUpdate)
                    }
                    _ if MULTI_CHAR_ESCAPES.contains(ch) => {
                        self.state = EngineState::ReadMultiCharEscape(ch);
                        Ok(CallbackAction::NoUpdate)
                    }
                    _ => self.execute_esc_command(screen, ch),
                }
            }

            EngineState::ReadMultiCharEscape(leader) => {
                self.state = EngineState::Default;
                self.execute_multi_char_escape(screen, leader, ch)
            }

            EngineState::ReadCsiSequence => {
                if ch == ESC {
                    self.state = EngineState::ReadEscapeSequence;
                    return Ok(CallbackAction::NoUpdate);
                }
                self.csi_sequence.push(ch);
                if ('\x40'..='\x7E').contains(&ch) && ch != '[' {
                    self.state = EngineState::Default;
                    return self.dispatch_csi(screen, ch);
                }
                Ok(CallbackAction::NoUpdate)
            }

            EngineState::ReadOscSequence => {
                if ch == ESC {
                    self.state = EngineState::ReadEscapeSequence;
                    return Ok(CallbackAction::NoUpdate);
                }
                self.osc_sequence.push(ch);
                Ok(CallbackAction::NoUpdate)
            }

            EngineState::Default => match ch {
                ESC => {
                    self.state = EngineState::ReadEscapeSequence;
                    Ok(CallbackAction::NoUpdate)
                }
                '\0' => Ok(CallbackAction::NoUpdate),
                _ => {
                    if ch.is_control() {
                        log::debug!("unprintable character {:#04x}", ch as u32);
                        return Ok(CallbackAction::NoUpdate);
                    }
                    screen.print_char(ch);
                    Ok(CallbackAction::Update)
                }
            },
        }
    }

    /// Single-character escapes (`ESC x`).
    fn execute_esc_command(&mut self, screen: &mut TextScreen, ch: char) -> EngineResult<CallbackAction> {
        match ch {
            '7' => {
                screen.save_cursor();
                Ok(CallbackAction::NoUpdate)
            }
            '8' => {
                screen.restore_cursor();
                Ok(CallbackAction::Update)
            }
            '>' | '=' => {
                // keypad modes, recognised and ignored
                Ok(CallbackAction::NoUpdate)
            }
            'H' => {
                let pos = screen.caret.pos;
                screen.terminal_state.set_tab_at(pos.x, pos.y);
                Ok(CallbackAction::NoUpdate)
            }
            'D' => {
                screen.index();
                Ok(CallbackAction::Update)
            }
            'M' => {
                screen.reverse_index();
                Ok(CallbackAction::Update)
            }
            'E' => {
                screen.next_line();
                Ok(CallbackAction::Update)
            }
            'c' => {
                screen.hard_reset();
                Ok(CallbackAction::Update)
            }
            'g' => Ok(CallbackAction::Beep),
            _ => Err(ParserError::UnsupportedEscapeSequence(format!("<ESC>{ch}")).into()),
        }
    }

    /// Two-character escapes opened by one of [`MULTI_CHAR_ESCAPES`].
    fn execute_multi_char_escape(&mut self, screen: &mut TextScreen, leader: char, ch: char) -> EngineResult<CallbackAction> {
        match (leader, ch) {
            ('(', _) | (')', _) => {
                // character-set designation, recognised and ignored
                Ok(CallbackAction::NoUpdate)
            }
            ('#', '8') => {
                screen.fill_with_e();
                Ok(CallbackAction::Update)
            }
            _ => Err(ParserError::UnsupportedEscapeSequence(format!("<ESC>{leader}{ch}")).into()),
        }
    }
}

/// Accumulate one decimal digit, saturating instead of overflowing.
pub fn parse_next_number(x: i32, ch: u8) -> i32 {
    x.saturating_mul(10).saturating_add(ch as i32).saturating_sub(b'0' as i32)
}
