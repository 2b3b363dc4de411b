use super::{CallbackAction, Parser, parse_next_number, sgr};
use crate::{AutoWrapMode, EngineResult, OriginMode, ParserError, Position, TextScreen, fmt_error_string};

impl Parser {
    /// Dispatch a complete CSI sequence. `self.csi_sequence` holds
    /// `"[" extra? params? final`.
    pub(super) fn dispatch_csi(&mut self, screen: &mut TextScreen, final_ch: char) -> EngineResult<CallbackAction> {
        let body: String = {
            let chars: Vec<char> = self.csi_sequence.chars().collect();
            chars[1..chars.len() - 1].iter().collect()
        };
        let (extra, params) = parse_sequence_body(&body);

        let param_or = |index: usize, default: i32| -> i32 {
            match params.get(index) {
                Some(&value) => value,
                None => default,
            }
        };
        // cursor motion treats 0 as 1
        let count = {
            let p = param_or(0, 1);
            if p == 0 { 1 } else { p }
        };

        match final_ch {
            'A' => {
                // cursor up
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                let y = (pos.y - count).max(screen.terminal_state.top_margin());
                screen.set_cursor_pos(pos.with_y(y));
                Ok(CallbackAction::Update)
            }
            'B' => {
                // cursor down
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                let y = (pos.y + count).min(screen.terminal_state.bottom_margin());
                screen.set_cursor_pos(pos.with_y(y));
                Ok(CallbackAction::Update)
            }
            'C' => {
                // cursor forward
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                let x = (pos.x + count).min(screen.get_width() - 1);
                screen.set_cursor_pos(pos.with_x(x));
                Ok(CallbackAction::Update)
            }
            'D' => {
                // cursor back
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                let x = (pos.x - count).max(0);
                screen.set_cursor_pos(pos.with_x(x));
                Ok(CallbackAction::Update)
            }
            'E' => {
                // cursor next line
                self.require_no_extra(&extra)?;
                let y = (screen.caret.pos.y + count).min(screen.terminal_state.bottom_margin());
                screen.set_cursor_pos(Position::new(0, y));
                Ok(CallbackAction::Update)
            }
            'F' => {
                // cursor previous line
                self.require_no_extra(&extra)?;
                let y = (screen.caret.pos.y - count).max(screen.terminal_state.top_margin());
                screen.set_cursor_pos(Position::new(0, y));
                Ok(CallbackAction::Update)
            }
            'G' => {
                // cursor horizontal absolute
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                screen.set_cursor_pos(pos.with_x(count - 1));
                Ok(CallbackAction::Update)
            }
            'H' | 'f' => {
                // cursor position
                self.require_no_extra(&extra)?;
                let row = param_or(0, 1);
                let col = param_or(1, 1);
                let y = if screen.terminal_state.origin_mode == OriginMode::WithinMargins {
                    row - 1 + screen.terminal_state.top_margin()
                } else {
                    row - 1
                };
                screen.set_cursor_pos(Position::new(col - 1, y));
                Ok(CallbackAction::Update)
            }
            'I' => {
                // tab forward
                self.require_no_extra(&extra)?;
                for _ in 0..param_or(0, 1) {
                    screen.tab_forward();
                }
                Ok(CallbackAction::Update)
            }
            'Z' => {
                // tab backward
                self.require_no_extra(&extra)?;
                for _ in 0..param_or(0, 1) {
                    screen.tab_backward();
                }
                Ok(CallbackAction::Update)
            }
            'J' => {
                // erase in display
                if !extra.is_empty() && extra != "?" {
                    return self.unsupported_sequence_error();
                }
                screen.erase_in_display(param_or(0, 0));
                Ok(CallbackAction::Update)
            }
            'K' => {
                // erase in line
                if !extra.is_empty() && extra != "?" {
                    return self.unsupported_sequence_error();
                }
                screen.erase_in_line(param_or(0, 0));
                Ok(CallbackAction::Update)
            }
            'X' => {
                // erase characters, cursor stays
                if !extra.is_empty() || params.len() > 1 {
                    return self.unsupported_sequence_error();
                }
                let p = param_or(0, 1);
                let x = screen.caret.pos.x;
                screen.erase_line_range(x, x + if p > 0 { p - 1 } else { 0 });
                Ok(CallbackAction::Update)
            }
            'L' => {
                // insert lines
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                if pos.y < screen.terminal_state.top_margin() || pos.y > screen.terminal_state.bottom_margin() {
                    return Ok(CallbackAction::NoUpdate);
                }
                let lines = count.min(screen.terminal_state.bottom_margin() - pos.y);
                screen.scroll_backward(lines, Some(pos.y));
                screen.set_cursor_pos(pos.with_x(0));
                Ok(CallbackAction::Update)
            }
            'M' => {
                // delete lines
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                if pos.y < screen.terminal_state.top_margin() || pos.y > screen.terminal_state.bottom_margin() {
                    return Ok(CallbackAction::NoUpdate);
                }
                let lines = count.min(screen.terminal_state.bottom_margin() - pos.y);
                screen.scroll_forward(lines, Some(pos.y));
                screen.set_cursor_pos(pos.with_x(0));
                Ok(CallbackAction::Update)
            }
            'P' => {
                // delete characters
                self.require_no_extra(&extra)?;
                for _ in 0..count {
                    screen.delete_char_at_cursor();
                }
                Ok(CallbackAction::Update)
            }
            '@' => {
                // insert blank characters, cursor stays
                self.require_no_extra(&extra)?;
                for _ in 0..count {
                    screen.insert_blank_at_cursor();
                }
                Ok(CallbackAction::Update)
            }
            'S' => {
                // scroll region up
                screen.scroll_forward(count, None);
                Ok(CallbackAction::Update)
            }
            'T' => {
                // scroll region down
                screen.scroll_backward(count, None);
                Ok(CallbackAction::Update)
            }
            'c' => {
                // device attributes
                if params.is_empty() || params == [0] {
                    Ok(CallbackAction::SendString("\x1b[?1;2c".to_string()))
                } else {
                    self.unsupported_sequence_error()
                }
            }
            'd' => {
                // vertical position absolute
                self.require_no_extra(&extra)?;
                let pos = screen.caret.pos;
                screen.set_cursor_pos(pos.with_y(count - 1));
                Ok(CallbackAction::Update)
            }
            'g' => {
                // tab clear
                if !extra.is_empty() {
                    return self.unsupported_sequence_error();
                }
                let pos = screen.caret.pos;
                match param_or(0, 0) {
                    0 => screen.terminal_state.remove_tab_at(pos.x, pos.y),
                    3 => screen.terminal_state.clear_all_tab_stops(),
                    _ => {}
                }
                Ok(CallbackAction::NoUpdate)
            }
            'n' => {
                // device status report
                if !extra.is_empty() {
                    return self.unsupported_sequence_error();
                }
                match param_or(0, 6) {
                    6 => {
                        let pos = screen.caret.pos;
                        Ok(CallbackAction::SendString(format!("\x1b[{};{}R", pos.y + 1, pos.x + 1)))
                    }
                    _ => self.unsupported_sequence_error(),
                }
            }
            'p' => match extra.as_str() {
                "!" | ">" | "$" => {
                    screen.soft_reset();
                    Ok(CallbackAction::Update)
                }
                _ => self.unsupported_sequence_error(),
            },
            's' => {
                self.require_no_extra(&extra)?;
                screen.save_cursor();
                Ok(CallbackAction::NoUpdate)
            }
            'u' => {
                self.require_no_extra(&extra)?;
                screen.restore_cursor();
                Ok(CallbackAction::Update)
            }
            'm' => {
                // SGR works on a staging copy; a malformed sequence leaves
                // the rendition untouched
                let params = if params.is_empty() { vec![0] } else { params.clone() };
                let attribute = sgr::apply(&params, screen.caret.attribute)?;
                screen.caret.attribute = attribute;
                Ok(CallbackAction::Update)
            }
            'h' => {
                for &mode in &params {
                    handle_mode(screen, mode, true, &extra);
                }
                Ok(CallbackAction::Update)
            }
            'l' => {
                for &mode in &params {
                    handle_mode(screen, mode, false, &extra);
                }
                Ok(CallbackAction::Update)
            }
            'r' => {
                // DECSTBM
                self.require_no_extra(&extra)?;
                let top = param_or(0, 1).max(1);
                let bottom = param_or(1, screen.get_height()).min(screen.get_height());
                screen.terminal_state.set_margins_top_bottom(top - 1, bottom - 1);
                let top = screen.terminal_state.top_margin();
                screen.set_cursor_pos(Position::new(0, top));
                Ok(CallbackAction::Update)
            }
            _ => self.unsupported_sequence_error(),
        }
    }

    fn require_no_extra(&self, extra: &str) -> EngineResult<()> {
        if extra.is_empty() {
            Ok(())
        } else {
            Err(ParserError::UnsupportedEscapeSequence(fmt_error_string(&self.csi_sequence)).into())
        }
    }

    fn unsupported_sequence_error(&self) -> EngineResult<CallbackAction> {
        Err(ParserError::UnsupportedEscapeSequence(fmt_error_string(&self.csi_sequence)).into())
    }
}

/// Split the part between `[` and the final character into the `extra`
/// prefix (everything before the first digit) and the `;`-separated
/// parameter list. Tokens that are not plain numbers are skipped.
fn parse_sequence_body(body: &str) -> (String, Vec<i32>) {
    let chars: Vec<char> = body.chars().collect();
    let mut x = 0;
    while x < chars.len() && !chars[x].is_ascii_digit() {
        x += 1;
    }
    let extra: String = chars[..x].iter().collect();
    let rest: String = chars[x..].iter().collect();

    let mut params = Vec::new();
    for token in rest.split(';') {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        params.push(token.bytes().fold(0, parse_next_number));
    }
    (extra, params)
}

/// CSI h/l. DEC private modes carry the `?` extra, ANSI modes none.
/// Unknown modes are logged and skipped so the remaining parameters still
/// apply.
fn handle_mode(screen: &mut TextScreen, mode: i32, set: bool, extra: &str) {
    match extra {
        "?" => match mode {
            1 => screen.terminal_state.app_cursor_keys = set,
            3 => {
                // column mode: not supported, but clear the screen, reset
                // margins and tabs as a real switch would
                screen.clear_all(false);
                screen.terminal_state.clear_margins();
                screen.terminal_state.reset_tabs();
            }
            5 => screen.terminal_state.inverse_video = set,
            6 => {
                screen.terminal_state.origin_mode = if set { OriginMode::WithinMargins } else { OriginMode::UpperLeftCorner };
            }
            7 => {
                screen.terminal_state.auto_wrap_mode = if set { AutoWrapMode::AutoWrap } else { AutoWrapMode::NoWrap };
            }
            12 => {} // cursor blink, ignored
            25 => screen.caret.is_visible = set,
            1049 => screen.set_use_alt_screen_buffer(set),
            2004 => screen.terminal_state.bracketed_paste = set,
            _ => log::debug!("unhandled DEC private mode {mode} set={set}"),
        },
        "" => match mode {
            4 => screen.caret.insert_mode = set,
            20 => screen.terminal_state.new_line_mode = set,
            _ => log::debug!("unhandled ANSI mode {mode} set={set}"),
        },
        _ => log::debug!("unhandled mode {extra}{mode} set={set}"),
    }
}
