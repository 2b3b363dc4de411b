use crate::{
    CallbackAction, EventSink, Key, KeyModifiers, KeyboardState, Parser, Position, TerminalEvent, TextScreen, encode_key, url_scanner,
};

#[derive(Debug, Clone, Copy)]
pub struct TerminalOptions {
    /// Cap of the scrollback ring.
    pub max_scroll_back_lines: usize,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        TerminalOptions { max_scroll_back_lines: 300 }
    }
}

/// The host-facing terminal: a [`Parser`] driving a [`TextScreen`], plus
/// the key/paste/selection entry points. All calls run to completion on
/// the caller's thread; results reach the host through the event sink.
pub struct Terminal {
    screen: TextScreen,
    parser: Parser,
    sink: Box<dyn EventSink>,
}

impl Terminal {
    pub fn new(rows: i32, cols: i32, options: TerminalOptions, sink: Box<dyn EventSink>) -> Self {
        Terminal {
            screen: TextScreen::new((cols, rows), options.max_scroll_back_lines),
            parser: Parser::default(),
            sink,
        }
    }

    /// Read-only access to the screen. Only call between entry points.
    pub fn screen(&self) -> &TextScreen {
        &self.screen
    }

    fn drain_screen_events(&mut self) {
        for event in self.screen.take_pending_events() {
            self.sink.on_event(event);
        }
    }

    /// Interpret decoded output of the child process. Emits the triggered
    /// events in input order and exactly one `DisplayChanged` at the end.
    pub fn feed(&mut self, chars: &str) {
        if self.screen.get_width() <= 0 || self.screen.get_height() <= 0 {
            log::debug!("dropping input for a zero-sized terminal");
            return;
        }

        let start_pos = self.screen.caret.pos;
        // output from the child snaps the view back to the live screen
        self.screen.reset_back_buffer_scroll_pos();
        self.drain_screen_events();

        for ch in chars.chars() {
            match self.parser.print_char(&mut self.screen, ch) {
                Ok(action) => self.handle_action(action),
                Err(err) => log::debug!("{err}"),
            }
            self.drain_screen_events();
        }

        if self.screen.caret.pos != start_pos {
            self.sink.on_event(TerminalEvent::CursorMoved(self.screen.caret.pos));
        }
        self.sink.on_event(TerminalEvent::DisplayChanged);
    }

    fn handle_action(&mut self, action: CallbackAction) {
        match action {
            CallbackAction::Update | CallbackAction::NoUpdate => {}
            CallbackAction::Beep => self.sink.on_event(TerminalEvent::VisualBell),
            CallbackAction::SendString(reply) => self.sink.on_event(TerminalEvent::Write(reply.into_bytes())),
            CallbackAction::ChangeWindowTitle(title) => self.sink.on_event(TerminalEvent::WindowTitleChanged(title)),
            CallbackAction::ChangeWorkingDirectory(dir) => self.sink.on_event(TerminalEvent::WorkingDirectoryChanged(dir)),
        }
    }

    /// Encode a key chord and return the bytes for the child process.
    /// Any key press snaps the view back to the live screen; unless the
    /// encoding starts with ESC it also drops the selection.
    pub fn key(&mut self, key: Key, modifiers: KeyModifiers, text: &str) -> Vec<u8> {
        let keyboard = KeyboardState {
            app_cursor_keys: self.screen.terminal_state.app_cursor_keys,
            new_line_mode: self.screen.terminal_state.new_line_mode,
        };
        let bytes = encode_key(key, modifiers, text, keyboard);

        if bytes.first() == Some(&0x1B) {
            self.screen.scroll_view_to_live();
        } else {
            self.screen.reset_back_buffer_scroll_pos();
        }
        self.drain_screen_events();
        bytes
    }

    /// Forward pasted text, wrapped in the bracketed-paste markers when
    /// the mode is set.
    pub fn paste(&mut self, text: &str) {
        self.screen.reset_back_buffer_scroll_pos();
        self.drain_screen_events();

        let mut bytes = Vec::with_capacity(text.len() + 12);
        if self.screen.terminal_state.bracketed_paste {
            bytes.extend(b"\x1b[200~");
            bytes.extend(text.as_bytes());
            bytes.extend(b"\x1b[201~");
        } else {
            bytes.extend(text.as_bytes());
        }
        self.sink.on_event(TerminalEvent::Write(bytes));
    }

    /// Scripted input: decode the usual back-slash escapes and send the
    /// result to the child, same as pasted text.
    pub fn put_string(&mut self, text: &str, un_escape: bool) {
        let payload = if un_escape { decode_escapes(text) } else { text.to_string() };
        self.sink.on_event(TerminalEvent::Write(payload.into_bytes()));
    }

    pub fn resize(&mut self, rows: i32, cols: i32) {
        if self.screen.resize((cols, rows)) {
            self.sink.on_event(TerminalEvent::SizeChanged(rows, cols));
        }
    }

    pub fn set_selection(&mut self, start: impl Into<Position>, end: impl Into<Position>, ongoing: bool) {
        self.screen.set_selection(start, end, ongoing);
        self.drain_screen_events();
    }

    pub fn clear_selection(&mut self) {
        self.screen.clear_selection();
        self.drain_screen_events();
    }

    pub fn selected_text(&self) -> Option<String> {
        self.screen.selected_text()
    }

    /// Positive `delta` scrolls toward older content.
    pub fn scroll_back_view(&mut self, delta: i32) {
        if delta > 0 {
            self.screen.scroll_back_buffer_back(delta);
        } else if delta < 0 {
            self.screen.scroll_back_buffer_fwd(-delta);
        }
        self.drain_screen_events();
    }

    pub fn grab_urls(&self) -> Vec<String> {
        url_scanner::grab_urls(&self.screen)
    }

    pub fn printable_lines_from_cursor(&self, lines: i32) -> Vec<String> {
        self.screen.printable_lines_from_cursor(lines)
    }

    /// The host saw the child go away. The terminal stays usable; what to
    /// do with further output is the host's call.
    pub fn hangup(&mut self) {
        self.sink.on_event(TerminalEvent::Hangup);
    }
}

/// Decode `\r \n \e \b \t \xHH \0ooo` in scripted input.
fn decode_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('r') => {
                chars.next();
                out.push('\r');
            }
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('e') => {
                chars.next();
                out.push('\x1b');
            }
            Some('b') => {
                chars.next();
                out.push('\x08');
            }
            Some('t') => {
                chars.next();
                out.push('\t');
            }
            Some('x') => {
                chars.next();
                let mut num = String::new();
                while num.len() < 2 {
                    match chars.peek() {
                        Some(&d) if d.is_ascii_hexdigit() => {
                            num.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let value = u32::from_str_radix(&num, 16).unwrap_or(0);
                out.push(char::from_u32(value).unwrap_or('\0'));
            }
            Some('0') => {
                chars.next();
                let mut num = String::new();
                while num.len() < 3 {
                    match chars.peek() {
                        Some(&d) if ('0'..='7').contains(&d) => {
                            num.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let value = u32::from_str_radix(&num, 8).unwrap_or(0);
                out.push(char::from_u32(value).unwrap_or('\0'));
            }
            _ => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{Selection, TermColor};

    fn terminal(rows: i32, cols: i32) -> (Terminal, Arc<Mutex<Vec<TerminalEvent>>>) {
        let events: Arc<Mutex<Vec<TerminalEvent>>> = Arc::default();
        let terminal = Terminal::new(rows, cols, TerminalOptions::default(), Box::new(events.clone()));
        (terminal, events)
    }

    fn events_of(events: &Arc<Mutex<Vec<TerminalEvent>>>) -> Vec<TerminalEvent> {
        events.lock().unwrap().clone()
    }

    #[test]
    fn test_hello() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.feed("hello");

        for (x, ch) in "hello".chars().enumerate() {
            let cell = terminal.screen().get_char((x as i32, 0));
            assert_eq!(ch, cell.ch);
            assert_eq!(crate::TextAttribute::default(), cell.attribute);
        }
        assert_eq!(Position::new(5, 0), terminal.screen().caret.pos);

        let events = events_of(&events);
        assert_eq!(1, events.iter().filter(|e| **e == TerminalEvent::DisplayChanged).count());
        assert!(events.contains(&TerminalEvent::CursorMoved(Position::new(5, 0))));
    }

    #[test]
    fn test_one_display_changed_per_feed() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.feed("a");
        terminal.feed("\x1b[31m");
        terminal.feed("bc\x1b[0m\x07");
        let events = events_of(&events);
        assert_eq!(3, events.iter().filter(|e| **e == TerminalEvent::DisplayChanged).count());
        assert!(events.contains(&TerminalEvent::VisualBell));
    }

    #[test]
    fn test_device_attributes_reply() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.feed("\x1b[c");
        assert!(events_of(&events).contains(&TerminalEvent::Write(b"\x1b[?1;2c".to_vec())));
    }

    #[test]
    fn test_cursor_position_report() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.feed("hi\x1b[6n");
        assert!(events_of(&events).contains(&TerminalEvent::Write(b"\x1b[1;3R".to_vec())));
    }

    #[test]
    fn test_window_title_event() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.feed("\x1b]2;my title\x07");
        assert!(events_of(&events).contains(&TerminalEvent::WindowTitleChanged("my title".to_string())));
        terminal.feed("\x1b]0;other\x1b\\");
        assert!(events_of(&events).contains(&TerminalEvent::WindowTitleChanged("other".to_string())));
    }

    #[test]
    fn test_working_directory_event() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.feed("\x1b]7;file:///home/user\x07");
        assert!(events_of(&events).contains(&TerminalEvent::WorkingDirectoryChanged("file:///home/user".to_string())));
    }

    #[test]
    fn test_resize_event() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.resize(30, 100);
        assert!(events_of(&events).contains(&TerminalEvent::SizeChanged(30, 100)));
        terminal.resize(30, 100);
        assert_eq!(1, events_of(&events).len());
    }

    #[test]
    fn test_zero_size_drops_feed() {
        let (mut terminal, _) = terminal(0, 80);
        terminal.feed("dropped");
        assert!(terminal.screen().visible_buffer().is_empty());
    }

    #[test]
    fn test_key_resets_scrollback_view() {
        let (mut terminal, _) = terminal(2, 80);
        terminal.feed("a\r\nb\r\nc\r\n");
        terminal.scroll_back_view(1);
        assert_eq!(1, terminal.screen().back_buffer_scroll_pos());
        terminal.key(Key::Char('x'), KeyModifiers::empty(), "x");
        assert_eq!(0, terminal.screen().back_buffer_scroll_pos());
    }

    #[test]
    fn test_escape_key_keeps_selection() {
        let (mut terminal, _) = terminal(24, 80);
        terminal.feed("some text");
        terminal.set_selection((0, 0), (3, 0), true);
        let bytes = terminal.key(Key::Up, KeyModifiers::empty(), "");
        assert_eq!(b"\x1b[A".to_vec(), bytes);
        assert!(terminal.screen().get_selection().is_some());

        terminal.key(Key::Char('x'), KeyModifiers::empty(), "");
        assert!(terminal.screen().get_selection().is_none());
    }

    #[test]
    fn test_selection_round_trip_emits_one_finished() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.set_selection((0, 0), (5, 0), true);
        terminal.clear_selection();
        let events = events_of(&events);
        assert_eq!(1, events.iter().filter(|e| **e == TerminalEvent::SelectionFinished).count());
        assert!(terminal.screen().get_selection().is_none());
    }

    #[test]
    fn test_selection_normalised_and_clamped() {
        let (mut terminal, _) = terminal(24, 80);
        terminal.set_selection((500, 30), (-2, -1), false);
        let selection = terminal.screen().get_selection().unwrap();
        assert_eq!(Selection::normalized(Position::new(0, 0), Position::new(79, 23)), selection);
    }

    #[test]
    fn test_paste_plain_and_bracketed() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.paste("hi");
        assert!(events_of(&events).contains(&TerminalEvent::Write(b"hi".to_vec())));

        terminal.feed("\x1b[?2004h");
        terminal.paste("hi");
        assert!(events_of(&events).contains(&TerminalEvent::Write(b"\x1b[200~hi\x1b[201~".to_vec())));
    }

    #[test]
    fn test_put_string_unescapes() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.put_string(r"ls\r\n\e[A\x41\0101", true);
        assert!(events_of(&events).contains(&TerminalEvent::Write(b"ls\r\n\x1b[AAA".to_vec())));
    }

    #[test]
    fn test_hangup_event() {
        let (mut terminal, events) = terminal(24, 80);
        terminal.hangup();
        assert!(events_of(&events).contains(&TerminalEvent::Hangup));
        // still parses afterwards
        terminal.feed("x");
        assert_eq!('x', terminal.screen().get_char((0, 0)).ch);
    }

    #[test]
    fn test_app_cursor_keys_follow_mode() {
        let (mut terminal, _) = terminal(24, 80);
        assert_eq!(b"\x1b[A".to_vec(), terminal.key(Key::Up, KeyModifiers::empty(), ""));
        terminal.feed("\x1b[?1h");
        assert_eq!(b"\x1bOA".to_vec(), terminal.key(Key::Up, KeyModifiers::empty(), ""));
    }

    #[test]
    fn test_feed_resets_scrollback_view() {
        let (mut terminal, events) = terminal(2, 80);
        terminal.feed("a\r\nb\r\nc\r\n");
        terminal.scroll_back_view(1);
        assert_eq!(1, terminal.screen().back_buffer_scroll_pos());
        terminal.feed("d");
        assert_eq!(0, terminal.screen().back_buffer_scroll_pos());
        assert!(events_of(&events).contains(&TerminalEvent::ScrollbackAdjusted(true)));
    }

    #[test]
    fn test_sgr_colors_in_stream() {
        let (mut terminal, _) = terminal(24, 80);
        terminal.feed("\x1b[31;1mX\x1b[0mY");
        let x = terminal.screen().get_char((0, 0));
        assert_eq!(TermColor::Palette(9), x.attribute.foreground_color);
        assert!(x.attribute.is_bold());
        let y = terminal.screen().get_char((1, 0));
        assert_eq!(crate::TextAttribute::default(), y.attribute);
    }
}
