use crate::{
    AttributedChar, AutoWrapMode, Caret, Line, OriginMode, Position, SavedCaretState, Selection, Size, TerminalEvent, TerminalState, limits,
};

pub type TerminalBuffer = Vec<Line>;

/// Rows that scrolled off the top of the primary screen, oldest first.
/// The ring is bounded; the oldest row is dropped once the cap is reached.
#[derive(Clone, Debug)]
pub struct ScrollbackBuffer {
    lines: Vec<Line>,
    max_lines: usize,
}

impl ScrollbackBuffer {
    pub fn new(max_lines: usize) -> Self {
        ScrollbackBuffer { lines: Vec::new(), max_lines }
    }

    pub fn len(&self) -> i32 {
        self.lines.len() as i32
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get_line(&self, index: i32) -> Option<&Line> {
        if index < 0 {
            return None;
        }
        self.lines.get(index as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    fn push(&mut self, line: Line) {
        self.lines.push(line);
        while self.lines.len() > self.max_lines {
            self.lines.remove(0);
        }
    }

    fn take_last(&mut self) -> Option<Line> {
        self.lines.pop()
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}

/// The screen engine: primary and alternate buffer, scrollback, cursor and
/// saved-cursor state, selection, and every mutation primitive the
/// control-sequence dispatcher needs.
///
/// Rows and columns are 0-based throughout. The cursor column may sit at
/// `width` (one past the last column); that is the pending-wrap position.
pub struct TextScreen {
    pub terminal_state: TerminalState,
    pub caret: Caret,

    buffer: TerminalBuffer,
    alt_buffer: TerminalBuffer,
    back_buffer: ScrollbackBuffer,
    back_buffer_scroll_pos: i32,
    use_alt_screen_buffer: bool,

    saved_caret: SavedCaretState,
    saved_caret_alt: SavedCaretState,

    selection: Option<Selection>,
    pending_events: Vec<TerminalEvent>,
}

impl TextScreen {
    pub fn new(size: impl Into<Size>, max_scroll_back_lines: usize) -> Self {
        TextScreen {
            terminal_state: TerminalState::from(size),
            caret: Caret::default(),
            buffer: Vec::new(),
            alt_buffer: Vec::new(),
            back_buffer: ScrollbackBuffer::new(max_scroll_back_lines),
            back_buffer_scroll_pos: 0,
            use_alt_screen_buffer: false,
            saved_caret: SavedCaretState::default(),
            saved_caret_alt: SavedCaretState::default(),
            selection: None,
            pending_events: Vec::new(),
        }
    }

    pub fn get_width(&self) -> i32 {
        self.terminal_state.get_width()
    }

    pub fn get_height(&self) -> i32 {
        self.terminal_state.get_height()
    }

    /// The buffer the cursor currently writes into.
    pub fn visible_buffer(&self) -> &TerminalBuffer {
        if self.use_alt_screen_buffer {
            &self.alt_buffer
        } else {
            &self.buffer
        }
    }

    fn visible_buffer_mut(&mut self) -> &mut TerminalBuffer {
        if self.use_alt_screen_buffer {
            &mut self.alt_buffer
        } else {
            &mut self.buffer
        }
    }

    pub fn primary_buffer(&self) -> &TerminalBuffer {
        &self.buffer
    }

    pub fn scrollback(&self) -> &ScrollbackBuffer {
        &self.back_buffer
    }

    pub fn back_buffer_scroll_pos(&self) -> i32 {
        self.back_buffer_scroll_pos
    }

    pub fn is_alt_screen_active(&self) -> bool {
        self.use_alt_screen_buffer
    }

    pub fn get_selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Cell at `pos` in the active buffer; zero cell when the row or the
    /// column was never written.
    pub fn get_char(&self, pos: impl Into<Position>) -> AttributedChar {
        let pos = pos.into();
        if pos.y < 0 {
            return AttributedChar::default();
        }
        self.visible_buffer()
            .get(pos.y as usize)
            .map(|line| line.get_char(pos.x))
            .unwrap_or_default()
    }

    pub fn take_pending_events(&mut self) -> Vec<TerminalEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// DECTCEM combined with the scrollback view: while scrolled back the
    /// cursor is never shown.
    pub fn show_cursor(&self) -> bool {
        if self.back_buffer_scroll_pos != 0 {
            return false;
        }
        self.caret.is_visible
    }

    // --- cursor ----------------------------------------------------------

    /// Clamp and move. The column may land at `width` (pending wrap); the
    /// row limits depend on origin mode.
    pub fn set_cursor_pos(&mut self, pos: impl Into<Position>) {
        let mut pos = pos.into();
        let (top, bottom) = if self.terminal_state.origin_mode == OriginMode::WithinMargins {
            (self.terminal_state.top_margin(), self.terminal_state.bottom_margin())
        } else {
            (0, self.get_height() - 1)
        };
        pos.x = pos.x.clamp(0, self.get_width());
        pos.y = pos.y.clamp(top, bottom.max(top));
        self.caret.pos = pos;
    }

    fn snapshot_caret_state(&self) -> SavedCaretState {
        SavedCaretState {
            caret: self.caret,
            origin_mode: self.terminal_state.origin_mode,
            auto_wrap_mode: self.terminal_state.auto_wrap_mode,
        }
    }

    fn restore_caret_state(&mut self, state: SavedCaretState) {
        self.caret = state.caret;
        self.terminal_state.origin_mode = state.origin_mode;
        self.terminal_state.auto_wrap_mode = state.auto_wrap_mode;
    }

    /// DECSC / CSI s. Each buffer has its own slot.
    pub fn save_cursor(&mut self) {
        let snapshot = self.snapshot_caret_state();
        if self.use_alt_screen_buffer {
            self.saved_caret_alt = snapshot;
        } else {
            self.saved_caret = snapshot;
        }
    }

    /// DECRC / CSI u.
    pub fn restore_cursor(&mut self) {
        let snapshot = if self.use_alt_screen_buffer {
            self.saved_caret_alt
        } else {
            self.saved_caret
        };
        self.restore_caret_state(snapshot);
    }

    // --- writing ---------------------------------------------------------

    /// The line under the cursor, creating rows on demand.
    fn current_line_mut(&mut self) -> &mut Line {
        let y = self.caret.pos.y.max(0) as usize;
        let buffer = self.visible_buffer_mut();
        while buffer.len() <= y {
            buffer.push(Line::new());
        }
        &mut buffer[y]
    }

    /// Write one printable character at the cursor. Handles the pending
    /// wrap column, padding of short lines and IRM insert mode.
    pub fn print_char(&mut self, ch: char) {
        let overwrite = !self.caret.insert_mode;
        self.insert_at_cursor(ch, overwrite, true);
    }

    pub(crate) fn insert_at_cursor(&mut self, ch: char, overwrite: bool, advance_cursor: bool) {
        if self.caret.pos.x >= self.get_width() && advance_cursor {
            if self.terminal_state.auto_wrap_mode == AutoWrapMode::AutoWrap {
                if self.caret.pos.y >= self.terminal_state.bottom_margin() {
                    self.scroll_forward(1, None);
                    let pos = self.caret.pos.with_x(0);
                    self.set_cursor_pos(pos);
                } else {
                    let pos = Position::new(0, self.caret.pos.y + 1);
                    self.set_cursor_pos(pos);
                }
            } else {
                let pos = self.caret.pos.with_x(self.get_width() - 1);
                self.set_cursor_pos(pos);
            }
        }

        let pos = self.caret.pos;
        if pos.x >= limits::MAX_COLUMNS || pos.y >= limits::MAX_ROWS {
            log::warn!("dropping write outside the buffer limits at {pos}");
            return;
        }

        let cell = AttributedChar::new(ch, self.caret.attribute);
        let x = pos.x;
        let line = self.current_line_mut();
        while line.len() < x {
            line.chars.push(AttributedChar::default());
        }
        if !overwrite {
            line.insert_char(x, AttributedChar::default());
        }
        line.set_char(x, cell);

        if advance_cursor {
            self.set_cursor_pos(pos.with_x(x + 1));
        }
    }

    /// ICH: one zero cell pushed in at the cursor, cursor unchanged.
    pub fn insert_blank_at_cursor(&mut self) {
        let x = self.caret.pos.x;
        if x >= limits::MAX_COLUMNS {
            return;
        }
        let line = self.current_line_mut();
        while line.len() < x {
            line.chars.push(AttributedChar::default());
        }
        line.insert_char(x, AttributedChar::default());
    }

    /// DCH: drop the cell under the cursor, the rest of the line moves left.
    pub fn delete_char_at_cursor(&mut self) {
        let x = self.caret.pos.x;
        let line = self.current_line_mut();
        line.remove_char(x);
    }

    // --- erasing ---------------------------------------------------------

    /// Reset the inclusive cell range `[from, to]` of the cursor line to
    /// zero cells. The range is clamped to the line contents.
    pub fn erase_line_range(&mut self, from: i32, to: i32) {
        let line = self.current_line_mut();
        let from = from.max(0);
        let to = to.min(line.len() - 1);
        for x in from..=to {
            line.chars[x as usize] = AttributedChar::default();
        }
    }

    pub fn clear_current_line(&mut self) {
        self.current_line_mut().clear();
    }

    /// EL with the cursor included on both variants.
    pub fn erase_in_line(&mut self, mode: i32) {
        let x = self.caret.pos.x;
        match mode {
            1 => self.erase_line_range(0, x),
            2 => self.clear_current_line(),
            _ => {
                let end = self.current_line_mut().len() - 1;
                self.erase_line_range(x, end);
            }
        }
    }

    /// ED. Mode 2 clears the whole screen (scrollback untouched).
    pub fn erase_in_display(&mut self, mode: i32) {
        let pos = self.caret.pos;
        match mode {
            1 => {
                self.erase_line_range(0, pos.x);
                let buffer = self.visible_buffer_mut();
                for y in 0..pos.y.max(0) as usize {
                    if let Some(line) = buffer.get_mut(y) {
                        line.clear();
                    }
                }
            }
            2 => self.clear_all(false),
            _ => {
                let end = self.current_line_mut().len() - 1;
                self.erase_line_range(pos.x, end);
                let buffer = self.visible_buffer_mut();
                for y in (pos.y.max(0) as usize + 1)..buffer.len() {
                    buffer[y].clear();
                }
            }
        }
    }

    /// Clear the active buffer; with `whole_buffer` the scrollback goes too.
    pub fn clear_all(&mut self, whole_buffer: bool) {
        self.clear_selection();
        if whole_buffer {
            self.back_buffer.clear();
            self.reset_back_buffer_scroll_pos();
        }
        self.visible_buffer_mut().clear();
        self.set_cursor_pos(Position::new(0, 0));
    }

    /// DECALN: fresh screen filled with `E` cells.
    pub fn fill_with_e(&mut self) {
        self.clear_all(true);
        let (width, height) = (self.get_width(), self.get_height());
        let buffer = self.visible_buffer_mut();
        for _ in 0..height {
            let mut line = Line::with_capacity(width);
            for _ in 0..width {
                line.chars.push(AttributedChar::from('E'));
            }
            buffer.push(line);
        }
    }

    // --- scrolling -------------------------------------------------------

    /// Remove `lines` rows at `at` (top margin by default) and append fresh
    /// rows below the bottom margin. Rows removed from the top of the
    /// primary screen retire into the scrollback.
    pub fn scroll_forward(&mut self, lines: i32, at: Option<i32>) {
        if lines <= 0 {
            return;
        }
        self.adjust_selection_position(-lines);

        let top = self.terminal_state.top_margin();
        let bottom = self.terminal_state.bottom_margin();
        let at_row = at.unwrap_or(top);
        if at_row < 0 || at_row > bottom {
            return;
        }
        let to_scrollback = !self.use_alt_screen_buffer && at_row == top;

        for _ in 0..lines {
            let removed = {
                let buffer = self.visible_buffer_mut();
                while (buffer.len() as i32) < bottom + 1 {
                    buffer.push(Line::new());
                }
                buffer.insert((bottom + 1) as usize, Line::new());
                buffer.remove(at_row as usize)
            };
            if to_scrollback {
                self.back_buffer.push(removed);
            }
        }
    }

    /// Insert `lines` rows at `at` (top margin by default) and drop rows at
    /// the bottom margin. At the top of the primary screen the inserted
    /// rows come back out of the scrollback.
    pub fn scroll_backward(&mut self, lines: i32, at: Option<i32>) {
        if lines <= 0 {
            return;
        }
        self.adjust_selection_position(lines);

        let top = self.terminal_state.top_margin();
        let bottom = self.terminal_state.bottom_margin();
        let (at_row, use_back_buffer) = match at {
            Some(row) => (row, false),
            None => (top, true),
        };
        if at_row < 0 || at_row > bottom {
            return;
        }

        for _ in 0..lines {
            let line = if !self.use_alt_screen_buffer && use_back_buffer {
                self.back_buffer.take_last().unwrap_or_default()
            } else {
                Line::new()
            };
            let buffer = self.visible_buffer_mut();
            while (buffer.len() as i32) < at_row {
                buffer.push(Line::new());
            }
            buffer.insert(at_row as usize, line);
            let remove_at = (bottom + 1).min(buffer.len() as i32 - 1);
            buffer.remove(remove_at as usize);
        }
    }

    // --- cursor motion driven by C0/ESC ----------------------------------

    /// LF/VT/FF. At the bottom margin the region scrolls; at the pending
    /// wrap column the advance is suppressed (terminfo `xenl`).
    pub fn lf(&mut self) {
        let pos = self.caret.pos;
        if pos.y == self.terminal_state.bottom_margin() {
            self.scroll_forward(1, None);
            if self.terminal_state.new_line_mode {
                let pos = self.caret.pos.with_x(0);
                self.set_cursor_pos(pos);
            }
        } else if pos.x < self.get_width() {
            if self.terminal_state.new_line_mode {
                self.set_cursor_pos(Position::new(0, pos.y + 1));
            } else {
                self.set_cursor_pos(pos.with_y(pos.y + 1));
            }
        }
    }

    pub fn cr(&mut self) {
        let pos = self.caret.pos.with_x(0);
        self.set_cursor_pos(pos);
    }

    /// BS/DEL: move left, never erase.
    pub fn bs(&mut self) {
        let pos = self.caret.pos;
        self.set_cursor_pos(pos.with_x(pos.x - 1));
    }

    /// IND.
    pub fn index(&mut self) {
        let pos = self.caret.pos;
        if pos.y == self.terminal_state.bottom_margin() {
            self.scroll_forward(1, None);
        } else {
            self.set_cursor_pos(pos.with_y(pos.y + 1));
        }
    }

    /// RI.
    pub fn reverse_index(&mut self) {
        let pos = self.caret.pos;
        if pos.y == self.terminal_state.top_margin() {
            self.scroll_backward(1, None);
        } else {
            self.set_cursor_pos(pos.with_y(pos.y - 1));
        }
    }

    /// NEL.
    pub fn next_line(&mut self) {
        let pos = self.caret.pos;
        if pos.y == self.terminal_state.bottom_margin() {
            self.scroll_forward(1, None);
            let pos = self.caret.pos.with_x(0);
            self.set_cursor_pos(pos);
        } else {
            self.set_cursor_pos(Position::new(0, pos.y + 1));
        }
    }

    pub fn tab_forward(&mut self) {
        let pos = self.caret.pos;
        if let Some(stop) = self.terminal_state.next_tab_stop(pos.x, pos.y) {
            self.set_cursor_pos(pos.with_x(stop));
        }
    }

    pub fn tab_backward(&mut self) {
        let pos = self.caret.pos;
        if let Some(stop) = self.terminal_state.prev_tab_stop(pos.x, pos.y) {
            self.set_cursor_pos(pos.with_x(stop));
        }
    }

    // --- alternate screen ------------------------------------------------

    /// DEC private mode 1049.
    pub fn set_use_alt_screen_buffer(&mut self, use_alt: bool) {
        if use_alt {
            self.saved_caret_alt = self.snapshot_caret_state();
            self.use_alt_screen_buffer = true;
            self.terminal_state.clear_margins();
            self.reset_back_buffer_scroll_pos();
            self.clear_all(false);
        } else {
            self.use_alt_screen_buffer = false;
            let saved = self.saved_caret_alt;
            self.restore_caret_state(saved);
            self.terminal_state.clear_margins();
            self.reset_back_buffer_scroll_pos();
        }
        self.terminal_state.reset_tabs();
    }

    // --- resets ----------------------------------------------------------

    /// DECSTR. Keeps the screen contents.
    pub fn soft_reset(&mut self) {
        self.terminal_state.reset_modes();
        self.caret.attribute = crate::TextAttribute::default();
        self.caret.insert_mode = false;
        self.caret.is_visible = true;
        self.use_alt_screen_buffer = false;
        let snapshot = self.snapshot_caret_state();
        self.saved_caret = snapshot;
        self.saved_caret_alt = snapshot;
    }

    /// RIS. Everything back to the initial state.
    pub fn hard_reset(&mut self) {
        self.soft_reset();
        self.clear_selection();
        self.buffer.clear();
        self.alt_buffer.clear();
        self.back_buffer.clear();
        self.back_buffer_scroll_pos = 0;
        self.caret.reset();
        self.saved_caret = SavedCaretState::default();
        self.saved_caret_alt = SavedCaretState::default();
        self.terminal_state.reset_tabs();
    }

    /// Returns `true` when the dimensions actually changed.
    pub fn resize(&mut self, size: impl Into<Size>) -> bool {
        let size = size.into();
        if size == self.terminal_state.get_size() {
            return false;
        }
        self.terminal_state.set_size(size);
        let pos = self.caret.pos;
        self.set_cursor_pos(pos);
        true
    }

    // --- selection -------------------------------------------------------

    pub fn set_selection(&mut self, start: impl Into<Position>, end: impl Into<Position>, ongoing: bool) {
        let mut selection = Selection::normalized(start.into(), end.into());
        selection.anchor.x = selection.anchor.x.max(0);
        selection.anchor.y = selection.anchor.y.max(0);
        selection.lead.x = selection.lead.x.min(self.get_width() - 1);
        selection.lead.y = selection.lead.y.min(self.get_height() - 1);
        self.selection = Some(selection);
        self.pending_events.push(TerminalEvent::SelectionChanged);
        if !ongoing {
            self.pending_events.push(TerminalEvent::SelectionFinished);
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_none() {
            return;
        }
        self.selection = None;
        self.pending_events.push(TerminalEvent::SelectionFinished);
        self.pending_events.push(TerminalEvent::SelectionChanged);
    }

    /// Shift the selection when the screen contents move `lines` rows down
    /// (negative: up). Partially visible selections clamp, invisible ones
    /// clear.
    fn adjust_selection_position(&mut self, lines: i32) {
        let Some(selection) = self.selection else { return };
        if lines == 0 {
            return;
        }

        let mut top = Position::new(selection.left(), selection.top() + lines);
        let mut bottom = Position::new(selection.right(), selection.bottom() + lines);

        if top.y < 0 {
            top = Position::new(0, 0);
        }
        if bottom.y > self.get_height() - 1 {
            bottom = Position::new(self.get_width() - 1, self.get_height() - 1);
        }
        if bottom.y < 0 || top.y > self.get_height() - 1 {
            self.clear_selection();
            return;
        }

        self.selection = Some(Selection::new(top, bottom));
        self.pending_events.push(TerminalEvent::SelectionChanged);
    }

    /// The selected cells as text: one string per covered row, right
    /// trimmed, joined with newlines. While scrolled back the upper rows
    /// come out of the scrollback.
    pub fn selected_text(&self) -> Option<String> {
        let selection = self.selection?;
        let mut rows: Vec<String> = Vec::new();

        if self.back_buffer_scroll_pos > 0 && !self.use_alt_screen_buffer {
            let line_from = self.back_buffer.len() - self.back_buffer_scroll_pos + selection.top();
            let line_to = self.back_buffer.len() - self.back_buffer_scroll_pos + selection.bottom();
            for i in line_from..=line_to {
                if let Some(line) = self.back_buffer.get_line(i) {
                    let start = if i == line_from { selection.left() } else { 0 };
                    let end = if i == line_to { selection.right() } else { line.len() - 1 };
                    rows.push(row_text(line, start, end));
                }
            }
        }

        let line_from = selection.top() - self.back_buffer_scroll_pos;
        let line_to = selection.bottom() - self.back_buffer_scroll_pos;
        for i in line_from..=line_to {
            if i < 0 {
                continue;
            }
            if let Some(line) = self.visible_buffer().get(i as usize) {
                let start = if i == line_from { selection.left() } else { 0 };
                let end = if i == line_to { selection.right() } else { line.len() - 1 };
                rows.push(row_text(line, start, end));
            }
        }

        Some(rows.join("\n"))
    }

    // --- scrollback view -------------------------------------------------

    /// Scroll the view toward older content.
    pub fn scroll_back_buffer_back(&mut self, lines: i32) {
        if self.use_alt_screen_buffer || lines <= 0 {
            return;
        }
        self.clear_selection();
        self.back_buffer_scroll_pos = (self.back_buffer_scroll_pos + lines).min(self.back_buffer.len());
        self.pending_events.push(TerminalEvent::ScrollbackAdjusted(false));
    }

    /// Scroll the view toward the live screen.
    pub fn scroll_back_buffer_fwd(&mut self, lines: i32) {
        if self.use_alt_screen_buffer || lines <= 0 {
            return;
        }
        self.clear_selection();
        self.back_buffer_scroll_pos = (self.back_buffer_scroll_pos - lines).max(0);
        self.pending_events.push(TerminalEvent::ScrollbackAdjusted(false));
    }

    /// Snap back to the live screen and drop the selection.
    pub fn reset_back_buffer_scroll_pos(&mut self) {
        if self.back_buffer_scroll_pos == 0 && self.selection.is_none() {
            return;
        }
        self.back_buffer_scroll_pos = 0;
        self.clear_selection();
        self.pending_events.push(TerminalEvent::ScrollbackAdjusted(true));
    }

    /// Snap back to the live screen without touching the selection; used
    /// for key presses that emit escape sequences.
    pub fn scroll_view_to_live(&mut self) {
        if self.back_buffer_scroll_pos == 0 {
            return;
        }
        self.back_buffer_scroll_pos = 0;
        self.pending_events.push(TerminalEvent::ScrollbackAdjusted(true));
    }

    // --- text extraction --------------------------------------------------

    /// `2 * lines + 1` rows of printable text centred on the cursor row;
    /// rows outside the buffer yield empty strings.
    pub fn printable_lines_from_cursor(&self, lines: i32) -> Vec<String> {
        let mut ret = Vec::new();
        let start = self.caret.pos.y - lines;
        let end = self.caret.pos.y + lines;
        for y in start..=end {
            let mut text = String::new();
            if y >= 0 {
                if let Some(line) = self.visible_buffer().get(y as usize) {
                    for cell in &line.chars {
                        if cell.is_printable() {
                            text.push(cell.ch);
                        }
                    }
                }
            }
            ret.push(text);
        }
        ret
    }
}

fn row_text(line: &Line, start: i32, end: i32) -> String {
    let mut text = String::new();
    for x in start.max(0)..=end.min(line.len() - 1) {
        let cell = line.get_char(x);
        if cell.is_printable() {
            text.push(cell.ch);
        }
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextAttribute;

    fn screen() -> TextScreen {
        TextScreen::new((80, 24), 300)
    }

    #[test]
    fn test_print_char_advances() {
        let mut screen = screen();
        screen.print_char('h');
        screen.print_char('i');
        assert_eq!('h', screen.get_char((0, 0)).ch);
        assert_eq!('i', screen.get_char((1, 0)).ch);
        assert_eq!(Position::new(2, 0), screen.caret.pos);
    }

    #[test]
    fn test_pending_wrap_column() {
        let mut screen = TextScreen::new((5, 24), 300);
        for ch in "abcde".chars() {
            screen.print_char(ch);
        }
        // one past the last column, no wrap yet
        assert_eq!(Position::new(5, 0), screen.caret.pos);
        screen.print_char('f');
        assert_eq!('f', screen.get_char((0, 1)).ch);
        assert_eq!(Position::new(1, 1), screen.caret.pos);
    }

    #[test]
    fn test_no_wrap_clamps() {
        let mut screen = TextScreen::new((5, 24), 300);
        screen.terminal_state.auto_wrap_mode = AutoWrapMode::NoWrap;
        for ch in "abcdefg".chars() {
            screen.print_char(ch);
        }
        assert_eq!('g', screen.get_char((4, 0)).ch);
        assert!(screen.visible_buffer().len() == 1);
    }

    #[test]
    fn test_scroll_forward_feeds_scrollback() {
        let mut screen = TextScreen::new((80, 3), 300);
        screen.print_char('a');
        screen.scroll_forward(1, None);
        assert_eq!(1, screen.scrollback().len());
        assert_eq!('a', screen.scrollback().get_line(0).unwrap().get_char(0).ch);
        assert_eq!(' ', screen.get_char((0, 0)).ch);
    }

    #[test]
    fn test_scroll_backward_restores_from_scrollback() {
        let mut screen = TextScreen::new((80, 3), 300);
        screen.print_char('a');
        screen.scroll_forward(1, None);
        screen.scroll_backward(1, None);
        assert_eq!(0, screen.scrollback().len());
        assert_eq!('a', screen.get_char((0, 0)).ch);
    }

    #[test]
    fn test_scrollback_cap() {
        let mut screen = TextScreen::new((80, 3), 5);
        for _ in 0..20 {
            screen.scroll_forward(1, None);
        }
        assert_eq!(5, screen.scrollback().len());
    }

    #[test]
    fn test_alt_screen_keeps_primary() {
        let mut screen = screen();
        screen.print_char('x');
        let attribute = TextAttribute::default();
        screen.set_use_alt_screen_buffer(true);
        screen.print_char('y');
        assert_eq!('y', screen.get_char((0, 0)).ch);
        screen.set_use_alt_screen_buffer(false);
        assert_eq!('x', screen.get_char((0, 0)).ch);
        assert_eq!(attribute, screen.caret.attribute);
        // the alt-screen cursor motion was rolled back
        assert_eq!(Position::new(1, 0), screen.caret.pos);
    }

    #[test]
    fn test_selection_adjusts_on_scroll() {
        let mut screen = TextScreen::new((80, 10), 300);
        screen.set_selection((0, 4), (10, 5), false);
        screen.scroll_forward(2, None);
        let selection = screen.get_selection().unwrap();
        assert_eq!(2, selection.top());
        assert_eq!(3, selection.bottom());
        screen.scroll_forward(4, None);
        assert!(screen.get_selection().is_none());
    }

    #[test]
    fn test_selected_text_trims() {
        let mut screen = screen();
        for ch in "hello   ".chars() {
            screen.print_char(ch);
        }
        screen.set_selection((0, 0), (79, 0), false);
        assert_eq!(Some("hello".to_string()), screen.selected_text());
    }

    #[test]
    fn test_selected_text_from_scrollback() {
        let mut screen = TextScreen::new((80, 3), 300);
        for ch in "old".chars() {
            screen.print_char(ch);
        }
        screen.scroll_forward(1, None);
        for ch in "new".chars() {
            screen.print_char(ch);
        }
        screen.scroll_back_buffer_back(1);
        screen.set_selection((0, 0), (79, 0), false);
        assert_eq!(Some("old".to_string()), screen.selected_text());
    }

    #[test]
    fn test_hard_reset_restores_initial_state() {
        let mut screen = screen();
        screen.print_char('x');
        screen.terminal_state.set_margins_top_bottom(2, 10);
        screen.terminal_state.new_line_mode = true;
        screen.scroll_forward(1, None);
        screen.hard_reset();
        assert!(screen.visible_buffer().is_empty());
        assert!(screen.scrollback().is_empty());
        assert_eq!(Position::new(0, 0), screen.caret.pos);
        assert_eq!(None, screen.terminal_state.get_margins_top_bottom());
        assert!(!screen.terminal_state.new_line_mode);
    }

    #[test]
    fn test_erase_uses_zero_cell() {
        let mut screen = screen();
        let mut attribute = TextAttribute::default();
        attribute.set_is_bold(true);
        screen.caret.attribute = attribute;
        screen.print_char('x');
        screen.set_cursor_pos(Position::new(0, 0));
        screen.erase_in_line(0);
        let cell = screen.get_char((0, 0));
        assert_eq!(' ', cell.ch);
        assert_eq!(TextAttribute::default(), cell.attribute);
    }

    #[test]
    fn test_printable_lines_from_cursor() {
        let mut screen = screen();
        screen.print_char('a');
        let lines = screen.printable_lines_from_cursor(1);
        assert_eq!(3, lines.len());
        assert_eq!("a", lines[1]);
        assert_eq!("", lines[2]);
    }
}
