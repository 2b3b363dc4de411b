use crate::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginMode {
    UpperLeftCorner,
    WithinMargins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoWrapMode {
    NoWrap,
    AutoWrap,
}

/// Mode flags, margins and tab stops.
///
/// Everything here is shared by both screen buffers; per-buffer state
/// (cursor, saved cursors, cell contents) lives on [`crate::TextScreen`].
#[derive(Debug, Clone)]
pub struct TerminalState {
    size: Size,

    pub origin_mode: OriginMode,
    pub auto_wrap_mode: AutoWrapMode,
    pub new_line_mode: bool,
    pub app_cursor_keys: bool,
    pub inverse_video: bool,
    pub bracketed_paste: bool,

    margins_top_bottom: Option<(i32, i32)>,
    // one sorted stop list per row
    tab_stops: Vec<Vec<i32>>,
}

impl TerminalState {
    pub fn from(size: impl Into<Size>) -> Self {
        let mut ret = Self {
            size: size.into(),
            origin_mode: OriginMode::UpperLeftCorner,
            auto_wrap_mode: AutoWrapMode::AutoWrap,
            new_line_mode: false,
            app_cursor_keys: false,
            inverse_video: false,
            bracketed_paste: false,
            margins_top_bottom: None,
            tab_stops: Vec::new(),
        };
        ret.reset_tabs();
        ret
    }

    pub fn get_width(&self) -> i32 {
        self.size.width
    }

    pub fn get_height(&self) -> i32 {
        self.size.height
    }

    pub fn get_size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: impl Into<Size>) {
        self.size = size.into();
        self.margins_top_bottom = None;
        self.reset_tabs();
    }

    pub fn get_margins_top_bottom(&self) -> Option<(i32, i32)> {
        self.margins_top_bottom
    }

    /// First row of the scroll region.
    pub fn top_margin(&self) -> i32 {
        match self.margins_top_bottom {
            Some((top, _)) => top,
            None => 0,
        }
    }

    /// Last row of the scroll region, inclusive.
    pub fn bottom_margin(&self) -> i32 {
        match self.margins_top_bottom {
            Some((_, bottom)) => bottom,
            None => self.size.height - 1,
        }
    }

    /// DECSTBM. An inverted region is normalised by shifting one margin,
    /// never rejected.
    pub fn set_margins_top_bottom(&mut self, top: i32, bottom: i32) {
        let mut top = top.max(0);
        let mut bottom = bottom.min(self.size.height - 1);
        if top >= bottom {
            if top >= self.size.height - 1 {
                top = bottom - 1;
            } else {
                bottom = top + 1;
            }
        }
        self.margins_top_bottom = Some((top, bottom));
    }

    pub fn clear_margins(&mut self) {
        self.margins_top_bottom = None;
    }

    pub fn reset_tabs(&mut self) {
        self.tab_stops.clear();
        for _ in 0..self.size.height {
            let mut stops = Vec::new();
            let mut tab = 0;
            while tab < self.size.width {
                stops.push(tab);
                tab += 8;
            }
            self.tab_stops.push(stops);
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.clear();
    }

    pub fn set_tab_at(&mut self, x: i32, y: i32) {
        if y < 0 {
            return;
        }
        while self.tab_stops.len() <= y as usize {
            self.tab_stops.push(Vec::new());
        }
        let stops = &mut self.tab_stops[y as usize];
        if !stops.contains(&x) {
            stops.push(x);
            stops.sort_unstable();
        }
    }

    pub fn remove_tab_at(&mut self, x: i32, y: i32) {
        if y < 0 {
            return;
        }
        if let Some(stops) = self.tab_stops.get_mut(y as usize) {
            stops.retain(|&t| t != x);
        }
    }

    /// Smallest stop right of `x` on row `y`, if any.
    pub fn next_tab_stop(&self, x: i32, y: i32) -> Option<i32> {
        let stops = self.tab_stops.get(y.max(0) as usize)?;
        stops.iter().copied().find(|&t| t > x)
    }

    /// Largest stop left of `x` on row `y`, if any.
    pub fn prev_tab_stop(&self, x: i32, y: i32) -> Option<i32> {
        let stops = self.tab_stops.get(y.max(0) as usize)?;
        stops.iter().rev().copied().find(|&t| t < x)
    }

    /// Soft-reset the mode flags and margins; the size survives.
    pub fn reset_modes(&mut self) {
        self.origin_mode = OriginMode::UpperLeftCorner;
        self.auto_wrap_mode = AutoWrapMode::AutoWrap;
        self.new_line_mode = false;
        self.app_cursor_keys = false;
        self.inverse_video = false;
        self.bracketed_paste = false;
        self.margins_top_bottom = None;
    }
}
