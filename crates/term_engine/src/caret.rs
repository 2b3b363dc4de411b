use crate::{AutoWrapMode, OriginMode, Position, TextAttribute};

/// The cursor: position, current rendition and the IRM/DECTCEM flags.
#[derive(Clone, Copy, PartialEq)]
pub struct Caret {
    pub pos: Position,
    pub attribute: TextAttribute,
    pub insert_mode: bool,
    pub is_visible: bool,
}

impl Default for Caret {
    fn default() -> Self {
        Caret {
            pos: Position::default(),
            attribute: TextAttribute::default(),
            insert_mode: false,
            is_visible: true,
        }
    }
}

impl Caret {
    pub fn get_position(&self) -> Position {
        self.pos
    }

    pub fn get_attribute(&self) -> TextAttribute {
        self.attribute
    }

    pub fn reset(&mut self) {
        *self = Caret::default();
    }

    pub fn reset_color_attribute(&mut self) {
        self.attribute = TextAttribute::default();
    }
}

impl std::fmt::Debug for Caret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caret")
            .field("pos", &self.pos)
            .field("attribute", &self.attribute)
            .field("insert_mode", &self.insert_mode)
            .finish_non_exhaustive()
    }
}

/// What DECSC/DECRC and the 1049 switch preserve: the caret plus the two
/// mode flags that travel with it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedCaretState {
    pub caret: Caret,
    pub origin_mode: OriginMode,
    pub auto_wrap_mode: AutoWrapMode,
}

impl Default for SavedCaretState {
    fn default() -> Self {
        SavedCaretState {
            caret: Caret::default(),
            origin_mode: OriginMode::UpperLeftCorner,
            auto_wrap_mode: AutoWrapMode::AutoWrap,
        }
    }
}
