use super::TextAttribute;

/// One screen cell. The default value is the "zero cell": a space with
/// default colours and no attributes, the state every erase operation
/// resets a cell to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttributedChar {
    pub ch: char,
    pub attribute: TextAttribute,
}

impl Default for AttributedChar {
    fn default() -> Self {
        AttributedChar {
            ch: ' ',
            attribute: TextAttribute::default(),
        }
    }
}

impl AttributedChar {
    pub fn new(ch: char, attribute: TextAttribute) -> Self {
        AttributedChar { ch, attribute }
    }

    pub fn is_printable(&self) -> bool {
        !self.ch.is_control()
    }
}

impl From<char> for AttributedChar {
    fn from(value: char) -> Self {
        AttributedChar {
            ch: value,
            attribute: TextAttribute::default(),
        }
    }
}

impl std::fmt::Display for AttributedChar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(Char: '{}' {:?})", self.ch, self.attribute)
    }
}
