#![warn(clippy::all)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::must_use_candidate
)]

//! A VT100/xterm terminal emulation engine: the stateful interpreter
//! between a pseudo-terminal child process and a grid of styled cells.
//!
//! The engine is single-threaded and cooperative. A host feeds it decoded
//! characters, key events and resizes; it mutates its screen/scrollback
//! model synchronously and reports everything else through an event sink.

mod position;
pub use position::*;

pub mod limits;

mod error;
pub use error::*;

mod color_table;
pub use color_table::*;

mod text_attribute;
pub use text_attribute::*;

mod attributed_char;
pub use attributed_char::*;

mod line;
pub use line::*;

mod selection;
pub use selection::*;

mod terminal_state;
pub use terminal_state::*;

mod caret;
pub use caret::*;

mod events;
pub use events::*;

mod screen;
pub use screen::*;

pub mod parser;
pub use parser::*;

mod keymaps;
pub use keymaps::*;

pub mod url_scanner;

mod terminal;
pub use terminal::*;

pub type EngineResult<T> = anyhow::Result<T>;
