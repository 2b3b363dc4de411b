use thiserror::Error;

/// Errors raised while interpreting the incoming character stream.
///
/// None of these propagate to the host; the terminal logs them and carries
/// on with the next character. The SGR variants are observable through the
/// pure [`crate::parser::sgr::apply`] entry point.
#[derive(Debug, Clone, Error)]
pub enum ParserError {
    #[error("got unknown SGR: {0}")]
    UnknownSgr(i32),

    #[error("got extended colour SGR without a mode selector")]
    ExtendedSgrMissingMode,

    #[error("got unknown extended colour SGR mode: {0}")]
    ExtendedSgrUnknownMode(i32),

    #[error("got invalid 8bit SGR with too few parameters")]
    IndexedSgrTooShort,

    #[error("got invalid 8bit SGR with out-of-range index: {0}")]
    IndexedSgrOutOfRange(i32),

    #[error("got invalid 16bit SGR with too few parameters: {0}")]
    TrueColorSgrTooShort(i32),

    #[error("got invalid 16bit SGR with out-of-range {0}: {1}")]
    TrueColorSgrOutOfRange(&'static str, i32),

    #[error("unsupported escape sequence {0}")]
    UnsupportedEscapeSequence(String),

    #[error("unsupported OSC sequence {0}")]
    UnsupportedOscSequence(String),
}

/// Truncate untrusted sequence data before it ends up in a log line.
pub fn fmt_error_string(input: &str) -> String {
    input.chars().take(40).collect()
}
