use super::{CallbackAction, Parser, parse_next_number};
use crate::{EngineResult, ParserError, fmt_error_string};

impl Parser {
    /// Dispatch an accumulated OSC, terminated by BEL or ST.
    pub(super) fn dispatch_osc(&mut self) -> EngineResult<CallbackAction> {
        let sequence = std::mem::take(&mut self.osc_sequence);
        if sequence.is_empty() {
            return Ok(CallbackAction::NoUpdate);
        }

        let Some((code, payload)) = sequence.split_once(';') else {
            return Err(ParserError::UnsupportedOscSequence(fmt_error_string(&sequence)).into());
        };
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParserError::UnsupportedOscSequence(fmt_error_string(&sequence)).into());
        }
        let code = code.bytes().fold(0, parse_next_number);

        match code {
            0 | 2 => Ok(CallbackAction::ChangeWindowTitle(payload.to_string())),
            7 => Ok(CallbackAction::ChangeWorkingDirectory(payload.to_string())),
            // iTerm2-family sequences, recognised and ignored
            6 | 133 | 1337 => Ok(CallbackAction::NoUpdate),
            _ => Err(ParserError::UnsupportedOscSequence(fmt_error_string(&sequence)).into()),
        }
    }
}
