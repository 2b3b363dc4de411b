//! Select Graphic Rendition: a pure function over the parameter list.
//!
//! Callers pass the current rendition and commit the returned one, so a
//! failing sequence leaves their state untouched. Processing stops at the
//! first bad parameter.

use crate::{DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, EngineResult, ParserError, TermColor, TextAttribute};

pub fn apply(params: &[i32], attribute: TextAttribute) -> EngineResult<TextAttribute> {
    let mut attribute = attribute;
    let mut i = 0;
    while i < params.len() {
        let p = params[i];
        match p {
            0 => attribute = TextAttribute::default(),
            1 => {
                attribute.set_is_bold(true);
                // bold brightens an already-selected basic foreground
                if let TermColor::Palette(index) = attribute.foreground_color {
                    if index < 8 {
                        attribute.foreground_color = TermColor::Palette(index + 8);
                    }
                }
            }
            3 => attribute.set_is_italic(true),
            4 => attribute.set_is_underlined(true),
            5 | 6 => attribute.set_is_blinking(true),
            7 => attribute.set_is_negative(true),
            2 | 8 | 9 | 21 | 28 | 29 => {
                // recognised, deliberately not rendered
            }
            22 => attribute.set_is_bold(false),
            23 => attribute.set_is_italic(false),
            24 => attribute.set_is_underlined(false),
            25 | 26 => attribute.set_is_blinking(false),
            27 => attribute.set_is_negative(false),
            30..=37 => {
                let mut index = (p - 30) as u8;
                if attribute.is_bold() {
                    index += 8;
                }
                attribute.foreground_color = TermColor::Palette(index);
            }
            38 => {
                i = apply_extended_color(&mut attribute, params, i, true)?;
                continue;
            }
            39 => attribute.foreground_color = TermColor::Palette(DEFAULT_FOREGROUND),
            40..=47 => attribute.background_color = TermColor::Palette((p - 40) as u8),
            48 => {
                i = apply_extended_color(&mut attribute, params, i, false)?;
                continue;
            }
            49 => attribute.background_color = TermColor::Palette(DEFAULT_BACKGROUND),
            // aixterm bright ranges; both steer the foreground here
            90..=97 => attribute.foreground_color = TermColor::Palette((p - 90 + 8) as u8),
            100..=107 => attribute.foreground_color = TermColor::Palette((p - 100 + 8) as u8),
            _ => return Err(ParserError::UnknownSgr(p).into()),
        }
        i += 1;
    }
    Ok(attribute)
}

/// SGR 38/48: the parameter after the introducer selects the form,
/// `5;index` for the 256-colour palette or `2;r;g;b` for direct colour.
/// Returns the index of the next unconsumed parameter.
fn apply_extended_color(attribute: &mut TextAttribute, params: &[i32], i: usize, is_foreground: bool) -> EngineResult<usize> {
    let Some(&mode) = params.get(i + 1) else {
        return Err(ParserError::ExtendedSgrMissingMode.into());
    };
    match mode {
        5 => {
            let Some(&index) = params.get(i + 2) else {
                return Err(ParserError::IndexedSgrTooShort.into());
            };
            if !(0..=255).contains(&index) {
                return Err(ParserError::IndexedSgrOutOfRange(index).into());
            }
            let mut index = index as u8;
            // bold promotion only applies to the foreground and only below
            // the bright range
            if is_foreground && index < 9 && attribute.is_bold() {
                index += 8;
            }
            if is_foreground {
                attribute.foreground_color = TermColor::Palette(index);
            } else {
                attribute.background_color = TermColor::Palette(index);
            }
            Ok(i + 3)
        }
        2 => {
            let components = params.len() as i32 - i as i32 - 2;
            if components < 3 {
                return Err(ParserError::TrueColorSgrTooShort(components.max(0)).into());
            }
            let (r, g, b) = (params[i + 2], params[i + 3], params[i + 4]);
            for (channel, value) in [("r", r), ("g", g), ("b", b)] {
                if !(0..=255).contains(&value) {
                    return Err(ParserError::TrueColorSgrOutOfRange(channel, value).into());
                }
            }
            let color = TermColor::Rgb(r as u8, g as u8, b as u8);
            if is_foreground {
                attribute.foreground_color = color;
            } else {
                attribute.background_color = color;
            }
            Ok(i + 5)
        }
        other => Err(ParserError::ExtendedSgrUnknownMode(other).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::{TermColor, TextAttribute};

    #[test]
    fn test_unknown_sgr_is_an_error() {
        let err = apply(&[1024, 3], TextAttribute::default()).unwrap_err();
        assert_eq!("got unknown SGR: 1024", err.to_string());
    }

    #[test]
    fn test_true_color_too_few_parameters() {
        let err = apply(&[48, 2, 0, 0], TextAttribute::default()).unwrap_err();
        assert_eq!("got invalid 16bit SGR with too few parameters: 2", err.to_string());
    }

    #[test]
    fn test_true_color_out_of_range() {
        let err = apply(&[48, 2, 256, 0, 0], TextAttribute::default()).unwrap_err();
        assert_eq!("got invalid 16bit SGR with out-of-range r: 256", err.to_string());
    }

    #[test]
    fn test_indexed_color() {
        let attribute = apply(&[38, 5, 0], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Palette(0), attribute.foreground_color);
    }

    #[test]
    fn test_indexed_color_bold_promotion() {
        let mut bold = TextAttribute::default();
        bold.set_is_bold(true);

        // promotion stops at the bright range
        let attribute = apply(&[38, 5, 9], bold).unwrap();
        assert_eq!(TermColor::Palette(9), attribute.foreground_color);

        let attribute = apply(&[38, 5, 1], bold).unwrap();
        assert_eq!(TermColor::Palette(9), attribute.foreground_color);

        let attribute = apply(&[38, 5, 1], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Palette(1), attribute.foreground_color);
    }

    #[test]
    fn test_true_color() {
        let attribute = apply(&[38, 2, 0, 0, 255], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Rgb(0, 0, 255), attribute.foreground_color);
    }

    #[test]
    fn test_bold_promotes_basic_foreground_in_either_order() {
        let attribute = apply(&[31, 1], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Palette(9), attribute.foreground_color);
        assert!(attribute.is_bold());

        let attribute = apply(&[1, 31], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Palette(9), attribute.foreground_color);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let styled = apply(&[1, 4, 33, 44], TextAttribute::default()).unwrap();
        let reset = apply(&[0], styled).unwrap();
        assert_eq!(TextAttribute::default(), reset);
    }

    #[test]
    fn test_ignored_codes_change_nothing() {
        let attribute = apply(&[2, 8, 9, 21, 28, 29], TextAttribute::default()).unwrap();
        assert_eq!(TextAttribute::default(), attribute);
    }

    #[test]
    fn test_bright_ranges_set_the_foreground() {
        let attribute = apply(&[92], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Palette(10), attribute.foreground_color);

        let attribute = apply(&[102], TextAttribute::default()).unwrap();
        assert_eq!(TermColor::Palette(10), attribute.foreground_color);
    }

    #[test]
    fn test_background_has_no_bold_promotion() {
        let mut bold = TextAttribute::default();
        bold.set_is_bold(true);
        let attribute = apply(&[44], bold).unwrap();
        assert_eq!(TermColor::Palette(4), attribute.background_color);

        let attribute = apply(&[48, 5, 1], bold).unwrap();
        assert_eq!(TermColor::Palette(1), attribute.background_color);
    }

    #[test]
    fn test_error_stops_processing() {
        // the trailing 31 must not be applied
        let err = apply(&[38, 2, 300, 0, 0, 31], TextAttribute::default());
        assert!(err.is_err());
    }
}
