//! URL extraction over the scrollback and the live screen.

use regex::Regex;

use crate::{Line, TextScreen};

lazy_static::lazy_static! {
    // http://blog.mattheworiordan.com/post/13174566389/url-regular-expression-for-links-with-or-without-the
    static ref URL_REGEX: Regex = Regex::new(
        r"((([A-Za-z]{3,9}:(?://)?)(?:[-;:&=+$,\w]+@)?[A-Za-z0-9.\-]+|(?:www\.|[-;:&=+$,\w]+@)[A-Za-z0-9.\-]+)((?:/[+~%/.\w\-]*)?\??(?:[-+=&;%@.\w]*)#?(?:[.!/\\\w]*))?)"
    ).unwrap();
}

/// Linearise the scrollback followed by the live screen and collect every
/// URL, deduplicated in first-occurrence order. Non-printable cells become
/// spaces and short lines are padded to the screen width, so a URL never
/// leaks across a row boundary.
pub fn grab_urls(screen: &TextScreen) -> Vec<String> {
    let mut text = String::new();
    let width = screen.get_width();

    if !screen.is_alt_screen_active() {
        for line in screen.scrollback().iter() {
            append_line(&mut text, line, width);
        }
    }
    for line in screen.visible_buffer() {
        append_line(&mut text, line, width);
    }

    let mut ret: Vec<String> = Vec::new();
    for m in URL_REGEX.find_iter(&text) {
        let url = m.as_str().to_string();
        if !ret.contains(&url) {
            ret.push(url);
        }
    }
    ret
}

fn append_line(text: &mut String, line: &Line, width: i32) {
    for cell in &line.chars {
        text.push(if cell.is_printable() { cell.ch } else { ' ' });
    }
    for _ in line.len()..width.max(line.len()) {
        text.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::grab_urls;
    use crate::TextScreen;

    fn screen_with(text: &str) -> TextScreen {
        let mut screen = TextScreen::new((80, 24), 300);
        for ch in text.chars() {
            if ch == '\n' {
                screen.cr();
                screen.lf();
            } else {
                screen.print_char(ch);
            }
        }
        screen
    }

    #[test]
    fn test_simple_url() {
        let screen = screen_with("see https://example.com/a for details");
        assert_eq!(vec!["https://example.com/a".to_string()], grab_urls(&screen));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let screen = screen_with("http://a.example\nhttp://b.example\nhttp://a.example");
        assert_eq!(vec!["http://a.example".to_string(), "http://b.example".to_string()], grab_urls(&screen));
    }

    #[test]
    fn test_www_and_mailto() {
        let screen = screen_with("www.example.org and mailto:someone@example.org");
        let urls = grab_urls(&screen);
        assert!(urls.contains(&"www.example.org".to_string()));
        assert!(urls.iter().any(|u| u.contains("someone@example.org")));
    }

    #[test]
    fn test_urls_found_in_scrollback() {
        let mut screen = TextScreen::new((80, 2), 300);
        for ch in "http://old.example".chars() {
            screen.print_char(ch);
        }
        // push the line into the scrollback
        screen.cr();
        screen.lf();
        screen.lf();
        for ch in "plain text".chars() {
            screen.print_char(ch);
        }
        let urls = grab_urls(&screen);
        assert_eq!(vec!["http://old.example".to_string()], urls);
    }
}
