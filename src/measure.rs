use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub struct TextMetrics {
    pub char_width: f64,
    pub padding_x: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            padding_x: 4.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Shorten `text` with a trailing ellipsis so it fits inside a box of
    /// `box_width` pixels, padding included.
    pub fn fit<'a>(&self, text: &'a str, box_width: f64) -> Cow<'a, str> {
        let available = box_width - self.padding_x * 2.0;
        if self.text_width(text) <= available {
            return Cow::Borrowed(text);
        }
        let max_cols = (available / self.char_width).floor() as usize;
        Cow::Owned(truncate_columns(text, max_cols))
    }
}

/// Number of terminal columns `text` occupies.
pub fn columns(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Left-align `text` in a field `width` columns wide.
pub fn pad_right(text: &str, width: usize) -> String {
    let used = columns(text);
    let mut out = String::with_capacity(text.len() + width.saturating_sub(used));
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

/// Cut `text` to at most `max_cols` columns, ending in `…` when shortened.
pub fn truncate_columns(text: &str, max_cols: usize) -> String {
    if columns(text) <= max_cols {
        return text.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_cols - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("Books"), 5.0 * 7.0);
    }

    #[test]
    fn test_unicode_width() {
        // 全角文字は幅2
        assert_eq!(columns("図書"), 4);
        assert_eq!(pad_right("図書", 6), "図書  ");
    }

    #[test]
    fn test_catalog_labels_fit_node_box() {
        let m = TextMetrics::default();
        assert_eq!(m.fit("Event_Attendees", 120.0), "Event_Attendees");
        assert_eq!(m.fit("Book_Categories", 120.0), "Book_Categories");
    }

    #[test]
    fn test_long_label_is_shortened() {
        let m = TextMetrics::default();
        let fitted = m.fit("Interlibrary_Loan_Requests", 120.0);
        assert!(fitted.ends_with('…'));
        assert!(m.text_width(&fitted) <= 112.0);
    }

    #[test]
    fn test_truncate_columns() {
        assert_eq!(truncate_columns("abcdef", 4), "abc…");
        assert_eq!(truncate_columns("abc", 4), "abc");
        assert_eq!(truncate_columns("図書館員", 5), "図書…");
        assert_eq!(truncate_columns("abc", 0), "");
    }
}
