use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculates the display width of a string in terminal columns.
///
/// CJK characters and most emoji occupy two columns, combining marks zero.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
/// Display width of the ellipsis (3 columns for ASCII "...")
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width.
///
/// If truncation is necessary, appends "..." to indicate text was cut off.
/// Widths of 3 columns or less get as many characters as fit, without an
/// ellipsis. Returns `Cow::Borrowed` when the string already fits.
///
/// # Examples
///
/// ```
/// use feria::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let end = prefix_within_width(s, max_width);
        if end == s.len() {
            return Cow::Borrowed(s);
        }
        return Cow::Owned(s[..end].to_string());
    }

    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let cut = prefix_within_width(s, max_width - ELLIPSIS_WIDTH);
    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

/// Byte offset of the longest prefix of `s` that fits in `width` columns.
fn prefix_within_width(s: &str, width: usize) -> usize {
    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }
    end
}

/// Word-wraps `text` to lines of at most `width` columns.
///
/// Explicit newlines start a new line (an empty source line yields an empty
/// output line). Words wider than `width` are split across lines. Runs of
/// whitespace between words collapse to a single space.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let mut word = word;
            let mut word_width = display_width(word);

            // Place the word after a separating space if it fits
            if current_width > 0 && current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
                continue;
            }

            if current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            // Hard-split words that cannot fit on a line of their own
            while word_width > width {
                let cut = prefix_within_width(word, width).max(
                    word.chars().next().map(char::len_utf8).unwrap_or(word.len()),
                );
                lines.push(word[..cut].to_string());
                word = &word[cut..];
                word_width = display_width(word);
            }

            current.push_str(word);
            current_width = word_width;
        }

        lines.push(current);
    }

    lines
}

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// Feed text is drawn straight into the terminal, so escape sequences embedded
/// in a title or body must not reach it. Removes C0 controls (except tab,
/// newline and carriage return), DEL, CSI sequences, OSC sequences and bare ESC.
///
/// Returns `Cow::Borrowed` when the input contains nothing to strip.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    fn is_stripped(b: u8) -> bool {
        b == 0x1b || b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d)
    }

    let bytes = s.as_bytes();
    let len = bytes.len();

    if !bytes.iter().any(|&b| is_stripped(b)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b == 0x1b {
            if i + 1 < len && bytes[i + 1] == b'[' {
                // CSI: parameters until a final byte in 0x40..=0x7e
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            } else if i + 1 < len && bytes[i + 1] == b']' {
                // OSC: until BEL or ST
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && i + 1 < len && bytes[i + 1] == b'\\' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            } else {
                i += 1;
            }
        } else if is_stripped(b) {
            i += 1;
        } else {
            let start = i;
            i += 1;
            while i < len && !is_stripped(bytes[i]) {
                i += 1;
            }
            // Only ASCII bytes stop the run, so the slice is on a char boundary.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}
