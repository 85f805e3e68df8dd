/// Whether `c` is a control character that XML 1.0 does not allow.
///
/// Tab, LF and CR are the only C0 controls XML accepts; DEL is dropped too.
pub fn is_xml_illegal(c: char) -> bool {
    matches!(
        c,
        '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'
    )
}

/// Strip characters that cannot appear in XML text content.
pub fn sanitize(text: &str) -> String {
    sanitize_with_extra(text, "")
}

/// Like [`sanitize`], also removing every character found in `extra`.
pub fn sanitize_with_extra(text: &str, extra: &str) -> String {
    text.chars()
        .filter(|&c| !is_xml_illegal(c) && !extra.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_illegal_ranges() {
        let illegal: String = (0x00u32..=0x08)
            .chain([0x0B, 0x0C])
            .chain(0x0E..=0x1F)
            .chain([0x7F])
            .filter_map(char::from_u32)
            .collect();
        let input = format!("a{illegal}b");
        assert_eq!(sanitize(&input), "ab");
    }

    #[test]
    fn test_keeps_tab_newline_carriage_return() {
        assert_eq!(sanitize("a\tb\nc\rd"), "a\tb\nc\rd");
    }

    #[test]
    fn test_keeps_non_ascii() {
        assert_eq!(sanitize("Crème brûlée — ﬁn"), "Crème brûlée — ﬁn");
    }

    #[test]
    fn test_idempotent() {
        let input = "\u{0}Ti\u{7}tle\u{1B}[0m\n\u{7F}Body\u{C}";
        let once = sanitize(input);
        assert_eq!(once, "Title[0m\nBody");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_extra_chars() {
        assert_eq!(sanitize_with_extra("a§b¶c\u{1}", "§¶"), "abc");
        let once = sanitize_with_extra("x§y", "§");
        assert_eq!(sanitize_with_extra(&once, "§"), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
