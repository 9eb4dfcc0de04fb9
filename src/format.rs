//! Line-level text cleanup for payloads and replies.

/// Removes whitespace-only lines and keeps every other line verbatim.
///
/// Used on capability records, unfiltered replies and filter output alike.
///
/// # Example
///
/// ```
/// use netconf_client::format::tidy;
///
/// assert_eq!(tidy("<a>\n   \n<b/>\n</a>\n"), "<a>\n<b/>\n</a>");
/// ```
#[must_use]
pub fn tidy(text: &str) -> String {
    join_lines(text.lines().filter(|line| !line.trim().is_empty()))
}

/// Removes empty lines from a request payload.
///
/// Lines holding only whitespace are kept; the device sees them as text.
#[must_use]
pub fn strip_empty_lines(text: &str) -> String {
    join_lines(text.split('\n').filter(|line| !line.is_empty()))
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tidy_drops_whitespace_lines() {
        let text = "<rpc-reply>\n\n  \t\n  <ok/>\n</rpc-reply>\n";
        assert_eq!(tidy(text), "<rpc-reply>\n  <ok/>\n</rpc-reply>");
    }

    #[test]
    fn test_tidy_handles_crlf() {
        assert_eq!(tidy("<a>\r\n\r\n<b/>\r\n</a>"), "<a>\n<b/>\n</a>");
    }

    #[test]
    fn test_tidy_empty() {
        assert_eq!(tidy(""), "");
        assert_eq!(tidy("\n \n"), "");
    }

    #[test]
    fn test_strip_empty_lines() {
        let payload = "<rpc>\n\n<get/>\n\n</rpc>\n";
        assert_eq!(strip_empty_lines(payload), "<rpc>\n<get/>\n</rpc>");
    }

    #[test]
    fn test_strip_empty_lines_keeps_indented_blank() {
        assert_eq!(strip_empty_lines("<a>\n  \n</a>"), "<a>\n  \n</a>");
    }
}
