/// Parses headers from a raw email, returning an ordered list of headers
/// and a reference to the content after the blank-line separator.
///
/// Headers are preserved in their original order with case-preserved keys
/// and trimmed values. Folded headers (continuation lines starting with a
/// space or a tab, RFC 5322 section 2.2.3) are unfolded into the previous
/// value, joined by a single space.
///
/// # Examples
///
/// ```rust
/// let (headers, content) = maileon_utils::parse_raw_headers(
///     "From: alice@example.com\r\nX-Maileon-Variables: {\"a\": 1,\r\n \"b\": 2}\r\n\r\nHello!"
/// );
/// assert_eq!(headers.len(), 2);
/// assert_eq!(headers[0], ("From".to_string(), "alice@example.com".to_string()));
/// assert_eq!(headers[1].1, "{\"a\": 1, \"b\": 2}");
/// assert_eq!(content, "Hello!");
/// ```
pub fn parse_raw_headers(raw: &str) -> (Vec<(String, String)>, &str) {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut pos = 0;

    for line in raw.lines() {
        let end = pos + line.len();
        let consumed = if raw[end..].starts_with("\r\n") {
            end + 2
        } else if raw[end..].starts_with('\n') {
            end + 1
        } else {
            end
        };

        if line.trim().is_empty() {
            pos = consumed;
            break;
        }

        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                let folded = line.trim();
                if value.is_empty() {
                    value.push_str(folded);
                } else if !folded.is_empty() {
                    value.push(' ');
                    value.push_str(folded);
                }
                pos = consumed;
                continue;
            }
            // Continuation without a preceding header, treat as content
            break;
        }

        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        } else {
            // Line is not a header (no colon) and not blank, treat as start of content
            break;
        }

        pos = consumed;
    }

    (headers, &raw[pos..])
}
