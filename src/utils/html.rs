//! HTML / inline-script escaping for the bootstrap page

use serde::Serialize;

/// Escape text for use inside an HTML attribute or element body
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a value as JSON that is safe inside a `<script>` element
///
/// `<`, `>` and `&` only occur inside JSON strings, so replacing them with
/// unicode escapes keeps the document valid JSON while making it
/// impossible to close the surrounding element.
pub fn script_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"https://e.com/?a=1&b="x"<'y'>"#),
            "https://e.com/?a=1&amp;b=&quot;x&quot;&lt;&#x27;y&#x27;&gt;"
        );
    }

    #[test]
    fn test_script_json_cannot_break_out() {
        let value = json!({"id": 1, "target": "https://e.com/</script><script>alert(1)</script>&x"});
        let encoded = script_json(&value).unwrap();
        assert!(!encoded.contains("</script>"));
        assert!(!encoded.contains('&'));
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
