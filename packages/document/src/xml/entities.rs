use std::borrow::Cow;

/// Decode the five predefined entities and numeric character references.
/// Unknown or malformed references are left as written.
pub fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

pub fn escape_text(value: &str) -> Cow<'_, str> {
    escape(value, false)
}

pub fn escape_attr(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(value: &str, attr: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (attr && matches!(c, '"' | '\n' | '\t'));
    if !value.chars().any(needs) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\n' if attr => out.push_str("&#10;"),
            '\t' if attr => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_predefined() {
        assert_eq!(decode("a &lt;b&gt; &amp; &quot;c&quot; &apos;"), "a <b> & \"c\" '");
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode("&#65;&#x42;&#x1F600;"), "AB😀");
    }

    #[test]
    fn test_decode_leaves_unknown() {
        assert_eq!(decode("fish & chips &nbsp; &"), "fish & chips &nbsp; &");
    }

    #[test]
    fn test_escape_round_trip() {
        let raw = "if a < b && c > \"d\"\nthen";
        assert_eq!(decode(&escape_attr(raw)), raw);
        assert_eq!(decode(&escape_text(raw)), raw);
        assert_eq!(escape_text("plain"), Cow::Borrowed("plain"));
    }
}
