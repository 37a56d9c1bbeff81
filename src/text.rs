use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Collapses runs of whitespace (including newlines) into single spaces
pub fn clean_inline_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes residual markup tags from extracted text
pub fn strip_tags(value: &str) -> String {
    TAG_RE.replace_all(value, "").into_owned()
}

/// Decodes the HTML character entities that show up in diary exports.
/// Unknown entities are left untouched.
pub fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            // Entities are short; a long run without ';' is just a bare ampersand
            Some(end) if end <= 10 => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push_str(&decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    let named = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    };
    if let Some(c) = named {
        return Some(c.to_string());
    }
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(|c| c.to_string())
}

/// Full normalization used on every extracted cell or line: tag stripping,
/// entity decoding, then whitespace collapse
pub fn normalize(value: &str) -> String {
    clean_inline_whitespace(&decode_entities(&strip_tags(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(clean_inline_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(clean_inline_whitespace(""), "");
    }

    #[test]
    fn strips_markup_tags() {
        assert_eq!(strip_tags("<td class=\"x\">Santa Fe</td>"), "Santa Fe");
        assert_eq!(strip_tags("no tags"), "no tags");
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("Generations B &amp; C"), "Generations B & C");
        assert_eq!(decode_entities("&lt;9:00&gt;"), "<9:00>");
        assert_eq!(decode_entities("&#39;til&#x20;late"), "'til late");
        assert_eq!(decode_entities("a&nbsp;b"), "a b");
    }

    #[test]
    fn leaves_unknown_entities_and_bare_ampersands() {
        assert_eq!(decode_entities("&bogus; B & C"), "&bogus; B & C");
    }

    #[test]
    fn normalize_combines_all_steps() {
        assert_eq!(
            normalize("<td> Generations&nbsp;B &amp; C </td>"),
            "Generations B & C"
        );
    }
}
