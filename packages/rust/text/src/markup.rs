//! Low-level helpers for wiki markup shared by the normalizer and the infobox parser.

/// Split `s` on every `sep` byte that is not nested inside `{{…}}` or `[[…]]`.
///
/// `sep` must be ASCII. Unbalanced openers simply keep the remainder in one part.
pub fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    debug_assert!(sep.is_ascii());

    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut braces = 0usize;
    let mut brackets = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes.get(i..i + 2) {
            Some(b"{{") => {
                braces += 1;
                i += 2;
                continue;
            }
            Some(b"}}") if braces > 0 => {
                braces -= 1;
                i += 2;
                continue;
            }
            Some(b"[[") => {
                brackets += 1;
                i += 2;
                continue;
            }
            Some(b"]]") if brackets > 0 => {
                brackets -= 1;
                i += 2;
                continue;
            }
            _ => {}
        }

        if bytes[i] == sep && braces == 0 && brackets == 0 {
            // ASCII byte, so `i` is a char boundary.
            parts.push(&s[start..i]);
            start = i + 1;
        }
        i += 1;
    }

    parts.push(&s[start..]);
    parts
}

/// Split a template argument into `(name, value)` if it is a named (`key = value`) argument.
pub fn named_arg(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.split_once('=')?;
    let key = key.trim();
    let is_identifier = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ' '));
    is_identifier.then(|| (key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ignores_nested_pipes() {
        let parts = split_top_level("hlist|[[Physicist|physics]]|{{lang|de|Ulm}}|x", b'|');
        assert_eq!(parts, vec!["hlist", "[[Physicist|physics]]", "{{lang|de|Ulm}}", "x"]);
    }

    #[test]
    fn split_without_separator() {
        assert_eq!(split_top_level("plain", b'|'), vec!["plain"]);
        assert_eq!(split_top_level("", b'|'), vec![""]);
    }

    #[test]
    fn split_unbalanced_keeps_remainder() {
        let parts = split_top_level("a|{{b|c", b'|');
        assert_eq!(parts, vec!["a", "{{b|c"]);
    }

    #[test]
    fn split_handles_multibyte_text() {
        let parts = split_top_level("Zürich|Genève", b'|');
        assert_eq!(parts, vec!["Zürich", "Genève"]);
    }

    #[test]
    fn named_arg_detection() {
        assert_eq!(named_arg(" df = yes "), Some(("df", "yes")));
        assert_eq!(named_arg("1879"), None);
        assert_eq!(named_arg("a [[link|x=y]]"), None);
    }
}
