//! OPC part name and relationship target checks

use crate::diagnostics::Code;
use urlencoding::decode;

/// Characters allowed verbatim in a URI path, besides ASCII alphanumerics
const URI_PATH_CHARS: &str = "-._~!$&'()*+,;=:@/";

/// Whether `name` is a well-formed URI reference
///
/// ASCII reserved and unreserved characters are allowed, `%` must introduce a
/// two digit hex escape that decodes to UTF-8, and a single `?` query and
/// `#` fragment are tolerated. Non-ASCII letters and digits are accepted for
/// compatibility with packages that store UTF-8 part names unescaped.
/// Whitespace, control characters and delimiters such as `<`, `>`, `"`,
/// `\`, `[`, `]`, `{`, `}`, `|` and `^` make the name malformed.
pub fn is_well_formed_uri(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let (path, rest) = match name.find(['?', '#']) {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    };

    // A scheme-like prefix ("c:foo") in the first segment is not a path
    let first_segment = path.split('/').next().unwrap_or("");
    if first_segment.contains(':') {
        return false;
    }

    if !valid_chars(path, "") {
        return false;
    }

    if !rest.is_empty() {
        let mut tail = rest;
        if let Some(query) = tail.strip_prefix('?') {
            let end = query.find('#').unwrap_or(query.len());
            if !valid_chars(&query[..end], "?") {
                return false;
            }
            tail = &query[end..];
        }
        if let Some(fragment) = tail.strip_prefix('#')
            && !valid_chars(fragment, "?")
        {
            return false;
        }
    }

    decode(name).is_ok()
}

fn valid_chars(s: &str, extra: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    for (idx, c) in s.char_indices() {
        if idx < i {
            continue;
        }
        if c == '%' {
            let hex = bytes.get(idx + 1..idx + 3);
            match hex {
                Some(h) if h.iter().all(u8::is_ascii_hexdigit) => {
                    i = idx + 3;
                    continue;
                }
                _ => return false,
            }
        }
        let ok = c.is_ascii_alphanumeric()
            || URI_PATH_CHARS.contains(c)
            || extra.contains(c)
            || (!c.is_ascii() && c.is_alphanumeric());
        if !ok {
            return false;
        }
    }
    true
}

/// Path segments of an archive entry name that are hidden files
///
/// Segments starting with `.` are not allowed in part names, except for
/// relationship parts such as `_rels/.rels`.
pub fn hidden_segments(name: &str) -> Vec<&str> {
    name.split('/')
        .filter(|segment| segment.starts_with('.') && !segment.ends_with(".rels"))
        .collect()
}

/// Rule violations of a relationship target that has parsed as a URI
///
/// The target must be absolute, must not end in `/`, contain `//`, or climb
/// with `/../`. A target may violate several rules at once.
pub fn target_violations(target: &str) -> Vec<Code> {
    let mut violations = Vec::new();

    if !target.starts_with('/') {
        violations.push(Code::ErrUriRelativePath);
    }

    let path = normalize_path(target);
    if path.ends_with('/') || path.contains("//") {
        violations.push(Code::ErrUriEmptySegment);
    }
    if (path.contains("/../") || path.starts_with("../"))
        && !violations.contains(&Code::ErrUriRelativePath)
    {
        violations.push(Code::ErrUriRelativePath);
    }

    violations
}

/// Normalize OPC path by removing leading slash
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Percent-decoded form of a part name, if it decodes to UTF-8
pub fn decode_part_name(name: &str) -> Option<String> {
    decode(name).ok().map(|decoded| decoded.into_owned())
}

/// Lookup key of a part's extension in the content-type table
///
/// Extensions compare case-insensitively and never include the dot.
pub fn extension_key(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_uris() {
        assert!(is_well_formed_uri("3D/3dmodel.model"));
        assert!(is_well_formed_uri("/3D/3dmodel.model"));
        assert!(is_well_formed_uri("_rels/.rels"));
        assert!(is_well_formed_uri("/2D/test%C3%86file.png"));
        assert!(is_well_formed_uri("/2D/testÆfile.png"));
        assert!(is_well_formed_uri("Metadata/thumbnail.png?x=1#y"));
    }

    #[test]
    fn test_malformed_uris() {
        assert!(!is_well_formed_uri(""));
        assert!(!is_well_formed_uri("3D/3d model.model"));
        assert!(!is_well_formed_uri("3D/<model>.model"));
        assert!(!is_well_formed_uri("3D\\3dmodel.model"));
        assert!(!is_well_formed_uri("3D/bad%zzescape"));
        assert!(!is_well_formed_uri("3D/bad%C3"));
        assert!(!is_well_formed_uri("c:/3D/3dmodel.model"));
        assert!(!is_well_formed_uri("3D/tab\there"));
    }

    #[test]
    fn test_hidden_segments() {
        assert!(hidden_segments("_rels/.rels").is_empty());
        assert!(hidden_segments("3D/_rels/3dmodel.model.rels").is_empty());
        assert_eq!(hidden_segments("3D/.hidden/file.model"), vec![".hidden"]);
        assert_eq!(hidden_segments(".DS_Store"), vec![".DS_Store"]);
    }

    #[test]
    fn test_target_violations() {
        assert!(target_violations("/3D/3dmodel.model").is_empty());
        assert_eq!(
            target_violations("3D/3dmodel.model"),
            vec![Code::ErrUriRelativePath]
        );
        assert_eq!(target_violations("/3D/"), vec![Code::ErrUriEmptySegment]);
        assert_eq!(
            target_violations("/3D//3dmodel.model"),
            vec![Code::ErrUriEmptySegment]
        );
        assert_eq!(
            target_violations("/3D/../3dmodel.model"),
            vec![Code::ErrUriRelativePath]
        );
    }

    #[test]
    fn test_extension_key() {
        assert_eq!(extension_key("/Metadata/thumbnail.PNG").as_deref(), Some("png"));
        assert_eq!(extension_key("/3D/3dmodel.model").as_deref(), Some("model"));
        assert_eq!(extension_key("/_rels/.rels").as_deref(), Some("rels"));
        assert_eq!(extension_key("/Metadata/README"), None);
        assert_eq!(extension_key("/dir.d/file"), None);
    }

    #[test]
    fn test_decode_part_name() {
        assert_eq!(
            decode_part_name("2D/test%C3%86file.model").as_deref(),
            Some("2D/testÆfile.model")
        );
    }
}
