/// Filename hint from a `Content-Disposition` header value.
///
/// Handles quoted and unquoted `filename=` parameters.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let pos = header.find("filename=")?;
    let value = header[pos + "filename=".len()..].trim();

    let name = match value.strip_prefix('"') {
        Some(quoted) => &quoted[..quoted.find('"')?],
        None => value[..value.find(';').unwrap_or(value.len())].trim(),
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// Makes a server- or target-derived filename safe to create in one directory.
///
/// Path separators and reserved characters become `_`, runs of `_` collapse,
/// and reserved Windows device names get a trailing `_`.
pub fn sanitize_filename(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(&['_', ' ', '.'][..]);
    if trimmed.is_empty() {
        return "export.csv".to_string();
    }

    let mut compacted = String::with_capacity(trimmed.len());
    let mut prev_underscore = false;
    for c in trimmed.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let stem = compacted.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        let stem_len = stem.len();
        compacted.insert(stem_len, '_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
