use regex::Regex;

/// Compiled text matcher used by the `like` family of operators
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Case-insensitive substring test; the needle is stored lower-cased
    Substring(String),
    /// Anchored SQL LIKE pattern compiled to a regex
    Pattern(Regex),
}

impl TextMatcher {
    /// Case-sensitive anchored LIKE pattern
    pub fn like(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TextMatcher::Pattern(compile_like(pattern, false)?))
    }

    /// Case-insensitive match. An operand holding an unescaped `%` is an
    /// anchored LIKE pattern; any other operand matches anywhere in the text,
    /// with `_` and `\` keeping their LIKE meaning.
    pub fn ilike(operand: &str) -> Result<Self, regex::Error> {
        if !operand.contains(['%', '_', '\\']) {
            return Ok(TextMatcher::Substring(operand.to_lowercase()));
        }
        if has_unescaped_percent(operand) {
            Ok(TextMatcher::Pattern(compile_like(operand, true)?))
        } else {
            let mut wrapped = format!("%{operand}");
            if ends_with_lone_escape(operand) {
                wrapped.push('\\');
            }
            wrapped.push('%');
            Ok(TextMatcher::Pattern(compile_like(&wrapped, true)?))
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TextMatcher::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            TextMatcher::Pattern(regex) => regex.is_match(text),
        }
    }
}

fn has_unescaped_percent(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '%' => return true,
            _ => {}
        }
    }
    false
}

fn ends_with_lone_escape(pattern: &str) -> bool {
    pattern.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Translate a SQL LIKE pattern into an anchored regex.
///
/// `%` matches any run of characters, `_` exactly one, and `\` escapes the
/// next character. Everything else is literal.
pub fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&regex::escape(escaped.encode_utf8(&mut [0; 4]))),
                None => out.push_str(&regex::escape("\\")),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    out
}

fn compile_like(pattern: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    let body = like_to_regex(pattern);
    if case_insensitive {
        Regex::new(&format!("(?is){body}"))
    } else {
        Regex::new(&format!("(?s){body}"))
    }
}
