//! Target-language identifier rules.
//!
//! The compiler emits one target representation per run; the target's
//! identifier alphabet, reserved-word set and escaping convention are the
//! only language facts the core needs, so they are bundled here instead of
//! being spread across the resolver.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static RUST_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true", "type",
        "unsafe", "use", "where", "while",
    ]
    .into_iter()
    .collect()
});

static RUST_PROFILE: Lazy<TargetProfile> = Lazy::new(|| TargetProfile {
    name: "rust",
    reserved: &RUST_KEYWORDS,
    escape_prefix: "r#",
});

/// Identifier rules for one target language.
#[derive(Debug)]
pub struct TargetProfile {
    pub name: &'static str,
    reserved: &'static Lazy<HashSet<&'static str>>,
    /// Raw-identifier marker prepended to reserved words (`r#` for Rust).
    escape_prefix: &'static str,
}

impl TargetProfile {
    /// The default Rust target.
    pub fn rust() -> &'static TargetProfile {
        &RUST_PROFILE
    }

    pub fn is_reserved(&self, ident: &str) -> bool {
        self.reserved.contains(ident)
    }

    /// Escape a reserved word with the target's raw-identifier convention.
    pub fn escape_reserved(&self, ident: &str) -> String {
        format!("{}{}", self.escape_prefix, ident)
    }

    /// Sanitize a source name into a valid binding identifier: illegal
    /// characters become underscores, runs collapse, and a leading digit
    /// gets a `p_` prefix. Casing is preserved so the sanitized name still
    /// matches the template placeholder it came from.
    pub fn sanitize(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        for ch in source.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
            } else if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        let out = out.trim_matches('_').to_string();
        if out.is_empty() {
            return "param".to_string();
        }
        if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return format!("p_{}", out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_illegal_characters() {
        let target = TargetProfile::rust();
        assert_eq!(target.sanitize("pet-id"), "pet_id");
        assert_eq!(target.sanitize("X-API-Key"), "X_API_Key");
        assert_eq!(target.sanitize("filter[tag]"), "filter_tag");
        assert_eq!(target.sanitize("1st"), "p_1st");
        assert_eq!(target.sanitize("***"), "param");
    }

    #[test]
    fn test_reserved_word_escaping() {
        let target = TargetProfile::rust();
        assert!(target.is_reserved("type"));
        assert_eq!(target.escape_reserved("type"), "r#type");
        assert!(!target.is_reserved("version"));
    }
}
