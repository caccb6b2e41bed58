//! Identifier canonicalization.
//!
//! Script names may contain module separators (`Foo::bar`), dashes, and the
//! angle brackets of synthesized lambda names. C++ identifiers may not, so
//! each name is escaped into a deterministic identifier. The escaping is
//! injective: `_` itself is escaped, so no two distinct names collide.

use std::fmt::Write;

/// Map a script name to a collision-free C++ identifier.
///
/// Every result ends in `_`, which keeps canonical names disjoint from C++
/// keywords and from the runtime's own identifiers.
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => out.push(c),
            '_' => out.push_str("__"),
            ':' => out.push_str("_c"),
            '-' => out.push_str("_d"),
            '<' => out.push_str("_l"),
            '>' => out.push_str("_g"),
            '.' => out.push_str("_p"),
            '#' => out.push_str("_h"),
            other => {
                let _ = write!(out, "_x{:x}_", u32::from(other));
            }
        }
    }
    out.push('_');
    out
}

#[cfg(test)]
mod tests {
    use super::canonicalize;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_names_gain_suffix() {
        assert_eq!(canonicalize("foo"), "foo_");
        assert_eq!(canonicalize("Foo9"), "Foo9_");
    }

    #[test]
    fn module_separators_are_escaped() {
        assert_eq!(canonicalize("Log::write"), "Log_c_cwrite_");
    }

    #[test]
    fn underscores_do_not_collide_with_escapes() {
        assert_ne!(canonicalize("a_c"), canonicalize("a:"));
        assert_ne!(canonicalize("a_"), canonicalize("a"));
        assert_eq!(canonicalize("a_b"), "a__b_");
    }

    #[test]
    fn lambda_names() {
        assert_eq!(canonicalize("<lambda>"), "_llambda_g_");
    }

    #[test]
    fn synthesized_temporaries() {
        assert_eq!(canonicalize("#tmp0"), "_htmp0_");
    }

    #[test]
    fn non_ascii_is_hex_escaped() {
        assert_eq!(canonicalize("é"), "_xe9__");
    }
}
