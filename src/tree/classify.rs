//! Fixed name sets that drive classification and context.

use phf::phf_set;

/// Environments typeset as displayed formulas.
static DISPLAY_MATH_ENVIRONMENTS: phf::Set<&'static str> = phf_set! {
    "$$", "displaymath",
    "align", "align*",
    "alignat", "alignat*",
    "eqnarray", "eqnarray*",
    "equation", "equation*",
    "flalign", "flalign*",
    "gather", "gather*",
    "multline", "multline*",
};

/// Display environments that receive an equation number.
static NUMBERED_MATH_ENVIRONMENTS: phf::Set<&'static str> = phf_set! {
    "align", "alignat", "eqnarray", "equation", "flalign", "gather", "multline",
};

/// Commands whose arguments are identifiers, not prose. Their body is never built.
static NO_TEXT_COMMANDS: phf::Set<&'static str> = phf_set! {
    "label", "ref", "eqref", "tag", "pageref", "autoref", "cref", "Cref",
};

/// Commands that switch back to text mode for their arguments.
static TEXT_MODE_COMMANDS: phf::Set<&'static str> = phf_set! {
    "mbox", "hbox", "text", "textnormal", "textrm", "textit", "textsf", "texttt",
};

/// Commands whose argument is a label reference.
static REFERENCE_COMMANDS: phf::Set<&'static str> = phf_set! {
    "ref", "eqref", "pageref", "autoref", "cref", "Cref",
};

/// Name of the synthetic root environment.
pub const DOCUMENT: &str = "document";

/// Canonical name for inline math, whichever delimiter produced it.
pub const INLINE_MATH: &str = "math";

/// Maps parser environment names onto tree names.
pub fn normalize_environment(name: &str) -> &str {
    match name {
        "$" | "math" => INLINE_MATH,
        other => other,
    }
}

pub fn is_display_math(name: &str) -> bool {
    DISPLAY_MATH_ENVIRONMENTS.contains(name)
}

pub fn is_math(name: &str) -> bool {
    name == INLINE_MATH || is_display_math(name)
}

pub fn is_numbered_math(name: &str) -> bool {
    NUMBERED_MATH_ENVIRONMENTS.contains(name)
}

pub fn is_no_text_command(name: &str) -> bool {
    NO_TEXT_COMMANDS.contains(name)
}

pub fn is_text_mode_command(name: &str) -> bool {
    TEXT_MODE_COMMANDS.contains(name)
}

pub fn is_reference_command(name: &str) -> bool {
    REFERENCE_COMMANDS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_implies_display() {
        for name in NUMBERED_MATH_ENVIRONMENTS.iter() {
            assert!(is_display_math(name), "{} should be display math", name);
        }
    }

    #[test]
    fn test_starred_is_unnumbered() {
        assert!(is_display_math("equation*"));
        assert!(!is_numbered_math("equation*"));
        assert!(!is_numbered_math("$$"));
    }

    #[test]
    fn test_inline_normalization() {
        assert_eq!(normalize_environment("$"), "math");
        assert_eq!(normalize_environment("math"), "math");
        assert_eq!(normalize_environment("$$"), "$$");
        assert!(is_math("math"));
        assert!(!is_math("itemize"));
    }

    #[test]
    fn test_references_carry_no_text() {
        for name in REFERENCE_COMMANDS.iter() {
            assert!(is_no_text_command(name));
        }
        assert!(!is_reference_command("label"));
    }
}
