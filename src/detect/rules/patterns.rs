//! Compiled patterns shared by the text rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Text anywhere.
    pub static ref MULTIPLICATION_STAR: Regex = Regex::new(r"(?s).\*").unwrap();
    pub static ref REPEATED_SPACING: Regex =
        Regex::new(r"(~|\\:|\\ |\\,|\\!|\\>|\\space|\{ \}){2,}").unwrap();
    pub static ref STARTS_WITH_CYRILLIC: Regex = Regex::new(r"(?i)^[а-яё]").unwrap();

    // Prose.
    pub static ref RU_ABBREVIATION_WITH_SPACE: Regex = Regex::new(r"(?i)т\. ?(д\.|н\.|ч\.|к\.)").unwrap();
    pub static ref DASH_WITHOUT_SPACES: Regex = Regex::new(r"--([^- ~\n]|$)|(^|[^- ~\n])--").unwrap();
    pub static ref DASH_AS_HYPHEN: Regex = Regex::new(r"(^|\s)-\s+|\s+-(\s|$)").unwrap();
    pub static ref SPACE_BEFORE_PUNCTUATION: Regex = Regex::new(r"\s+[?!.,;:]").unwrap();
    pub static ref SPACE_AFTER_PUNCTUATION: Regex = Regex::new(r"[?!.,;:][^ ~\t\n\\]").unwrap();
    pub static ref SPACE_BEFORE_PARENTHESIS: Regex = Regex::new(r"[^()\[\]{}\n\t-/+]\(").unwrap();
    pub static ref SPACE_AFTER_PARENTHESIS: Regex = Regex::new(r"\(\s").unwrap();
    pub static ref LATIN_C_IN_CYRILLIC: Regex = Regex::new(r"(?i)[а-яё]\s*c|c\s*[а-яё]").unwrap();
    pub static ref MATH_OUTSIDE_MATH: Regex =
        Regex::new(r"(\\(infty|cdot|sum))|([0-9 \n]+ *[=+*^])|([+*^] *[0-9 \n]+)").unwrap();
    pub static ref LATIN_LETTER_RU: Regex = Regex::new(r" (^|[, .~])[a-zA-Z]($|[,.:!? ~-]) ").unwrap();
    pub static ref LATIN_LETTER_EN: Regex = Regex::new(r" (^|[, .~])[b-zA-HJ-Z]($|[,.:!? ~-]) ").unwrap();
    pub static ref CAPITAL_AFTER_COMMA: Regex = Regex::new(r"[,;:]\s*[А-ЯЁA-Z]").unwrap();
    pub static ref LOWERCASE_AFTER_PERIOD: Regex = Regex::new(r"\.\s*[а-яёa-z]").unwrap();
    pub static ref STARTS_LOWERCASE: Regex = Regex::new(r"^\s*[а-яёa-z]").unwrap();
    pub static ref STARTS_UPPERCASE: Regex = Regex::new(r"^\s*[А-ЯЁA-Z]").unwrap();
    pub static ref SYMBOLIC_REFERENCE: Regex = Regex::new(
        r"(?i)(рис(унок|унка|унке|\.)|формул(а|е|ой|у|ы)|(равенств|тождеств)(о|а|е|у|ами|ах)|(соотношени|выражени)(е|ю|и|я|ями|ях|ям))\s+\(?\d+\)?"
    )
    .unwrap();
    pub static ref RU_ORDINAL: Regex = Regex::new(
        r"(?is)\s*-{1,2}\s*(ый|ого|о|тому|ому|ему|ом|ая|ой|ую|ые|ыми|и|ым|тым|той|им|его|того|тых|ых|том|ем|ём|ех|ёх|ух)([^а-яё]|$)"
    )
    .unwrap();
    pub static ref SMALL_NUMERAL: Regex = Regex::new(r"([,.!?:]|\W\s+)[0-5]([,.!?:]|\s+\W)").unwrap();
    pub static ref EN_ORDINAL: Regex = Regex::new(r"\b([0-9]+)(st|nd|rd|th)\b").unwrap();
    pub static ref SENTENCE_STARTS_WITH_DIGIT: Regex = Regex::new(r"[.!?]\s+\d").unwrap();
    pub static ref MANUAL_LIST_ITEM: Regex = Regex::new(r"(?m)^\s*[1-9][.)]\s+\S").unwrap();
    pub static ref ENDS_WITH_BLANK_LINE: Regex = Regex::new(r"\n[ \t]*\n\s*$").unwrap();
    pub static ref ENDS_WITH_SENTENCE_BREAK: Regex = Regex::new(r"(^|[.!?])\s*$").unwrap();

    // Math.
    pub static ref MOD_WORD: Regex = Regex::new(r"\bmod\b").unwrap();
    pub static ref POSSIBLY_WORD: Regex =
        Regex::new(r"(?i)([^a-z\\]|^)([a-z]{4,}|bad|[a-z]{2,3}\.)").unwrap();
    pub static ref FUNCTION_WITHOUT_BACKSLASH: Regex = Regex::new(
        r"([^\\a-z]|^)(cos|csc|exp|ker|limsup|max|min|sinh|arcsin|cosh|deg|gcd|lg|ln|Pr|sup|arctan|cot|det|hom|lim|log|sec|tan|arg|coth|dim|liminf|sin|tanh)([^a-z]|$)"
    )
    .unwrap();
    pub static ref CYRILLIC_LOOKALIKE: Regex = Regex::new(r"[уехаос]").unwrap();
    pub static ref ENDS_WITH_OPERAND: Regex = Regex::new(r"(?i)[0-9a-z]\s*$").unwrap();
    pub static ref BRACKET_FLOOR: Regex = Regex::new(r"\[\s*[a-zA-Z]\s*\]").unwrap();
    pub static ref ORDINAL_SUPERSCRIPT: Regex = Regex::new(r"\^\s*(st|nd|rd|th)\b").unwrap();
    pub static ref ORDINAL_SUFFIX: Regex = Regex::new(r"^\s*(st|nd|rd|th)\s*$").unwrap();
    pub static ref FORMULA_GLUE: Regex = Regex::new(r"^\s*[=<>+]?\s*$").unwrap();
    pub static ref STARTS_WITH_RELATION: Regex = Regex::new(r"^\s*[=<>]").unwrap();
    pub static ref TRIVIAL_LABEL: Regex =
        Regex::new(r"(?i)^\s*(eq|equation|eqn|th|thm|lemma|theorem|lem|fig|figure)?:?[^a-z}]").unwrap();
}
