//! Stable rule identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! rule_codes {
    ($($variant:ident => $name:literal,)*) => {
        /// Identifier of one diagnostic condition.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum RuleCode {
            $($variant,)*
        }

        impl RuleCode {
            /// Every known code, in catalog order.
            pub const ALL: &'static [RuleCode] = &[$(RuleCode::$variant,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(RuleCode::$variant => $name,)*
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($name => Some(RuleCode::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

rule_codes! {
    ParseError => "PARSE_ERROR",
    DoubleDollars => "DOUBLE_DOLLARS",
    ConsecutiveDisplayFormulae => "CONSECUTIVE_DISPLAY_FORMULAE",
    LinebreakAfterDisplayFormulae => "LINEBREAK_AFTER_DISPLAY_FORMULAE",
    LinebreakBeforeDisplayFormulae => "LINEBREAK_BEFORE_DISPLAY_FORMULAE",
    EqnarrayUsed => "EQNARRAY_USED",
    AbbreviationsWithSpace => "ABBREVIATIONS_WITH_SPACE",
    DashHyphen => "DASH_HYPHEN",
    DashInMathMode => "DASH_IN_MATH_MODE",
    DashSurroundWithSpaces => "DASH_SURROUND_WITH_SPACES",
    RuOrdinalAbbreviation => "RU_ORDINAL_ABBREVIATION",
    ParagraphBreakBeforeDisplayFormula => "PARAGRAPH_BREAK_BEFORE_DISPLAY_FORMULA",
    UnnecessaryFormulaBreak => "UNNECESSARY_FORMULA_BREAK",
    Centering => "CENTERING",
    LowLevelFontCommands => "LOW_LEVEL_FONT_COMMANDS",
    WrongQuotes => "WRONG_QUOTES",
    WrongSameQuotes => "WRONG_SAME_QUOTES",
    QuotesInMath => "QUOTES_IN_MATH",
    LatinLetterOutsideMathRu => "LATIN_LETTER_OUTSIDE_MATH_RU",
    LatinLetterOutsideMathEn => "LATIN_LETTER_OUTSIDE_MATH_EN",
    MathSemanticsOutsideMath => "MATH_SEMANTICS_OUTSIDE_MATH",
    LatinLetterCMisused => "LATIN_LETTER_C_MISUSED",
    CyrillicLetterCMisused => "CYRILLIC_LETTER_C_MISUSED",
    MultiplicationSign => "MULTIPLICATION_SIGN",
    SpaceBeforePunctuationMark => "SPACE_BEFORE_PUNCTUATION_MARK",
    SpaceBeforeParenthesis => "SPACE_BEFORE_PARENTHESIS",
    SpaceAfterPunctuationMark => "SPACE_AFTER_PUNCTUATION_MARK",
    SpaceAfterParenthesis => "SPACE_AFTER_PARENTHESIS",
    CapitalizationAfterPunctuationMark => "CAPITALIZATION_AFTER_PUNCTUATION_MARK",
    CapitalizationAfterPeriod => "CAPITALIZATION_AFTER_PERIOD",
    PeriodBeforeNextSentence => "PERIOD_BEFORE_NEXT_SENTENCE",
    LeftRightRecommended => "LEFT_RIGHT_RECOMMENDED",
    SymbolicLinks => "SYMBOLIC_LINKS",
    EqrefInsteadOfRef => "EQREF_INSTEAD_OF_REF",
    NonbreakableSpaceBeforeRef => "NONBREAKABLE_SPACE_BEFORE_REF",
    EllipsisLdots => "ELLIPSIS_LDOTS",
    TrivialLabel => "TRIVIAL_LABEL",
    ReplaceMboxWithText => "REPLACE_MBOX_WITH_TEXT",
    TextInMathMode => "TEXT_IN_MATH_MODE",
    IncorporateNot => "INCORPORATE_NOT",
    OverVsFrac => "OVER_VS_FRAC",
    ChooseVsBinom => "CHOOSE_VS_BINOM",
    SetsInBbfont => "SETS_IN_BBFONT",
    ModNotACommand => "MOD_NOT_A_COMMAND",
    TildeIneffectiveAsNbsp => "TILDE_INEFFECTIVE_AS_NBSP",
    IndentationWithSpaces => "INDENTATION_WITH_SPACES",
    LeAsSingleCommand => "LE_AS_SINGLE_COMMAND",
    PunctuationAfterDisplayMath => "PUNCTUATION_AFTER_DISPLAY_MATH",
    BackslashNeeded => "BACKSLASH_NEEDED",
    CdotForReadability => "CDOT_FOR_READABILITY",
    GraphicsInMathMode => "GRAPHICS_IN_MATH_MODE",
    UnnecessaryMathMode => "UNNECESSARY_MATH_MODE",
    NoSpaceAfterCommandBeforeCyrillic => "NO_SPACE_AFTER_COMMAND_BEFORE_CYRILLIC",
    TextCommandsInMathMode => "TEXT_COMMANDS_IN_MATH_MODE",
    LimitsUnnecessaryInDisplayMode => "LIMITS_UNNECESSARY_IN_DISPLAY_MODE",
    FormulaNeighbouringReference => "FORMULA_NEIGHBOURING_REFERENCE",
    UnicodeSqrt => "UNICODE_SQRT",
    NumberedMathNeedsReferencing => "NUMBERED_MATH_NEEDS_REFERENCING",
    UnreferencedLabel => "UNREFERENCED_LABEL",
    NoConclusion => "NO_CONCLUSION",
    SuggestedNewParagraph => "SUGGESTED_NEW_PARAGRAPH",
    NumeralsAsWords => "NUMERALS_AS_WORDS",
    MidInSetComprehension => "MID_IN_SET_COMPREHENSION",
    FloorFunctionNotation => "FLOOR_FUNCTION_NOTATION",
    ItalicInsteadOfEmph => "ITALIC_INSTEAD_OF_EMPH",
    ParagraphStartsWithFormula => "PARAGRAPH_STARTS_WITH_FORMULA",
    SentenceStartsWithFormula => "SENTENCE_STARTS_WITH_FORMULA",
    SentenceStartsWithNumber => "SENTENCE_STARTS_WITH_NUMBER",
    BetterToUseWordsThenMath => "BETTER_TO_USE_WORDS_THEN_MATH",
    MathEnvironmentVerbosityWarning => "MATH_ENVIRONMENT_VERBOSITY_WARNING",
    UseDividesInsteadOfVdots => "USE_DIVIDES_INSTEAD_OF_VDOTS",
    EnOrdinalAbbreviation => "EN_ORDINAL_ABBREVIATION",
    EnOrdinalAbbreviationInMath => "EN_ORDINAL_ABBREVIATION_IN_MATH",
    InvisibleBraces => "INVISIBLE_BRACES",
    ManualLists => "MANUAL_LISTS",
    MismatchedMathDelimiters => "MISMATCHED_MATH_DELIMITERS",
    RussianTypographyPeculiarities => "RUSSIAN_TYPOGRAPHY_PECULIARITIES",
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleCode::parse(s.trim()).ok_or_else(|| format!("unknown rule code: {}", s))
    }
}

impl Serialize for RuleCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
