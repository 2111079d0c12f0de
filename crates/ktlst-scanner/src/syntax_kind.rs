//! Token kinds.
//!
//! Token kinds live in a `u16`-represented enum so node headers can store them
//! inline. Node kinds (`syntax_kind_ext`) live in the parser crate and start
//! after the last token kind.

use serde::Serialize;

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    Unknown = 0,
    EndOfFileToken,

    // Literals
    NumericLiteral,
    StringLiteral,
    CharacterLiteral,

    // Names
    Identifier,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotToken,
    DotDotLessThanToken,
    QuestionDotToken,
    CommaToken,
    SemicolonToken,
    ColonToken,
    ColonColonToken,
    QuestionToken,
    QuestionColonToken,
    AtToken,
    MinusGreaterThanToken,
    ExclamationToken,
    ExclamationExclamationToken,
    EqualsToken,
    EqualsEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsToken,
    ExclamationEqualsEqualsToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    AmpersandAmpersandToken,
    BarBarToken,

    // Hard keywords
    AsKeyword,
    AsSafeKeyword,
    BreakKeyword,
    ClassKeyword,
    ContinueKeyword,
    DoKeyword,
    ElseKeyword,
    FalseKeyword,
    ForKeyword,
    FunKeyword,
    IfKeyword,
    InKeyword,
    NotInKeyword,
    InterfaceKeyword,
    IsKeyword,
    NotIsKeyword,
    NullKeyword,
    ObjectKeyword,
    PackageKeyword,
    ReturnKeyword,
    SuperKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypealiasKeyword,
    ValKeyword,
    VarKeyword,
    WhenKeyword,
    WhileKeyword,

    // Soft keywords and modifiers (valid identifiers outside their position)
    ImportKeyword,
    CompanionKeyword,
    OpenKeyword,
    AbstractKeyword,
    DataKeyword,
    PrivateKeyword,
    PublicKeyword,
    InternalKeyword,
    ProtectedKeyword,
    OverrideKeyword,
    FinalKeyword,
    SealedKeyword,
    InnerKeyword,
    EnumKeyword,
    ConstKeyword,
    LateinitKeyword,
    ConstructorKeyword,
    InitKeyword,
    ByKeyword,
    GetKeyword,
    SetKeyword,
    WhereKeyword,
}

impl SyntaxKind {
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::AsKeyword;
    pub const LAST_HARD_KEYWORD: SyntaxKind = SyntaxKind::WhileKeyword;
    pub const FIRST_SOFT_KEYWORD: SyntaxKind = SyntaxKind::ImportKeyword;
    pub const LAST_TOKEN: SyntaxKind = SyntaxKind::WhereKeyword;

    #[inline]
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::FIRST_KEYWORD as u16)
    }

    /// Soft keywords are only keywords in specific positions; everywhere else
    /// they are plain identifiers.
    #[inline]
    pub fn is_soft_keyword(self) -> bool {
        (self as u16) >= (Self::FIRST_SOFT_KEYWORD as u16)
    }

    #[inline]
    pub fn is_hard_keyword(self) -> bool {
        self.is_keyword() && !self.is_soft_keyword()
    }

    /// Declaration modifiers accepted in front of classes, functions and properties.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::OpenKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::DataKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::PublicKeyword
                | SyntaxKind::InternalKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::OverrideKeyword
                | SyntaxKind::FinalKeyword
                | SyntaxKind::SealedKeyword
                | SyntaxKind::InnerKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::LateinitKeyword
                | SyntaxKind::CompanionKeyword
        )
    }

    /// Assignment operators (`=`, `+=`, ...).
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsToken
                | SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
                | SyntaxKind::PercentEqualsToken
        )
    }

    /// Convert a raw `u16` back into a token kind.
    pub fn from_u16(value: u16) -> Option<SyntaxKind> {
        if value > SyntaxKind::LAST_TOKEN as u16 {
            return None;
        }
        TOKEN_KINDS.get(value as usize).copied()
    }

    /// Fixed source text of punctuation and keyword tokens.
    pub fn text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        Some(match self {
            OpenBraceToken => "{",
            CloseBraceToken => "}",
            OpenParenToken => "(",
            CloseParenToken => ")",
            OpenBracketToken => "[",
            CloseBracketToken => "]",
            DotToken => ".",
            DotDotToken => "..",
            DotDotLessThanToken => "..<",
            QuestionDotToken => "?.",
            CommaToken => ",",
            SemicolonToken => ";",
            ColonToken => ":",
            ColonColonToken => "::",
            QuestionToken => "?",
            QuestionColonToken => "?:",
            AtToken => "@",
            MinusGreaterThanToken => "->",
            ExclamationToken => "!",
            ExclamationExclamationToken => "!!",
            EqualsToken => "=",
            EqualsEqualsToken => "==",
            EqualsEqualsEqualsToken => "===",
            ExclamationEqualsToken => "!=",
            ExclamationEqualsEqualsToken => "!==",
            LessThanToken => "<",
            GreaterThanToken => ">",
            LessThanEqualsToken => "<=",
            GreaterThanEqualsToken => ">=",
            PlusToken => "+",
            MinusToken => "-",
            AsteriskToken => "*",
            SlashToken => "/",
            PercentToken => "%",
            PlusPlusToken => "++",
            MinusMinusToken => "--",
            PlusEqualsToken => "+=",
            MinusEqualsToken => "-=",
            AsteriskEqualsToken => "*=",
            SlashEqualsToken => "/=",
            PercentEqualsToken => "%=",
            AmpersandAmpersandToken => "&&",
            BarBarToken => "||",
            AsSafeKeyword => "as?",
            NotInKeyword => "!in",
            NotIsKeyword => "!is",
            _ => return KEYWORDS.iter().find(|(_, k)| *k == self).map(|(t, _)| *t),
        })
    }
}

const TOKEN_KINDS: &[SyntaxKind] = {
    use SyntaxKind::*;
    &[
        Unknown,
        EndOfFileToken,
        NumericLiteral,
        StringLiteral,
        CharacterLiteral,
        Identifier,
        OpenBraceToken,
        CloseBraceToken,
        OpenParenToken,
        CloseParenToken,
        OpenBracketToken,
        CloseBracketToken,
        DotToken,
        DotDotToken,
        DotDotLessThanToken,
        QuestionDotToken,
        CommaToken,
        SemicolonToken,
        ColonToken,
        ColonColonToken,
        QuestionToken,
        QuestionColonToken,
        AtToken,
        MinusGreaterThanToken,
        ExclamationToken,
        ExclamationExclamationToken,
        EqualsToken,
        EqualsEqualsToken,
        EqualsEqualsEqualsToken,
        ExclamationEqualsToken,
        ExclamationEqualsEqualsToken,
        LessThanToken,
        GreaterThanToken,
        LessThanEqualsToken,
        GreaterThanEqualsToken,
        PlusToken,
        MinusToken,
        AsteriskToken,
        SlashToken,
        PercentToken,
        PlusPlusToken,
        MinusMinusToken,
        PlusEqualsToken,
        MinusEqualsToken,
        AsteriskEqualsToken,
        SlashEqualsToken,
        PercentEqualsToken,
        AmpersandAmpersandToken,
        BarBarToken,
        AsKeyword,
        AsSafeKeyword,
        BreakKeyword,
        ClassKeyword,
        ContinueKeyword,
        DoKeyword,
        ElseKeyword,
        FalseKeyword,
        ForKeyword,
        FunKeyword,
        IfKeyword,
        InKeyword,
        NotInKeyword,
        InterfaceKeyword,
        IsKeyword,
        NotIsKeyword,
        NullKeyword,
        ObjectKeyword,
        PackageKeyword,
        ReturnKeyword,
        SuperKeyword,
        ThisKeyword,
        ThrowKeyword,
        TrueKeyword,
        TryKeyword,
        TypealiasKeyword,
        ValKeyword,
        VarKeyword,
        WhenKeyword,
        WhileKeyword,
        ImportKeyword,
        CompanionKeyword,
        OpenKeyword,
        AbstractKeyword,
        DataKeyword,
        PrivateKeyword,
        PublicKeyword,
        InternalKeyword,
        ProtectedKeyword,
        OverrideKeyword,
        FinalKeyword,
        SealedKeyword,
        InnerKeyword,
        EnumKeyword,
        ConstKeyword,
        LateinitKeyword,
        ConstructorKeyword,
        InitKeyword,
        ByKeyword,
        GetKeyword,
        SetKeyword,
        WhereKeyword,
    ]
};

const KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("as", SyntaxKind::AsKeyword),
    ("break", SyntaxKind::BreakKeyword),
    ("class", SyntaxKind::ClassKeyword),
    ("continue", SyntaxKind::ContinueKeyword),
    ("do", SyntaxKind::DoKeyword),
    ("else", SyntaxKind::ElseKeyword),
    ("false", SyntaxKind::FalseKeyword),
    ("for", SyntaxKind::ForKeyword),
    ("fun", SyntaxKind::FunKeyword),
    ("if", SyntaxKind::IfKeyword),
    ("in", SyntaxKind::InKeyword),
    ("interface", SyntaxKind::InterfaceKeyword),
    ("is", SyntaxKind::IsKeyword),
    ("null", SyntaxKind::NullKeyword),
    ("object", SyntaxKind::ObjectKeyword),
    ("package", SyntaxKind::PackageKeyword),
    ("return", SyntaxKind::ReturnKeyword),
    ("super", SyntaxKind::SuperKeyword),
    ("this", SyntaxKind::ThisKeyword),
    ("throw", SyntaxKind::ThrowKeyword),
    ("true", SyntaxKind::TrueKeyword),
    ("try", SyntaxKind::TryKeyword),
    ("typealias", SyntaxKind::TypealiasKeyword),
    ("val", SyntaxKind::ValKeyword),
    ("var", SyntaxKind::VarKeyword),
    ("when", SyntaxKind::WhenKeyword),
    ("while", SyntaxKind::WhileKeyword),
    ("import", SyntaxKind::ImportKeyword),
    ("companion", SyntaxKind::CompanionKeyword),
    ("open", SyntaxKind::OpenKeyword),
    ("abstract", SyntaxKind::AbstractKeyword),
    ("data", SyntaxKind::DataKeyword),
    ("private", SyntaxKind::PrivateKeyword),
    ("public", SyntaxKind::PublicKeyword),
    ("internal", SyntaxKind::InternalKeyword),
    ("protected", SyntaxKind::ProtectedKeyword),
    ("override", SyntaxKind::OverrideKeyword),
    ("final", SyntaxKind::FinalKeyword),
    ("sealed", SyntaxKind::SealedKeyword),
    ("inner", SyntaxKind::InnerKeyword),
    ("enum", SyntaxKind::EnumKeyword),
    ("const", SyntaxKind::ConstKeyword),
    ("lateinit", SyntaxKind::LateinitKeyword),
    ("constructor", SyntaxKind::ConstructorKeyword),
    ("init", SyntaxKind::InitKeyword),
    ("by", SyntaxKind::ByKeyword),
    ("get", SyntaxKind::GetKeyword),
    ("set", SyntaxKind::SetKeyword),
    ("where", SyntaxKind::WhereKeyword),
];

/// Look up the keyword kind for an identifier's text.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    KEYWORDS.iter().find(|(t, _)| *t == text).map(|(_, k)| *k)
}

/// Flags describing the shape of the current token.
pub mod token_flags {
    pub const NONE: u32 = 0;
    /// Identifier written as `` `name` ``.
    pub const BACKTICKED: u32 = 1 << 0;
    /// Numeric literal with `L` suffix.
    pub const LONG_SUFFIX: u32 = 1 << 1;
    /// Numeric literal with `u`/`U` suffix.
    pub const UNSIGNED_SUFFIX: u32 = 1 << 2;
    /// Numeric literal with a fraction, exponent or `f` suffix.
    pub const FLOATING: u32 = 1 << 3;
    /// Numeric literal with `f`/`F` suffix.
    pub const FLOAT_SUFFIX: u32 = 1 << 4;
    /// `0x` literal.
    pub const HEX: u32 = 1 << 5;
    /// `0b` literal.
    pub const BINARY: u32 = 1 << 6;
    /// Triple-quoted raw string.
    pub const RAW_STRING: u32 = 1 << 7;
    /// String literal containing `$name` or `${...}` templates.
    pub const TEMPLATE: u32 = 1 << 8;
    /// Literal ran to end of input without its closing delimiter.
    pub const UNTERMINATED: u32 = 1 << 9;
}

pub type TokenFlags = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u16_round_trip() {
        for (i, kind) in TOKEN_KINDS.iter().enumerate() {
            assert_eq!(*kind as u16, i as u16, "{kind:?} out of order");
            assert_eq!(SyntaxKind::from_u16(i as u16), Some(*kind));
        }
        assert_eq!(SyntaxKind::from_u16(SyntaxKind::LAST_TOKEN as u16 + 1), None);
    }

    #[test]
    fn test_keyword_classes() {
        assert!(SyntaxKind::ThisKeyword.is_hard_keyword());
        assert!(SyntaxKind::CompanionKeyword.is_soft_keyword());
        assert!(!SyntaxKind::Identifier.is_keyword());
        assert_eq!(keyword_kind("super"), Some(SyntaxKind::SuperKeyword));
        assert_eq!(SyntaxKind::QuestionColonToken.text(), Some("?:"));
        assert_eq!(SyntaxKind::ValKeyword.text(), Some("val"));
    }
}
