//! Closed enumerations of the completion overlay.
//!
//! Discriminants are part of the interchange contract and never reshuffle;
//! obsoleted slots stay reserved so the numbering of later entries holds.

use serde::Serialize;

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[repr(u32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            pub fn from_u32(raw: u32) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_u32(self) -> u32 {
                self as u32
            }
        }
    };
}

closed_enum! {
    /// Syntactic position a completion request was made in.
    pub enum CompletionKind {
        None = 0,
        Import = 1,
        UnresolvedMember = 2,
        DotExpr = 3,
        StmtOrExpr = 4,
        PostfixExprBeginning = 5,
        PostfixExpr = 6,
        /// Obsoleted; slot reserved.
        PostfixExprParen = 7,
        KeyPathExprObjC = 8,
        KeyPathExprSwift = 9,
        TypeDeclResultBeginning = 10,
        TypeSimpleBeginning = 11,
        TypeIdentifierWithDot = 12,
        TypeIdentifierWithoutDot = 13,
        CaseStmtKeyword = 14,
        CaseStmtBeginning = 15,
        NominalMemberBeginning = 16,
        AccessorBeginning = 17,
        AttributeBegin = 18,
        AttributeDeclParen = 19,
        PoundAvailablePlatform = 20,
        CallArg = 21,
        LabeledTrailingClosure = 22,
        ReturnStmtExpr = 23,
        YieldStmtExpr = 24,
        ForEachSequence = 25,
        AfterPoundExpr = 26,
        AfterPoundDirective = 27,
        PlatformConditon = 28,
        AfterIfStmtElse = 29,
        GenericRequirement = 30,
        PrecedenceGroup = 31,
        StmtLabel = 32,
        EffectsSpecifier = 33,
        ForEachPatternBeginning = 34,
        TypeAttrBeginning = 35,
        OptionalBinding = 36,
        ForEachKwIn = 37,
        WithoutConstraintType = 38,
        ThenStmtExpr = 39,
        TypeBeginning = 40,
        TypeSimpleOrComposition = 41,
        TypePossibleFunctionParamBeginning = 42,
        TypeAttrInheritanceBeginning = 43,
    }
}

closed_enum! {
    /// Broad category of a completion item.
    pub enum CompletionItemKind {
        Declaration = 0,
        Keyword = 1,
        Pattern = 2,
        Literal = 3,
        BuiltinOperator = 4,
    }
}

closed_enum! {
    /// Declaration kind, meaningful when the item kind is `Declaration`.
    pub enum CompletionItemDeclKind {
        Module = 0,
        Class = 1,
        Struct = 2,
        Enum = 3,
        EnumElement = 4,
        Protocol = 5,
        AssociatedType = 6,
        TypeAlias = 7,
        GenericTypeParam = 8,
        Constructor = 9,
        Destructor = 10,
        Subscript = 11,
        StaticMethod = 12,
        InstanceMethod = 13,
        PrefixOperatorFunction = 14,
        PostfixOperatorFunction = 15,
        InfixOperatorFunction = 16,
        FreeFunction = 17,
        StaticVar = 18,
        InstanceVar = 19,
        LocalVar = 20,
        GlobalVar = 21,
        PrecedenceGroup = 22,
        Actor = 23,
        Macro = 24,
    }
}

closed_enum! {
    /// How an item's type relates to the type expected at the request
    /// position.
    pub enum TypeRelation {
        NotApplicable = 0,
        Unknown = 1,
        Unrelated = 2,
        Invalid = 3,
        Convertible = 4,
        Identical = 5,
    }
}

closed_enum! {
    /// Lexical distance between the item's declaration and the request
    /// position.
    pub enum SemanticContext {
        None = 0,
        /// Obsoleted; slot reserved.
        ExpressionSpecific = 1,
        Local = 2,
        CurrentNominal = 3,
        Super = 4,
        OutsideNominal = 5,
        CurrentModule = 6,
        OtherModule = 7,
    }
}

closed_enum! {
    /// Why an item is flagged as not recommended.
    pub enum NotRecommendedReason {
        None = 0,
        RedundantImport = 1,
        Deprecated = 2,
        InvalidAsyncContext = 3,
        CrossActorReference = 4,
        VariableUsedInOwnDefinition = 5,
        RedundantImportIndirect = 6,
        SoftDeprecated = 7,
        NonAsyncAlternativeUsedInAsyncContext = 8,
    }
}

closed_enum! {
    /// Severity of a diagnostic attached to a completion item.
    pub enum DiagnosticSeverity {
        None = 0,
        Error = 1,
        Warning = 2,
        Remark = 3,
        Note = 4,
    }
}

/// Ranking nudges attached to an item, combinable as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Flair(u32);

impl Flair {
    pub const NONE: Flair = Flair(0);
    pub const EXPRESSION_SPECIFIC: Flair = Flair(1 << 0);
    pub const SUPER_CHAIN: Flair = Flair(1 << 1);
    pub const ARGUMENT_LABELS: Flair = Flair(1 << 2);
    pub const COMMON_KEYWORD_AT_CURRENT_POSITION: Flair = Flair(1 << 3);
    pub const RARE_KEYWORD_AT_CURRENT_POSITION: Flair = Flair(1 << 4);
    pub const RARE_TYPE_AT_CURRENT_POSITION: Flair = Flair(1 << 5);
    pub const EXPRESSION_AT_NON_SCRIPT_OR_MAIN_FILE_SCOPE: Flair = Flair(1 << 6);

    pub const fn from_bits(bits: u32) -> Self {
        Flair(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flair) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Flair {
    type Output = Flair;

    fn bitor(self, rhs: Flair) -> Flair {
        Flair(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Flair {
    fn bitor_assign(&mut self, rhs: Flair) {
        self.0 |= rhs.0;
    }
}
