use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[error("Invalid {field} value: '{value}'")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variant declaration order is the `Ord` order.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Warning < Danger < Critical.
str_enum!(Severity {
    Warning => "warning",
    Danger => "danger",
    Critical => "critical",
});

impl Severity {
    /// Most severe first. Grouping and display iterate in this order.
    pub const DESCENDING: [Severity; 3] = [Self::Critical, Self::Danger, Self::Warning];

    /// Portuguese label shown to clinicians.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Crítico",
            Self::Danger => "Perigo",
            Self::Warning => "Atenção",
        }
    }

    /// Bullet marker used in the plain-text summary.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::Danger => "🟠",
            Self::Warning => "🟡",
        }
    }
}

str_enum!(MatchMode {
    AllOf => "all_of",
    AnyOf => "any_of",
});

str_enum!(MatchKind {
    Exact => "exact",
    Prefix => "prefix",
    Synonym => "synonym",
    Fuzzy => "fuzzy",
    Ngram => "ngram",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_round_trip() {
        for (variant, s) in [
            (Severity::Warning, "warning"),
            (Severity::Danger, "danger"),
            (Severity::Critical, "critical"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Severity::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn severity_ordering_is_total() {
        assert!(Severity::Warning < Severity::Danger);
        assert!(Severity::Danger < Severity::Critical);
        assert!(Severity::Warning < Severity::Critical);
        let mut sorted = vec![Severity::Danger, Severity::Critical, Severity::Warning];
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, Severity::DESCENDING.to_vec());
    }

    #[test]
    fn match_mode_serde_names() {
        assert_eq!(serde_json::to_string(&MatchMode::AllOf).unwrap(), "\"all_of\"");
        let parsed: MatchMode = serde_json::from_str("\"any_of\"").unwrap();
        assert_eq!(parsed, MatchMode::AnyOf);
    }

    #[test]
    fn match_kind_names() {
        assert_eq!(MatchKind::Ngram.as_str(), "ngram");
        assert_eq!(MatchKind::from_str("synonym").unwrap(), MatchKind::Synonym);
    }

    #[test]
    fn invalid_enum_returns_error() {
        let err = Severity::from_str("urgent").unwrap_err();
        assert_eq!(err.field, "Severity");
        assert_eq!(err.value, "urgent");
        assert!(MatchKind::from_str("").is_err());
    }
}
