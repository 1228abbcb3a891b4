//! Findings: what a detector concludes about a document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code reserved across every condition for "not enough signal"
pub const SKIP_CODE: i32 = 99;

/// A condition-specific outcome category
///
/// Implemented by the enums generated with [`status_enum!`](crate::status_enum).
pub trait Status: Copy + fmt::Debug {
    /// Stable integer code
    fn code(self) -> i32;

    /// Upper-case label, e.g. `MISSING_STRING`
    fn name(self) -> &'static str;

    fn value(self) -> StatusValue {
        StatusValue {
            name: self.name(),
            code: self.code(),
        }
    }

    fn is_skip(self) -> bool {
        self.code() == SKIP_CODE
    }
}

/// Type-erased status carried by a [`Finding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StatusValue {
    pub name: &'static str,
    pub code: i32,
}

impl StatusValue {
    pub fn is_skip(&self) -> bool {
        self.code == SKIP_CODE
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declare a condition's status enum
///
/// Every variant gets an explicit code and label. A `Skip` variant with
/// [`SKIP_CODE`] and label `SKIP` is always appended.
///
/// ```
/// apex_core::status_enum! {
///     pub enum RemovalStatus {
///         None = -1 => "NONE",
///         Remove = 1 => "REMOVE",
///     }
/// }
///
/// use apex_core::Status;
/// assert_eq!(RemovalStatus::Skip.code(), 99);
/// assert_eq!(RemovalStatus::from_code(1), Some(RemovalStatus::Remove));
/// ```
#[macro_export]
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:expr => $label:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            Skip,
        }

        impl $name {
            /// Every variant in declaration order, `Skip` last
            pub const ALL: &'static [$name] = &[$($name::$variant,)+ $name::Skip];

            pub fn from_code(code: i32) -> ::std::option::Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|s| $crate::Status::code(*s) == code)
            }
        }

        impl $crate::Status for $name {
            fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code,)+
                    $name::Skip => $crate::SKIP_CODE,
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Skip => "SKIP",
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::Status::name(*self))
            }
        }

        impl ::std::convert::From<$name> for $crate::StatusValue {
            fn from(status: $name) -> Self {
                $crate::Status::value(status)
            }
        }
    };
}

/// How much a finding should be trusted
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    None,
    VeryLow,
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
    Absolute,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
            Self::Absolute => "absolute",
        };
        f.write_str(s)
    }
}

/// One conclusion drawn by a detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub status: StatusValue,
    /// Numeric outcome; negative means no positive conclusion
    pub result: i32,
    /// Gold label, when one was supplied
    pub expected: Option<i32>,
    /// Supporting text, whitespace-normalized
    pub text: Option<String>,
    pub date: Option<String>,
    pub extras: Vec<String>,
    pub confidence: Confidence,
}

impl Finding {
    pub fn new(status: impl Into<StatusValue>, result: i32) -> Self {
        Self {
            status: status.into(),
            result,
            expected: None,
            text: None,
            date: None,
            extras: Vec::new(),
            confidence: Confidence::default(),
        }
    }

    /// A finding whose result is the status code
    pub fn of<S: Status>(status: S) -> Self {
        Self::new(status.value(), status.code())
    }

    pub fn with_expected(mut self, expected: Option<i32>) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.text = Some(normalize_whitespace(text.as_ref()));
        self
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extras.push(extra.into());
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// Whether the result agrees with the gold label
    pub fn correct(&self) -> Option<bool> {
        self.expected.map(|e| e == self.result)
    }

    /// Positive or neutral, and not SKIP
    pub fn is_actionable(&self) -> bool {
        self.result >= 0 && !self.status.is_skip()
    }

    pub fn is_skip(&self) -> bool {
        self.status.is_skip()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let correct = match self.correct() {
            Some(true) => "True",
            Some(false) => "False",
            None => "None",
        };
        let expected = self
            .expected
            .map_or_else(|| "None".to_string(), |e| e.to_string());
        write!(f, "<Finding:{}:{}==exp({})>", correct, self.result, expected)
    }
}

/// Collapse every whitespace run to a single space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Choose the finding to report for a detector
///
/// Actionable findings beat non-actionable ones, then the higher result wins,
/// then the higher confidence. Full ties keep the earliest candidate.
pub fn select_best<I>(findings: I) -> Option<Finding>
where
    I: IntoIterator<Item = Finding>,
{
    let key = |f: &Finding| (f.is_actionable(), f.result, f.confidence);
    findings.into_iter().fold(None, |best, candidate| match best {
        Some(b) if key(&candidate) <= key(&b) => Some(b),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    status_enum! {
        enum TestStatus {
            None = -1 => "NONE",
            Yes = 1 => "YES",
            Maybe = 0 => "MAYBE",
        }
    }

    #[test]
    fn test_status_enum_appends_skip() {
        assert_eq!(TestStatus::ALL.len(), 4);
        assert!(TestStatus::Skip.is_skip());
        assert_eq!(TestStatus::Skip.code(), SKIP_CODE);
        assert_eq!(TestStatus::from_code(0), Some(TestStatus::Maybe));
        assert_eq!(TestStatus::from_code(7), None);
        assert_eq!(TestStatus::Yes.to_string(), "YES");
    }

    #[test]
    fn test_text_is_normalized() {
        let f = Finding::of(TestStatus::Yes).with_text("  iud\n\tplaced   today ");
        assert_eq!(f.text.as_deref(), Some("iud placed today"));
    }

    #[test]
    fn test_correctness() {
        assert_eq!(Finding::of(TestStatus::Yes).correct(), None);
        assert_eq!(Finding::of(TestStatus::Yes).with_expected(Some(1)).correct(), Some(true));
        assert_eq!(Finding::of(TestStatus::Yes).with_expected(Some(-1)).correct(), Some(false));
        assert_eq!(
            Finding::of(TestStatus::Yes).with_expected(Some(1)).to_string(),
            "<Finding:True:1==exp(1)>"
        );
    }

    #[test]
    fn test_gate() {
        assert!(Finding::of(TestStatus::Yes).is_actionable());
        assert!(Finding::of(TestStatus::Maybe).is_actionable());
        assert!(!Finding::of(TestStatus::None).is_actionable());
        assert!(!Finding::of(TestStatus::Skip).is_actionable());
        assert!(!Finding::new(TestStatus::Yes, -1).is_actionable());
    }

    #[test]
    fn test_select_best_prefers_actionable_then_result_then_confidence() {
        let picked = select_best(vec![
            Finding::of(TestStatus::Skip),
            Finding::of(TestStatus::Maybe).with_confidence(Confidence::High),
            Finding::of(TestStatus::Yes).with_confidence(Confidence::Low),
            Finding::of(TestStatus::Yes)
                .with_confidence(Confidence::VeryHigh)
                .with_extra("second"),
        ])
        .unwrap();
        assert_eq!(picked.extras, vec!["second".to_string()]);
    }

    #[test]
    fn test_select_best_keeps_earliest_on_tie() {
        let picked = select_best(vec![
            Finding::of(TestStatus::Yes).with_extra("first"),
            Finding::of(TestStatus::Yes).with_extra("second"),
        ])
        .unwrap();
        assert_eq!(picked.extras, vec!["first".to_string()]);
        assert!(select_best(Vec::new()).is_none());
    }

    #[test]
    fn test_confidence_order() {
        assert!(Confidence::None < Confidence::VeryLow);
        assert!(Confidence::VeryHigh < Confidence::Absolute);
        assert_eq!(Confidence::default(), Confidence::Medium);
    }
}
