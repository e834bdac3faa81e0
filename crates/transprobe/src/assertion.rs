//! Text expectations checked against the rendered page.
//!
//! Assertions are literal substring checks against the page body's visible
//! text. There is no normalization: zero-width joiners, punctuation and
//! whitespace must match exactly.

use serde::{Deserialize, Serialize};

use crate::result::{ProbeError, ProbeResult};
use crate::wait::{contains_sinhala, excerpt, Readiness};

/// Characters of observed text quoted in assertion failures
const FAILURE_EXCERPT_CHARS: usize = 160;

/// Result of an assertion check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionCheckResult {
    /// Assertion passed
    Pass,
    /// Assertion failed with message
    Fail(String),
}

impl AssertionCheckResult {
    /// Check if the result is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if the result is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Convert into a result, failing with [`ProbeError::AssertionFailed`]
    pub fn into_result(self) -> ProbeResult<()> {
        match self {
            Self::Pass => Ok(()),
            Self::Fail(message) => Err(ProbeError::assertion(message)),
        }
    }
}

/// Whether a scenario expects the ideal output or its absence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Output must contain the literal
    Positive,
    /// Output must not contain the literal
    Negative,
}

impl Polarity {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Polarity {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" | "pos" => Ok(Self::Positive),
            "negative" | "neg" => Ok(Self::Negative),
            other => Err(ProbeError::config(format!("unknown polarity: {other}"))),
        }
    }
}

/// Expected relationship between the page text and a literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The page text contains the literal
    Contains(String),
    /// The page text does not contain the literal.
    ///
    /// Negative scenarios only assert that the output differs from the ideal
    /// transliteration. They do not pin down which incorrect output appears.
    NotContains(String),
}

impl Expectation {
    /// Expect the literal to be present
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains(text.into())
    }

    /// Expect the literal to be absent
    #[must_use]
    pub fn not_contains(text: impl Into<String>) -> Self {
        Self::NotContains(text.into())
    }

    /// The literal being checked
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Contains(t) | Self::NotContains(t) => t,
        }
    }

    /// Positive or negative
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        match self {
            Self::Contains(_) => Polarity::Positive,
            Self::NotContains(_) => Polarity::Negative,
        }
    }

    /// Readiness used when a scenario does not name one: wait for the
    /// literal itself, or for any Sinhala output when the literal must be
    /// absent.
    #[must_use]
    pub fn default_readiness(&self) -> Readiness {
        match self {
            Self::Contains(t) => Readiness::contains(t.clone()),
            Self::NotContains(_) => Readiness::sinhala(),
        }
    }

    /// Check observed page text
    #[must_use]
    pub fn check(&self, observed: &str) -> AssertionCheckResult {
        match self {
            Self::Contains(t) if observed.contains(t.as_str()) => AssertionCheckResult::Pass,
            Self::Contains(t) => AssertionCheckResult::Fail(format!(
                "expected page text to contain {t:?}, got {:?}",
                excerpt(observed, FAILURE_EXCERPT_CHARS)
            )),
            Self::NotContains(t) if observed.contains(t.as_str()) => {
                AssertionCheckResult::Fail(format!(
                    "expected page text not to contain {t:?}, got {:?}",
                    excerpt(observed, FAILURE_EXCERPT_CHARS)
                ))
            }
            Self::NotContains(_) => AssertionCheckResult::Pass,
        }
    }

    /// Check observed page text, failing with [`ProbeError::AssertionFailed`]
    pub fn validate(&self, observed: &str) -> ProbeResult<()> {
        self.check(observed).into_result()
    }
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contains(t) => write!(f, "contains {t:?}"),
            Self::NotContains(t) => write!(f, "not contains {t:?}"),
        }
    }
}

/// The Sinhala-bearing lines of the page text, used to compare two renders
/// of the same input while ignoring static page chrome.
#[must_use]
pub fn rendered_output(page_text: &str) -> String {
    page_text
        .lines()
        .map(str::trim)
        .filter(|line| contains_sinhala(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod expectation_tests {
        use super::*;

        #[test]
        fn test_contains_pass_and_fail() {
            let e = Expectation::contains("ආයුබෝවන් නිමල්!");
            assert!(e.check("Output\nආයුබෝවන් නිමල්!\n").is_pass());
            let fail = e.check("ආයුබෝවන් නිමල්");
            assert!(fail.is_fail());
        }

        #[test]
        fn test_not_contains() {
            let e = Expectation::not_contains("මම ගෙදර යනවා");
            assert!(e.check("මමගෙදරයනවා").is_pass());
            assert!(e.check("x මම ගෙදර යනවා y").is_fail());
        }

        #[test]
        fn test_zero_width_joiner_is_significant() {
            let e = Expectation::contains("ශ්\u{200D}රී");
            assert!(e.check("ශ්\u{200D}රී ලංකාව").is_pass());
            assert!(e.check("ශ්රී ලංකාව").is_fail());
        }

        #[test]
        fn test_validate_maps_to_assertion_error() {
            let err = Expectation::contains("x").validate("y").unwrap_err();
            assert!(matches!(err, ProbeError::AssertionFailed { .. }));
            assert!(err.to_string().contains("\"x\""));
        }

        #[test]
        fn test_polarity_and_text() {
            let e = Expectation::not_contains("abc");
            assert_eq!(e.polarity(), Polarity::Negative);
            assert_eq!(e.text(), "abc");
            assert_eq!(Expectation::contains("a").polarity(), Polarity::Positive);
        }

        #[test]
        fn test_default_readiness() {
            assert_eq!(
                Expectation::contains("මම").default_readiness(),
                Readiness::contains("මම")
            );
            assert_eq!(
                Expectation::not_contains("මම").default_readiness(),
                Readiness::sinhala()
            );
        }

        #[test]
        fn test_serde_shape() {
            let e: Expectation = serde_yaml_ng::from_str("not_contains: \"මම\"").unwrap();
            assert_eq!(e, Expectation::not_contains("මම"));
            let json = serde_json::to_string(&Expectation::contains("a")).unwrap();
            assert_eq!(json, r#"{"contains":"a"}"#);
        }

        #[test]
        fn test_failure_message_is_truncated() {
            let long = "a".repeat(1_000);
            match Expectation::contains("b").check(&long) {
                AssertionCheckResult::Fail(msg) => assert!(msg.len() < 300),
                AssertionCheckResult::Pass => panic!("should fail"),
            }
        }
    }

    mod polarity_tests {
        use super::*;

        #[test]
        fn test_parse() {
            assert_eq!("positive".parse::<Polarity>().unwrap(), Polarity::Positive);
            assert_eq!("NEG".parse::<Polarity>().unwrap(), Polarity::Negative);
            assert!("maybe".parse::<Polarity>().is_err());
        }

        #[test]
        fn test_display() {
            assert_eq!(Polarity::Negative.to_string(), "negative");
        }
    }

    mod rendered_output_tests {
        use super::*;

        #[test]
        fn test_keeps_only_sinhala_lines() {
            let page = "Swift Translator\nClear\n  මම ගෙදර යනවා  \nfooter";
            assert_eq!(rendered_output(page), "මම ගෙදර යනවා");
        }

        #[test]
        fn test_no_output() {
            assert_eq!(rendered_output("Swift Translator\nClear"), "");
        }
    }

    proptest! {
        #[test]
        fn prop_exactly_one_polarity_passes(literal in "\\PC{1,12}", observed in "\\PC{0,40}") {
            let pos = Expectation::contains(literal.clone()).check(&observed).is_pass();
            let neg = Expectation::not_contains(literal).check(&observed).is_pass();
            prop_assert!(pos != neg);
        }

        #[test]
        fn prop_literal_embedded_always_contains(
            prefix in "\\PC{0,10}",
            literal in "\\PC{1,10}",
            suffix in "\\PC{0,10}",
        ) {
            let observed = format!("{prefix}{literal}{suffix}");
            prop_assert!(Expectation::contains(literal).check(&observed).is_pass());
        }
    }
}
