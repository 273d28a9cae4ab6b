use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::whitelist::Whitelist;

lazy_static! {
    /// `#ddd`, `#3d4456`
    static ref HEX: Regex = Regex::new(r"^#[a-zA-Z0-9]{3,6}").unwrap();
    /// `.8` as in `rgba(0,0,0,.8)`
    static ref LEADING_DOT_FRACTION: Regex = Regex::new(r"^\.[0-9]{1,2}").unwrap();
    /// `0.8`
    static ref DIGIT_DOT_FRACTION: Regex = Regex::new(r"^[0-9]\.[0-9]{1,2}").unwrap();
    /// `.gif"`, `.woff?22t19m"`
    static ref URL_SUFFIX: Regex = Regex::new(r#"^\.[a-zA-Z0-9?&]+""#).unwrap();
    /// `w3.org/2000/svg'`
    static ref PATH: Regex = Regex::new(r#"[a-zA-Z0-9?&/]+['"]"#).unwrap();
    /// `.2s`, `0.2s`
    static ref TIME: Regex = Regex::new(r"^[0-9]?\.[0-9]{1,2}s").unwrap();
    /// `.22em`, `0.2em`
    static ref EM: Regex = Regex::new(r"^[0-9]?\.[0-9]{1,2}em").unwrap();
    /// `.22rem`, `0.2rem`
    static ref REM: Regex = Regex::new(r"^[0-9]?\.[0-9]{1,2}rem").unwrap();
}

/// Why a `.name` / `#name` lookalike is not a selector.
///
/// Variants are listed in evaluation order, the first matching rule names the
/// reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    Whitelist,
    HexColor,
    Fraction,
    DigitFraction,
    UrlSuffix,
    Path,
    QuestionMark,
    Time,
    Em,
    Rem,
}

impl RejectReason {
    pub const ORDER: [RejectReason; 10] = [
        Self::Whitelist,
        Self::HexColor,
        Self::Fraction,
        Self::DigitFraction,
        Self::UrlSuffix,
        Self::Path,
        Self::QuestionMark,
        Self::Time,
        Self::Em,
        Self::Rem,
    ];

    fn matches(self, token: &str, whitelist: &Whitelist) -> bool {
        match self {
            Self::Whitelist => whitelist.contains_token(token),
            Self::HexColor => HEX.is_match(token),
            Self::Fraction => LEADING_DOT_FRACTION.is_match(token),
            Self::DigitFraction => DIGIT_DOT_FRACTION.is_match(token),
            Self::UrlSuffix => URL_SUFFIX.is_match(token),
            Self::Path => PATH.is_match(token),
            Self::QuestionMark => token.contains('?'),
            Self::Time => TIME.is_match(token),
            Self::Em => EM.is_match(token),
            Self::Rem => REM.is_match(token),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Whitelist => "Whitelist",
            Self::HexColor => "Hex color",
            Self::Fraction | Self::DigitFraction => "Rgb | Numeric",
            Self::UrlSuffix | Self::Path => "Url | Path",
            Self::QuestionMark => "Question mark",
            Self::Time => "Time",
            Self::Em => "Em",
            Self::Rem => "Rem",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    Rejected(RejectReason),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Decide whether a raw token found in stylesheet text is a real selector.
///
/// The token is trimmed first; callers discard empty tokens before asking.
pub fn classify(token: &str, whitelist: &Whitelist) -> Classification {
    let token = token.trim();

    RejectReason::ORDER
        .into_iter()
        .find(|reason| reason.matches(token, whitelist))
        .map_or(Classification::Accepted, Classification::Rejected)
}
