use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Message shown whenever an address fails validation, on either side of the wire.
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// Atext characters of RFC 5322 plus dots. No quoting, no whitespace, no `@`.
pub const LOCAL_PART_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+$";
/// Two or more ASCII hostname labels. IP literals and trailing dots do not match.
pub const DOMAIN_PATTERN: &str =
    r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_LOCAL_PART_LENGTH: usize = 64;
pub const MAX_DOMAIN_LENGTH: usize = 255;

static LOCAL_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(LOCAL_PART_PATTERN).expect("local part pattern is valid"));
static DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DOMAIN_PATTERN).expect("domain pattern is valid"));

/// The address rule as data, so the landing page can evaluate the exact same
/// patterns and limits in the browser.
#[derive(Debug, Clone, Serialize)]
pub struct EmailRule {
    pub local_part_pattern: &'static str,
    pub domain_pattern: &'static str,
    pub max_length: usize,
    pub max_local_part_length: usize,
    pub max_domain_length: usize,
    pub message: &'static str,
}

pub fn email_rule() -> EmailRule {
    EmailRule {
        local_part_pattern: LOCAL_PART_PATTERN,
        domain_pattern: DOMAIN_PATTERN,
        max_length: MAX_EMAIL_LENGTH,
        max_local_part_length: MAX_LOCAL_PART_LENGTH,
        max_domain_length: MAX_DOMAIN_LENGTH,
        message: INVALID_EMAIL_MESSAGE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Returns an instance of `SubscriberEmail` if the input satisfies [`email_rule`]:
    /// split at the last `@`, both halves match their pattern and no length limit
    /// is exceeded.
    ///
    /// The input is kept as-is. No trimming or case folding happens here, so two
    /// addresses only compare equal when they are byte-for-byte identical.
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        let is_valid = match email.rsplit_once('@') {
            Some((local, domain)) => {
                email.chars().count() <= MAX_EMAIL_LENGTH
                    && local.chars().count() <= MAX_LOCAL_PART_LENGTH
                    && domain.chars().count() <= MAX_DOMAIN_LENGTH
                    && LOCAL_PART.is_match(local)
                    && DOMAIN.is_match(domain)
            }
            None => false,
        };

        if !is_valid {
            return Err(INVALID_EMAIL_MESSAGE.to_string());
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Addresses the rule must accept or reject, shared by the unit tests here
/// and the landing page tests.
#[doc(hidden)]
pub fn email_rule_cases() -> Vec<(String, bool)> {
    let long_domain = |last_label: usize| {
        format!(
            "{}.{}.{}.com",
            "a".repeat(63),
            "b".repeat(63),
            "c".repeat(last_label)
        )
    };
    vec![
        ("a@b.com".to_string(), true),
        ("first.last+tag@mail.example.co".to_string(), true),
        ("o'brien@example.com".to_string(), true),
        ("UPPER@Example.COM".to_string(), true),
        (format!("{}@b.com", "x".repeat(64)), true),
        (format!("{}@{}", "x".repeat(64), long_domain(57)), true),
        ("".to_string(), false),
        ("not-an-email".to_string(), false),
        ("@domain.com".to_string(), false),
        ("a@".to_string(), false),
        ("a@@b.com".to_string(), false),
        ("someone@localhost".to_string(), false),
        ("a@b.com.".to_string(), false),
        ("a@-b.com".to_string(), false),
        ("a@[127.0.0.1]".to_string(), false),
        ("a@bücher.de".to_string(), false),
        ("some one@domain.com".to_string(), false),
        (" a@b.com".to_string(), false),
        ("a@b.com ".to_string(), false),
        ("a@b\t.com".to_string(), false),
        (format!("{}@b.com", "x".repeat(65)), false),
        (format!("{}@{}", "x".repeat(64), long_domain(58)), false),
    ]
}
