//! Password policy engine for gatelock.
//!
//! Validity checking and strength classification are independent rule
//! evaluations over the same candidate; neither is derived from the other.
//! Also provides a non-authoritative email-shape check for identity strings.

use std::fmt;

use thiserror::Error;

/// Minimum password length required by the validity rules.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length at which the strength score earns its sixth criterion.
pub const LONG_PASSWORD_LENGTH: usize = 12;

/// Special characters accepted by the special-character rule.
pub const SPECIAL_CHARS: &str = r##"!@#$%^&*()_+-=[]{};':"\|,.<>/?"##;

/// A violated validity rule.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Password is shorter than the minimum length.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password contains no uppercase letter.
    #[error("password must contain an uppercase letter")]
    NoUppercase,

    /// Password contains no lowercase letter.
    #[error("password must contain a lowercase letter")]
    NoLowercase,

    /// Password contains no digit.
    #[error("password must contain a digit")]
    NoDigit,

    /// Password contains no special character.
    #[error("password must contain a special character")]
    NoSpecial,
}

/// Password strength classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    /// String representation of the strength level.
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
            PasswordStrength::VeryStrong => "very-strong",
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict for a password candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReport {
    /// True when no validity rule is violated.
    pub is_valid: bool,
    /// Violated rules, in rule order.
    pub violations: Vec<PolicyViolation>,
    /// Strength classification, computed independently of validity.
    pub strength: PasswordStrength,
}

fn char_count(password: &str) -> usize {
    password.chars().count()
}

fn has_uppercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_digit())
}

fn has_special(password: &str) -> bool {
    password.chars().any(|c| SPECIAL_CHARS.contains(c))
}

/// Evaluate the five validity rules, returning violations in rule order.
pub fn check_rules(password: &str) -> Vec<PolicyViolation> {
    let mut violations = Vec::new();

    if char_count(password) < MIN_PASSWORD_LENGTH {
        violations.push(PolicyViolation::TooShort);
    }
    if !has_uppercase(password) {
        violations.push(PolicyViolation::NoUppercase);
    }
    if !has_lowercase(password) {
        violations.push(PolicyViolation::NoLowercase);
    }
    if !has_digit(password) {
        violations.push(PolicyViolation::NoDigit);
    }
    if !has_special(password) {
        violations.push(PolicyViolation::NoSpecial);
    }

    violations
}

/// Classify password strength from the six-criterion score.
///
/// The criteria are the five validity rules plus length >= 12. The mapping
/// on the number of passing criteria is: <= 2 weak, 3 medium, 4 strong,
/// >= 5 very-strong.
pub fn classify_strength(password: &str) -> PasswordStrength {
    let length = char_count(password);
    let criteria = [
        length >= MIN_PASSWORD_LENGTH,
        has_uppercase(password),
        has_lowercase(password),
        has_digit(password),
        has_special(password),
        length >= LONG_PASSWORD_LENGTH,
    ];
    let passed = criteria.iter().filter(|&&passed| passed).count();

    match passed {
        0..=2 => PasswordStrength::Weak,
        3 => PasswordStrength::Medium,
        4 => PasswordStrength::Strong,
        _ => PasswordStrength::VeryStrong,
    }
}

/// Validate a password candidate.
///
/// Returns the validity verdict, the ordered violation list, and the
/// strength classification.
pub fn validate_password(password: &str) -> PasswordReport {
    let violations = check_rules(password);

    PasswordReport {
        is_valid: violations.is_empty(),
        strength: classify_strength(password),
        violations,
    }
}

/// Non-authoritative email-shape check for identity strings.
///
/// Accepts a single `@` with a non-empty local part and a dotted domain,
/// and rejects whitespace. Offered as a convenience only; guard operations
/// never re-validate identity format.
pub fn is_email_shaped(identity: &str) -> bool {
    let parts: Vec<&str> = identity.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || !domain.contains('.') {
        return false;
    }
    if domain.split('.').any(|p| p.is_empty()) {
        return false;
    }

    !identity.chars().any(char::is_whitespace)
}
