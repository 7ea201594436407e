//! Channel-specific value rules: the email grammar and phone normalization.

use std::sync::OnceLock;

use phonenumber::country::Id as Region;
use phonenumber::Mode;
use regex::Regex;

/// Region assumed for phone numbers written without a country prefix.
pub const DEFAULT_PHONE_REGION: Region = Region::US;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // The domain needs at least one dot so bare hosts are rejected.
        let pattern = concat!(
            r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+",
            r"@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?",
            r"(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$",
        );
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Whether `value` satisfies the email-address grammar.
pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Rewrite `value` to E.164 form, or `None` when it is not a valid number.
pub fn normalize_phone(value: &str) -> Option<String> {
    let number = phonenumber::parse(Some(DEFAULT_PHONE_REGION), value).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("richard@hutta.com", true)]
    #[case("user.name+tag@example.co.uk", true)]
    #[case("richard@hutta", false)]
    #[case("@example.com", false)]
    #[case("user@", false)]
    #[case("user@@example.com", false)]
    #[case("plain", false)]
    #[case("Ada@Example.COM", true)]
    #[case("ada@-example.com", false)]
    fn email_grammar(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_email(value), expected);
    }

    #[rstest]
    #[case("202-555-0158", "+12025550158")]
    #[case("2025550158", "+12025550158")]
    #[case("+1 202-555-0158", "+12025550158")]
    #[case("+12025550158", "+12025550158")]
    fn phone_numbers_normalize_to_e164(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_phone(raw).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("+1")]
    #[case("+1 2")]
    #[case("not a number")]
    fn unusable_phone_numbers_are_rejected(#[case] raw: &str) {
        assert_eq!(normalize_phone(raw), None);
    }
}
