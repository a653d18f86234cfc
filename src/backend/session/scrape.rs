//! HTML and cookie parsing for the settings page.
//!
//! Kept free of I/O so page-format changes only touch this file.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

use crate::error::UpdateError;

/// Form field carrying the anti-forgery token.
pub const TOKEN_FIELD: &str = "authenticity_token";

/// Maximum characters of flash text carried into an error message.
const MAX_FLASH_LEN: usize = 300;

/// Flash/alert containers checked in order when a submission is rejected.
const FLASH_SELECTORS: [&str; 4] = [
    ".flash-error",
    ".alert-danger",
    "[role=\"alert\"]",
    ".flash",
];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The value may follow other attributes but must sit in the same tag;
    // `\s` keeps `data-value=` and similar from matching.
    PATTERN.get_or_init(|| {
        Regex::new(r#"name="authenticity_token"[^>]*?\svalue="([^"]*)""#)
            .expect("valid authenticity token pattern")
    })
}

/// Pull the anti-forgery token out of the settings page body.
pub fn extract_authenticity_token(body: &str) -> Result<String, UpdateError> {
    token_pattern()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            UpdateError::SessionAcquisition(
                "anti-forgery token not found — caller is not authenticated or lacks access to this resource"
                    .to_string(),
            )
        })
}

/// Collapse `Set-Cookie` values into one outbound `Cookie` header.
///
/// Attributes after the first `;` are dropped; order is preserved.
pub fn collate_cookies<'a, I>(set_cookies: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    set_cookies
        .into_iter()
        .map(|value| value.split(';').next().unwrap_or_default().trim())
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merge a seed `Cookie` header with freshly collated pairs.
///
/// Seed order is kept; a fresh pair replaces the seed pair of the same name
/// in place, and new names are appended.
pub fn merge_cookie_headers(seed: &str, fresh: &str) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for pair in split_cookie_header(seed).chain(split_cookie_header(fresh)) {
        let name = cookie_name(pair).to_string();
        match pairs.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = pair.to_string(),
            None => pairs.push((name, pair.to_string())),
        }
    }
    pairs
        .into_iter()
        .map(|(_, pair)| pair)
        .collect::<Vec<_>>()
        .join("; ")
}

fn split_cookie_header(header: &str) -> impl Iterator<Item = &str> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
}

fn cookie_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name).trim()
}

/// Text of the first non-empty flash/alert element, whitespace-collapsed.
pub fn flash_message(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    FLASH_SELECTORS.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document.select(&selector).find_map(|element| {
            let text = element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                None
            } else {
                Some(text.chars().take(MAX_FLASH_LEN).collect::<String>())
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_from_hidden_input() {
        let body = r#"<form><input type="hidden" name="authenticity_token" value="abc123" autocomplete="off"></form>"#;
        assert_eq!(extract_authenticity_token(body).unwrap(), "abc123");
    }

    #[test]
    fn extracts_first_token_when_several_forms() {
        let body = concat!(
            r#"<input name="authenticity_token" value="first+/=">"#,
            r#"<input name="authenticity_token" value="second">"#
        );
        assert_eq!(extract_authenticity_token(body).unwrap(), "first+/=");
    }

    #[test]
    fn value_must_follow_name_within_the_same_tag() {
        let body = r#"<input name="authenticity_token"><input name="other" value="leak">"#;
        let err = extract_authenticity_token(body).unwrap_err();
        assert_eq!(err.kind(), "session_acquisition");
    }

    #[test]
    fn suffixed_value_attributes_are_not_the_token() {
        let body = r#"<input name="authenticity_token" data-value="WRONG" value="RIGHT">"#;
        assert_eq!(extract_authenticity_token(body).unwrap(), "RIGHT");

        let body = r#"<input name="authenticity_token" ng-value="x"
            value="multi-line">"#;
        assert_eq!(extract_authenticity_token(body).unwrap(), "multi-line");
    }

    #[test]
    fn missing_or_empty_token_is_session_error() {
        let err = extract_authenticity_token("<html><body>Sign in</body></html>").unwrap_err();
        assert!(err.to_string().contains("not authenticated"), "got: {err}");

        let err =
            extract_authenticity_token(r#"<input name="authenticity_token" value="">"#).unwrap_err();
        assert_eq!(err.kind(), "session_acquisition");
    }

    #[test]
    fn collates_cookie_pairs_in_order() {
        let header = collate_cookies([
            "k1=v1; path=/; HttpOnly",
            "k2=v2; Secure",
            "k3=v3",
        ]);
        assert_eq!(header, "k1=v1; k2=v2; k3=v3");
    }

    #[test]
    fn no_cookies_collate_to_empty_string() {
        assert_eq!(collate_cookies(std::iter::empty::<&str>()), "");
        assert_eq!(collate_cookies(["; path=/"]), "");
    }

    #[test]
    fn merge_prefers_fresh_values_and_keeps_order() {
        assert_eq!(
            merge_cookie_headers("_session=old; theme=dark", "_session=new; csrf=x"),
            "_session=new; theme=dark; csrf=x"
        );
        assert_eq!(merge_cookie_headers("", "a=1; b=2"), "a=1; b=2");
        assert_eq!(merge_cookie_headers("a=1", ""), "a=1");
    }

    #[test]
    fn flash_message_prefers_error_containers() {
        let body = r#"
            <div class="flash">Welcome back</div>
            <div class="flash-error">
                Image reference   is invalid
            </div>
        "#;
        assert_eq!(
            flash_message(body).as_deref(),
            Some("Image reference is invalid")
        );
        assert_eq!(flash_message("<p>nothing here</p>"), None);
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn token_is_extracted_exactly_from_surrounding_markup(
                token in proptest::string::string_regex("[A-Za-z0-9+/=_-]{1,64}").expect("regex"),
                before in proptest::string::string_regex("[a-z <>/]{0,40}").expect("regex"),
                attrs in proptest::collection::vec(
                    (
                        proptest::string::string_regex("[a-z]{1,8}").expect("regex"),
                        proptest::string::string_regex("[a-z0-9]{0,8}").expect("regex"),
                    ),
                    0..4
                ),
                after in proptest::string::string_regex("[a-z <>/=\"]{0,40}").expect("regex"),
            ) {
                let mut body = format!("{before}<input type=\"hidden\" name=\"authenticity_token\"");
                for (name, value) in &attrs {
                    body.push_str(&format!(" data-{name}=\"{value}\""));
                }
                body.push_str(&format!(" value=\"{token}\">{after}"));

                prop_assert_eq!(extract_authenticity_token(&body).unwrap(), token);
            }

            #[test]
            fn collation_joins_name_value_pairs_in_order(
                cookies in proptest::collection::vec(
                    (
                        proptest::string::string_regex("[A-Za-z0-9%._-]{1,16}").expect("regex"),
                        proptest::sample::select(vec![
                            "",
                            "; Path=/",
                            "; path=/; HttpOnly",
                            "; Secure; SameSite=Lax",
                            "; Expires=Wed, 21 Oct 2026 07:28:00 GMT",
                        ]),
                    ),
                    0..8
                )
            ) {
                let set_cookies: Vec<String> = cookies
                    .iter()
                    .enumerate()
                    .map(|(idx, (value, attrs))| format!("k{idx}={value}{attrs}"))
                    .collect();
                let expected = cookies
                    .iter()
                    .enumerate()
                    .map(|(idx, (value, _))| format!("k{idx}={value}"))
                    .collect::<Vec<_>>()
                    .join("; ");

                prop_assert_eq!(collate_cookies(set_cookies.iter().map(String::as_str)), expected);
            }
        }
    }
}
