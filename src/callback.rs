//! OAuth redirect callback parsing.
//!
//! After the identity provider redirects back, the callback URL carries
//! either a `code` query parameter to exchange for a session or an `error`
//! parameter explaining the refusal.

#[cfg(test)]
#[path = "callback_test.rs"]
mod callback_test;

use url::Url;

use crate::error::CallbackError;

/// Extract the authorization code from an identity-provider redirect URL.
///
/// # Errors
///
/// Returns an error if the URL does not parse, the provider reported an
/// error, or no `code` parameter is present.
pub fn parse_callback(callback_url: &str) -> Result<String, CallbackError> {
    let url = Url::parse(callback_url)?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            // Provider error wins over a (bogus) code in the same URL.
            "error" => return Err(CallbackError::Provider(value.into_owned())),
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            _ => {}
        }
    }
    code.ok_or(CallbackError::MissingCode)
}
