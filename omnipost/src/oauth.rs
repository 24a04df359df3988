use reqwest::Url;

/// What a platform's OAuth redirect told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Authorized { code: String, state: String },
    /// The user (or the provider) refused; `error` is the provider's error parameter
    Denied { error: String },
    /// Missing code or state, or not a URL at all
    Invalid,
}

impl CallbackOutcome {
    /// Interprets the redirect URL the platform sent the browser back to
    pub fn from_url(redirect: &str) -> Self {
        let url = match Url::parse(redirect) {
            Ok(url) => url,
            Err(_) => return CallbackOutcome::Invalid,
        };
        let mut code = None;
        let mut state = None;
        for (k, v) in url.query_pairs() {
            match &*k {
                "error" => {
                    return CallbackOutcome::Denied {
                        error: v.into_owned(),
                    }
                }
                "code" if !v.is_empty() => code = Some(v.into_owned()),
                "state" if !v.is_empty() => state = Some(v.into_owned()),
                _ => {}
            }
        }
        match (code, state) {
            (Some(code), Some(state)) => CallbackOutcome::Authorized { code, state },
            _ => CallbackOutcome::Invalid,
        }
    }
}

#[test]
fn test_callback_outcome() {
    assert_eq!(
        CallbackOutcome::from_url(
            "http://localhost:5173/auth/callback/twitter?code=abc%2F123&state=xyz"
        ),
        CallbackOutcome::Authorized {
            code: "abc/123".to_string(),
            state: "xyz".to_string()
        }
    );
    assert_eq!(
        CallbackOutcome::from_url(
            "http://localhost:5173/auth/callback/facebook?error=access_denied&state=xyz"
        ),
        CallbackOutcome::Denied {
            error: "access_denied".to_string()
        }
    );
    assert_eq!(
        CallbackOutcome::from_url("http://localhost:5173/auth/callback/tiktok?code=abc"),
        CallbackOutcome::Invalid
    );
    assert_eq!(
        CallbackOutcome::from_url("http://localhost/cb?code=&state=xyz"),
        CallbackOutcome::Invalid
    );
    assert_eq!(
        CallbackOutcome::from_url("not a url"),
        CallbackOutcome::Invalid
    );
}
