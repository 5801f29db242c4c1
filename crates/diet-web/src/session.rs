//! Cookie transport for the session identity.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use diet_core::config::SessionConfig;
use diet_core::model::SessionId;
use diet_core::session::{identify, Identified};

use crate::AppState;

/// The resolved caller, available to handlers as `Extension<Caller>`.
#[derive(Debug, Clone)]
pub struct Caller {
    pub session: SessionId,
}

/// Resolve (or mint) the caller's session before the handler runs, and hand
/// a freshly minted token back to the client as a cookie.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_config = &state.config.session;
    let token = cookie_value(req.headers(), &session_config.cookie_name);
    let Identified { session, is_new } = identify(token);

    req.extensions_mut().insert(Caller {
        session: session.clone(),
    });

    let mut response = next.run(req).await;

    if is_new {
        match HeaderValue::from_str(&session_cookie(session_config, &session)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("failed to encode session cookie: {e}"),
        }
    }

    response
}

/// Find the value of cookie `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

pub fn session_cookie(config: &SessionConfig, session: &SessionId) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name,
        session,
        config.max_age_secs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn test_cookie_value_found_among_others() {
        let headers = headers(&["theme=dark; sessionId=abc-123; lang=en"]);
        assert_eq!(cookie_value(&headers, "sessionId"), Some("abc-123"));
    }

    #[test]
    fn test_cookie_value_across_multiple_headers() {
        let headers = headers(&["theme=dark", "sessionId=xyz"]);
        assert_eq!(cookie_value(&headers, "sessionId"), Some("xyz"));
    }

    #[test]
    fn test_cookie_value_exact_name_match() {
        let headers = headers(&["mysessionId=nope; sessionIdX=nope"]);
        assert_eq!(cookie_value(&headers, "sessionId"), None);
    }

    #[test]
    fn test_cookie_value_absent() {
        assert_eq!(cookie_value(&HeaderMap::new(), "sessionId"), None);
    }

    #[test]
    fn test_session_cookie_format() {
        let config = SessionConfig::default();
        let session = SessionId::parse("tok").unwrap();
        assert_eq!(
            session_cookie(&config, &session),
            "sessionId=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
    }
}
