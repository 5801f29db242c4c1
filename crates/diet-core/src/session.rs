//! Session identity provider.
//!
//! The token *is* the identity: there is no server-side session table, and
//! a presented token is never checked against anything. Carrying the token
//! back to the client is the HTTP layer's job.

use crate::model::SessionId;

/// Result of resolving the caller behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identified {
    pub session: SessionId,
    /// The token was minted for this request and must be handed back to the client.
    pub is_new: bool,
}

/// Resolve the caller from an optional client-presented token.
///
/// A syntactically plausible token is returned unchanged. Anything else,
/// including no token at all, mints a new one. Never fails.
pub fn identify(token: Option<&str>) -> Identified {
    match token.and_then(SessionId::parse) {
        Some(session) => Identified {
            session,
            is_new: false,
        },
        None => {
            let session = SessionId::mint();
            tracing::debug!(session = %session, "minted new session");
            Identified {
                session,
                is_new: true,
            }
        }
    }
}
