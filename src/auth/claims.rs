use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of JWT: access or refresh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[serde(alias = "Access")]
    Access,
    #[serde(alias = "Refresh")]
    Refresh,
}

/// JWT payload. Carries the caller's identity and roles so that handlers
/// never reach into ambient security state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,           // user ID
    pub username: String,    // stored username
    pub roles: Vec<String>,  // role tags, e.g. ROLE_ADMIN
    pub iat: usize,          // issued at (unix timestamp)
    pub exp: usize,          // expires at (unix timestamp)
    pub iss: String,         // issuer
    pub aud: String,         // audience
    pub kind: TokenKind,     // access or refresh
}
