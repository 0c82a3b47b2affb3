use serde::{Deserialize, Serialize};

/// Token claims as issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    /// Role names, e.g. ["teacher"] or ["admin", "supervisor"]
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to a teacher record
    #[serde(default)]
    pub teacher_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
