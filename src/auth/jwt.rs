use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes and validates an access token. Refresh tokens are rejected.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("access token required".to_string());
    }
    Ok(claims)
}


#[cfg(test)]
mod tests {
    use super::testing::{access_token, token};
    use super::*;

    #[test]
    fn access_token_round_trips_roles_and_teacher() {
        let raw = access_token(5, &["teacher"], Some(7), "secret");
        let claims = verify_access_token(&raw, "secret").unwrap();

        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.roles, vec!["teacher".to_string()]);
        assert_eq!(claims.teacher_id, Some(7));
    }

    #[test]
    fn refresh_tokens_and_wrong_secrets_are_rejected() {
        let refresh = token(5, &["admin"], None, TokenType::Refresh, "secret");
        assert!(verify_access_token(&refresh, "secret").is_err());

        let access = access_token(5, &["admin"], None, "secret");
        assert!(verify_access_token(&access, "other").is_err());
    }
}
