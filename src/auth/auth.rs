use crate::auth::jwt::verify_access_token;
use crate::auth::policy::Caller;
use crate::config::Config;
use crate::model::role::CapabilitySet;
use crate::models::Claims;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub caller: Caller,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            username: claims.sub,
            caller: Caller {
                user_id: claims.user_id,
                capabilities: CapabilitySet::from_names(&claims.roles),
                teacher_id: claims.teacher_id,
            },
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already verified by the middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ));
            }
        };

        match verify_access_token(token, &config.jwt_secret) {
            Ok(claims) => ready(Ok(AuthUser::from(claims))),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
        }
    }
}
