use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Bearer token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // actor id
    pub exp: usize,
}

/// The authenticated user performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
}

pub fn decode_actor(token: &str, config: &Config) -> Result<Actor, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        log::debug!("Rejected bearer token: {}", e);
        AppError::Unauthorized
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(Actor {
        id: token_data.claims.sub,
    })
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        let result = match (token, req.app_data::<Data<Config>>()) {
            (Some(token), Some(config)) => decode_actor(token, config),
            (None, _) => Err(AppError::Unauthorized),
            (Some(_), None) => Err(AppError::internal_server_error_message(
                "Config not registered as app data",
            )),
        };

        ready(result)
    }
}
