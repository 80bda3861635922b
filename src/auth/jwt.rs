use crate::config::SecurityConfig;
use crate::error::AppResult;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const SESSION_TOKEN_TYPE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

pub fn create_session_token(username: &str, security: &SecurityConfig) -> AppResult<String> {
    let expiration = Utc::now() + Duration::minutes(security.session_expire_minutes);

    let claims = Claims {
        sub: username.to_string(),
        exp: expiration.timestamp(),
        token_type: SESSION_TOKEN_TYPE.to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(security.secret_key.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_session_token(token: &str, secret_key: &str) -> Option<Claims> {
    let validation = Validation::default();

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret_key.as_bytes()),
        &validation,
    ) {
        Ok(data) if data.claims.token_type == SESSION_TOKEN_TYPE => Some(data.claims),
        _ => None,
    }
}
