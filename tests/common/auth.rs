use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use teatrack_backend::auth::{Claims, USER_TOKEN_TYPE};

use super::app::TestApp;

/// 线上 token 由账号服务签发，测试里按同样的 claims 自行签名
pub fn sign_user_token(user_id: &str, secret: &str, ttl: Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        token_type: USER_TOKEN_TYPE.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign test token")
}

/// 为随机用户签发 token，返回 (user_id, token)
pub fn new_user_token(app: &TestApp) -> (String, String) {
    let user_id = format!("user-{}", uuid::Uuid::new_v4().simple());
    let token = token_for(app, &user_id);
    (user_id, token)
}

pub fn token_for(app: &TestApp, user_id: &str) -> String {
    sign_user_token(user_id, &app.config.jwt_secret, Duration::hours(1))
}

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}
