use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{password_rule_failures, AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub password_algorithm: String,
}

/// Bearer token payload: the authenticated user id and expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verify signature and expiry, returning the embedded user id.
/// Pure function; safe to call concurrently from middleware.
pub fn decode_token(jwt_secret: &str, token: &str) -> Result<Uuid, AuthError> {
    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Uuid::parse_str(&data.claims.sub).map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_secs: 3600, password_algorithm: "argon2".into() });
    /// let input = RegisterInput { username: "alice".into(), email: "a@x.com".into(), password: "Abcd12#!".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "alice");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let failures = password_rule_failures(&input.password);
        if !failures.is_empty() {
            return Err(AuthError::Validation(failures.join("; ")));
        }

        let user = self.repo.create_user(&input.username, &input.email).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self
            .repo
            .upsert_password(user.id, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a signed bearer token.
    ///
    /// Unknown username and wrong password both yield
    /// [`AuthError::InvalidCredentials`] with no distinguishing detail.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "secret".into(), token_ttl_secs: 3600, password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "bob".into(), email: "b@x.com".into(), password: "Passw0rd!".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "bob".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.user.username, "bob");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let cred = self
            .repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed =
            PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default()
            .verify_password(input.password.as_bytes(), &parsed)
            .is_err()
        {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(user.id)?;
        Ok(AuthSession { user, token })
    }

    fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::seconds(self.cfg.token_ttl_secs))
            .timestamp() as usize;
        let claims = Claims { sub: user_id.to_string(), exp };
        encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig {
                jwt_secret: "test-secret".into(),
                token_ttl_secs: 3600,
                password_algorithm: "argon2".into(),
            },
        )
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let svc = svc();
        let user = svc
            .register(RegisterInput {
                username: "alice".into(),
                email: "a@x.com".into(),
                password: "Abcd12#!".into(),
            })
            .await
            .unwrap();

        let session = svc
            .login(LoginInput { username: "alice".into(), password: "Abcd12#!".into() })
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);

        // Token embeds the registered user's id
        let uid = decode_token("test-secret", &session.token).unwrap();
        assert_eq!(uid, user.id);
    }

    #[tokio::test]
    async fn weak_password_rejected_with_rule_names() {
        let svc = svc();
        let err = svc
            .register(RegisterInput {
                username: "weak".into(),
                email: "w@x.com".into(),
                password: "abcdef".into(),
            })
            .await
            .unwrap_err();
        match err {
            AuthError::Validation(msg) => {
                assert!(msg.contains("uppercase"));
                assert!(msg.contains("number"));
                assert!(msg.contains("special character"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let svc = svc();
        svc.register(RegisterInput {
            username: "carol".into(),
            email: "c@x.com".into(),
            password: "Abcd12#!".into(),
        })
        .await
        .unwrap();

        let wrong_password = svc
            .login(LoginInput { username: "carol".into(), password: "Wrong12#!".into() })
            .await
            .unwrap_err();
        let unknown_user = svc
            .login(LoginInput { username: "nobody".into(), password: "Abcd12#!".into() })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_repository_error() {
        let svc = svc();
        let input = RegisterInput {
            username: "dup".into(),
            email: "d@x.com".into(),
            password: "Abcd12#!".into(),
        };
        svc.register(input.clone()).await.unwrap();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Repository(_)));
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let svc = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig {
                jwt_secret: "test-secret".into(),
                // well past jsonwebtoken's default 60s leeway
                token_ttl_secs: -300,
                password_algorithm: "argon2".into(),
            },
        );
        svc.register(RegisterInput {
            username: "late".into(),
            email: "l@x.com".into(),
            password: "Abcd12#!".into(),
        })
        .await
        .unwrap();
        let session = svc
            .login(LoginInput { username: "late".into(), password: "Abcd12#!".into() })
            .await
            .unwrap();
        assert!(matches!(
            decode_token("test-secret", &session.token),
            Err(AuthError::TokenError(_))
        ));
    }

    #[tokio::test]
    async fn tampered_token_rejected() {
        let svc = svc();
        svc.register(RegisterInput {
            username: "eve".into(),
            email: "e@x.com".into(),
            password: "Abcd12#!".into(),
        })
        .await
        .unwrap();
        let session = svc
            .login(LoginInput { username: "eve".into(), password: "Abcd12#!".into() })
            .await
            .unwrap();
        assert!(decode_token("other-secret", &session.token).is_err());
        let mut tampered = session.token.clone();
        tampered.push('x');
        assert!(decode_token("test-secret", &tampered).is_err());
    }
}
