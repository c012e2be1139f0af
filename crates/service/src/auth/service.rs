use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::auth_user::{self, LegacyPaymentStatus, Role};
use models::types::StringList;
use models::validation::{normalize_email, validate_email};

use super::domain::{AdminBootstrap, AuthSession, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_email: String,
    pub bootstrap_password: Option<String>,
}

impl AuthConfig {
    pub fn from_app(cfg: &configs::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_hours: cfg.auth.token_ttl_hours,
            admin_email: cfg.admin.email.clone(),
            bootstrap_password: cfg.admin.bootstrap_password.clone(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    pub fn token_ttl_hours(&self) -> i64 { self.cfg.token_ttl_hours }

    /// Register a new account with a hashed password and open a session for it.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, repository::memory::InMemoryAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 168, admin_email: "admin@roborumble.com".into(), bootstrap_password: None };
    /// let svc = AuthService::new(repo, cfg);
    /// let input = RegisterInput { name: "Ada".into(), team_name: "Sparks".into(), email: "ada@example.com".into(), password: "Secret123".into(), college: "CSJMU".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "ada@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let required = [&input.name, &input.team_name, &input.email, &input.password, &input.college];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(AuthError::Validation("ALL_FIELDS_REQUIRED", "All fields are required".into()));
        }
        let email = normalize_email(&input.email);
        validate_email(&email).map_err(|_| AuthError::Validation("INVALID_EMAIL", "Email address is not valid".into()))?;
        if input.password.len() < 8 {
            return Err(AuthError::Validation("PASSWORD_TOO_SHORT", "password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let now = Utc::now().into();
        let user = auth_user::Model {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email,
            password_hash: hash_password(&input.password)?,
            college: input.college.trim().to_string(),
            events: StringList::default(),
            team_members: StringList::default(),
            payment_status: LegacyPaymentStatus::Pending,
            role: Role::User,
            team_name: Some(input.team_name.trim().to_string()),
            paid_events: StringList::default(),
            transaction_id: None,
            screenshot_url: None,
            declared_amount: None,
            created_at: now,
            updated_at: now,
        };
        let user = self.repo.insert(user).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate with email and password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, repository::memory::InMemoryAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 168, admin_email: "admin@roborumble.com".into(), bootstrap_password: None };
    /// let svc = AuthService::new(repo, cfg);
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { name: "N".into(), team_name: "T".into(), email: "u@e.com".into(), password: "Passw0rd".into(), college: "C".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    pub fn issue_token(&self, user: &auth_user::Model) -> Result<String, AuthError> {
        let exp = (Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: user.id.to_string(), email: user.email.clone(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode and check signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Account behind a verified session; a deleted account invalidates the session.
    pub async fn current_user(&self, claims: &Claims) -> Result<auth_user::Model, AuthError> {
        let id = claims.user_id().ok_or(AuthError::InvalidToken)?;
        self.repo.find_by_id(id).await?.ok_or(AuthError::InvalidToken)
    }

    pub async fn admin_account(&self) -> Result<Option<auth_user::Model>, AuthError> {
        self.repo.find_by_email(&self.cfg.admin_email).await
    }

    /// Create the administrator account, or restore its role and status when it exists.
    #[instrument(skip(self))]
    pub async fn bootstrap_admin(&self) -> Result<(auth_user::Model, AdminBootstrap), AuthError> {
        if let Some(mut existing) = self.admin_account().await? {
            existing.role = Role::Admin;
            existing.team_name = Some("ADMIN_CORE".into());
            existing.payment_status = LegacyPaymentStatus::Approved;
            existing.updated_at = Utc::now().into();
            let user = self.repo.update(existing).await?;
            info!(user_id = %user.id, "admin_restored");
            return Ok((user, AdminBootstrap::Restored));
        }

        let password = self
            .cfg
            .bootstrap_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AuthError::Validation("BOOTSTRAP_PASSWORD_MISSING", "admin.bootstrap_password is not configured".into()))?;
        let now = Utc::now().into();
        let admin = auth_user::Model {
            id: Uuid::new_v4(),
            name: "System Administrator".into(),
            email: normalize_email(&self.cfg.admin_email),
            password_hash: hash_password(password)?,
            college: "CSJMU".into(),
            events: StringList::default(),
            team_members: StringList::default(),
            payment_status: LegacyPaymentStatus::Approved,
            role: Role::Admin,
            team_name: Some("ADMIN_CORE".into()),
            paid_events: StringList::default(),
            transaction_id: None,
            screenshot_url: None,
            declared_amount: None,
            created_at: now,
            updated_at: now,
        };
        let user = self.repo.insert(admin).await?;
        info!(user_id = %user.id, "admin_created");
        Ok((user, AdminBootstrap::Created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::memory::InMemoryAuthRepository;

    fn svc(bootstrap: Option<&str>) -> AuthService<InMemoryAuthRepository> {
        let cfg = AuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl_hours: 168,
            admin_email: "admin@roborumble.com".into(),
            bootstrap_password: bootstrap.map(str::to_string),
        };
        AuthService::new(Arc::new(InMemoryAuthRepository::default()), cfg)
    }

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Ada".into(),
            team_name: "Sparks".into(),
            email: email.into(),
            password: "Passw0rd!".into(),
            college: "CSJMU".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let s = svc(None);
        let session = s.register(input("Ada@Example.com")).await.unwrap();
        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(session.user.payment_status, LegacyPaymentStatus::Pending);
        assert_eq!(session.user.role, Role::User);

        let claims = s.verify_token(&session.token).unwrap();
        assert_eq!(claims.user_id(), Some(session.user.id));

        let login = s.login(LoginInput { email: "ada@example.com".into(), password: "Passw0rd!".into() }).await.unwrap();
        assert_eq!(login.user.id, session.user.id);
    }

    #[tokio::test]
    async fn register_rejects_missing_fields_and_duplicates() {
        let s = svc(None);
        let mut missing = input("a@b.in");
        missing.college = " ".into();
        match s.register(missing).await {
            Err(AuthError::Validation(code, _)) => assert_eq!(code, "ALL_FIELDS_REQUIRED"),
            other => panic!("unexpected: {other:?}"),
        }

        s.register(input("a@b.in")).await.unwrap();
        assert!(matches!(s.register(input("a@b.in")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let s = svc(None);
        s.register(input("x@y.in")).await.unwrap();
        let res = s.login(LoginInput { email: "x@y.in".into(), password: "nope-nope".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let s = svc(None);
        let session = s.register(input("t@y.in")).await.unwrap();
        let mut token = session.token.clone();
        token.push('x');
        assert!(matches!(s.verify_token(&token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn bootstrap_creates_then_restores() {
        let s = svc(Some("adminpassword123"));
        let (admin, outcome) = s.bootstrap_admin().await.unwrap();
        assert_eq!(outcome, AdminBootstrap::Created);
        assert!(admin.is_admin());
        assert_eq!(admin.team_name.as_deref(), Some("ADMIN_CORE"));

        let (again, outcome) = s.bootstrap_admin().await.unwrap();
        assert_eq!(outcome, AdminBootstrap::Restored);
        assert_eq!(again.id, admin.id);
    }

    #[tokio::test]
    async fn bootstrap_without_password_fails() {
        let s = svc(None);
        assert!(matches!(s.bootstrap_admin().await, Err(AuthError::Validation("BOOTSTRAP_PASSWORD_MISSING", _))));
    }
}
