use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    middleware::CurrentUser,
    models::{CreateUser, NewUser, Operation, Role, User},
    repository::DynInventoryStore,
    utils::{create_token, hash_password, verify_password, verify_token, Claims},
};

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

pub struct AuthService {
    store: DynInventoryStore,
    settings: AuthSettings,
    // Verified against when the username is unknown.
    dummy_hash: Option<String>,
}

impl AuthService {
    pub fn new(store: DynInventoryStore, settings: AuthSettings) -> Self {
        let dummy_hash = hash_password("stockroom-dummy-password", settings.bcrypt_cost)
            .map_err(|err| warn!("Could not prepare dummy password hash: {}", err))
            .ok();
        Self { store, settings, dummy_hash }
    }

    pub fn token_ttl_hours(&self) -> i64 {
        self.settings.token_ttl_hours
    }

    /// Checks the credentials and issues an access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), ServiceError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            if let Some(hash) = &self.dummy_hash {
                let _ = verify_password(password, hash);
            }
            warn!("Failed login for {}", username);
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for {}", username);
            return Err(ServiceError::InvalidCredentials);
        }

        let claims = Claims::new(
            user.id,
            user.username.clone(),
            user.role,
            self.settings.token_ttl_hours,
        );
        let token = create_token(&claims, &self.settings.jwt_secret)?;

        info!("{} signed in", user.username);
        Ok((user, token))
    }

    /// Resolves a token to the user it was issued for. The role comes from
    /// the stored user, so a changed role applies to tokens already issued.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, ServiceError> {
        let claims = verify_token(token, &self.settings.jwt_secret)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ServiceError::Unauthenticated)?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        Ok(CurrentUser::from(user))
    }

    pub async fn create_user(&self, actor: &CurrentUser, req: &CreateUser) -> Result<User, ServiceError> {
        actor.require(Operation::ManageUsers)?;
        let req = req.normalized();
        req.validate()?;

        let user = self.provision(&req.username, &req.password, req.role).await?;
        info!("{} created {} account {}", actor.username, user.role, user.username);
        Ok(user)
    }

    pub async fn provision(&self, username: &str, password: &str, role: Role) -> Result<User, ServiceError> {
        let password_hash = hash_password(password, self.settings.bcrypt_cost)?;
        let user = self
            .store
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;
        Ok(user)
    }

    /// Creates the bootstrap manager unless a user with that name exists.
    pub async fn ensure_manager(&self, username: &str, password: &str) -> Result<(), ServiceError> {
        if self.store.find_user_by_username(username).await?.is_some() {
            return Ok(());
        }

        self.provision(username, password, Role::Manager).await?;
        info!("Bootstrap manager {} created", username);
        Ok(())
    }
}
