use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    api::{ApiResponse, ApiState, TransportError},
    error::StoreError,
    models::{RegistrationProfile, Role, Session},
    storage::{AUTH_TOKEN_KEY, AUTHENTICATED_KEY, StorageState, USER_KEY},
};

/// LoginResponse
///
/// Success body of the login endpoints. `role` is a list of role names on `/login`
/// and may be a bare string elsewhere; the admin endpoint omits it entirely.
#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    role: Option<RoleField>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleField {
    List(Vec<String>),
    Single(String),
}

impl RoleField {
    /// The first role listed decides; an empty list means customer.
    fn primary(&self) -> Role {
        match self {
            RoleField::List(names) => names
                .first()
                .map(|name| Role::from_name(name))
                .unwrap_or_default(),
            RoleField::Single(name) => Role::from_name(name),
        }
    }
}

/// AuthStore
///
/// Owns the session for the current run. Every successful sign-in writes the session
/// through to durable storage in the same call, and every sign-out removes it, so
/// `check_session` on the next start sees exactly what this store last held.
pub struct AuthStore {
    api: ApiState,
    storage: StorageState,
    session: Option<Session>,
    authenticated: bool,
    role: Option<Role>,
}

impl AuthStore {
    pub fn new(api: ApiState, storage: StorageState) -> Self {
        Self {
            api,
            storage,
            session: None,
            authenticated: false,
            role: None,
        }
    }

    // --- Getters ---

    pub fn current_user(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_customer(&self) -> bool {
        self.role == Some(Role::Customer)
    }

    // --- Actions ---

    /// login
    ///
    /// Signs in with email and password. The session role is the first role the
    /// backend lists for the account.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, StoreError> {
        let response = self
            .api
            .post(
                "/api/login",
                json!({ "user_mail": email, "user_pass": password }),
            )
            .await?;

        let body = Self::accepted(&response, "Login failed")?;
        let role = body
            .role
            .as_ref()
            .map(RoleField::primary)
            .unwrap_or_default();

        let session = Session {
            email: email.to_string(),
            name: None,
            role,
            message: body.message,
        };
        self.establish(session, body.auth_token)
    }

    /// admin_login
    ///
    /// Signs in through the admin-only endpoint. The backend refuses non-admins, so a
    /// success always yields an admin session.
    pub async fn admin_login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Session, StoreError> {
        let response = self
            .api
            .post(
                "/api/admin/login",
                json!({ "user_mail": email, "user_pass": password }),
            )
            .await?;

        let body = Self::accepted(&response, "Admin login failed")?;
        let session = Session {
            email: email.to_string(),
            name: None,
            role: Role::Admin,
            message: body.message,
        };
        self.establish(session, body.auth_token)
    }

    /// register
    ///
    /// Creates an account and signs it in. The request always asks for the customer
    /// role; an elevated role is only honoured when the backend reports it back.
    pub async fn register(&mut self, profile: &RegistrationProfile) -> Result<Session, StoreError> {
        let response = self
            .api
            .post(
                "/api/register",
                json!({
                    "user_mail": profile.email,
                    "user_name": profile.full_name,
                    "user_pass": profile.password,
                    "qualification": profile.qualification,
                    "dob": profile.date_of_birth,
                    "role": Role::Customer.as_str(),
                }),
            )
            .await?;

        let body = Self::accepted(&response, "Registration failed")?;
        let role = body
            .role
            .as_ref()
            .map(RoleField::primary)
            .unwrap_or_default();

        let session = Session {
            email: profile.email.clone(),
            name: Some(profile.full_name.clone()),
            role,
            message: body.message,
        };
        self.establish(session, body.auth_token)
    }

    /// logout
    ///
    /// Tells the backend, then forgets the session locally whatever the backend said.
    pub async fn logout(&mut self) {
        match self.api.send(Method::POST, "/api/logout", None).await {
            Ok(response) if !response.is_success() => {
                tracing::warn!(status = response.status, "logout rejected by backend");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "logout request failed"),
        }

        self.session = None;
        self.role = None;
        self.authenticated = false;
        self.api.set_auth_token(None);

        for key in [USER_KEY, AUTHENTICATED_KEY, AUTH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(error = %e, key, "failed to clear stored session key");
            }
        }
        tracing::info!("session cleared");
    }

    /// check_session
    ///
    /// Restores a persisted session, if there is a valid one. Never touches the network.
    pub fn check_session(&mut self) -> bool {
        if self.storage.get(AUTHENTICATED_KEY).as_deref() != Some("true") {
            return false;
        }
        let Some(raw) = self.storage.get(USER_KEY) else {
            return false;
        };
        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable stored session");
                return false;
            }
        };

        self.api.set_auth_token(self.storage.get(AUTH_TOKEN_KEY));
        self.role = Some(session.role);
        self.session = Some(session);
        self.authenticated = true;
        true
    }

    // --- Internals ---

    /// Checks the status, then reads the optional fields of the success body.
    ///
    /// Registration answers 201 with only a message, and an empty body decodes as no
    /// fields at all. A 2xx body that is not a JSON object, or whose fields have the
    /// wrong types, is a transport failure: the sign-in is not trusted.
    fn accepted(response: &ApiResponse, fallback: &str) -> Result<LoginResponse, StoreError> {
        if !response.is_success() {
            let message = response.error_message(fallback);
            tracing::warn!(status = response.status, %message, "authentication rejected");
            return Err(StoreError::rejected(response.status, message));
        }
        match &response.body {
            Value::Null => Ok(LoginResponse::default()),
            Value::Object(_) => Ok(response.decode()?),
            other => Err(TransportError(format!("unexpected response body: {other}")).into()),
        }
    }

    /// Installs `session` in memory and in storage as one step. If storage refuses any
    /// write, both the in-memory state and the stored keys are put back.
    fn establish(
        &mut self,
        session: Session,
        auth_token: Option<String>,
    ) -> Result<Session, StoreError> {
        let previous = (self.session.take(), self.authenticated, self.role);

        self.session = Some(session.clone());
        self.role = Some(session.role);
        self.authenticated = true;

        if let Err(e) = self.persist(&session, auth_token.as_deref()) {
            tracing::error!(error = %e, "failed to persist session");
            (self.session, self.authenticated, self.role) = previous;
            return Err(e);
        }

        self.api.set_auth_token(auth_token);
        tracing::info!(email = %session.email, role = session.role.as_str(), "signed in");
        Ok(session)
    }

    /// Writes the three session keys. If any write fails, the keys already written
    /// are put back to what they held before, so storage still describes the previous
    /// session (or none) exactly.
    fn persist(&self, session: &Session, auth_token: Option<&str>) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(session)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        // The flag goes last: a restart only trusts `user` once it is set.
        let writes = [
            (AUTH_TOKEN_KEY, auth_token.map(str::to_string)),
            (USER_KEY, Some(serialized)),
            (AUTHENTICATED_KEY, Some("true".to_string())),
        ];

        let mut applied: Vec<(&str, Option<String>)> = Vec::with_capacity(writes.len());
        for (key, value) in writes {
            let previous = self.storage.get(key);
            let written = match &value {
                Some(value) => self.storage.set(key, value),
                None => self.storage.remove(key),
            };
            if let Err(e) = written {
                self.restore(applied);
                return Err(e.into());
            }
            applied.push((key, previous));
        }
        Ok(())
    }

    fn restore(&self, applied: Vec<(&str, Option<String>)>) {
        for (key, previous) in applied.into_iter().rev() {
            let restored = match &previous {
                Some(value) => self.storage.set(key, value),
                None => self.storage.remove(key),
            };
            if let Err(e) = restored {
                tracing::error!(error = %e, key, "failed to restore stored session key");
            }
        }
    }
}
