//! Account registration checks run before anything is sent to the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Outcome, ResourceStore};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";
pub const ADMIN_PREFIX: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be at least 8 characters")]
    TooShort,
    #[error("password needs an uppercase letter")]
    MissingUppercase,
    #[error("password needs a lowercase letter")]
    MissingLowercase,
    #[error("password needs a digit")]
    MissingDigit,
    #[error("password needs a symbol such as ! @ # $ %")]
    MissingSymbol,
}

/// Reports the first unmet requirement.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(PasswordError::MissingSymbol);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error(transparent)]
    WeakPassword(#[from] PasswordError),
    #[error("name cannot be empty")]
    EmptyName,
    #[error("administrator names must start with 'admin'")]
    MissingAdminPrefix,
    #[error("email looks invalid")]
    InvalidEmail,
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Accounts registered from the admin screen need an `admin` name prefix.
    pub require_admin_prefix: bool,
}

/// What the users collection receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(self) -> Result<NewUser, RegistrationError> {
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }
        validate_password(&self.password)?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.require_admin_prefix && !self.name.starts_with(ADMIN_PREFIX) {
            return Err(RegistrationError::MissingAdminPrefix);
        }
        let email = self.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(RegistrationError::InvalidEmail);
        }

        Ok(NewUser {
            name: name.to_string(),
            surname: self.surname.trim().to_string(),
            email: email.to_string(),
            password: self.password,
        })
    }

    /// Validate, then create the account through the users store.
    pub async fn submit(self, users: &ResourceStore<Value>) -> Result<Outcome<Value>, RegistrationError> {
        let user = self.validate()?;
        let body = serde_json::json!({
            "name": user.name,
            "surname": user.surname,
            "email": user.email,
            "password": user.password,
        });
        Ok(users.create(&body).await)
    }
}
