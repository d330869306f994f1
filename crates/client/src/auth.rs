//! Signup flow and form validation.
//!
//! Validation happens entirely client-side before any request goes out;
//! the auth service applies its own policy on top (duplicate emails,
//! server-side password rules) and those rejections come back as
//! [`RemoteError::Auth`](crate::remote::RemoteError::Auth).

use grocer_core::{Email, NameError, PersonName};

use crate::error::{GrocerError, ValidationError};
use crate::models::User;
use crate::remote::{AuthClient, AuthSession, RemoteError};
use crate::repos::{ProfileInsert, UserRepository};

/// Minimum password length accepted by the form.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw signup form input, exactly as the caller collected it.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password repeated for confirmation.
    pub confirm_password: String,
}

/// A signup form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedSignup {
    /// Parsed name.
    pub name: PersonName,
    /// Parsed email.
    pub email: Email,
    /// The password, length-checked and confirmed.
    pub password: String,
}

/// What happened after a successful signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The account is active and a session was issued.
    SignedIn,
    /// The service wants the email confirmed before issuing tokens.
    ConfirmEmail,
}

impl SignupForm {
    /// Validate the form, field by field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, tagged with the
    /// offending field.
    pub fn validate(&self) -> Result<ValidatedSignup, ValidationError> {
        let name = PersonName::parse(&self.first_name, &self.last_name)
            .map_err(|e| ValidationError::new(name_field(&e), e.to_string()))?;

        let email = Email::parse(self.email.trim())
            .map_err(|e| ValidationError::new("email", e.to_string()))?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(
                "password",
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }

        if self.password != self.confirm_password {
            return Err(ValidationError::new(
                "confirm_password",
                "passwords do not match",
            ));
        }

        Ok(ValidatedSignup {
            name,
            email,
            password: self.password.clone(),
        })
    }
}

fn name_field(error: &NameError) -> &'static str {
    let part = match error {
        NameError::TooShort { part, .. } | NameError::TooLong { part, .. } => part,
    };
    if *part == "first name" {
        "first_name"
    } else {
        "last_name"
    }
}

/// Seam over the auth service's account registration.
///
/// Implemented by [`AuthClient`] for the hosted service; tests script it.
pub trait SignupBackend: Send + Sync {
    /// Register a new account.
    fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, RemoteError>> + Send;
}

impl SignupBackend for AuthClient {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, RemoteError> {
        AuthClient::sign_up(self, email, password).await
    }
}

/// Seam over profile-row storage.
///
/// Implemented by [`UserRepository`] for the hosted service.
pub trait ProfileStore: Send + Sync {
    /// Insert the profile row for a freshly signed-up user.
    fn insert_profile(
        &self,
        profile: &ProfileInsert,
    ) -> impl Future<Output = Result<User, RemoteError>> + Send;
}

impl ProfileStore for UserRepository {
    async fn insert_profile(&self, profile: &ProfileInsert) -> Result<User, RemoteError> {
        UserRepository::insert_profile(self, profile).await
    }
}

/// Registers accounts: validates the form, creates the auth user, and
/// inserts the matching profile row.
#[derive(Clone)]
pub struct SignupFlow<A: SignupBackend, P: ProfileStore> {
    auth: A,
    users: P,
}

impl<A: SignupBackend, P: ProfileStore> SignupFlow<A, P> {
    /// Create a signup flow over the given clients.
    #[must_use]
    pub const fn new(auth: A, users: P) -> Self {
        Self { auth, users }
    }

    /// Run the full signup: validate, register, insert profile.
    ///
    /// The profile row carries the auth service's user id so later
    /// queries can join the two.
    ///
    /// # Errors
    ///
    /// Returns [`GrocerError::Validation`] if the form is invalid and
    /// [`GrocerError::Remote`] if the auth service rejects the signup or
    /// the profile insert fails. A profile-insert failure after the auth
    /// user exists is surfaced, not swallowed; retrying the insert is the
    /// caller's recovery path.
    pub async fn sign_up(&self, form: &SignupForm) -> Result<SignupOutcome, GrocerError> {
        let validated = form.validate()?;

        tracing::info!(email = %validated.email, "signing up");
        let session = self
            .auth
            .sign_up(&validated.email, &validated.password)
            .await?;

        self.users
            .insert_profile(&ProfileInsert {
                id: session.user.id,
                email: validated.email,
                first_name: validated.name.first().to_owned(),
                last_name: validated.name.last().to_owned(),
            })
            .await?;

        if session.session.is_some() {
            Ok(SignupOutcome::SignedIn)
        } else {
            tracing::info!("signup pending email confirmation");
            Ok(SignupOutcome::ConfirmEmail)
        }
    }
}
