//! Sign-in, sign-up and availability checks.

use kanban_core::{CacheKey, ErrorCode, KeyPattern};
use kanban_remote::{Credentials, Endpoint, RemoteRequest, ResourceClient};
use serde_json::{Value, json};
use tracing::info;

use super::keys;
use crate::error::MutationError;
use crate::mutation::{Mutation, RecoveryAction, decode_payload};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Persist credentials across restarts.
    pub keep_signed_in: bool,
}

impl LoginInput {
    fn body(&self) -> Value {
        json!({ "email": self.email, "password": self.password })
    }
}

/// Signs in and stores the issued credentials.
///
/// A deactivated account is reactivated and the login retried once.
#[derive(Debug, Clone)]
pub struct Login {
    session: Session,
}

impl Login {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Mutation for Login {
    type Input = LoginInput;
    type Output = Credentials;

    fn name(&self) -> &'static str {
        "login"
    }

    fn affected_keys(&self, _input: &LoginInput) -> Vec<CacheKey> {
        Vec::new()
    }

    fn exclusive_keys(&self, _input: &LoginInput) -> Vec<CacheKey> {
        vec![keys::me()]
    }

    fn request(&self, input: &LoginInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::Login).with_body(input.body())
    }

    fn commit_keys(&self, _input: &LoginInput) -> Vec<KeyPattern> {
        vec![keys::me().as_pattern()]
    }

    fn decode(&self, _input: &LoginInput, payload: Value) -> Result<Credentials, MutationError> {
        decode_payload(payload)
    }

    fn on_committed(&self, input: &LoginInput, credentials: &Credentials) -> Result<(), MutationError> {
        self.session
            .sign_in(credentials, input.keep_signed_in)
            .map(|_| ())
            .map_err(|e| MutationError::Aborted(format!("cannot store credentials: {}", e)))
    }

    fn on_conflict(&self, error: &MutationError, input: &LoginInput) -> RecoveryAction {
        if error.is_conflict(&ErrorCode::DeactivatedAccount) {
            info!("Account deactivated, reactivating before retrying login");
            return RecoveryAction::RetryAfter(
                RemoteRequest::new(Endpoint::Reactivate).with_body(input.body()),
            );
        }
        RecoveryAction::Surface
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

/// Creates an account. The email must have been verified first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignUp;

impl Mutation for SignUp {
    type Input = SignUpInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "sign_up"
    }

    fn affected_keys(&self, _input: &SignUpInput) -> Vec<CacheKey> {
        Vec::new()
    }

    fn request(&self, input: &SignUpInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::SignUp).with_body(json!({
            "email": input.email,
            "password": input.password,
            "nickname": input.nickname,
        }))
    }

    fn commit_keys(&self, _input: &SignUpInput) -> Vec<KeyPattern> {
        Vec::new()
    }

    fn decode(&self, _input: &SignUpInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

/// Sends a verification code to an email address.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendVerification;

impl Mutation for SendVerification {
    type Input = String;
    type Output = ();

    fn name(&self) -> &'static str {
        "send_verification"
    }

    fn affected_keys(&self, _email: &String) -> Vec<CacheKey> {
        Vec::new()
    }

    fn request(&self, email: &String) -> RemoteRequest {
        RemoteRequest::new(Endpoint::SendVerification).with_body(json!({ "email": email }))
    }

    fn commit_keys(&self, _email: &String) -> Vec<KeyPattern> {
        Vec::new()
    }

    fn decode(&self, _email: &String, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationInput {
    pub email: String,
    pub code: String,
}

/// Confirms a verification code.
///
/// A wrong code is a validation error on `verificationCode`; an expired
/// one is a conflict and the flow restarts from [`SendVerification`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmVerification;

impl Mutation for ConfirmVerification {
    type Input = VerificationInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "confirm_verification"
    }

    fn affected_keys(&self, _input: &VerificationInput) -> Vec<CacheKey> {
        Vec::new()
    }

    fn request(&self, input: &VerificationInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::VerifyCode)
            .with_body(json!({ "email": input.email, "code": input.code }))
    }

    fn commit_keys(&self, _input: &VerificationInput) -> Vec<KeyPattern> {
        Vec::new()
    }

    fn decode(&self, _input: &VerificationInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

/// Field whose availability can be checked before sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckField {
    Email,
    Nickname,
}

impl CheckField {
    fn endpoint(&self) -> Endpoint {
        match self {
            Self::Email => Endpoint::CheckEmail,
            Self::Nickname => Endpoint::CheckNickname,
        }
    }

    fn param(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Nickname => "nickname",
        }
    }

    /// Asks the backend whether `value` is still free.
    ///
    /// A taken value fails with [`MutationError::Validation`] naming the
    /// field. Nothing is cached and nothing is rolled back.
    pub async fn check(&self, client: &dyn ResourceClient, value: &str) -> Result<(), MutationError> {
        let request = RemoteRequest::new(self.endpoint()).with_query(self.param(), value);
        client.call(&request).await.map(|_| ()).map_err(MutationError::from)
    }
}
