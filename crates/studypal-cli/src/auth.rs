//! Offline authentication: accepts any credentials and derives an identity
//! from them. Stands in for a real identity provider.

use std::future::Future;

use studypal_core::{
  auth::{Authenticator, Credentials, Identity},
  text::capitalize_first,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("an email address is required")]
  MissingEmail,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAuthenticator;

impl Authenticator for OfflineAuthenticator {
  type Error = AuthError;

  fn authenticate<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + 'a {
    async move {
      let email = credentials.email.trim();
      if email.is_empty() {
        return Err(AuthError::MissingEmail);
      }
      let name = match &credentials.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
        _ => name_from_email(email),
      };
      Ok(Identity { name, email: email.to_owned() })
    }
  }
}

/// `"jane.doe@example.com"` → `"Jane.doe"`.
fn name_from_email(email: &str) -> String {
  match email.split('@').next() {
    Some(local) if !local.is_empty() => capitalize_first(&local.to_lowercase()),
    _ => "User".to_owned(),
  }
}
