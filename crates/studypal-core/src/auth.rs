//! The authentication collaborator boundary.
//!
//! Authentication itself lives outside the engine. Whatever performs it hands
//! the engine an [`Identity`] through the synchronous
//! [`StudyEngine::sign_in`](crate::StudyEngine::sign_in); its own timing model
//! stays behind this trait.

use std::future::Future;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
  /// Display name supplied at registration; `None` for a plain sign-in.
  pub name:     Option<String>,
}

/// Who the authenticator says the user is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub name:  String,
  pub email: String,
}

pub trait Authenticator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn authenticate<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + 'a;
}
