use serde::{Deserialize, Serialize};

use crate::{domain::AuthProvider, error::AppError};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SignInRequest {
    Password { email: String, password: String },
    Apple { identity_token: String },
    Google { id_token: String },
}

impl SignInRequest {
    pub fn provider(&self) -> AuthProvider {
        match self {
            SignInRequest::Password { .. } => AuthProvider::Local,
            SignInRequest::Apple { .. } => AuthProvider::Apple,
            SignInRequest::Google { .. } => AuthProvider::Google,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            SignInRequest::Password { email, password } => {
                let email = email.trim();
                let well_formed = email
                    .split_once('@')
                    .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
                if !well_formed {
                    return Err(AppError::validation(format!("invalid email address '{email}'")));
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(AppError::validation(format!(
                        "invalid password: at least {MIN_PASSWORD_LEN} characters required"
                    )));
                }
                Ok(())
            }
            SignInRequest::Apple { identity_token } if identity_token.trim().is_empty() => {
                Err(AppError::validation("missing Apple identity token"))
            }
            SignInRequest::Google { id_token } if id_token.trim().is_empty() => {
                Err(AppError::validation("missing Google id token"))
            }
            _ => Ok(()),
        }
    }
}
