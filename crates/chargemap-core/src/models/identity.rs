use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "fullname", alias = "fullName", default)]
    pub full_name: String,
}

impl Identity {
    /// Name to show in the status bar, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup form as typed by the user, including the confirmation field.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }

    pub(crate) fn request(&self) -> SignupRequest<'_> {
        SignupRequest {
            email: &self.email,
            username: &self.username,
            fullname: &self.full_name,
            password: &self.password,
        }
    }
}

/// Wire body for `POST /api/auth/signup`; the confirmation never leaves the client.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub fullname: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity() {
        let json = r#"{"_id":"u1","email":"a@b.com","username":"ann","fullname":"Ann Bell"}"#;
        let identity: Identity = serde_json::from_str(json).expect("identity should parse");
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.full_name, "Ann Bell");
        assert_eq!(identity.display_name(), "Ann Bell");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let json = r#"{"id":"u1","email":"a@b.com","username":"ann"}"#;
        let identity: Identity = serde_json::from_str(json).expect("identity should parse");
        assert_eq!(identity.display_name(), "ann");
    }

    #[test]
    fn test_signup_request_omits_confirmation() {
        let form = SignupForm {
            username: "ann".to_string(),
            full_name: "Ann Bell".to_string(),
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
        };
        let body = serde_json::to_value(form.request()).expect("body should serialize");
        assert_eq!(body["fullname"], "Ann Bell");
        assert!(body.get("confirmPassword").is_none());
        assert!(body.get("confirm_password").is_none());
    }
}
