use serde::{Deserialize, Serialize};

/// The token pair that authenticates a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of `POST {auth_prefix}/mobile-login`.
///
/// `U` is the profile shape of the app (checker staff or portal customer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse<U> {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: U,
}

impl<U> LoginResponse<U> {
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Response of `POST {auth_prefix}/mobile-refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

impl From<RefreshResponse> for Session {
    fn from(value: RefreshResponse) -> Self {
        Self {
            access_token: value.access_token,
            refresh_token: value.refresh_token,
        }
    }
}

fn bearer() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::CheckerUser;

    #[test]
    fn login_response_parses_checker_payload() {
        let json = r#"{
            "access_token": "acc",
            "refresh_token": "ref",
            "token_type": "bearer",
            "user": {
                "id": "7f1c",
                "full_name": "Gate One",
                "email": "gate@ferry.test",
                "role": "TICKET_CHECKER",
                "route_id": 2,
                "route_name": "Dabhol - Dhopave"
            }
        }"#;
        let resp: LoginResponse<CheckerUser> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.user.route_id, Some(2));
        assert_eq!(
            resp.session(),
            Session {
                access_token: "acc".into(),
                refresh_token: "ref".into()
            }
        );
    }

    #[test]
    fn token_type_defaults_when_absent() {
        let resp: RefreshResponse =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(resp.token_type, "bearer");
    }
}
