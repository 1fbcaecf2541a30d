use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of a login response. A present `token` means the login succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct LoginUser {
    pub employee_id: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct RegisterRequest {
    /// Display name; the backend calls this field `nama`
    #[serde(rename = "nama")]
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"message": "Login successful", "token": "h.p.s", "user": {"employee_id": "EMP0003", "name": "Siti", "role": "kasir"}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.as_deref(), Some("h.p.s"));
        let user = resp.user.unwrap();
        assert_eq!(user.employee_id, "EMP0003");
        assert_eq!(user.role.as_deref(), Some("kasir"));
    }

    #[test]
    fn test_parse_login_response_without_token() {
        let resp: LoginResponse = serde_json::from_str(r#"{"message": "Invalid username or password"}"#).unwrap();
        assert!(resp.token.is_none());
        assert!(resp.user.is_none());
    }

    #[test]
    fn test_parse_register_responses() {
        let ok: RegisterResponse = serde_json::from_str(
            r#"{"message": "User registered successfully", "employee_id": "EMP0007"}"#,
        )
        .unwrap();
        assert_eq!(ok.employee_id.as_deref(), Some("EMP0007"));
        assert!(ok.error.is_none());

        let failed: RegisterResponse =
            serde_json::from_str(r#"{"error": "Username or email already exists"}"#).unwrap();
        assert_eq!(failed.error.as_deref(), Some("Username or email already exists"));
        assert!(failed.employee_id.is_none());
    }

    #[test]
    fn test_register_request_uses_backend_field_names() {
        let req = RegisterRequest {
            name: "Budi".to_string(),
            username: "budi".to_string(),
            email: "budi@example.com".to_string(),
            password: "secret".to_string(),
            role: "kasir".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["nama"], "Budi");
        assert!(value.get("name").is_none());
        assert_eq!(value["role"], "kasir");
    }
}
