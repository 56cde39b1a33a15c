use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: Option<String>,
    pub dob: Option<String>,
    pub location: Option<String>,
    pub sso_provider: Option<String>,
    pub sso_id: Option<String>,
}

/// Values for a new `users` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: Option<String>,
    pub dob: Option<String>,
    pub location: Option<String>,
    pub sso_provider: Option<String>,
    pub sso_id: Option<String>,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            username: new.username,
            email: new.email,
            phone_number: new.phone_number,
            password_hash: new.password_hash,
            dob: new.dob,
            location: new.location,
            sso_provider: new.sso_provider,
            sso_id: new.sso_id,
        }
    }
}

/// Public profile as returned to clients. Missing dob/location render as "".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub dob: String,
    pub location: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            dob: user.dob.clone().unwrap_or_default(),
            location: user.location.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_renders_missing_optionals_as_empty() {
        let user = User::from(NewUser {
            username: "al".into(),
            email: "a@x.com".into(),
            phone_number: "1".into(),
            location: Some("Oslo".into()),
            ..Default::default()
        });

        let profile = UserProfile::from(&user);
        assert_eq!(profile.dob, "");
        assert_eq!(profile.location, "Oslo");
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            serde_json::json!({
                "username": "al",
                "email": "a@x.com",
                "phone_number": "1",
                "dob": "",
                "location": "Oslo"
            })
        );
    }
}
