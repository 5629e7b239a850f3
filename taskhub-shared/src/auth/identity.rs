/// Subject identity
///
/// The verified caller identity attached to every authenticated request.
/// The API layer validates the bearer token, resolves the user against the
/// Identity Store once, and hands this struct to handlers. The core never
/// sees raw credentials.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{User, UserRole};

/// Verified caller identity `{id, email, role}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Account role
    pub role: UserRole,
}

impl Subject {
    /// Whether the subject is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for Subject {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            email: "bob@x.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_subject_from_user() {
        let user = sample_user(UserRole::User);
        let subject = Subject::from(&user);
        assert_eq!(subject.id, user.id);
        assert_eq!(subject.email, user.email);
        assert!(!subject.is_admin());
    }

    #[test]
    fn test_admin_subject() {
        let user = sample_user(UserRole::Admin);
        assert!(Subject::from(&user).is_admin());
    }
}
