//! User identity and role model shared by every service.

use serde::{Deserialize, Serialize};

/// Role of the signed-in user.
///
/// Drives both source selection (parents/students get read-only sources,
/// staff roles get interactive + management sources) and branch filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Parent,
    Teacher,
    Staff,
    Admin,
    HeadOfSection,
    HeadOfSchool,
}

impl UserType {
    /// Staff-tier roles may create and manage calendar events.
    pub fn is_staff_tier(self) -> bool {
        matches!(
            self,
            UserType::Teacher
                | UserType::Staff
                | UserType::Admin
                | UserType::HeadOfSection
                | UserType::HeadOfSchool
        )
    }

    /// Roles that see events from every branch, not just their own.
    pub fn has_cross_branch_visibility(self) -> bool {
        matches!(self, UserType::Admin | UserType::HeadOfSchool)
    }

    /// Wire name as used by the REST backend.
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Parent => "parent",
            UserType::Teacher => "teacher",
            UserType::Staff => "staff",
            UserType::Admin => "admin",
            UserType::HeadOfSection => "head_of_section",
            UserType::HeadOfSchool => "head_of_school",
        }
    }
}

/// Identity of the active session, read from the session store.
///
/// Threaded explicitly through every call that needs it; there is no
/// ambient global user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub user_type: UserType,
    /// Opaque backend credential, appended to REST calls as `authCode`.
    pub auth_code: String,
    /// Branch the user belongs to. `None` for accounts not tied to a branch.
    pub branch_id: Option<String>,
}

impl UserContext {
    pub fn new(
        user_id: impl Into<String>,
        user_type: UserType,
        auth_code: impl Into<String>,
        branch_id: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_type,
            auth_code: auth_code.into(),
            branch_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_tier_roles() {
        assert!(UserType::Teacher.is_staff_tier());
        assert!(UserType::Staff.is_staff_tier());
        assert!(UserType::Admin.is_staff_tier());
        assert!(UserType::HeadOfSection.is_staff_tier());
        assert!(UserType::HeadOfSchool.is_staff_tier());
        assert!(!UserType::Student.is_staff_tier());
        assert!(!UserType::Parent.is_staff_tier());
    }

    #[test]
    fn test_cross_branch_visibility() {
        assert!(UserType::Admin.has_cross_branch_visibility());
        assert!(UserType::HeadOfSchool.has_cross_branch_visibility());
        assert!(!UserType::Teacher.has_cross_branch_visibility());
        assert!(!UserType::HeadOfSection.has_cross_branch_visibility());
    }

    #[test]
    fn test_user_type_serde_wire_names() {
        let json = serde_json::to_string(&UserType::HeadOfSection).unwrap();
        assert_eq!(json, r#""head_of_section""#);

        let parsed: UserType = serde_json::from_str(r#""parent""#).unwrap();
        assert_eq!(parsed, UserType::Parent);
    }
}
