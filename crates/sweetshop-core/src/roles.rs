//! Role derivation from identity-provider metadata.
//!
//! The identity provider exposes role information in several places. Each
//! place is a [`RoleStrategy`]; [`RoleResolver`] asks them in order and takes
//! the first answer, falling back to [`Role::User`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parses a role name as stored in metadata, ignoring case. Unknown names
    /// are `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// The signed-in user's identity-provider metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    #[serde(default)]
    pub email: Option<String>,
    /// Role set directly on the user's public metadata.
    #[serde(default)]
    pub public_role: Option<String>,
    /// Role within the currently active organization.
    #[serde(default)]
    pub active_org_role: Option<String>,
    /// Roles across every organization the user belongs to.
    #[serde(default)]
    pub org_roles: Vec<String>,
}

/// Returns `true` for organization roles that grant admin access:
/// `admin`, `org:admin` and `owner`, in any case.
#[must_use]
pub fn is_org_admin(org_role: &str) -> bool {
    matches!(
        org_role.trim().to_lowercase().as_str(),
        "admin" | "org:admin" | "owner"
    )
}

/// One source of role information.
pub trait RoleStrategy: Send + Sync {
    /// Returns the role this source determines, or `None` to defer to the
    /// next strategy.
    fn resolve(&self, profile: &IdentityProfile) -> Option<Role>;
}

/// The role set explicitly on public metadata wins outright. Any non-blank
/// value is final; names other than `ADMIN` resolve to [`Role::User`].
#[derive(Debug, Default)]
pub struct PublicMetadataRole;

impl RoleStrategy for PublicMetadataRole {
    fn resolve(&self, profile: &IdentityProfile) -> Option<Role> {
        profile
            .public_role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .map(|r| Role::parse(r).unwrap_or(Role::User))
    }
}

/// Admin if the active organization membership is an admin role.
#[derive(Debug, Default)]
pub struct ActiveOrganizationRole;

impl RoleStrategy for ActiveOrganizationRole {
    fn resolve(&self, profile: &IdentityProfile) -> Option<Role> {
        profile
            .active_org_role
            .as_deref()
            .filter(|r| is_org_admin(r))
            .map(|_| Role::Admin)
    }
}

/// Admin if any organization membership is an admin role.
#[derive(Debug, Default)]
pub struct AnyOrganizationRole;

impl RoleStrategy for AnyOrganizationRole {
    fn resolve(&self, profile: &IdentityProfile) -> Option<Role> {
        profile
            .org_roles
            .iter()
            .any(|r| is_org_admin(r))
            .then_some(Role::Admin)
    }
}

/// Ordered list of role strategies.
pub struct RoleResolver {
    strategies: Vec<Box<dyn RoleStrategy>>,
}

impl RoleResolver {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn RoleStrategy>>) -> Self {
        Self { strategies }
    }

    /// First non-empty answer from the strategies, or [`Role::User`].
    #[must_use]
    pub fn resolve(&self, profile: &IdentityProfile) -> Role {
        self.strategies
            .iter()
            .find_map(|s| s.resolve(profile))
            .unwrap_or(Role::User)
    }
}

impl Default for RoleResolver {
    /// Public metadata, then the active organization, then any organization.
    fn default() -> Self {
        Self::new(vec![
            Box::new(PublicMetadataRole),
            Box::new(ActiveOrganizationRole),
            Box::new(AnyOrganizationRole),
        ])
    }
}

/// Load an identity profile from a YAML (or JSON) file.
///
/// # Errors
///
/// Returns [`ConfigError::IdentityFileIo`] if the file cannot be read and
/// [`ConfigError::IdentityFileParse`] if it does not match [`IdentityProfile`].
pub fn load_identity_profile(path: &Path) -> Result<IdentityProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IdentityFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(ConfigError::IdentityFileParse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> IdentityProfile {
        IdentityProfile::default()
    }

    #[test]
    fn no_metadata_resolves_to_user() {
        assert_eq!(RoleResolver::default().resolve(&profile()), Role::User);
    }

    #[test]
    fn public_role_takes_priority_over_org_roles() {
        let p = IdentityProfile {
            public_role: Some("user".to_string()),
            active_org_role: Some("org:admin".to_string()),
            org_roles: vec!["owner".to_string()],
            ..profile()
        };
        assert_eq!(RoleResolver::default().resolve(&p), Role::User);
    }

    #[test]
    fn public_role_is_case_insensitive() {
        let p = IdentityProfile {
            public_role: Some("Admin".to_string()),
            ..profile()
        };
        assert_eq!(RoleResolver::default().resolve(&p), Role::Admin);
    }

    #[test]
    fn unknown_public_role_is_final_and_not_admin() {
        let p = IdentityProfile {
            public_role: Some("customer".to_string()),
            active_org_role: Some("org:admin".to_string()),
            org_roles: vec!["owner".to_string()],
            ..profile()
        };
        assert_eq!(PublicMetadataRole.resolve(&p), Some(Role::User));
        assert_eq!(RoleResolver::default().resolve(&p), Role::User);
    }

    #[test]
    fn blank_public_role_defers_to_org_roles() {
        let p = IdentityProfile {
            public_role: Some("  ".to_string()),
            active_org_role: Some("org:admin".to_string()),
            ..profile()
        };
        assert_eq!(RoleResolver::default().resolve(&p), Role::Admin);
    }

    #[test]
    fn active_org_member_role_is_not_admin() {
        let p = IdentityProfile {
            active_org_role: Some("org:member".to_string()),
            ..profile()
        };
        assert_eq!(RoleResolver::default().resolve(&p), Role::User);
    }

    #[test]
    fn any_org_owner_is_admin() {
        let p = IdentityProfile {
            org_roles: vec!["org:member".to_string(), "Owner".to_string()],
            ..profile()
        };
        assert_eq!(RoleResolver::default().resolve(&p), Role::Admin);
    }

    #[test]
    fn custom_strategy_order_is_respected() {
        struct AlwaysUser;
        impl RoleStrategy for AlwaysUser {
            fn resolve(&self, _: &IdentityProfile) -> Option<Role> {
                Some(Role::User)
            }
        }
        let resolver = RoleResolver::new(vec![Box::new(AlwaysUser), Box::new(AnyOrganizationRole)]);
        let p = IdentityProfile {
            org_roles: vec!["admin".to_string()],
            ..profile()
        };
        assert_eq!(resolver.resolve(&p), Role::User);
    }

    #[test]
    fn load_identity_profile_missing_file_is_io_error() {
        let err = load_identity_profile(Path::new("/nonexistent/identity.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::IdentityFileIo { .. }));
    }

    #[test]
    fn identity_profile_parses_from_yaml() {
        let yaml = "email: ann@sweets.test\nactive_org_role: \"org:admin\"\norg_roles:\n  - \"org:admin\"\n";
        let p: IdentityProfile = serde_yaml::from_str(yaml).expect("valid yaml");
        assert_eq!(p.email.as_deref(), Some("ann@sweets.test"));
        assert!(p.public_role.is_none());
        assert_eq!(RoleResolver::default().resolve(&p), Role::Admin);
    }

    #[test]
    fn identity_profile_parses_from_json() {
        let json = r#"{"public_role": "ADMIN"}"#;
        let p: IdentityProfile = serde_yaml::from_str(json).expect("json is valid yaml");
        assert_eq!(p.public_role.as_deref(), Some("ADMIN"));
    }
}
