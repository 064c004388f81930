//! Identities, roles and the registry that resolves login identifiers.
//!
//! Unknown identifiers are not rejected.  `resolve_or_guest` admits them
//! as low-privilege guests; this open-door policy is a product decision
//! and is kept as is.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Roles of the authorization model, highest privilege first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "HSE_Director")]
    HseDirector,
    #[serde(rename = "Site_HSE_Manager")]
    SiteHseManager,
    Supervisor,
    Worker,
    Contractor,
    Auditor,
    Guest,
}

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewDashboards,
    ReportIncidents,
    ApprovePermits,
    ManageTasks,
    ExportData,
    ManageUsers,
    ViewAuditLog,
}

impl Role {
    /// Canonical name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HseDirector => "HSE_Director",
            Self::SiteHseManager => "Site_HSE_Manager",
            Self::Supervisor => "Supervisor",
            Self::Worker => "Worker",
            Self::Contractor => "Contractor",
            Self::Auditor => "Auditor",
            Self::Guest => "Guest",
        }
    }

    /// Whether this role may perform `permission`.
    pub fn permits(self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            Self::HseDirector => true,
            Self::SiteHseManager => !matches!(permission, ManageUsers),
            Self::Supervisor => matches!(
                permission,
                ViewDashboards | ReportIncidents | ApprovePermits | ManageTasks
            ),
            Self::Worker | Self::Contractor => {
                matches!(permission, ViewDashboards | ReportIncidents)
            }
            Self::Auditor => matches!(permission, ViewDashboards | ExportData | ViewAuditLog),
            Self::Guest => matches!(permission, ViewDashboards),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    pub department: String,
}

impl Identity {
    pub fn can(&self, permission: Permission) -> bool {
        self.role.permits(permission)
    }

    /// Whether this identity was synthesized for an unknown identifier.
    pub fn is_guest(&self) -> bool {
        self.role == Role::Guest
    }

    /// Build the guest identity for a normalized login name.
    pub fn guest(name: &str) -> Self {
        Self {
            id: format!("guest:{name}"),
            display_name: name.to_string(),
            role: Role::Guest,
            department: "Visitors".to_string(),
        }
    }
}

/// Lookup of known users.
pub trait IdentityRegistry: Send + Sync {
    /// Resolve a normalized login name to a known identity.
    fn resolve(&self, login: &str) -> Option<Identity>;

    /// Find a known identity by its id.
    fn find_by_id(&self, id: &str) -> Option<Identity>;

    /// All known identities, for profile pickers.
    fn all(&self) -> Vec<Identity>;
}

/// Normalize a login identifier: trim, lowercase and drop any `@domain`.
///
/// Returns `None` for blank identifiers or ones containing characters
/// outside `[a-z0-9._-]`.
pub fn normalize_identifier(identifier: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^([a-z0-9][a-z0-9._-]{0,63})(@[a-z0-9.-]+)?$").ok())
        .as_ref()?;

    let lowered = identifier.trim().to_lowercase();
    let captures = pattern.captures(&lowered)?;
    captures.get(1).map(|m| m.as_str().to_string())
}

/// Resolve `identifier`, admitting unknown names as guests.
///
/// Returns `None` only when the identifier is blank or malformed.
pub fn resolve_or_guest(registry: &dyn IdentityRegistry, identifier: &str) -> Option<Identity> {
    let login = normalize_identifier(identifier)?;
    Some(
        registry
            .resolve(&login)
            .unwrap_or_else(|| Identity::guest(&login)),
    )
}

/// Built-in roster used for guided trials.
#[derive(Debug, Clone)]
pub struct DemoRoster {
    by_login: BTreeMap<String, Identity>,
}

impl DemoRoster {
    pub fn new() -> Self {
        let entries = [
            ("david.chen", "USR-001", "David Chen", Role::HseDirector, "Corporate HSE"),
            ("sarah.jones", "USR-002", "Sarah Jones", Role::SiteHseManager, "Site Operations"),
            ("maria.garcia", "USR-003", "Maria Garcia", Role::Supervisor, "Maintenance"),
            ("james.wilson", "USR-004", "James Wilson", Role::Worker, "Production"),
            ("tom.baker", "USR-005", "Tom Baker", Role::Contractor, "Contractor Services"),
            ("priya.patel", "USR-006", "Priya Patel", Role::Auditor, "Compliance"),
        ];

        let by_login = entries
            .into_iter()
            .map(|(login, id, name, role, department)| {
                (
                    login.to_string(),
                    Identity {
                        id: id.to_string(),
                        display_name: name.to_string(),
                        role,
                        department: department.to_string(),
                    },
                )
            })
            .collect();

        Self { by_login }
    }
}

impl Default for DemoRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry for DemoRoster {
    fn resolve(&self, login: &str) -> Option<Identity> {
        self.by_login.get(login).cloned()
    }

    fn find_by_id(&self, id: &str) -> Option<Identity> {
        self.by_login.values().find(|i| i.id == id).cloned()
    }

    fn all(&self) -> Vec<Identity> {
        let mut all: Vec<Identity> = self.by_login.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}
