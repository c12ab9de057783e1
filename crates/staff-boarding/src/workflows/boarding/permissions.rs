use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{Actor, RecruitmentTicket};

/// Authorization decisions consumed by the boarding workflow. Implementations answer per
/// actor and ticket; the workflow never inspects roles itself.
pub trait PermissionResolver: Send + Sync {
    /// Whether records boarded by `actor` may start past the first approval stage.
    fn may_skip_approval(&self, actor: &Actor, ticket: &RecruitmentTicket) -> bool;

    fn may_approve(&self, actor: &Actor, ticket: &RecruitmentTicket) -> bool;

    fn may_final_approve(&self, actor: &Actor, ticket: &RecruitmentTicket) -> bool;

    /// Uploading against a ticket is limited to its creator, its assigned recruiter, and
    /// actors trusted to skip approval.
    fn can_use_ticket(&self, actor: &Actor, ticket: &RecruitmentTicket) -> bool {
        ticket.is_created_by(actor)
            || ticket.is_assigned_to(actor)
            || self.may_skip_approval(actor, ticket)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    #[serde(default)]
    pub skip_approval: bool,
    #[serde(default)]
    pub approve: bool,
    #[serde(default)]
    pub final_approve: bool,
}

/// Role-table resolver. Unknown roles get no rights; ticket creators additionally skip
/// and grant the first approval stage for their own tickets.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    roles: HashMap<String, RolePermissions>,
}

impl RoleHierarchy {
    pub fn standard() -> Self {
        Self::default()
            .with_role("recruiter", RolePermissions::default())
            .with_role(
                "supervisor",
                RolePermissions {
                    approve: true,
                    ..RolePermissions::default()
                },
            )
            .with_role(
                "hr_manager",
                RolePermissions {
                    skip_approval: true,
                    approve: true,
                    final_approve: false,
                },
            )
            .with_role(
                "control",
                RolePermissions {
                    final_approve: true,
                    ..RolePermissions::default()
                },
            )
            .with_role(
                "admin",
                RolePermissions {
                    skip_approval: true,
                    approve: true,
                    final_approve: true,
                },
            )
    }

    pub fn with_role(mut self, role: impl Into<String>, permissions: RolePermissions) -> Self {
        self.roles
            .insert(role.into().trim().to_ascii_lowercase(), permissions);
        self
    }

    pub fn permissions_for(&self, actor: &Actor) -> RolePermissions {
        self.roles
            .get(&actor.role.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or_default()
    }
}

impl PermissionResolver for RoleHierarchy {
    fn may_skip_approval(&self, actor: &Actor, ticket: &RecruitmentTicket) -> bool {
        self.permissions_for(actor).skip_approval || ticket.is_created_by(actor)
    }

    fn may_approve(&self, actor: &Actor, ticket: &RecruitmentTicket) -> bool {
        self.permissions_for(actor).approve || ticket.is_created_by(actor)
    }

    fn may_final_approve(&self, actor: &Actor, _ticket: &RecruitmentTicket) -> bool {
        self.permissions_for(actor).final_approve
    }
}
