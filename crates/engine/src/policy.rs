//! Capability resolution policy
//!
//! The one place where roles are consulted. Managers never compare role
//! values directly; they resolve a [`Capabilities`] set and check flags.

use auditflow_common::models::Role;

/// Capability set for the current actor against one request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub create_request: bool,
    pub edit_request_status: bool,
    pub upload_request_file: bool,
    pub delete_request_file: bool,
    pub delete_request: bool,
    pub evaluate_content: bool,
    pub add_or_edit_content: bool,
}

impl Capabilities {
    /// Resolve capabilities from a role and an ownership flag
    ///
    /// `is_owner` means the actor is the designated responder of the
    /// request under inspection. Pure and deterministic; call sites
    /// re-resolve whenever the actor or the responder changes.
    pub fn resolve(role: Role, is_owner: bool) -> Self {
        let staff = matches!(role, Role::Lead | Role::Member);
        let lead = matches!(role, Role::Lead);

        Self {
            create_request: staff,
            edit_request_status: staff,
            upload_request_file: staff,
            delete_request_file: staff,
            delete_request: lead,
            evaluate_content: lead,
            add_or_edit_content: lead || (is_owner && matches!(role, Role::Unit | Role::Member)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_has_full_authority() {
        for is_owner in [false, true] {
            let caps = Capabilities::resolve(Role::Lead, is_owner);
            assert!(caps.create_request);
            assert!(caps.edit_request_status);
            assert!(caps.upload_request_file);
            assert!(caps.delete_request_file);
            assert!(caps.delete_request);
            assert!(caps.evaluate_content);
            assert!(caps.add_or_edit_content);
        }
    }

    #[test]
    fn test_member_cannot_delete_or_evaluate() {
        for is_owner in [false, true] {
            let caps = Capabilities::resolve(Role::Member, is_owner);
            assert!(caps.create_request);
            assert!(caps.edit_request_status);
            assert!(caps.upload_request_file);
            assert!(caps.delete_request_file);
            assert!(!caps.delete_request);
            assert!(!caps.evaluate_content);
            assert_eq!(caps.add_or_edit_content, is_owner);
        }
    }

    #[test]
    fn test_unit_only_writes_own_content() {
        let stranger = Capabilities::resolve(Role::Unit, false);
        assert_eq!(stranger, Capabilities::default());

        let owner = Capabilities::resolve(Role::Unit, true);
        assert!(owner.add_or_edit_content);
        assert!(!owner.create_request);
        assert!(!owner.edit_request_status);
        assert!(!owner.upload_request_file);
        assert!(!owner.delete_request_file);
        assert!(!owner.delete_request);
        assert!(!owner.evaluate_content);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for role in [Role::Lead, Role::Member, Role::Unit] {
            for is_owner in [false, true] {
                assert_eq!(
                    Capabilities::resolve(role, is_owner),
                    Capabilities::resolve(role, is_owner)
                );
            }
        }
    }
}
