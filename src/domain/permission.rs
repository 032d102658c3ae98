use uuid::Uuid;

use super::DomainError;
use crate::types::Role;

/// Who is acting: the session role plus the caller's instrutor profile, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub usuario_id: Uuid,
    pub role: Role,
    pub instrutor_id: Option<Uuid>,
}

impl Actor {
    pub fn is_global(&self) -> bool {
        self.role.has_global_access()
    }

    /// Global roles pass; otherwise the caller must be one of `owners`
    pub fn can_access(&self, owners: &[Uuid]) -> bool {
        if self.is_global() {
            return true;
        }
        match self.instrutor_id {
            Some(id) => owners.contains(&id),
            None => false,
        }
    }

    pub fn ensure_access(&self, owners: &[Uuid], recurso: &'static str) -> Result<(), DomainError> {
        if self.can_access(owners) {
            Ok(())
        } else {
            Err(DomainError::AcessoNegado(recurso))
        }
    }

    /// ADMIN or ENCARREGADO
    pub fn ensure_global(&self) -> Result<(), DomainError> {
        if self.is_global() {
            Ok(())
        } else {
            Err(DomainError::RequerEncarregado)
        }
    }

    pub fn ensure_admin(&self) -> Result<(), DomainError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(DomainError::RequerAdministrador)
        }
    }

    /// Instrutor filter for list queries; `None` means no restriction.
    ///
    /// A non-global caller without a profile gets `Some(Uuid::nil())`, which
    /// matches nothing.
    pub fn scope(&self) -> Option<Uuid> {
        if self.is_global() {
            None
        } else {
            Some(self.instrutor_id.unwrap_or(Uuid::nil()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, instrutor_id: Option<Uuid>) -> Actor {
        Actor {
            usuario_id: Uuid::new_v4(),
            role,
            instrutor_id,
        }
    }

    #[test]
    fn global_roles_access_everything() {
        let other = Uuid::new_v4();
        for role in [Role::Admin, Role::Encarregado] {
            let a = actor(role, None);
            assert!(a.can_access(&[other]));
            assert!(a.ensure_global().is_ok());
            assert_eq!(a.scope(), None);
        }
    }

    #[test]
    fn instrutor_accesses_only_owned_records() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let a = actor(Role::Instrutor, Some(me));

        assert!(a.can_access(&[me]));
        assert!(a.can_access(&[other, me]));
        assert!(!a.can_access(&[other]));
        assert_eq!(
            a.ensure_access(&[other], "aluno"),
            Err(DomainError::AcessoNegado("aluno"))
        );
        assert_eq!(a.scope(), Some(me));
    }

    #[test]
    fn instrutor_without_profile_owns_nothing() {
        let a = actor(Role::Instrutor, None);
        assert!(!a.can_access(&[Uuid::new_v4()]));
        assert_eq!(a.scope(), Some(Uuid::nil()));
    }

    #[test]
    fn only_admin_passes_admin_check() {
        assert!(actor(Role::Admin, None).ensure_admin().is_ok());
        assert_eq!(
            actor(Role::Encarregado, None).ensure_admin(),
            Err(DomainError::RequerAdministrador)
        );
        assert_eq!(
            actor(Role::Instrutor, None).ensure_global(),
            Err(DomainError::RequerEncarregado)
        );
    }
}
