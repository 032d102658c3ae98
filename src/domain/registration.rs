//! Account creation limits.
//!
//! The counts come from plain `COUNT(*)` queries; nothing here reserves a slot,
//! so two concurrent registrations can both pass the check.

use std::collections::HashSet;

use uuid::Uuid;

use super::DomainError;
use crate::types::Role;

/// ENCARREGADO + ADMIN accounts allowed per congregação
pub const MAX_ENCARREGADOS_POR_CONGREGACAO: i64 = 4;
/// ADMIN accounts allowed per congregação when created by an administrator
pub const MAX_ADMINS_POR_CONGREGACAO: i64 = 3;

/// Counts the caller queried before inserting
#[derive(Debug, Clone, Copy, Default)]
pub struct Lotacao {
    pub encarregados_e_admins: i64,
    pub admins: i64,
}

pub fn check_limite_encarregados(role: Role, congregacao: &str, lotacao: Lotacao) -> Result<(), DomainError> {
    if role.has_global_access() && lotacao.encarregados_e_admins >= MAX_ENCARREGADOS_POR_CONGREGACAO {
        return Err(DomainError::LimiteEncarregados(congregacao.to_string()));
    }
    Ok(())
}

pub fn check_limite_admins(role: Role, congregacao: &str, lotacao: Lotacao) -> Result<(), DomainError> {
    if role == Role::Admin && lotacao.admins >= MAX_ADMINS_POR_CONGREGACAO {
        return Err(DomainError::LimiteAdministradores(congregacao.to_string()));
    }
    Ok(())
}

/// Which caps a role or congregação change has to re-run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitesAfetados {
    pub encarregados: bool,
    pub admins: bool,
}

impl LimitesAfetados {
    /// A cap applies when the account newly enters its group, either by role
    /// or by moving into another congregação
    pub fn na_mudanca(anterior: Role, nova: Role, muda_congregacao: bool) -> Self {
        Self {
            encarregados: nova.has_global_access() && (muda_congregacao || !anterior.has_global_access()),
            admins: nova == Role::Admin && (muda_congregacao || anterior != Role::Admin),
        }
    }

    pub fn algum(&self) -> bool {
        self.encarregados || self.admins
    }

    pub fn check(&self, role: Role, congregacao: &str, lotacao: Lotacao) -> Result<(), DomainError> {
        if self.encarregados {
            check_limite_encarregados(role, congregacao, lotacao)?;
        }
        if self.admins {
            check_limite_admins(role, congregacao, lotacao)?;
        }
        Ok(())
    }
}

/// Requested ids that are not in the set of active instruments found
pub fn instrumentos_invalidos(solicitados: &[Uuid], ativos: &[Uuid]) -> Vec<Uuid> {
    let ativos: HashSet<&Uuid> = ativos.iter().collect();
    let mut vistos = HashSet::new();
    solicitados
        .iter()
        .filter(|id| !ativos.contains(id) && vistos.insert(**id))
        .copied()
        .collect()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifth_encarregado_is_rejected_with_exact_message() {
        let lotacao = Lotacao { encarregados_e_admins: 4, admins: 1 };
        let err = check_limite_encarregados(Role::Encarregado, "Vila Maria", lotacao).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Já existe um Encarregado de Orquestra cadastrado para a congregação Vila Maria"
        );
    }

    #[test]
    fn admins_count_against_the_encarregado_cap() {
        let lotacao = Lotacao { encarregados_e_admins: 4, admins: 4 };
        assert!(check_limite_encarregados(Role::Admin, "Centro", lotacao).is_err());
    }

    #[test]
    fn fourth_encarregado_is_allowed() {
        let lotacao = Lotacao { encarregados_e_admins: 3, admins: 0 };
        assert!(check_limite_encarregados(Role::Encarregado, "Centro", lotacao).is_ok());
    }

    #[test]
    fn instrutores_are_never_capped() {
        let lotacao = Lotacao { encarregados_e_admins: 40, admins: 40 };
        assert!(check_limite_encarregados(Role::Instrutor, "Centro", lotacao).is_ok());
        assert!(check_limite_admins(Role::Instrutor, "Centro", lotacao).is_ok());
    }

    #[test]
    fn admin_cap_is_three() {
        let at_cap = Lotacao { encarregados_e_admins: 3, admins: 3 };
        assert_eq!(
            check_limite_admins(Role::Admin, "Centro", at_cap),
            Err(DomainError::LimiteAdministradores("Centro".to_string()))
        );
        assert!(check_limite_admins(Role::Encarregado, "Centro", at_cap).is_ok());

        let below = Lotacao { encarregados_e_admins: 2, admins: 2 };
        assert!(check_limite_admins(Role::Admin, "Centro", below).is_ok());
    }

    #[test]
    fn promoting_encarregado_to_admin_runs_only_the_admin_cap() {
        let limites = LimitesAfetados::na_mudanca(Role::Encarregado, Role::Admin, false);
        assert_eq!(limites, LimitesAfetados { encarregados: false, admins: true });

        // Three admins plus the encarregado being promoted
        let lotacao = Lotacao { encarregados_e_admins: 4, admins: 3 };
        assert_eq!(
            limites.check(Role::Admin, "Centro", lotacao),
            Err(DomainError::LimiteAdministradores("Centro".to_string()))
        );
        assert!(limites
            .check(Role::Admin, "Centro", Lotacao { encarregados_e_admins: 4, admins: 2 })
            .is_ok());
    }

    #[test]
    fn promoting_instrutor_runs_both_caps() {
        let limites = LimitesAfetados::na_mudanca(Role::Instrutor, Role::Admin, false);
        assert_eq!(limites, LimitesAfetados { encarregados: true, admins: true });

        let cheio = Lotacao { encarregados_e_admins: 4, admins: 0 };
        assert!(matches!(
            limites.check(Role::Admin, "Centro", cheio),
            Err(DomainError::LimiteEncarregados(_))
        ));
    }

    #[test]
    fn moving_congregacao_reruns_caps_for_current_role() {
        let admin = LimitesAfetados::na_mudanca(Role::Admin, Role::Admin, true);
        assert_eq!(admin, LimitesAfetados { encarregados: true, admins: true });

        let encarregado = LimitesAfetados::na_mudanca(Role::Encarregado, Role::Encarregado, true);
        assert_eq!(encarregado, LimitesAfetados { encarregados: true, admins: false });
    }

    #[test]
    fn unchanged_or_demoted_accounts_skip_caps() {
        assert!(!LimitesAfetados::na_mudanca(Role::Admin, Role::Admin, false).algum());
        assert!(!LimitesAfetados::na_mudanca(Role::Admin, Role::Encarregado, false).algum());
        assert!(!LimitesAfetados::na_mudanca(Role::Encarregado, Role::Instrutor, true).algum());
    }

    #[test]
    fn reports_each_missing_instrument_once() {
        let ok = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let invalid = instrumentos_invalidos(&[ok, missing, missing], &[ok]);
        assert_eq!(invalid, vec![missing]);
        assert!(instrumentos_invalidos(&[ok], &[ok]).is_empty());
    }

    #[test]
    fn emails_are_compared_lowercased() {
        assert_eq!(normalize_email("  Maria@Exemplo.COM "), "maria@exemplo.com");
    }
}
