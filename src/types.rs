/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("Valor inválido para {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Account role stored on `usuarios.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Encarregado,
    Instrutor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Encarregado => "ENCARREGADO",
            Role::Instrutor => "INSTRUTOR",
        }
    }

    /// ADMIN and ENCARREGADO see every record regardless of ownership
    pub fn has_global_access(&self) -> bool {
        matches!(self, Role::Admin | Role::Encarregado)
    }
}

/// Lesson type of a ficha de acompanhamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAula {
    Teoria,
    Solfejo,
    Instrumento,
}

impl TipoAula {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoAula::Teoria => "TEORIA",
            TipoAula::Solfejo => "SOLFEJO",
            TipoAula::Instrumento => "INSTRUMENTO",
        }
    }
}

/// Skill level a Programa Mínimo applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NivelPrograma {
    Rjm,
    CultoOficial,
    Oficializacao,
}

impl NivelPrograma {
    pub fn as_str(&self) -> &'static str {
        match self {
            NivelPrograma::Rjm => "RJM",
            NivelPrograma::CultoOficial => "CULTO_OFICIAL",
            NivelPrograma::Oficializacao => "OFICIALIZACAO",
        }
    }
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal, [$($variant:ident),+]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )+
                Err(UnknownVariant { kind: $kind, value: s.to_string() })
            }
        }

        impl TryFrom<String> for $ty {
            type Error = UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(Role, "role", [Admin, Encarregado, Instrutor]);
text_enum!(TipoAula, "tipoAula", [Teoria, Solfejo, Instrumento]);
text_enum!(NivelPrograma, "nivel", [Rjm, CultoOficial, Oficializacao]);

/// Distinguishes an absent field from an explicit `null` in update payloads.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: missing → `None`, `null` → `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!("ENCARREGADO".parse::<Role>().unwrap(), Role::Encarregado);
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn global_access_roles() {
        assert!(Role::Admin.has_global_access());
        assert!(Role::Encarregado.has_global_access());
        assert!(!Role::Instrutor.has_global_access());
    }

    #[test]
    fn enums_use_screaming_case_on_the_wire() {
        assert_eq!(json!(NivelPrograma::CultoOficial), json!("CULTO_OFICIAL"));
        let tipo: TipoAula = serde_json::from_value(json!("SOLFEJO")).unwrap();
        assert_eq!(tipo, TipoAula::Solfejo);
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        telefone: Option<Option<String>>,
    }

    #[test]
    fn nullable_separates_missing_from_null() {
        let missing: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.telefone, None);

        let cleared: Patch = serde_json::from_value(json!({ "telefone": null })).unwrap();
        assert_eq!(cleared.telefone, Some(None));

        let set: Patch = serde_json::from_value(json!({ "telefone": "1199" })).unwrap();
        assert_eq!(set.telefone, Some(Some("1199".to_string())));
    }
}
