use crate::error::{ApiError, Issue};

/// Request payloads check their own shape before any database work
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Collects field issues so one response reports every problem at once
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<Issue>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, path: &str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.issues.push(Issue::new(path, message));
        }
        self
    }

    pub fn required_text(&mut self, path: &str, value: &str, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            self.issues.push(Issue::new(path, "Campo obrigatório"));
        } else if len > max {
            self.issues.push(Issue::new(path, format!("Máximo de {} caracteres", max)));
        }
        self
    }

    pub fn optional_text(&mut self, path: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.issues.push(Issue::new(path, format!("Máximo de {} caracteres", max)));
            }
        }
        self
    }

    pub fn email(&mut self, path: &str, value: &str) -> &mut Self {
        if let Err(message) = validate_email_format(value) {
            self.issues.push(Issue::new(path, message));
        }
        self
    }

    pub fn senha(&mut self, path: &str, value: &str) -> &mut Self {
        let len = value.chars().count();
        if len < 6 {
            self.issues.push(Issue::new(path, "A senha deve ter pelo menos 6 caracteres"));
        } else if len > 128 {
            self.issues.push(Issue::new(path, "A senha deve ter no máximo 128 caracteres"));
        }
        self
    }

    pub fn range(&mut self, path: &str, value: i32, min: i32, max: i32) -> &mut Self {
        if value < min || value > max {
            self.issues.push(Issue::new(path, format!("Deve estar entre {} e {}", min, max)));
        }
        self
    }

    pub fn range_f64(&mut self, path: &str, value: Option<f64>, min: f64, max: f64) -> &mut Self {
        if let Some(value) = value {
            if !value.is_finite() || value < min || value > max {
                self.issues.push(Issue::new(path, format!("Deve estar entre {} e {}", min, max)));
            }
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(std::mem::take(&mut self.issues)))
        }
    }
}

/// Basic email shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email obrigatório".to_string());
    }
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err("Email inválido".to_string());
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');

    if local.is_empty() || !domain_ok {
        return Err("Email inválido".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_issue() {
        let err = Validator::new()
            .required_text("nome", "   ", 100)
            .email("email", "sem-arroba")
            .range("numeroAula", 21, 1, 20)
            .finish()
            .unwrap_err();

        match err {
            ApiError::ValidationError { issues, .. } => {
                let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
                assert_eq!(paths, vec!["nome", "email", "numeroAula"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn passes_when_clean() {
        assert!(Validator::new()
            .required_text("nome", "Ana", 100)
            .optional_text("observacoes", None, 10)
            .range_f64("nota", Some(10.0), 0.0, 10.0)
            .finish()
            .is_ok());
    }

    #[test]
    fn rejects_non_finite_and_out_of_range_scores() {
        assert!(Validator::new().range_f64("nota", Some(f64::NAN), 0.0, 10.0).finish().is_err());
        assert!(Validator::new().range_f64("nota", Some(10.5), 0.0, 10.0).finish().is_err());
        assert!(Validator::new().range_f64("nota", Some(-0.1), 0.0, 10.0).finish().is_err());
        assert!(Validator::new().range_f64("nota", None, 0.0, 10.0).finish().is_ok());
    }

    #[test]
    fn email_format() {
        assert!(validate_email_format("ana@ccb.org.br").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("ana@").is_err());
        assert!(validate_email_format("@ccb.org").is_err());
        assert!(validate_email_format("ana@@ccb.org").is_err());
        assert!(validate_email_format("ana@localhost").is_err());
        assert!(validate_email_format("a na@ccb.org").is_err());
    }

    #[test]
    fn text_length_counts_characters() {
        assert!(Validator::new().required_text("nome", "Conceição", 9).finish().is_ok());
        assert!(Validator::new().required_text("nome", "Conceição!", 9).finish().is_err());
    }
}
