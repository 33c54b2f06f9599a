use serde::{Deserialize, Serialize};

use crate::scoring::{presets, validate_questionnaire, Questionnaire};

/// Top-level config file.
///
/// Example YAML:
/// ```yaml
/// default_questionnaire: size-reach
/// questionnaires:
///   - name: size-reach
///     questions: [...]
///     thresholds: [...]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Questionnaire used when a command names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_questionnaire: Option<String>,

    /// Questionnaires defined by the user. One named like a built-in replaces it.
    #[serde(default)]
    pub questionnaires: Vec<Questionnaire>,
}

impl Config {
    /// Config holding every built-in questionnaire
    pub fn builtin() -> Self {
        Self {
            default_questionnaire: Some(presets::SELF_RELEASE.to_string()),
            questionnaires: presets::builtin(),
        }
    }

    /// Built-ins overlaid with the user's questionnaires, in built-in order
    /// followed by new user entries.
    pub fn effective_questionnaires(&self) -> Vec<Questionnaire> {
        let mut merged = presets::builtin();
        for user in &self.questionnaires {
            match merged.iter_mut().find(|q| q.name == user.name) {
                Some(slot) => *slot = user.clone(),
                None => merged.push(user.clone()),
            }
        }
        merged
    }

    pub fn questionnaire(&self, name: &str) -> Option<Questionnaire> {
        self.effective_questionnaires()
            .into_iter()
            .find(|q| q.name == name)
    }

    pub fn default_questionnaire_name(&self) -> &str {
        self.default_questionnaire
            .as_deref()
            .unwrap_or(presets::SELF_RELEASE)
    }
}

/// Validate the whole config. Returns all validation errors at once.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (i, q) in config.questionnaires.iter().enumerate() {
        if config.questionnaires[..i].iter().any(|other| other.name == q.name) {
            errors.push(format!(
                "questionnaires[{}].name: duplicate questionnaire '{}'",
                i, q.name
            ));
        }
        if let Err(inner) = validate_questionnaire(q) {
            errors.extend(
                inner
                    .into_iter()
                    .map(|e| format!("questionnaires[{}].{}", i, e)),
            );
        }
    }

    if let Some(ref name) = config.default_questionnaire {
        if config.questionnaire(name).is_none() {
            errors.push(format!(
                "default_questionnaire: unknown questionnaire '{}'",
                name
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert!(config.default_questionnaire.is_none());
        assert!(config.questionnaires.is_empty());
        assert_eq!(config.effective_questionnaires().len(), 3);
        assert_eq!(config.default_questionnaire_name(), presets::SELF_RELEASE);
    }

    #[test]
    fn test_user_questionnaire_overrides_builtin() {
        let yaml = r#"
default_questionnaire: size-reach
questionnaires:
  - name: size-reach
    questions:
      - name: Gelände
        weight: 1.5
        options:
          - { label: klein, score: 1 }
          - { label: groß, score: 7 }
    thresholds:
      - { upper: 3.15, tier: low, label: "Geringe Gefahr" }
      - { upper: 3.7, tier: moderate, label: "Mäßige Gefahr" }
      - { tier: high, label: "Hohe Gefahr" }
  - name: quick
    questions:
      - name: Wind
        options:
          - { label: stark, score: 3 }
    thresholds:
      - { tier: high, label: "Hoch" }
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert!(validate_config(&config).is_ok());

        let merged = config.effective_questionnaires();
        let names: Vec<&str> = merged.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["self-release", "size-reach", "size-reach-classic", "quick"]);

        let size = config.questionnaire("size-reach").unwrap();
        assert_eq!(size.questions.len(), 1);
        assert_eq!(size.thresholds[0].upper, Some(3.15));
        assert_eq!(config.default_questionnaire_name(), "size-reach");
    }

    #[test]
    fn test_validate_config_prefixes_errors() {
        let mut config = Config::default();
        let mut broken = presets::self_release();
        broken.name = "broken".to_string();
        broken.thresholds.clear();
        config.questionnaires.push(broken.clone());
        config.questionnaires.push(broken);
        config.default_questionnaire = Some("missing".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&"questionnaires[0].thresholds: at least one threshold is required".to_string()));
        assert!(errors.contains(&"questionnaires[1].name: duplicate questionnaire 'broken'".to_string()));
        assert!(errors.contains(&"default_questionnaire: unknown questionnaire 'missing'".to_string()));
    }

    #[test]
    fn test_builtin_config_roundtrip() {
        let config = Config::builtin();
        assert!(validate_config(&config).is_ok());
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
