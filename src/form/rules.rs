//! Field-level validation rules.
//!
//! Rules are data: each field carries an optional `required` message and
//! optional `min`, `max` and `pattern` constraints. Evaluation order is
//! required, then the numeric bounds (max before min), then the pattern.
//! Empty values are only checked by `required`, and the bounds only apply to
//! values that parse as numbers.

use super::{ErrorKind, FieldError, FieldName, RegistrationDraft};
use log::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Defines a numeric bound and the message reported when it is crossed.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundRule {
    pub value: f64,
    pub message: String,
}

/// Defines a pattern every non-empty value must match.
///
#[derive(Clone, Debug)]
pub struct PatternRule {
    pub value: Regex,
    pub message: String,
}

/// Rules declared for one field.
///
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    pub required: Option<String>,
    pub min: Option<BoundRule>,
    pub max: Option<BoundRule>,
    pub pattern: Option<PatternRule>,
}

/// Serialized form of `FieldRules`, as found in the configuration file.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRulesSpec {
    pub required: Option<String>,
    pub min: Option<BoundRule>,
    pub max: Option<BoundRule>,
    pub pattern: Option<PatternSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub value: String,
    pub message: String,
}

impl TryFrom<FieldRulesSpec> for FieldRules {
    type Error = regex::Error;

    fn try_from(spec: FieldRulesSpec) -> Result<Self, Self::Error> {
        let pattern = match spec.pattern {
            Some(pattern) => Some(PatternRule {
                value: Regex::new(&pattern.value)?,
                message: pattern.message,
            }),
            None => None,
        };
        Ok(FieldRules {
            required: spec.required,
            min: spec.min,
            max: spec.max,
            pattern,
        })
    }
}

impl FieldRules {
    /// Evaluate the rules against a raw value, returning the first failure.
    ///
    pub fn check(&self, value: Option<&str>) -> Option<FieldError> {
        let value = value.unwrap_or_default();
        if value.is_empty() {
            return self
                .required
                .as_ref()
                .map(|message| FieldError::new(ErrorKind::Required, message.as_str()));
        }

        if self.min.is_some() || self.max.is_some() {
            if let Ok(number) = value.trim().parse::<f64>() {
                if let Some(max) = self.max.as_ref().filter(|max| number > max.value) {
                    return Some(FieldError::new(ErrorKind::Max, max.message.as_str()));
                }
                if let Some(min) = self.min.as_ref().filter(|min| number < min.value) {
                    return Some(FieldError::new(ErrorKind::Min, min.message.as_str()));
                }
            }
        }

        match &self.pattern {
            Some(pattern) if !pattern.value.is_match(value) => {
                Some(FieldError::new(ErrorKind::Pattern, pattern.message.as_str()))
            }
            _ => None,
        }
    }
}

/// Rules for every registration field.
///
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: HashMap<FieldName, FieldRules>,
}

impl RuleSet {
    /// Returns the built-in registration rules.
    ///
    pub fn registration() -> RuleSet {
        let mut rules = HashMap::new();
        rules.insert(
            FieldName::GroupMemberCount,
            FieldRules {
                required: Some("모집 인원을 입력해주세요.".to_string()),
                min: Some(BoundRule {
                    value: 1.0,
                    message: "모집 인원은 최소 1명 이상입니다.".to_string(),
                }),
                max: Some(BoundRule {
                    value: 20.0,
                    message: "모집 인원은 최대 20명까지 가능합니다.".to_string(),
                }),
                pattern: Regex::new(r"^[0-9]*$").ok().map(|value| PatternRule {
                    value,
                    message: "숫자만 입력해 주세요.".to_string(),
                }),
            },
        );
        rules.insert(
            FieldName::GroupTitle,
            FieldRules {
                required: Some("그룹 이름을 입력해주세요.".to_string()),
                ..FieldRules::default()
            },
        );
        rules.insert(
            FieldName::DepartureDate,
            FieldRules {
                required: Some("여행날짜를 입력해주세요.".to_string()),
                ..FieldRules::default()
            },
        );
        RuleSet { rules }
    }

    /// Replace the rules of one field.
    ///
    pub fn set(&mut self, field: FieldName, rules: FieldRules) -> &mut Self {
        if field == FieldName::RecruitmentEndDate {
            warn!(
                "Rules configured for {} are ignored; the date-order rule owns that field.",
                field
            );
        }
        self.rules.insert(field, rules);
        self
    }

    pub fn get(&self, field: FieldName) -> Option<&FieldRules> {
        self.rules.get(&field)
    }

    /// Evaluate the rules of one field against the form values.
    ///
    pub fn validate(&self, field: FieldName, values: &RegistrationDraft) -> Option<FieldError> {
        if field == FieldName::RecruitmentEndDate {
            return None;
        }
        let rules = self.rules.get(&field)?;
        rules.check(values.raw_value(field).as_deref())
    }

    /// True when every field passes its rules.
    ///
    pub fn all_pass(&self, values: &RegistrationDraft) -> bool {
        FieldName::ALL
            .iter()
            .all(|field| self.validate(*field, values).is_none())
    }
}
