use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::contains_ignore_case;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: ClassType,
    #[serde(default)]
    pub start_date: i64,
    #[serde(default)]
    pub end_date: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: ClassStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ClassType {
    #[default]
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "no private")]
    NoPrivate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ClassStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "inactive")]
    Inactive,
    #[default]
    #[serde(rename = "upcoming")]
    Upcoming,
    #[serde(rename = "on going")]
    OnGoing,
}

impl ClassStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(ClassStatus::Active),
            "inactive" => Some(ClassStatus::Inactive),
            "upcoming" => Some(ClassStatus::Upcoming),
            "on going" | "ongoing" => Some(ClassStatus::OnGoing),
            _ => None,
        }
    }
}

/// Fields an admin submits when creating or editing a class.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_schedule"))]
pub struct ClassForm {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(rename = "type")]
    pub kind: ClassType,
    pub start_date: i64,
    pub end_date: i64,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: f64,
    pub status: ClassStatus,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

fn validate_schedule(form: &ClassForm) -> Result<(), ValidationError> {
    if form.end_date < form.start_date {
        return Err(ValidationError::new("schedule")
            .with_message("endDate must not be before startDate".into()));
    }
    Ok(())
}

/// Search box plus status dropdown of the class list.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub query: String,
    pub status: Option<ClassStatus>,
}

impl ClassFilter {
    pub fn matches(&self, class: &Class) -> bool {
        if !self.query.is_empty()
            && !contains_ignore_case(&class.name, &self.query)
            && !contains_ignore_case(&class.category, &self.query)
        {
            return false;
        }

        match self.status {
            Some(status) => class.status == status,
            None => true,
        }
    }

    pub fn apply(&self, classes: &[Class]) -> Vec<Class> {
        classes.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}
