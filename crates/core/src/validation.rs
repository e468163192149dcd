use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::states::ContactDetails;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_COMPANY_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 2000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level validation failures, surfaced inline next to the form
/// fields. Never reaches the estimate engine or the state machine.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("contact validation failed for {} field(s)", .fields.len())]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.field.as_str()).collect()
    }
}

pub fn validate_contact(contact: &ContactDetails) -> Result<(), ValidationError> {
    let mut fields = Vec::new();

    check_name(&mut fields, "first_name", &contact.first_name);
    check_name(&mut fields, "last_name", &contact.last_name);
    check_email(&mut fields, &contact.email);

    if let Some(company) = &contact.company {
        if company.chars().count() > MAX_COMPANY_LEN {
            push(&mut fields, "company", format!("must be at most {MAX_COMPANY_LEN} characters"));
        }
    }
    if let Some(notes) = &contact.notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            push(&mut fields, "notes", format!("must be at most {MAX_NOTES_LEN} characters"));
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

fn check_name(fields: &mut Vec<FieldError>, field: &str, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        push(fields, field, "is required".to_string());
    } else if trimmed.chars().count() > MAX_NAME_LEN {
        push(fields, field, format!("must be at most {MAX_NAME_LEN} characters"));
    }
}

fn check_email(fields: &mut Vec<FieldError>, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        push(fields, "email", "is required".to_string());
        return;
    }
    if trimmed.chars().count() > MAX_EMAIL_LEN || !is_plausible_email(trimmed) {
        push(fields, "email", "must be a valid email address".to_string());
    }
}

// Structural check only; deliverability is the backend's problem.
fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !domain.contains("@")
}

fn push(fields: &mut Vec<FieldError>, field: &str, message: String) {
    fields.push(FieldError { field: field.to_string(), message });
}
