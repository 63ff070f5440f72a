use crate::system::auth::UserContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ноутбук, сданный сотрудником в ИТ-отдел
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaptopSubmission {
    pub id: String,
    /// Ссылка на запись в коллекции laptops, если ноутбук учтен
    pub laptop_ref: Option<String>,
    pub serial_number: String,
    pub model: String,
    pub submitted_by: String,
    pub submitted_by_email: Option<String>,
    pub campus_ref: Option<String>,
    pub notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl LaptopSubmission {
    pub fn new_for_insert(
        submitter: &UserContext,
        dto: &LaptopSubmissionDto,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        let submission = Self {
            id: String::new(),
            laptop_ref: trimmed(dto.laptop_ref.as_deref()),
            serial_number: dto.serial_number.trim().to_uppercase(),
            model: dto.model.trim().to_string(),
            submitted_by: submitter.uid.clone(),
            submitted_by_email: submitter.email.clone(),
            campus_ref: trimmed(dto.campus_ref.as_deref()),
            notes: trimmed(dto.notes.as_deref()),
            submitted_at: now,
        };
        submission.validate()?;
        Ok(submission)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.serial_number.is_empty() {
            return Err("Serial number must not be empty".into());
        }
        if self.model.is_empty() {
            return Err("Model must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaptopSubmissionDto {
    pub laptop_ref: Option<String>,
    pub serial_number: String,
    pub model: String,
    pub campus_ref: Option<String>,
    pub notes: Option<String>,
}

pub(crate) fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
