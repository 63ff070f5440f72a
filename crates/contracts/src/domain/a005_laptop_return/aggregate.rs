use crate::domain::a004_laptop_submission::aggregate::{trimmed, LaptopSubmission};
use crate::system::auth::UserContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Возврат ноутбука владельцу. Создается вместо удаляемой записи сдачи.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaptopReturn {
    pub id: String,
    pub submission_ref: String,
    pub laptop_ref: Option<String>,
    pub serial_number: String,
    pub model: String,
    /// uid сотрудника, которому вернули ноутбук
    pub returned_to: String,
    pub returned_to_email: Option<String>,
    pub processed_by: String,
    pub campus_ref: Option<String>,
    pub notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
}

impl LaptopReturn {
    pub fn from_submission(
        submission: &LaptopSubmission,
        processed_by: &UserContext,
        dto: &LaptopReturnDto,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            submission_ref: submission.id.clone(),
            laptop_ref: submission.laptop_ref.clone(),
            serial_number: submission.serial_number.clone(),
            model: submission.model.clone(),
            returned_to: submission.submitted_by.clone(),
            returned_to_email: submission.submitted_by_email.clone(),
            processed_by: processed_by.uid.clone(),
            campus_ref: submission.campus_ref.clone(),
            notes: trimmed(dto.notes.as_deref()).or_else(|| submission.notes.clone()),
            submitted_at: submission.submitted_at,
            returned_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaptopReturnDto {
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a004_laptop_submission::LaptopSubmissionDto;
    use crate::system::auth::UserRole;

    #[test]
    fn test_return_copies_submission_and_owner() {
        let owner = UserContext::new("u-1", UserRole::Staff).with_email("owner@campus.edu");
        let mut submission = LaptopSubmission::new_for_insert(
            &owner,
            &LaptopSubmissionDto {
                laptop_ref: Some("lap-9".into()),
                serial_number: "sn-1".into(),
                model: "MacBook Air".into(),
                campus_ref: Some("c-1".into()),
                notes: Some("cracked hinge".into()),
            },
            Utc::now(),
        )
        .unwrap();
        submission.id = "sub-1".into();

        let it = UserContext::new("it-1", UserRole::Manager);
        let dto = LaptopReturnDto::default();
        let ret = LaptopReturn::from_submission(&submission, &it, &dto, Utc::now());
        assert_eq!(ret.submission_ref, "sub-1");
        assert_eq!(ret.returned_to, "u-1");
        assert_eq!(ret.processed_by, "it-1");
        assert_eq!(ret.notes.as_deref(), Some("cracked hinge"));
        assert!(ret.returned_at >= ret.submitted_at);
    }
}
