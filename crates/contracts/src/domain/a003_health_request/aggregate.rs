use crate::system::auth::UserContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn code(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRequest {
    pub id: String,
    pub requester_id: String,
    pub requester_email: Option<String>,
    pub requester_name: Option<String>,

    /// Ссылка на запись инвентаря (если известна при подаче)
    pub item_ref: Option<String>,
    pub item_name: String,
    pub quantity: u32,
    pub reason: String,
    pub date_requested: DateTime<Utc>,

    #[serde(default)]
    pub status: RequestStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_note: Option<String>,
}

impl HealthRequest {
    pub fn new_for_insert(
        requester: &UserContext,
        dto: &HealthRequestDto,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        if dto.quantity <= 0 {
            return Err("Requested quantity must be positive".into());
        }
        let quantity =
            u32::try_from(dto.quantity).map_err(|_| "Requested quantity is too large".to_string())?;

        let request = Self {
            id: String::new(),
            requester_id: requester.uid.clone(),
            requester_email: requester.email.clone(),
            requester_name: requester.display_name.clone(),
            item_ref: dto
                .item_ref
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            item_name: dto.item_name.trim().to_string(),
            quantity,
            reason: dto.reason.trim().to_string(),
            date_requested: now,
            status: RequestStatus::Pending,
            decided_by: None,
            decided_at: None,
            decision_note: None,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.item_name.is_empty() {
            return Err("Item name must not be empty".into());
        }
        if self.reason.is_empty() {
            return Err("Reason must not be empty".into());
        }
        if self.quantity == 0 {
            return Err("Requested quantity must be positive".into());
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Одобрить заявку. Допустимо только из Pending.
    pub fn approve(
        &mut self,
        decided_by: &UserContext,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        self.decide(RequestStatus::Approved, decided_by, note, now)
    }

    /// Отклонить заявку. Допустимо только из Pending.
    pub fn reject(
        &mut self,
        decided_by: &UserContext,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        self.decide(RequestStatus::Rejected, decided_by, note, now)
    }

    fn decide(
        &mut self,
        status: RequestStatus,
        decided_by: &UserContext,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        if !self.is_pending() {
            return Err(format!("Request is already {}", self.status));
        }
        self.status = status;
        self.decided_by = Some(decided_by.uid.clone());
        self.decided_at = Some(now);
        self.decision_note = note.filter(|n| !n.trim().is_empty());
        Ok(())
    }
}

/// Форма подачи заявки
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRequestDto {
    pub item_ref: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub reason: String,
}

/// Решение по заявке
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecisionDto {
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::auth::UserRole;

    fn staff() -> UserContext {
        UserContext::new("staff-1", UserRole::Staff).with_email("nurse@campus.edu")
    }

    fn manager() -> UserContext {
        UserContext::new("mgr-1", UserRole::Manager)
    }

    fn dto(quantity: i64) -> HealthRequestDto {
        HealthRequestDto {
            item_ref: None,
            item_name: "Ibuprofen".into(),
            quantity,
            reason: "First aid kit refill".into(),
        }
    }

    #[test]
    fn test_new_request_is_pending() {
        let request = HealthRequest::new_for_insert(&staff(), &dto(4), Utc::now()).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.requester_email.as_deref(), Some("nurse@campus.edu"));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        assert!(HealthRequest::new_for_insert(&staff(), &dto(0), Utc::now()).is_err());
        assert!(HealthRequest::new_for_insert(&staff(), &dto(-3), Utc::now()).is_err());
    }

    #[test]
    fn test_decision_happens_once() {
        let mut request = HealthRequest::new_for_insert(&staff(), &dto(2), Utc::now()).unwrap();
        request
            .approve(&manager(), Some("ok".into()), Utc::now())
            .unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.decided_by.as_deref(), Some("mgr-1"));

        let err = request.reject(&manager(), None, Utc::now()).unwrap_err();
        assert!(err.contains("approved"));
        assert_eq!(request.status, RequestStatus::Approved);
    }
}
