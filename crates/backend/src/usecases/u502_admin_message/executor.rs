use chrono::Utc;
use contracts::domain::a006_notification::{Notification, NotificationKind, Recipient};
use contracts::system::auth::UserContext;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u502_admin_message::{
    AdminMessage, AdminMessageRequest, AdminMessageResponse,
};

use crate::domain::a006_notification;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;

/// Сообщение администратора: уведомление в приложении, затем письмо,
/// если указан адрес. Письмо уходит через первый сработавший транспорт.
pub async fn execute(
    state: &AppState,
    ctx: &UserContext,
    request: &AdminMessageRequest,
) -> Result<AdminMessageResponse, AppError> {
    AppError::require(ctx.role.is_admin(), "send admin messages")?;
    request.validate().map_err(AppError::Validation)?;

    let notification = Notification::new(
        Recipient::User(request.recipient_uid.trim().to_string()),
        NotificationKind::AdminMessage,
        request.subject.trim(),
        request.body.trim(),
        Utc::now(),
    );
    let notification_id =
        a006_notification::service::notify(state.store.as_ref(), notification).await?;

    let delivery = match request.recipient_email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            let mail = state.mail.compose(email, &request.subject, &request.body);
            let report = state.mail.deliver(&mail).await;
            tracing::info!(
                "{}: message to {} delivered via {:?} ({} transport(s) skipped)",
                AdminMessage::full_name(),
                email,
                report.method,
                report.skipped.len()
            );
            Some(report)
        }
        _ => None,
    };

    Ok(AdminMessageResponse {
        notification_id,
        delivery,
    })
}
