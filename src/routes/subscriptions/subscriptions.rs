use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, web};

use crate::{
    domain::SubscriberEmail,
    email_client::{Delivery, DeliveryError, EmailClient},
    routes::helpers::log_failed_deliveries,
    subscriber_store::SubscriberStore,
};

use super::{
    errors::SubscribeError,
    helpers::{admin_notification_email, confirmation_email},
};

#[derive(serde::Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: serde_json::Value,
}

#[derive(serde::Serialize)]
struct SubscribeResponse {
    message: &'static str,
}

/// Malformed or non-JSON bodies get the same answer as a bad address.
pub fn subscribe_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        SubscribeError::ValidationError(err.to_string()).into()
    })
}

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(payload, store, email_client),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    payload: web::Json<SubscribeRequest>,
    store: web::Data<SubscriberStore>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SubscribeError> {
    let email = SubscriberEmail::try_from(payload.into_inner().email)
        .map_err(SubscribeError::ValidationError)?;
    tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

    let mut subscribers = store.load().await;
    if subscribers.iter().any(|s| s == email.as_ref()) {
        tracing::info!("Address is already subscribed");
        return Ok(HttpResponse::Ok().json(SubscribeResponse {
            message: "Already subscribed",
        }));
    }

    subscribers.push(email.to_string());
    store.save(&subscribers).await;

    let outcomes = notify_new_subscriber(&email_client, &email).await;
    let failed = log_failed_deliveries(&outcomes[..]);
    if failed > 0 {
        tracing::warn!(failed, "Subscription stored, but not every email went out");
    }

    Ok(HttpResponse::Ok().json(SubscribeResponse {
        message: "Subscribed",
    }))
}

/// Both sends run to completion independently; neither outcome affects the other.
#[tracing::instrument(name = "Notifying about a new subscriber", skip(email_client))]
async fn notify_new_subscriber(
    email_client: &EmailClient,
    subscriber: &SubscriberEmail,
) -> [(&'static str, Result<Delivery, DeliveryError>); 2] {
    let confirmation = confirmation_email(email_client.sender(), subscriber);
    let notification =
        admin_notification_email(email_client.sender(), email_client.admin(), subscriber);

    let (confirmation, notification) = tokio::join!(
        email_client.send(&confirmation),
        email_client.send(&notification)
    );

    [
        ("subscriber_confirmation", confirmation),
        ("admin_notification", notification),
    ]
}
