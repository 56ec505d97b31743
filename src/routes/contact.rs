use actix_web::{
    Either, HttpMessage, HttpRequest, HttpResponse, ResponseError,
    http::{StatusCode, header::ContentType},
    web,
};

use crate::email_client::{DeliveryError, EmailClient, MailMessage};

use super::helpers::error_chain_fmt;

#[derive(serde::Deserialize, Default, Debug)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    fn into_mail(self, sender: &str, admin: &str) -> MailMessage {
        let name = self.name.unwrap_or_default();
        let email = self.email.unwrap_or_default();
        let message = self.message.unwrap_or_default();
        let reply_to = email
            .parse::<lettre::message::Mailbox>()
            .ok()
            .map(|_| email.clone());

        MailMessage {
            from: sender.to_string(),
            to: admin.to_string(),
            reply_to,
            subject: format!("New Contact Form Submission from {name}"),
            text: format!("You have a new message from {name} ({email}):\n\n{message}"),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("The {0} body could not be parsed.")]
    InvalidBody(String),
    #[error("Failed to deliver the contact form email.")]
    DeliveryError(#[from] DeliveryError),
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ContactError::DeliveryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ContactError::InvalidBody(_) => "Invalid request body.",
            ContactError::DeliveryError(_) => "Failed to send email.",
        };
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(body)
    }
}

fn is_parsed_body_type(content_type: &str) -> bool {
    ["application/json", "application/x-www-form-urlencoded"]
        .iter()
        .any(|t| content_type.eq_ignore_ascii_case(t))
}

/// Accepts the site's form posts as JSON or url-encoded. A body of some other
/// type (or none at all) is ignored and the submission counts as empty.
#[tracing::instrument(
    name = "Forwarding a contact form submission",
    skip(req, form, email_client)
)]
pub async fn send_contact_email(
    req: HttpRequest,
    form: Option<Either<web::Json<ContactForm>, web::Form<ContactForm>>>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, ContactError> {
    let form = match form {
        Some(Either::Left(json)) => json.into_inner(),
        Some(Either::Right(form)) => form.into_inner(),
        None if is_parsed_body_type(req.content_type()) => {
            return Err(ContactError::InvalidBody(req.content_type().to_string()));
        }
        None => ContactForm::default(),
    };

    let mail = form.into_mail(email_client.sender(), email_client.admin());
    let delivery = email_client.send(&mail).await.inspect_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Contact form email was not delivered"
        )
    })?;
    tracing::info!(accepted = ?delivery.accepted, "Contact form email sent");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Email sent successfully!"))
}
