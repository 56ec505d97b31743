use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use secrecy::{ExposeSecret, SecretString};

pub const IMPLICIT_TLS_PORT: u16 = 465;
pub const SUBMISSION_PORT: u16 = 587;

/// Resolved SMTP connection details. Only built when a host is configured.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: Option<u16>,
    pub secure: bool,
    pub credentials: Option<(String, SecretString)>,
}

#[derive(Clone, Debug)]
enum Transporter {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Console,
}

#[derive(Clone, Debug)]
pub struct EmailClient {
    transporter: Transporter,
    sender: String,
    admin: String,
}

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub accepted: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("{address:?} is not a valid mailbox")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("Failed to build the email")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport error")]
    Transport(#[from] lettre::transport::smtp::Error),
}

fn mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse()
        .map_err(|source| DeliveryError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

impl MailMessage {
    fn to_message(&self) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder()
            .from(mailbox(&self.from)?)
            .to(mailbox(&self.to)?)
            .subject(&self.subject)
            .header(ContentType::TEXT_PLAIN);

        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }

        Ok(builder.body(self.text.clone())?)
    }
}

impl EmailClient {
    /// Builds a client that relays through SMTP, or only logs when `smtp` is `None`.
    pub fn new(
        smtp: Option<SmtpSettings>,
        sender: String,
        admin: String,
    ) -> Result<Self, DeliveryError> {
        mailbox(&sender)?;
        mailbox(&admin)?;

        let transporter = match smtp {
            Some(settings) => Transporter::Smtp(build_transport(settings)?),
            None => Transporter::Console,
        };

        Ok(Self {
            transporter,
            sender,
            admin,
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    pub fn is_console(&self) -> bool {
        matches!(self.transporter, Transporter::Console)
    }

    /// Checks that the SMTP server is reachable. The outcome is only logged.
    #[tracing::instrument(name = "Verifying the mail transporter", skip(self))]
    pub async fn verify(&self) {
        let Transporter::Smtp(transport) = &self.transporter else {
            tracing::info!("No SMTP host configured, emails will only be logged");
            return;
        };

        match transport.test_connection().await {
            Ok(true) => tracing::info!("SMTP server is ready to take messages"),
            Ok(false) => tracing::warn!("SMTP server did not accept the connection test"),
            Err(e) => tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "SMTP connection test failed"
            ),
        }
    }

    #[tracing::instrument(
        name = "Sending an email",
        skip(self, message),
        fields(to = %message.to, subject = %message.subject)
    )]
    pub async fn send(&self, message: &MailMessage) -> Result<Delivery, DeliveryError> {
        match &self.transporter {
            Transporter::Smtp(transport) => {
                let email = message.to_message()?;
                let accepted = email
                    .envelope()
                    .to()
                    .iter()
                    .map(ToString::to_string)
                    .collect();

                transport.send(email).await?;
                Ok(Delivery { accepted })
            }
            Transporter::Console => {
                tracing::info!(
                    from = %message.from,
                    reply_to = ?message.reply_to,
                    body = %message.text,
                    "SMTP not configured, logging the email instead of sending it"
                );
                Ok(Delivery {
                    accepted: vec![self.admin.clone()],
                })
            }
        }
    }
}

fn build_transport(
    settings: SmtpSettings,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
    let mut builder = if settings.secure {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
            .port(settings.port.unwrap_or(IMPLICIT_TLS_PORT))
    } else {
        let tls = TlsParameters::new(settings.host.clone())?;
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port.unwrap_or(SUBMISSION_PORT))
            .tls(Tls::Opportunistic(tls))
    };

    if let Some((user, password)) = settings.credentials {
        builder = builder.credentials(Credentials::new(
            user,
            password.expose_secret().to_string(),
        ));
    }

    Ok(builder.build())
}
