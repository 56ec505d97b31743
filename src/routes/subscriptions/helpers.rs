use crate::{domain::SubscriberEmail, email_client::MailMessage};

pub fn confirmation_email(sender: &str, subscriber: &SubscriberEmail) -> MailMessage {
    MailMessage {
        from: sender.to_string(),
        to: subscriber.to_string(),
        reply_to: None,
        subject: "Welcome to Carl's Closet!".into(),
        text: "Thanks for subscribing to the Carl's Closet newsletter!\n\n\
            You'll be the first to hear about new arrivals, sales and events.\n\n\
            If you did not sign up, you can safely ignore this email."
            .into(),
    }
}

pub fn admin_notification_email(
    sender: &str,
    admin: &str,
    subscriber: &SubscriberEmail,
) -> MailMessage {
    MailMessage {
        from: sender.to_string(),
        to: admin.to_string(),
        reply_to: None,
        subject: "New newsletter subscriber".into(),
        text: format!("{subscriber} just subscribed to the Carl's Closet newsletter."),
    }
}
