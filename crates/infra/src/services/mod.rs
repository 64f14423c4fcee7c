mod notification;

pub use notification::{
    create_notification_transport, INotificationTransport, InMemoryNotificationTransport,
    SmtpNotificationTransport, WebhookNotificationTransport,
};
