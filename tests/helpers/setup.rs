use medication_reminders_api::Application;
use medication_reminders_infra::{InMemoryNotificationTransport, ReminderContext};
use std::sync::Arc;

pub struct TestApp {
    pub ctx: ReminderContext,
    pub transport: Arc<InMemoryNotificationTransport>,
    pub address: String,
}

// Launch the application as a background task, backed by inmemory
// repositories so that no database or mail server is needed
pub async fn spawn_app() -> TestApp {
    let mut ctx = ReminderContext::create_inmemory();
    ctx.config.port = 0; // Random port
    let transport = Arc::new(InMemoryNotificationTransport::new());
    ctx.transport = transport.clone();

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        transport,
        address,
    }
}
