mod error;
mod job_schedulers;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, rt::task::JoinHandle, web, App, HttpServer};
use job_schedulers::start_reminder_dispatcher;
pub use job_schedulers::{run_reminder_dispatcher, IntervalTicker, PollTicker};
use medication_reminders_infra::ReminderContext;
pub use reminder::{CycleReport, DispatchOutcome, SendRemindersUseCase};
pub use shared::usecase::{execute, UseCase};
use std::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    dispatcher: JoinHandle<()>,
    shutdown: CancellationToken,
}

impl Application {
    pub async fn new(context: ReminderContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        let shutdown = CancellationToken::new();
        let dispatcher = start_reminder_dispatcher(context, shutdown.clone());

        Ok(Self {
            server,
            port,
            dispatcher,
            shutdown,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: ReminderContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves until the process is asked to stop, then lets the dispatcher
    /// finish the cycle it is in before returning.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;

        info!("Shutting down the reminder dispatcher");
        self.shutdown.cancel();
        if let Err(e) = self.dispatcher.await {
            warn!("Reminder dispatcher did not stop cleanly: {:?}", e);
        }

        res
    }
}
