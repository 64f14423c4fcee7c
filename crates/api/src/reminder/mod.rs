mod inspect_reminders;
mod send_reminders;

use actix_web::web;
use inspect_reminders::inspect_reminders_controller;
pub use send_reminders::{CycleReport, DispatchOutcome, SendRemindersUseCase};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/inspect",
        web::get().to(inspect_reminders_controller),
    );
}
