mod helpers;

use helpers::setup::spawn_app;
use medication_reminders_api_structs::{get_service_health, inspect_reminders};
use medication_reminders_domain::{Profile, Reminder, ID};
use medication_reminders_infra::{IProfileRepo, IReminderRepo};

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let app = spawn_app().await;

    let res = reqwest::get(format!("{}/", app.address))
        .await
        .expect("Expected status request to succeed");

    assert!(res.status().is_success());
    let body = res
        .json::<get_service_health::APIResponse>()
        .await
        .expect("Expected status body");
    assert!(body.message.contains("is up"));
}

#[actix_web::main]
#[test]
async fn test_inspect_reminders() {
    let app = spawn_app().await;

    let mut profile = Profile::new(ID::new());
    profile.full_name = Some("Ada Lovelace".into());
    profile.email = Some("ada@example.com".into());
    app.ctx.repos.profiles.insert(&profile).await.unwrap();
    let orphan = Reminder::new(ID::new(), "Aspirin".into(), "21:30".parse().unwrap());
    let reminder = Reminder::new(profile.id.clone(), "Metformin".into(), "08:00".parse().unwrap());
    app.ctx.repos.reminders.insert(&reminder).await.unwrap();
    app.ctx.repos.reminders.insert(&orphan).await.unwrap();

    let res = reqwest::get(format!("{}/reminders/inspect", app.address))
        .await
        .expect("Expected inspect request to succeed");
    assert!(res.status().is_success());
    let body = res.text().await.expect("Expected inspect body");

    assert!(!body.contains("ada@example.com"));
    let inspection: inspect_reminders::APIResponse =
        serde_json::from_str(&body).expect("Expected inspect response");
    assert_eq!(inspection.lead_minutes, app.ctx.config.lead_minutes);
    assert_eq!(inspection.reminders.len(), 2);
    assert_eq!(inspection.reminders[0].id, reminder.id);
    assert_eq!(inspection.reminders[1].id, orphan.id);
    assert_eq!(inspection.profiles.len(), 1);
    assert!(inspection.profiles[0].has_address);
    assert_eq!(
        inspection.profiles[0].display_name.as_deref(),
        Some("Ada Lovelace")
    );
}

#[actix_web::main]
#[test]
async fn test_unknown_route_is_not_found() {
    let app = spawn_app().await;

    let res = reqwest::get(format!("{}/reminders/unknown", app.address))
        .await
        .expect("Expected request to complete");

    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(app.transport.sent().is_empty());
}
