//! End-to-end update checks against mocked catalogs

mod helper;

use std::sync::Arc;
use std::time::Duration;

use mockito::Server;
use serde_json::json;

use helper::{
    BrokenInventory, RecordingSink, StaticInventory, catalogs_config, component,
    create_test_settings, mock_community_listing, mock_status, mock_store_page,
    mock_store_test_page,
};
use app_update_checker::service::events::{StatusUpdate, UpdateAvailableEvent};
use app_update_checker::service::resolver::UpdateResolver;
use app_update_checker::service::scheduler::Scheduler;
use app_update_checker::version::fetcher::HttpFetcher;
use app_update_checker::version::settings;
use app_update_checker::version::store::{SettingsStore, SqliteSettings};
use app_update_checker::version::types::{Origin, UpdateListEntry};

const PAGE: &str = "/en-us/app/com.example.x/Example-App/";
const TEST_PAGE: &str = "/en-us/app/com.example.x/Example-App/test/";

fn scheduler(
    settings: Arc<SqliteSettings>,
    inventory: Arc<StaticInventory>,
    sink: Arc<RecordingSink>,
    server: &mockito::ServerGuard,
) -> Arc<Scheduler<SqliteSettings>> {
    let resolver = UpdateResolver::new(
        settings,
        inventory,
        Arc::new(HttpFetcher::new().unwrap()),
        sink,
        catalogs_config(server),
    );
    Scheduler::new(resolver)
}

fn example_app(version: &str) -> Arc<StaticInventory> {
    Arc::new(StaticInventory::new(vec![component(
        "com.example.x",
        "Example App",
        version,
        Origin::AppStore,
    )]))
}

#[tokio::test(flavor = "multi_thread")]
async fn reports_community_and_store_updates_once() {
    let mut server = Server::new_async().await;
    mock_community_listing(&mut server, r#"[{"id": "com.example.x", "version": "1.0.1"}]"#).await;
    mock_store_page(&mut server, PAGE, "1.0.2").await;
    mock_status(&mut server, TEST_PAGE, 404).await;

    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings.clone(), example_app("1.0.0"), sink.clone(), &server);

    // 1. First run reports both updates
    assert!(scheduler.check_now(true, false).await);

    let expected_list = vec![
        UpdateListEntry {
            url: format!("{}/community/app/com.example.x", server.url()),
            display_name: "Example App 1.0.1 (Community Store)".to_string(),
        },
        UpdateListEntry {
            url: format!("{}{}", server.url(), PAGE),
            display_name: "Example App 1.0.2 (Athom Store)".to_string(),
        },
    ];
    let report = scheduler.last_report().unwrap();
    assert_eq!(report.status, "");
    assert_eq!(report.updates, expected_list);
    assert_eq!(settings::update_list(&*settings).unwrap(), expected_list);

    assert_eq!(
        settings.get("notifiedList").unwrap(),
        Some(json!([
            {"componentId": "com.example.x", "source": "Community", "version": "1.0.1"},
            {"componentId": "com.example.x", "source": "Athom-Production", "version": "1.0.2"}
        ]))
    );
    assert_eq!(
        sink.events(),
        vec![
            UpdateAvailableEvent {
                component_name: "Example App".to_string(),
                store_label: "Community Store".to_string(),
                old_version: "1.0.0".to_string(),
                new_version: "1.0.1".to_string(),
            },
            UpdateAvailableEvent {
                component_name: "Example App".to_string(),
                store_label: "Athom Store".to_string(),
                old_version: "1.0.0".to_string(),
                new_version: "1.0.2".to_string(),
            },
        ]
    );
    assert_eq!(sink.notifications().len(), 2);

    // 2. Second run rebuilds the same list without reporting again
    assert!(scheduler.check_now(true, false).await);

    assert_eq!(scheduler.last_report().unwrap().updates, expected_list);
    assert_eq!(settings::update_list(&*settings).unwrap(), expected_list);
    assert_eq!(sink.events().len(), 2);
    assert_eq!(sink.notifications().len(), 2);

    scheduler.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn pushes_status_phases_and_empty_status_on_success() {
    let mut server = Server::new_async().await;
    mock_community_listing(&mut server, "[]").await;
    mock_store_page(&mut server, PAGE, "1.0.0").await;
    mock_status(&mut server, TEST_PAGE, 404).await;

    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings, example_app("1.0.0"), sink.clone(), &server);

    assert!(scheduler.check_now(false, false).await);
    scheduler.shutdown();

    assert_eq!(
        sink.statuses(),
        vec![
            StatusUpdate::Fetching("Community Store".to_string()),
            StatusUpdate::Fetching("Installed apps".to_string()),
            StatusUpdate::Fetching("Athom Store".to_string()),
            StatusUpdate::Status(String::new()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn reports_again_when_catalog_version_changes() {
    let mut server = Server::new_async().await;
    let listing =
        mock_community_listing(&mut server, r#"[{"id": "com.example.x", "version": "1.0.1"}]"#)
            .await;
    mock_store_page(&mut server, PAGE, "1.0.0").await;
    mock_status(&mut server, TEST_PAGE, 404).await;

    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings.clone(), example_app("1.0.0"), sink.clone(), &server);

    assert!(scheduler.check_now(true, false).await);

    listing.remove_async().await;
    mock_community_listing(&mut server, r#"[{"id": "com.example.x", "version": "1.0.3"}]"#).await;

    assert!(scheduler.check_now(true, false).await);
    scheduler.shutdown();

    let new_versions: Vec<_> = sink.events().into_iter().map(|e| e.new_version).collect();
    assert_eq!(new_versions, vec!["1.0.1", "1.0.3"]);
    assert_eq!(
        settings.get("notifiedList").unwrap(),
        Some(json!([
            {"componentId": "com.example.x", "source": "Community", "version": "1.0.3"}
        ]))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn reports_test_channel_when_release_is_current() {
    let mut server = Server::new_async().await;
    mock_community_listing(&mut server, "[]").await;
    mock_store_page(&mut server, PAGE, "1.0.2").await;
    mock_store_test_page(&mut server, TEST_PAGE, "1.1.0").await;

    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings.clone(), example_app("1.0.2"), sink.clone(), &server);

    assert!(scheduler.check_now(true, false).await);
    scheduler.shutdown();

    assert_eq!(
        scheduler.last_report().unwrap().updates,
        vec![UpdateListEntry {
            url: format!("{}{}", server.url(), TEST_PAGE),
            display_name: "Example App 1.1.0 (Athom Store (test))".to_string(),
        }]
    );
    assert_eq!(
        settings.get("notifiedList").unwrap(),
        Some(json!([
            {"componentId": "com.example.x", "source": "Athom-Test", "version": "1.1.0"}
        ]))
    );
    assert_eq!(
        sink.notifications(),
        vec!["Update available for Example App on Athom Store (test) from 1.0.2 to 1.1.0"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn continues_without_community_store_when_listing_fails() {
    let mut server = Server::new_async().await;
    mock_status(&mut server, "/api/apps", 503).await;
    mock_store_page(&mut server, PAGE, "1.0.2").await;
    mock_status(&mut server, TEST_PAGE, 404).await;

    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings, example_app("1.0.0"), sink.clone(), &server);

    assert!(scheduler.check_now(false, false).await);
    scheduler.shutdown();

    let report = scheduler.last_report().unwrap();
    assert_eq!(report.status, "");
    assert_eq!(report.updates.len(), 1);
    assert_eq!(sink.events()[0].store_label, "Athom Store");
    assert!(sink.notifications().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_store_page_only_loses_that_app() {
    let mut server = Server::new_async().await;
    mock_community_listing(&mut server, "[]").await;
    mock_status(&mut server, PAGE, 500).await;
    mock_store_page(&mut server, "/en-us/app/com.example.y/Other-App/", "2.0.0").await;
    mock_status(&mut server, "/en-us/app/com.example.y/Other-App/test/", 404).await;

    let inventory = Arc::new(StaticInventory::new(vec![
        component("com.example.x", "Example App", "1.0.0", Origin::AppStore),
        component("com.example.y", "Other App", "1.0.0", Origin::AppStore),
    ]));
    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings, inventory, sink.clone(), &server);

    assert!(scheduler.check_now(false, false).await);
    scheduler.shutdown();

    let report = scheduler.last_report().unwrap();
    assert_eq!(report.status, "");
    assert_eq!(report.updates.len(), 1);
    assert_eq!(report.updates[0].display_name, "Other App 2.0.0 (Athom Store)");
}

#[tokio::test(flavor = "multi_thread")]
async fn run_level_failure_is_reported_as_status_and_still_reschedules() {
    let server = Server::new_async().await;
    let (_temp_dir, settings) = create_test_settings();
    let previous = vec![UpdateListEntry {
        url: "https://example.test".to_string(),
        display_name: "Previous 1.0.0 (Community Store)".to_string(),
    }];
    settings
        .set("updateList", serde_json::to_value(&previous).unwrap())
        .unwrap();

    let sink = Arc::new(RecordingSink::default());
    let resolver = UpdateResolver::new(
        settings.clone(),
        Arc::new(BrokenInventory),
        Arc::new(HttpFetcher::new().unwrap()),
        sink.clone(),
        catalogs_config(&server),
    );
    let scheduler = Scheduler::new(resolver);

    assert!(scheduler.check_now(true, false).await);

    let report = scheduler.last_report().unwrap();
    assert!(report.status.contains("installed.json missing"));
    assert_eq!(
        sink.statuses().last(),
        Some(&StatusUpdate::Status(report.status.clone()))
    );
    // Nothing is published for a failed run
    assert_eq!(settings::update_list(&*settings).unwrap(), previous);
    assert!(!scheduler.is_checking());
    assert!(scheduler.has_pending_timer());

    scheduler.shutdown();
    assert!(!scheduler.has_pending_timer());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_check_is_skipped_not_queued() {
    let mut server = Server::new_async().await;
    mock_community_listing(&mut server, "[]").await;
    mock_store_page(&mut server, PAGE, "1.0.0").await;
    mock_status(&mut server, TEST_PAGE, 404).await;

    let inventory = Arc::new(
        StaticInventory::new(vec![component(
            "com.example.x",
            "Example App",
            "1.0.0",
            Origin::AppStore,
        )])
        .with_delay(Duration::from_millis(300)),
    );
    let (_temp_dir, settings) = create_test_settings();
    let sink = Arc::new(RecordingSink::default());
    let scheduler = scheduler(settings, inventory.clone(), sink, &server);

    let (first, second) = tokio::join!(
        scheduler.check_now(false, false),
        scheduler.check_now(false, false)
    );

    assert_ne!(first, second);
    assert_eq!(inventory.calls(), 1);

    // Once the first run is over a new check runs again
    assert!(scheduler.check_now(false, false).await);
    assert_eq!(inventory.calls(), 2);

    scheduler.shutdown();
}
