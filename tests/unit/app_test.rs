#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use rstest::rstest;
use tempfile::TempDir;

use common::{
    certificate, trusted, url, FakeDownloader, FakeEvaluator, FakeProbe, FakeSurface,
    MemoryPersistence, SharedRuleStore, SharedSurface,
};
use opacity::app::{App, Collaborators};
use opacity::managers::tab_manager::TabCollectionTrait;
use opacity::managers::window_manager::{CloseOutcome, WindowRegistryTrait};
use opacity::services::content_blocker::RuleStoreOp;
use opacity::services::favicon_loader::{FAVICON_QUERY_SCRIPT, TITLE_QUERY_SCRIPT};
use opacity::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use opacity::services::navigation_controller::hash_change_listener_script;
use opacity::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use opacity::types::certificate::{CertificateStatus, ServerTrust};
use opacity::types::errors::NavigationError;
use opacity::types::navigation::{
    ChallengeDisposition, LoadDecision, NavigationEvent, NavigationTask,
};
use opacity::types::privacy::BlockingLevel;
use opacity::types::tab::TabId;
use opacity::managers::drag_coordinator::DropOutcome;
use opacity::types::window::{Point, WindowId};

struct Harness {
    app: App,
    persistence: MemoryPersistence,
    downloader: Arc<FakeDownloader>,
    probe: Arc<FakeProbe>,
    rules: SharedRuleStore,
    _dir: TempDir,
}

fn example_trust() -> ServerTrust {
    trusted(vec![certificate("Example Inc", &["example.com"])])
}

fn build(dir: TempDir, favicon: Option<Vec<u8>>, trust: ServerTrust) -> Harness {
    let persistence = MemoryPersistence::default();
    let downloader = Arc::new(FakeDownloader::new(favicon));
    let probe = Arc::new(FakeProbe::new(trust));
    let rules = SharedRuleStore::default();
    let collaborators = Collaborators {
        persistence: Box::new(persistence.clone()),
        rule_store: Box::new(rules.clone()),
        trust_probe: probe.clone(),
        downloader: downloader.clone(),
    };
    let mut app = App::new(
        SettingsEngine::new(Some(dir.path().join("settings.json"))),
        LocalizationEngine::new().unwrap(),
        collaborators,
        tokio::runtime::Handle::current(),
    );
    app.startup().unwrap();

    Harness {
        app,
        persistence,
        downloader,
        probe,
        rules,
        _dir: dir,
    }
}

fn harness_with(dir: TempDir, favicon: Option<Vec<u8>>) -> Harness {
    build(dir, favicon, example_trust())
}

fn harness() -> Harness {
    harness_with(TempDir::new().unwrap(), Some(vec![1, 2, 3]))
}

fn page_surface(raw: &str) -> SharedSurface {
    let mut surface = FakeSurface::at(raw);
    surface.evaluator = Arc::new(
        FakeEvaluator::new()
            .answer(TITLE_QUERY_SCRIPT, 0, Ok(json!("Example")))
            .answer(FAVICON_QUERY_SCRIPT, 0, Ok(json!("/icon.png"))),
    );
    SharedSurface::new(surface)
}

fn first_tab(app: &App, window: WindowId) -> TabId {
    app.registry().window(window).unwrap().tabs.tab_order()[0]
}

async fn drain(app: &mut App, count: usize) {
    for _ in 0..count {
        let applied = tokio::time::timeout(Duration::from_secs(5), app.process_next())
            .await
            .unwrap();
        assert!(applied);
    }
}

/// Answers arrive from the checking task, after the owner replied.
async fn challenge_answers(probe: &FakeProbe) -> Vec<(url::Url, ChallengeDisposition)> {
    for _ in 0..500 {
        let answers = probe.answers();
        if !answers.is_empty() {
            return answers;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    probe.answers()
}

fn load(app: &mut App, tab: TabId) -> Vec<NavigationTask> {
    app.handle_navigation(tab, NavigationEvent::Started).unwrap();
    app.handle_navigation(tab, NavigationEvent::Committed).unwrap();
    app.handle_navigation(tab, NavigationEvent::Finished)
        .unwrap()
        .tasks
}

#[tokio::test]
async fn test_startup_applies_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("settings.json"),
        json!({
            "general": { "language": "ko", "homepage": "opacity://new-tab" },
            "privacy": { "blocking_level": "Strong" },
            "window": { "width": 800.0, "height": 600.0 }
        })
        .to_string(),
    )
    .unwrap();

    let h = harness_with(dir, None);

    assert_eq!(h.app.localization().get_locale(), "ko");
    assert_eq!(h.app.content_blocker().current_level(), Some(BlockingLevel::Strong));
}

#[tokio::test]
async fn test_finished_load_resolves_certificate_and_persists_visit() {
    let mut h = harness();
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    let surface = page_surface("https://example.com/");
    h.app.attach_surface(tab, Box::new(surface.clone()));

    let tasks = load(&mut h.app, tab);
    assert_eq!(tasks.len(), 2);
    assert_eq!(h.app.registry().tab(tab).unwrap().certificate, CertificateStatus::invalid());

    // Certificate answer, metadata join, then the visit built from it.
    drain(&mut h.app, 3).await;

    let state = h.app.registry().tab(tab).unwrap();
    assert_eq!(state.certificate, CertificateStatus::valid("Example Inc"));
    assert_eq!(state.title, "Example");
    assert_eq!(state.favicon_url, Some(url("https://example.com/icon.png")));
    assert_eq!(state.history_sites.len(), 1);
    assert_eq!(h.app.validator().cached_summary("example.com"), Some("Example Inc"));

    let visits = h.persistence.visits.lock().unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].url, "https://example.com/");
    assert_eq!(visits[0].title, "Example");
    assert_eq!(visits[0].favicon, Some(vec![1, 2, 3]));
    assert_eq!(
        h.downloader.requests.lock().unwrap().as_slice(),
        &[url("https://example.com/icon.png")]
    );
    assert!(surface.with(|s| s.scripts.contains(&hash_change_listener_script())));
}

#[tokio::test]
async fn test_failed_favicon_download_still_persists_visit() {
    let mut h = harness_with(TempDir::new().unwrap(), None);
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    h.app.attach_surface(tab, Box::new(page_surface("https://example.com/")));

    load(&mut h.app, tab);
    drain(&mut h.app, 3).await;

    let visits = h.persistence.visits.lock().unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].favicon, None);
}

#[tokio::test]
async fn test_results_for_superseded_load_are_dropped() {
    let mut h = harness();
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    h.app.attach_surface(tab, Box::new(page_surface("https://example.com/")));

    load(&mut h.app, tab);
    h.app.handle_navigation(tab, NavigationEvent::Started).unwrap();
    drain(&mut h.app, 2).await;

    let state = h.app.registry().tab(tab).unwrap();
    assert_eq!(state.certificate, CertificateStatus::invalid());
    assert!(state.history_sites.is_empty());
    assert_eq!(h.app.validator().cached_summary("example.com"), Some("Example Inc"));
    assert!(h.persistence.visits.lock().unwrap().is_empty());
    assert_eq!(h.app.process_pending(), 0);
}

#[tokio::test]
async fn test_navigate_reloads_searched_address() {
    let mut h = harness();
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    let surface = SharedSurface::new(FakeSurface::at("https://example.com/"));
    h.app.attach_surface(tab, Box::new(surface.clone()));

    let decision = h.app.navigate(tab, url("https://rust-lang.org/"));

    assert_eq!(decision, Some(LoadDecision::ReloadedBySearch));
    assert_eq!(surface.with(|s| s.loads.clone()), vec![url("https://rust-lang.org/")]);
    assert!(!h.app.registry().tab(tab).unwrap().is_update_by_search);
}

#[tokio::test]
async fn test_detached_tab_has_no_surface() {
    let mut h = harness();
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);

    assert_eq!(h.app.sync_tab(tab), None);
    assert!(h.app.handle_navigation(tab, NavigationEvent::Started).is_none());
    assert!(matches!(
        h.app.find_in_page(tab, "rust", false),
        Err(NavigationError::NoSurface(_))
    ));
}

#[tokio::test]
async fn test_find_in_page_runs_script() {
    let mut h = harness();
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    let surface = SharedSurface::new(FakeSurface::at("https://example.com/"));
    h.app.attach_surface(tab, Box::new(surface.clone()));

    h.app.find_in_page(tab, "rust", true).unwrap();

    assert_eq!(
        surface.with(|s| s.scripts.clone()),
        vec![r#"window.find("rust", false, true, true);"#.to_string()]
    );
}

#[tokio::test]
async fn test_close_tab_releases_surface() {
    let mut h = harness();
    let window = h
        .app
        .open_window(vec![url("https://a.test/"), url("https://b.test/")])
        .unwrap();
    let order = h.app.registry().window(window).unwrap().tabs.tab_order();
    for tab in &order {
        h.app
            .attach_surface(*tab, Box::new(SharedSurface::new(FakeSurface::new())));
    }

    let outcome = h.app.close_tab(window, order[0]).unwrap();
    assert_eq!(outcome, CloseOutcome::TabClosed { window });
    assert!(h.app.handle_navigation(order[0], NavigationEvent::Started).is_none());

    let outcome = h.app.close_tab(window, order[1]).unwrap();
    assert_eq!(outcome, CloseOutcome::ExitApplication);
    assert!(h.app.handle_navigation(order[1], NavigationEvent::Started).is_some());
    assert_eq!(h.app.registry().window_count(), 1);
}

#[tokio::test]
async fn test_set_blocking_level_persists_and_reapplies() {
    let mut h = harness();
    assert_eq!(h.app.content_blocker().current_level(), Some(BlockingLevel::Moderate));

    h.app.set_blocking_level(BlockingLevel::None).unwrap();

    assert_eq!(h.app.content_blocker().current_level(), Some(BlockingLevel::None));
    assert_eq!(
        h.app.settings().get_settings().privacy.blocking_level,
        BlockingLevel::None
    );
    assert!(h.app.settings().config_path().exists());
}

#[tokio::test]
async fn test_same_blocking_level_keeps_installed_rules() {
    let mut h = harness();
    let applied = h.rules.ops();
    assert!(!applied.is_empty());

    h.app.set_blocking_level(BlockingLevel::Moderate).unwrap();
    assert_eq!(h.rules.ops(), applied);

    h.app.set_blocking_level(BlockingLevel::Strong).unwrap();
    assert!(h.rules.ops().len() > applied.len());
    assert!(matches!(h.rules.ops().last(), Some(RuleStoreOp::Compile(_))));
}

#[rstest]
#[case::inside_tab_strip(Point::new(700.0, 790.0), 1)]
#[case::far_outside(Point::new(5000.0, 5000.0), 2)]
#[tokio::test]
async fn test_drop_outside_uses_source_window_frame(
    #[case] point: Point,
    #[case] windows: usize,
) {
    let mut h = harness();
    let window = h
        .app
        .open_window(vec![url("https://a.test/"), url("https://b.test/")])
        .unwrap();
    let dragged = h.app.registry().window(window).unwrap().tabs.tab_order()[1];

    assert!(h.app.begin_drag(dragged, window));
    let outcome = h.app.drop_outside(point);

    assert_eq!(h.app.registry().window_count(), windows);
    if windows == 1 {
        assert_eq!(outcome, DropOutcome::InsideTabStrip);
    } else {
        assert!(matches!(outcome, DropOutcome::SpawnedWindow { .. }));
    }
}

#[tokio::test]
async fn test_script_messages() {
    let h = harness();
    let tab = TabId::new();

    let message = h
        .app
        .handle_script_message(tab, json!({ "name": "hashChange", "value": "https://a.test/#b" }))
        .unwrap();
    assert!(message.is_hash_change());
    assert_eq!(message.value, "https://a.test/#b");

    assert!(h.app.handle_script_message(tab, json!({ "name": 3 })).is_none());
}

#[tokio::test]
async fn test_bookmarks_reach_persistence() {
    let mut h = harness();
    let mutation = opacity::types::bookmark::BookmarkMutation::Remove { id: "b1".into() };

    h.app.apply_bookmark(mutation.clone()).unwrap();

    assert_eq!(h.persistence.bookmarks.lock().unwrap().as_slice(), &[mutation]);
}

#[tokio::test]
async fn test_matching_chain_accepts_credential() {
    let mut h = harness();
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    h.app.attach_surface(tab, Box::new(page_surface("https://example.com/")));

    load(&mut h.app, tab);
    drain(&mut h.app, 3).await;

    assert_eq!(
        challenge_answers(&h.probe).await,
        vec![(url("https://example.com/"), ChallengeDisposition::UseCredential)]
    );
}

#[rstest]
#[case::untrusted(ServerTrust {
    trusted: false,
    chain: vec![certificate("Example Inc", &["example.com"])],
})]
#[case::no_matching_name(trusted(vec![certificate("Other", &["other.com"])]))]
#[tokio::test]
async fn test_rejected_chain_cancels_credential(#[case] trust: ServerTrust) {
    let mut h = build(TempDir::new().unwrap(), Some(vec![1]), trust);
    let window = h.app.open_window(vec![url("https://example.com/")]).unwrap();
    let tab = first_tab(&h.app, window);
    h.app.attach_surface(tab, Box::new(page_surface("https://example.com/")));

    load(&mut h.app, tab);
    drain(&mut h.app, 3).await;

    assert_eq!(
        challenge_answers(&h.probe).await,
        vec![(url("https://example.com/"), ChallengeDisposition::CancelChallenge)]
    );
    let state = h.app.registry().tab(tab).unwrap();
    assert_eq!(state.certificate, CertificateStatus::invalid());
    assert_eq!(h.app.validator().cached_summary("example.com"), None);
}

#[tokio::test]
async fn test_challenge_for_closed_tab_is_cancelled() {
    let mut h = harness();
    let window = h
        .app
        .open_window(vec![url("https://example.com/"), url("https://b.test/")])
        .unwrap();
    let tab = first_tab(&h.app, window);
    h.app.attach_surface(tab, Box::new(page_surface("https://example.com/")));

    load(&mut h.app, tab);
    h.app.close_tab(window, tab).unwrap();
    drain(&mut h.app, 2).await;

    assert_eq!(
        challenge_answers(&h.probe).await,
        vec![(url("https://example.com/"), ChallengeDisposition::CancelChallenge)]
    );
    assert!(h.persistence.visits.lock().unwrap().is_empty());
}

