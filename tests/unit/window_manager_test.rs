use opacity::managers::tab_manager::TabCollectionTrait;
use opacity::managers::window_manager::{CloseOutcome, WindowRegistry, WindowRegistryTrait};
use opacity::types::errors::WindowError;
use opacity::types::tab::{Tab, TabId};
use opacity::types::window::Rect;
use url::Url;

fn urls(names: &[&str]) -> Vec<Url> {
    names
        .iter()
        .map(|n| Url::parse(&format!("https://{n}.test/")).unwrap())
        .collect()
}

fn frame() -> Rect {
    Rect::new(100.0, 100.0, 1400.0, 800.0)
}

#[test]
fn test_open_window_activates_first_tab() {
    let mut registry = WindowRegistry::new();
    let id = registry.open_window(frame(), urls(&["a", "b"])).unwrap();

    let window = registry.window(id).unwrap();
    assert_eq!(window.frame, frame());
    assert_eq!(window.tabs.tab_count(), 2);
    assert_eq!(window.tabs.active_tab_id(), Some(window.tabs.tab_order()[0]));
}

#[test]
fn test_new_tab_becomes_active() {
    let mut registry = WindowRegistry::new();
    let id = registry.open_window(frame(), urls(&["a"])).unwrap();

    let tab_id = registry.new_tab(id, urls(&["b"]).remove(0)).unwrap();

    assert_eq!(registry.window(id).unwrap().tabs.active_tab_id(), Some(tab_id));
    assert_eq!(registry.find_tab(tab_id), Some(id));
}

#[test]
fn test_new_tab_in_unknown_window_fails() {
    let mut registry = WindowRegistry::new();
    let stray = Tab::new(urls(&["x"]).remove(0));
    let other = WindowRegistry::new().spawn_window_with_tab(stray, frame());
    let result = registry.new_tab(other, urls(&["a"]).remove(0));
    assert!(matches!(result, Err(WindowError::NotFound(_))));
}

#[test]
fn test_close_tab_activates_predecessor() {
    let mut registry = WindowRegistry::new();
    let id = registry.open_window(frame(), urls(&["a", "b", "c"])).unwrap();
    let order = registry.window(id).unwrap().tabs.tab_order();
    registry.window_mut(id).unwrap().tabs.switch_tab(order[1]).unwrap();

    let outcome = registry.close_tab(id, order[1]).unwrap();

    assert_eq!(outcome, CloseOutcome::TabClosed { window: id });
    assert_eq!(registry.window(id).unwrap().tabs.active_tab_id(), Some(order[0]));
}

#[test]
fn test_closing_last_tab_closes_window() {
    let mut registry = WindowRegistry::new();
    let first = registry.open_window(frame(), urls(&["a"])).unwrap();
    let second = registry.open_window(frame(), urls(&["b"])).unwrap();
    let tab_id = registry.window(second).unwrap().tabs.tab_order()[0];

    let outcome = registry.close_tab(second, tab_id).unwrap();

    assert_eq!(outcome, CloseOutcome::WindowClosed { window: second });
    assert_eq!(registry.windows().map(|w| w.id).collect::<Vec<_>>(), vec![first]);
    assert!(registry.tab(tab_id).is_none());
}

#[test]
fn test_closing_last_tab_of_last_window_exits() {
    let mut registry = WindowRegistry::new();
    let id = registry.open_window(frame(), urls(&["a"])).unwrap();
    let tab_id = registry.window(id).unwrap().tabs.tab_order()[0];

    assert_eq!(registry.close_tab(id, tab_id).unwrap(), CloseOutcome::ExitApplication);
    assert_eq!(registry.window_count(), 1);
}

#[test]
fn test_close_tab_not_in_window_fails() {
    let mut registry = WindowRegistry::new();
    let first = registry.open_window(frame(), urls(&["a", "b"])).unwrap();
    let second = registry.open_window(frame(), urls(&["c"])).unwrap();
    let foreign = registry.window(second).unwrap().tabs.tab_order()[0];

    let result = registry.close_tab(first, foreign);

    assert!(matches!(result, Err(WindowError::Tab(_))));
    assert!(registry.close_tab(first, TabId::new()).is_err());
}

#[test]
fn test_spawn_window_with_tab_makes_it_active() {
    let mut registry = WindowRegistry::new();
    let tab = Tab::new(urls(&["a"]).remove(0));
    let tab_id = tab.id;

    let id = registry.spawn_window_with_tab(tab, frame());

    let window = registry.window(id).unwrap();
    assert_eq!(window.tabs.tab_order(), vec![tab_id]);
    assert_eq!(window.tabs.active_tab_id(), Some(tab_id));
}

#[test]
fn test_tab_lookup_across_windows() {
    let mut registry = WindowRegistry::new();
    registry.open_window(frame(), urls(&["a"])).unwrap();
    let second = registry.open_window(frame(), urls(&["b", "c"])).unwrap();
    let target = registry.window(second).unwrap().tabs.tab_order()[1];

    registry.tab_mut(target).unwrap().title = "renamed".into();

    assert_eq!(registry.tab(target).unwrap().title, "renamed");
    assert_eq!(registry.find_tab(target), Some(second));
}
