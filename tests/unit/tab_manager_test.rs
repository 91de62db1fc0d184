use opacity::managers::tab_manager::{TabCollection, TabCollectionTrait};
use opacity::types::errors::TabError;
use opacity::types::tab::{Tab, TabId};
use url::Url;

fn tab(n: usize) -> Tab {
    Tab::new(Url::parse(&format!("https://site{n}.test/")).unwrap())
}

fn collection(n: usize) -> (TabCollection, Vec<TabId>) {
    let mut tabs = TabCollection::new();
    let ids = (0..n).map(|i| tabs.push_tab(tab(i), false)).collect();
    (tabs, ids)
}

#[test]
fn test_first_tab_becomes_active() {
    let mut tabs = TabCollection::new();
    let id = tabs.push_tab(tab(0), false);
    tabs.push_tab(tab(1), false);
    assert_eq!(tabs.active_tab_id(), Some(id));
}

#[test]
fn test_push_active_switches() {
    let (mut tabs, _) = collection(2);
    let id = tabs.push_tab(tab(9), true);
    assert_eq!(tabs.get_active_tab().unwrap().id, id);
    assert_eq!(tabs.tab_count(), 3);
}

#[test]
fn test_insert_clamps_index() {
    let (mut tabs, ids) = collection(2);
    let new_tab = tab(9);
    let new_id = new_tab.id;

    let index = tabs.insert_tab(10, new_tab, true);

    assert_eq!(index, 2);
    assert_eq!(tabs.tab_order(), vec![ids[0], ids[1], new_id]);
    assert_eq!(tabs.active_tab_id(), Some(new_id));
}

#[test]
fn test_take_active_tab_activates_predecessor() {
    let (mut tabs, ids) = collection(3);
    tabs.switch_tab(ids[2]).unwrap();

    let (index, taken) = tabs.take_tab(ids[2]).unwrap();

    assert_eq!(index, 2);
    assert_eq!(taken.id, ids[2]);
    assert_eq!(tabs.active_tab_id(), Some(ids[1]));
}

#[test]
fn test_take_first_active_tab_activates_new_first() {
    let (mut tabs, ids) = collection(3);

    tabs.take_tab(ids[0]).unwrap();

    assert_eq!(tabs.active_tab_id(), Some(ids[1]));
}

#[test]
fn test_take_inactive_tab_keeps_active() {
    let (mut tabs, ids) = collection(3);
    tabs.switch_tab(ids[2]).unwrap();

    tabs.take_tab(ids[0]).unwrap();

    assert_eq!(tabs.active_tab_id(), Some(ids[2]));
}

#[test]
fn test_take_last_tab_clears_active() {
    let (mut tabs, ids) = collection(1);
    tabs.take_tab(ids[0]).unwrap();
    assert!(tabs.is_empty());
    assert_eq!(tabs.active_tab_id(), None);
}

#[test]
fn test_take_unknown_tab_fails() {
    let (mut tabs, _) = collection(2);
    let result = tabs.take_tab(TabId::new());
    assert!(matches!(result, Err(TabError::NotFound(_))));
    assert_eq!(tabs.tab_count(), 2);
}

#[test]
fn test_move_tab_reorders_and_activates() {
    let (mut tabs, ids) = collection(3);

    tabs.move_tab(ids[1], 0).unwrap();

    assert_eq!(tabs.tab_order(), vec![ids[1], ids[0], ids[2]]);
    assert_eq!(tabs.active_tab_id(), Some(ids[1]));
}

#[test]
fn test_move_tab_out_of_bounds_fails() {
    let (mut tabs, ids) = collection(3);
    let result = tabs.move_tab(ids[0], 3);
    assert!(matches!(result, Err(TabError::InvalidIndex(3))));
    assert_eq!(tabs.tab_order(), ids);
}

#[test]
fn test_switch_to_unknown_tab_fails() {
    let (mut tabs, ids) = collection(2);
    assert!(tabs.switch_tab(TabId::new()).is_err());
    assert_eq!(tabs.active_tab_id(), Some(ids[0]));
}
