//! Property-based tests for bookmark placement.
//!
//! For any sequence of adds and moves between the root and a few folders,
//! every bookmark is listed in exactly the folder it was last put in, in the
//! order it arrived there.

use std::collections::HashMap;

use opacity::database::Database;
use opacity::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use proptest::prelude::*;

const FOLDERS: usize = 3;

#[derive(Debug, Clone)]
enum BookmarkOp {
    /// Add into folder n, where `FOLDERS` means the root.
    Add { folder: usize, title: String },
    Move { pick: usize, folder: usize },
}

fn arb_ops() -> impl Strategy<Value = Vec<BookmarkOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0..=FOLDERS, "[a-zA-Z][a-zA-Z0-9 ]{0,20}")
                .prop_map(|(folder, title)| BookmarkOp::Add { folder, title }),
            2 => (0..40usize, 0..=FOLDERS)
                .prop_map(|(pick, folder)| BookmarkOp::Move { pick, folder }),
        ],
        1..40,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn bookmarks_stay_in_arrival_order(ops in arb_ops()) {
        let db = Database::open_in_memory().unwrap();
        let mut manager = BookmarkManager::new(db.connection());

        let mut folder_ids: Vec<Option<String>> = (0..FOLDERS)
            .map(|i| Some(manager.create_folder(&format!("Folder {i}"), None).unwrap()))
            .collect();
        folder_ids.push(None);

        let mut model: HashMap<usize, Vec<String>> = HashMap::new();
        let mut all: Vec<String> = Vec::new();

        for op in &ops {
            match op {
                BookmarkOp::Add { folder, title } => {
                    let id = manager
                        .add_bookmark("https://example.com/", title, folder_ids[*folder].as_deref())
                        .unwrap();
                    model.entry(*folder).or_default().push(id.clone());
                    all.push(id);
                }
                BookmarkOp::Move { pick, folder } => {
                    if all.is_empty() {
                        continue;
                    }
                    let id = all[pick % all.len()].clone();
                    manager.move_bookmark(&id, folder_ids[*folder].as_deref()).unwrap();
                    for ids in model.values_mut() {
                        ids.retain(|b| *b != id);
                    }
                    model.entry(*folder).or_default().push(id);
                }
            }
        }

        let mut listed = 0;
        for (index, folder_id) in folder_ids.iter().enumerate() {
            let actual: Vec<String> = manager
                .list_bookmarks(folder_id.as_deref())
                .unwrap()
                .into_iter()
                .map(|b| b.id)
                .collect();
            let expected = model.get(&index).cloned().unwrap_or_default();
            listed += actual.len();
            prop_assert_eq!(actual, expected);
        }
        prop_assert_eq!(listed, all.len());
    }
}
