use cqlite::{
    executor::{scan::Scanner, sequential_scan::SequentialScanner},
    storage::bplus_tree::BPlusTree,
    types::row::Row,
    utils::mock::TempDatabase,
};

fn create_test_row(id: u32) -> Row {
    Row::new(id, format!("user{}", id), format!("person{}@example.com", id))
}

fn populated_tree(temp_db: &TempDatabase, ids: impl IntoIterator<Item = u32>) -> BPlusTree {
    let mut tree = temp_db.open().unwrap();
    for id in ids {
        tree.insert(&create_test_row(id)).unwrap();
    }
    tree
}

#[test]
fn test_scan_empty_table() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = temp_db.open().unwrap();
    let mut scanner = SequentialScanner::new(&mut tree);

    assert!(scanner.scan().unwrap().is_none());
    assert!(scanner.scan().unwrap().is_none());
}

#[test]
fn test_scan_returns_rows_in_id_order() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = populated_tree(&temp_db, [5, 3, 9, 1, 7]);
    let mut scanner = SequentialScanner::new(&mut tree);

    let mut rows = Vec::new();
    while let Some(row) = scanner.scan().unwrap() {
        rows.push(row);
    }

    assert_eq!(
        rows,
        [1, 3, 5, 7, 9].map(create_test_row).to_vec()
    );
}

#[test]
fn test_scan_crosses_leaves() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = populated_tree(&temp_db, (1..=100).rev());

    let ids: Vec<u32> = tree.scan_ascending().map(|row| row.unwrap().id).collect();
    assert_eq!(ids, (1..=100).collect::<Vec<_>>());
}

#[test]
fn test_scan_batch() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = populated_tree(&temp_db, 1..=30);
    let mut scanner = SequentialScanner::new(&mut tree);

    let batch_sizes: Vec<usize> = std::iter::from_fn(|| {
        let batch = scanner.scan_batch(8).unwrap();
        (!batch.is_empty()).then_some(batch.len())
    })
    .collect();

    assert_eq!(batch_sizes, vec![8, 8, 8, 6]);
}

#[test]
fn test_scan_reset_restarts() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = populated_tree(&temp_db, 1..=20);
    let mut scanner = SequentialScanner::new(&mut tree);

    let first = scanner.scan_batch(100).unwrap();
    assert_eq!(first.len(), 20);
    assert!(scanner.scan().unwrap().is_none());

    scanner.reset().unwrap();
    let second = scanner.scan_batch(100).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scan_twice_is_identical() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = populated_tree(&temp_db, [18, 7, 10, 29, 23, 4, 14, 30, 15, 26, 22, 19]);

    let first: Vec<Row> = tree.scan_ascending().map(|row| row.unwrap()).collect();
    let second: Vec<Row> = tree.scan_ascending().map(|row| row.unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_scan_is_lazy() {
    let temp_db = TempDatabase::new().unwrap();
    let mut tree = populated_tree(&temp_db, 1..=40);

    let first_three: Vec<u32> = tree
        .scan_ascending()
        .take(3)
        .map(|row| row.unwrap().id)
        .collect();
    assert_eq!(first_three, vec![1, 2, 3]);
}

#[test]
fn test_scan_sees_reopened_data() {
    let temp_db = TempDatabase::new().unwrap();
    populated_tree(&temp_db, 1..=15).close().unwrap();

    let mut tree = temp_db.open().unwrap();
    let mut scanner = SequentialScanner::new(&mut tree);
    let rows = scanner.scan_batch(1_000).unwrap();
    assert_eq!(rows.len(), 15);
}
