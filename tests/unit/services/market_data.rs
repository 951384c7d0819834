//! Unit tests for pagination cursors and pages

use intrabar::services::{BarPage, FetchCursor};
use rust_decimal_macros::dec;

use crate::fixtures::{flat_bar, session_day};

#[test]
fn cursor_encodes_the_timestamp() {
    let cursor = FetchCursor::before(session_day(9, 45));

    assert_eq!(cursor.as_str(), "20240304094500");
    assert_eq!(cursor.timestamp(), Some(session_day(9, 45)));
    assert_eq!(cursor.to_string(), "20240304094500");
}

#[test]
fn page_is_ordered_newest_first_and_cursors_on_earliest() {
    let page = BarPage::new(vec![
        flat_bar(session_day(9, 31), dec!(2)),
        flat_bar(session_day(9, 33), dec!(4)),
        flat_bar(session_day(9, 32), dec!(3)),
    ]);

    let stamps: Vec<_> = page.bars.iter().map(|b| b.timestamp).collect();
    assert_eq!(
        stamps,
        vec![session_day(9, 33), session_day(9, 32), session_day(9, 31)]
    );
    assert_eq!(page.earliest(), Some(session_day(9, 31)));
    assert_eq!(page.next_cursor, Some(FetchCursor::before(session_day(9, 31))));
}

#[test]
fn empty_page_has_no_cursor() {
    let page = BarPage::new(Vec::new());
    assert!(page.is_empty());
    assert!(page.next_cursor.is_none());
    assert!(page.earliest().is_none());
}
