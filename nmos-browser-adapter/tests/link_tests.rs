use nmos_browser_adapter::LinkSet;
use nmos_browser_prefs::PaginationMode;
use nmos_browser_types::LinkRelation;

#[test]
fn parses_all_relations() {
    let header = concat!(
        r#"<http://q/nodes?paging.until=10>; rel="prev", "#,
        r#"<http://q/nodes?paging.since=20>; rel="next", "#,
        r#"<http://q/nodes?paging.since=0>; rel="first", "#,
        r#"<http://q/nodes?paging.until=99>;rel="last""#,
    );
    let links = LinkSet::parse(header);
    assert_eq!(links.get(LinkRelation::Prev), Some("http://q/nodes?paging.until=10"));
    assert_eq!(links.get(LinkRelation::Next), Some("http://q/nodes?paging.since=20"));
    assert_eq!(links.get(LinkRelation::First), Some("http://q/nodes?paging.since=0"));
    assert_eq!(links.get(LinkRelation::Last), Some("http://q/nodes?paging.until=99"));
}

#[test]
fn next_only_is_partial() {
    let links = LinkSet::parse(r#"<u1>; rel="next""#);
    assert_eq!(links.pagination_mode(), PaginationMode::Partial);
}

#[test]
fn first_and_next_is_enabled() {
    let links = LinkSet::parse(r#"<u0>; rel="first", <u1>; rel="next""#);
    assert_eq!(links.pagination_mode(), PaginationMode::Enabled);
}

#[test]
fn neither_is_disabled() {
    let links = LinkSet::parse(r#"<u9>; rel="last""#);
    assert_eq!(links.pagination_mode(), PaginationMode::Disabled);
    assert_eq!(LinkSet::default().pagination_mode(), PaginationMode::Disabled);
}

#[test]
fn first_without_next_is_disabled() {
    let links = LinkSet::parse(r#"<u0>; rel="first""#);
    assert_eq!(links.pagination_mode(), PaginationMode::Disabled);
}

#[test]
fn malformed_header_is_empty() {
    for header in ["", "garbage", "<unterminated; rel=\"next\"", "u1; rel=next", "<u1>; rel=\"self\""] {
        let links = LinkSet::parse(header);
        assert!(links.is_empty(), "header {header:?} should yield no links");
    }
    assert!(LinkSet::from_header(None).is_empty());
}

#[test]
fn first_occurrence_wins() {
    let links = LinkSet::parse(r#"<a>; rel="next", <b>; rel="next""#);
    assert_eq!(links.next.as_deref(), Some("a"));
}

#[test]
fn tab_separator_accepted() {
    let links = LinkSet::parse("<a>;\trel=\"prev\"");
    assert_eq!(links.prev.as_deref(), Some("a"));
}
