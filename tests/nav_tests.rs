use chrono::Utc;
use content_manager::nav;
use content_manager::schema::Lang;
use content_manager::storage::models::{LocalizedText, PageRecord, PageType};

fn page(id: &str, order: i32, parent: Option<&str>) -> PageRecord {
    let now = Utc::now();
    PageRecord {
        id: id.to_string(),
        title: LocalizedText {
            uz: format!("{id} uz"),
            ru: format!("{id} ru"),
            en: format!("{id} en"),
        },
        slug: id.to_string(),
        page_type: PageType::Static,
        icon: None,
        order,
        is_active: true,
        key: String::new(),
        parent: parent.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_build_menu_two_levels() {
    // Page 1 groups page 2; page 3 stands alone
    let pages = vec![page("1", 0, None), page("2", 0, Some("1")), page("3", 1, None)];

    let menu = nav::build_menu(&pages, Lang::Uz);
    assert_eq!(menu.len(), 2);

    assert_eq!(menu[0].id, "1");
    assert_eq!(menu[0].children.len(), 1);
    assert_eq!(menu[0].children[0].id, "2");

    assert_eq!(menu[1].id, "3");
    assert!(menu[1].children.is_empty());
}

#[test]
fn test_build_menu_localizes_titles() {
    let pages = vec![page("group", 0, None), page("leaf", 0, Some("group"))];

    let menu = nav::build_menu(&pages, Lang::Ru);
    assert_eq!(menu[0].title, "group ru");
    assert_eq!(menu[0].children[0].title, "leaf ru");
    assert_eq!(menu[0].children[0].parent_title, "group ru");

    let menu_en = nav::build_menu(&pages, Lang::En);
    assert_eq!(menu_en[0].children[0].parent_title, "group en");
}

#[test]
fn test_build_menu_orders_entries() {
    let pages = vec![
        page("third", 30, None),
        page("first", 10, None),
        page("second", 20, None),
        page("child-b", 2, Some("first")),
        page("child-a", 1, Some("first")),
    ];

    let menu = nav::build_menu(&pages, Lang::Uz);
    let ids: Vec<&str> = menu.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);

    let child_ids: Vec<&str> = menu[0].children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(child_ids, vec!["child-a", "child-b"]);
}

#[test]
fn test_build_menu_ignores_dangling_children() {
    // A child whose parent was deleted attaches to nothing
    let pages = vec![page("top", 0, None), page("orphan", 0, Some("gone"))];

    let menu = nav::build_menu(&pages, Lang::Uz);
    assert_eq!(menu.len(), 1);
    assert!(menu[0].children.is_empty());
}

#[test]
fn test_top_level_and_children_partition() {
    let pages = vec![page("1", 0, None), page("2", 0, Some("1")), page("3", 1, None)];

    let top: Vec<&str> = nav::top_level(&pages).iter().map(|p| p.id.as_str()).collect();
    assert_eq!(top, vec!["1", "3"]);

    let kids: Vec<&str> = nav::children(&pages).iter().map(|p| p.id.as_str()).collect();
    assert_eq!(kids, vec!["2"]);
}

#[test]
fn test_top_level_leaves_exclude_grouping_pages() {
    // Page 1 is used as a parent, so only page 3 is a main-navigation leaf
    let pages = vec![page("1", 0, None), page("2", 0, Some("1")), page("3", 1, None)];

    let leaves: Vec<&str> = nav::top_level_leaves(&pages)
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(leaves, vec!["3"]);
}

#[test]
fn test_child_leaves() {
    let pages = vec![page("1", 0, None), page("2", 0, Some("1")), page("3", 1, None)];

    let leaves: Vec<&str> = nav::child_leaves(&pages)
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(leaves, vec!["2"]);
}

#[test]
fn test_validate_parent() {
    let pages = vec![page("top", 0, None), page("kid", 0, Some("top")), page("solo", 1, None)];

    // A new page may sit under a top-level page
    assert!(nav::validate_parent(&pages, None, "top").is_ok());
    assert!(nav::validate_parent(&pages, Some("solo"), "top").is_ok());

    // Never under a child, a missing page, or itself
    assert_eq!(
        nav::validate_parent(&pages, None, "kid"),
        Err(nav::HierarchyError::ParentIsChild)
    );
    assert_eq!(
        nav::validate_parent(&pages, None, "ghost"),
        Err(nav::HierarchyError::MissingParent)
    );
    assert_eq!(
        nav::validate_parent(&pages, Some("top"), "top"),
        Err(nav::HierarchyError::SelfParent)
    );

    // A grouping page cannot be demoted to a child
    assert_eq!(
        nav::validate_parent(&pages, Some("top"), "solo"),
        Err(nav::HierarchyError::HasChildren)
    );
}

#[test]
fn test_parent_ids() {
    let pages = vec![page("1", 0, None), page("2", 0, Some("1")), page("3", 1, None)];
    let parents = nav::parent_ids(&pages);
    assert!(parents.contains("1"));
    assert_eq!(parents.len(), 1);
}
