//! Config set merge and override policy.

use rstest::rstest;

use crate::helpers::workspace::Workspace;

fn two_configs_declaring_a() -> Workspace {
    Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"/><alias name="a" alias="first"/>"#),
        ("two.xml", r#"<bean id="a" class="Bar"/><alias name="a" alias="first"/>"#),
    ])
}

#[rstest]
#[case::overriding_disabled(false, "Foo")]
#[case::overriding_enabled(true, "Bar")]
fn test_override_policy_decides_winner(#[case] allow: bool, #[case] expected_class: &str) {
    let ws = two_configs_declaring_a();
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    set.add_config("two.xml");
    set.set_allow_bean_overriding(allow);

    let bean = set.bean("a").unwrap();
    assert_eq!(bean.class_name(), Some(expected_class));
    assert_eq!(set.beans().len(), 1);
}

#[test]
fn test_membership_changes_reset_merge() {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"/>"#),
        ("two.xml", r#"<bean id="b" class="Bar"/>"#),
    ]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    assert!(set.bean("b").is_none());
    assert!(set.is_populated());

    assert!(set.add_config("two.xml"));
    assert!(!set.is_populated());
    assert!(set.bean("b").is_some());
    assert!(!set.add_config("two.xml"));

    assert!(set.remove_config("one.xml"));
    assert!(set.bean("a").is_none());
}

#[test]
fn test_config_reload_resets_containing_sets() {
    let ws = Workspace::new(&[("one.xml", r#"<bean id="a" class="Foo"/>"#)]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    assert!(set.bean("a").is_some());

    ws.edit("one.xml", r#"<bean id="z" class="Foo"/>"#);
    ws.config("one.xml").reload();

    assert!(!set.is_populated());
    assert!(set.bean("a").is_none());
    assert!(set.bean("z").is_some());
}

#[test]
fn test_set_queries_span_members() {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"/>"#),
        ("two.xml", r#"<bean id="b" class="Foo"/><alias name="b" alias="bee"/>"#),
    ]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    set.add_config("two.xml");

    assert_eq!(set.beans_of_class("Foo").len(), 2);
    assert!(set.is_bean_class("Foo"));
    assert_eq!(set.alias("bee").unwrap().bean_name, "b");
    assert_eq!(set.configs().len(), 2);
    assert_eq!(ws.project.config_sets_of("two.xml").len(), 1);
}
