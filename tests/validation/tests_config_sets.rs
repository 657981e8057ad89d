//! Validation of configs inside config sets.

use tokio_util::sync::CancellationToken;

use beanscope::{Diagnostic, Validator, codes};

use crate::helpers::diagnostic_helpers::{assert_clean, codes_of};
use crate::helpers::workspace::{Workspace, type_index};

fn validate(ws: &Workspace, config: &str) -> Vec<Diagnostic> {
    Validator::new(type_index())
        .validate(&ws.project, &ws.config(config), &CancellationToken::new())
        .unwrap()
}

fn two_configs_declaring_a(allow_overriding: bool) -> Workspace {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"/>"#),
        ("two.xml", r#"<bean id="a" class="Bar"/>"#),
    ]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    set.add_config("two.xml");
    set.set_allow_bean_overriding(allow_overriding);
    ws
}

#[test]
fn test_override_reported_once_on_second_config() {
    let ws = two_configs_declaring_a(false);

    assert_clean(&validate(&ws, "one.xml"));
    let diagnostics = validate(&ws, "two.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::BEAN_OVERRIDE]);
    let error = &diagnostics[0];
    assert!(error.is_error());
    assert_eq!(error.resource.as_str(), "two.xml");
    assert_eq!(error.bean_id.as_deref(), Some("a"));
    assert_eq!(&*error.message, "Overrides another bean within config set 'all'");
}

#[test]
fn test_override_allowed_is_clean() {
    let ws = two_configs_declaring_a(true);
    assert_clean(&validate(&ws, "one.xml"));
    assert_clean(&validate(&ws, "two.xml"));
}

#[test]
fn test_reference_across_members_resolves() {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"><property name="bar" ref="b"/></bean>"#),
        ("two.xml", r#"<bean id="b" class="Bar"/>"#),
    ]);

    assert_eq!(codes_of(&validate(&ws, "one.xml")), vec![codes::UNDEFINED_REFERENCED_BEAN]);

    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    set.add_config("two.xml");
    assert_clean(&validate(&ws, "one.xml"));
}

#[test]
fn test_reference_through_alias_of_other_member() {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"><property name="bar" ref="x"/></bean>"#),
        ("two.xml", r#"<bean id="b" class="Bar"/><alias name="b" alias="x"/>"#),
    ]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    set.add_config("two.xml");
    assert_eq!(set.alias("x").unwrap().bean_name, "b");

    assert_clean(&validate(&ws, "one.xml"));
    assert_clean(&validate(&ws, "two.xml"));
}

#[test]
fn test_incomplete_set_skips_reference_checks() {
    let ws = Workspace::new(&[("one.xml", r#"<bean id="a" class="Foo"><property name="bar" ref="b"/></bean>"#)]);
    let set = ws.project.add_config_set("partial").unwrap();
    set.add_config("one.xml");

    assert_eq!(codes_of(&validate(&ws, "one.xml")), vec![codes::UNDEFINED_REFERENCED_BEAN]);

    set.set_incomplete(true);
    assert_clean(&validate(&ws, "one.xml"));
}

#[test]
fn test_parent_missing_in_set_names_the_set() {
    let ws = Workspace::new(&[("one.xml", r#"<bean id="a" parent="base"/>"#)]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");

    let diagnostics = validate(&ws, "one.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::UNDEFINED_PARENT_BEAN]);
    assert!(diagnostics[0].is_warning());
    assert_eq!(
        &*diagnostics[0].message,
        "Parent bean 'base' not found in config set 'all'"
    );
}

#[test]
fn test_alias_to_undefined_bean() {
    let ws = Workspace::new(&[("one.xml", r#"<bean id="a" class="Foo"/><alias name="ghost" alias="g"/>"#)]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");

    let diagnostics = validate(&ws, "one.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::UNDEFINED_ALIAS_TARGET]);
    assert!(diagnostics[0].is_warning());
}

#[test]
fn test_same_config_in_two_sets_is_deduplicated() {
    let ws = Workspace::new(&[("one.xml", r#"<bean id="a" class="Nope"/>"#)]);
    for name in ["first", "second"] {
        let set = ws.project.add_config_set(name).unwrap();
        set.add_config("one.xml");
    }

    let diagnostics = validate(&ws, "one.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::CLASS_NOT_FOUND]);
}
