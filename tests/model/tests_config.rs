//! Config population, queries, imports and reload.

use std::sync::Arc;

use beanscope::codes;

use crate::helpers::source_fixtures::FOO_REFERS_TO_BAR;
use crate::helpers::workspace::Workspace;

#[test]
fn test_population_is_idempotent() {
    let ws = Workspace::new(&[("beans.xml", FOO_REFERS_TO_BAR)]);
    let config = ws.config("beans.xml");
    assert!(!config.is_populated());

    let first = config.beans();
    let second = config.beans();

    assert!(config.is_populated());
    assert_eq!(first.len(), 2);
    assert!(first.iter().zip(&second).all(|(a, b)| Arc::ptr_eq(a, b)));
    assert!(Arc::ptr_eq(&config.contents(), &config.contents()));
}

#[test]
fn test_reload_rereads_document() {
    let ws = Workspace::new(&[("beans.xml", FOO_REFERS_TO_BAR)]);
    let config = ws.config("beans.xml");
    assert!(config.bean("b").is_some());

    ws.edit("beans.xml", r#"<bean id="c" class="Bar"/>"#);
    // Cached until reloaded
    assert!(config.bean("b").is_some());

    config.reload();
    assert!(!config.is_populated());
    assert!(config.bean("b").is_none());
    assert!(config.bean("c").is_some());
}

#[test]
fn test_bean_class_queries() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="a" class="com.acme.Outer$Inner"/>
<bean id="b" class="Bar"><property name="p"><bean class="Foo"/></property></bean>"#,
    )]);
    let config = ws.config("beans.xml");

    assert!(config.is_bean_class("com.acme.Outer"));
    assert!(config.is_bean_class("Foo"));
    assert_eq!(config.beans_of_class("Bar").len(), 1);
    assert_eq!(config.bean_classes(), vec!["Bar", "Foo", "com.acme.Outer"]);
}

#[test]
fn test_malformed_document_degrades_to_problem() {
    let ws = Workspace::new(&[("beans.xml", r#"<bean id="a" class="Foo">"#)]);
    let config = ws.config("beans.xml");

    assert!(config.beans().is_empty());
    assert!(config.is_populated());
    let problems = config.problems();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code(), Some(codes::PARSING_FAILED));
}

#[test]
fn test_imports_are_merged() {
    let ws = Workspace::new(&[
        ("app/main.xml", r#"<import resource="common.xml"/><bean id="a" class="Foo"/>"#),
        ("app/common.xml", r#"<bean id="shared" class="Bar"/><alias name="shared" alias="s"/>"#),
    ]);
    let config = ws.config("app/main.xml");

    assert_eq!(config.imports().len(), 1);
    assert!(config.bean("shared").is_some());
    assert!(config.alias("s").is_some());
    let names: Vec<String> = config.beans().iter().map(|b| b.name().to_string()).collect();
    assert_eq!(names, vec!["a", "shared"]);
}

#[test]
fn test_disabled_imports_are_not_read() {
    let ws = Workspace::new(&[
        ("main.xml", r#"<import resource="common.xml"/><bean id="a" class="Foo"/>"#),
        ("common.xml", r#"<bean id="shared" class="Bar"/>"#),
    ]);
    ws.project.set_imports_enabled(false);
    let config = ws.config("main.xml");

    assert!(config.bean("shared").is_none());
    assert!(config.bean("a").is_some());
}

#[test]
fn test_resource_changed_tracks_imports() {
    let ws = Workspace::new(&[
        ("main.xml", r#"<import resource="common.xml"/>"#),
        ("common.xml", r#"<bean id="shared" class="Bar"/>"#),
    ]);
    let config = ws.config("main.xml");
    config.beans();
    assert!(!config.resource_changed());

    ws.edit("common.xml", r#"<bean id="other" class="Bar"/>"#);
    assert!(config.resource_changed());
}
