//! Inheritance merge over parsed configs.

use beanscope::resolve::{MergeCache, merged_bean_definition};

use crate::helpers::source_fixtures::{CHILD_OF_BASE, PARENT_CYCLE, THREE_LEVEL_CHAIN};
use crate::helpers::workspace::Workspace;

fn property<'a>(definition: &'a beanscope::syntax::BeanDefinition, name: &str) -> Option<&'a str> {
    definition.property(name).and_then(|p| p.value.as_str())
}

#[test]
fn test_child_inherits_class_and_properties() {
    let ws = Workspace::new(&[("beans.xml", CHILD_OF_BASE)]);
    let config = ws.config("beans.xml");
    let child = config.bean("child").unwrap();

    let merged = merged_bean_definition(&child, &*config);

    assert_eq!(merged.class_name.as_deref(), Some("Foo"));
    assert_eq!(property(&merged, "x"), Some("1"));
    assert_eq!(property(&merged, "y"), Some("2"));
    // The declared definition is untouched
    assert!(child.class_name().is_none());
}

#[test]
fn test_three_level_chain() {
    let ws = Workspace::new(&[("beans.xml", THREE_LEVEL_CHAIN)]);
    let config = ws.config("beans.xml");
    let c = config.bean("c").unwrap();

    let merged = merged_bean_definition(&c, &*config);

    assert_eq!(merged.class_name.as_deref(), Some("Foo"));
    assert_eq!(property(&merged, "x"), Some("c"));
    assert_eq!(property(&merged, "y"), Some("b"));
    assert_eq!(merged.scope.as_deref(), Some("prototype"));
    assert_eq!(merged.lazy_init, Some(true));
}

#[test]
fn test_parent_cycle_returns_declared_definition() {
    let ws = Workspace::new(&[("beans.xml", PARENT_CYCLE)]);
    let config = ws.config("beans.xml");
    let x = config.bean("x").unwrap();

    let merged = merged_bean_definition(&x, &*config);

    assert_eq!(&merged, x.definition());
}

#[test]
fn test_parent_declared_in_import() {
    let ws = Workspace::new(&[
        ("main.xml", r#"<import resource="base.xml"/><bean id="child" parent="base"/>"#),
        ("base.xml", r#"<bean id="base" class="Bar" abstract="true"/>"#),
    ]);
    let config = ws.config("main.xml");
    let child = config.bean("child").unwrap();

    let merged = MergeCache::new().merged(&child, &*config);

    assert_eq!(merged.class_name.as_deref(), Some("Bar"));
    assert!(!merged.is_abstract);
}

#[test]
fn test_merge_in_config_set_sees_other_members() {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="base" class="Foo"><property name="x" value="1"/></bean>"#),
        ("two.xml", r#"<bean id="child" parent="base"/>"#),
    ]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    set.add_config("two.xml");
    let child = set.bean("child").unwrap();

    assert!(merged_bean_definition(&child, &*ws.config("two.xml")).class_name.is_none());
    let merged = merged_bean_definition(&child, &*set);
    assert_eq!(merged.class_name.as_deref(), Some("Foo"));
    assert_eq!(property(&merged, "x"), Some("1"));
}
