//! Reference graph over parsed configs.

use indexmap::IndexSet;

use beanscope::resolve::{
    BeanReference, InterceptorRule, ReferenceElement, ReferenceKind, ReferenceResolver, bean_references,
};

use crate::helpers::workspace::Workspace;

fn edges(references: &IndexSet<BeanReference>) -> Vec<(ReferenceKind, &str, &str)> {
    references
        .iter()
        .map(|r| (r.kind, r.source.bean.name(), r.target.name()))
        .collect()
}

#[test]
fn test_self_reference_reported_once() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="a" class="Foo" depends-on="a"><property name="bar" ref="a"/></bean>"#,
    )]);
    let config = ws.config("beans.xml");
    let a = config.bean("a").unwrap();

    let references = bean_references(&ReferenceElement::Bean(a), &*config, true);

    assert_eq!(edges(&references), vec![(ReferenceKind::Standard, "a", "a")]);
}

#[test]
fn test_recursive_walk_follows_targets() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="a" class="Foo"><property name="bar" ref="b"/></bean>
<bean id="b" class="Bar" depends-on="c"/>
<bean id="c" class="Bar"><constructor-arg ref="a"/></bean>"#,
    )]);
    let config = ws.config("beans.xml");
    let a = config.bean("a").unwrap();

    let direct = bean_references(&ReferenceElement::Bean(a.clone()), &*config, false);
    assert_eq!(edges(&direct), vec![(ReferenceKind::Standard, "a", "b")]);

    let all = bean_references(&ReferenceElement::Bean(a), &*config, true);
    assert_eq!(
        edges(&all),
        vec![
            (ReferenceKind::Standard, "a", "b"),
            (ReferenceKind::DependsOn, "b", "c"),
            (ReferenceKind::Standard, "c", "a"),
        ]
    );
    assert!(all.iter().all(|r| r.context == "beans.xml"));
}

#[test]
fn test_interceptor_names_are_bean_names() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="proxy" class="org.springframework.aop.framework.ProxyFactoryBean">
  <property name="interceptorNames"><list><value>audit</value><value>missing</value></list></property>
</bean>
<bean id="audit" class="Foo"/>
<bean id="plain" class="Foo">
  <property name="interceptorNames"><list><value>audit</value></list></property>
</bean>"#,
    )]);
    let config = ws.config("beans.xml");

    let proxy = bean_references(&ReferenceElement::Bean(config.bean("proxy").unwrap()), &*config, false);
    assert_eq!(edges(&proxy), vec![(ReferenceKind::Interceptor, "proxy", "audit")]);

    let plain = bean_references(&ReferenceElement::Bean(config.bean("plain").unwrap()), &*config, false);
    assert!(plain.is_empty());

    let custom = ReferenceResolver::new().with_rules(vec![InterceptorRule::new("Foo", "interceptorNames")]);
    let plain = custom.bean_references(&ReferenceElement::Bean(config.bean("plain").unwrap()), &*config, false);
    assert_eq!(edges(&plain), vec![(ReferenceKind::Interceptor, "plain", "audit")]);
}

#[test]
fn test_inner_bean_edges_are_marked() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="outer" class="Foo">
  <property name="bar"><bean class="Bar"><constructor-arg ref="target"/></bean></property>
</bean>
<bean id="target" class="Bar"/>"#,
    )]);
    let config = ws.config("beans.xml");

    let references = bean_references(&ReferenceElement::Bean(config.bean("outer").unwrap()), &*config, false);

    assert_eq!(references.len(), 1);
    let reference = references.first().unwrap();
    assert!(reference.inner);
    assert_eq!(reference.source.bean.name(), "outer");
    assert_eq!(reference.target.name(), "target");
}

#[test]
fn test_property_element_walk() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="a" class="Foo"><property name="bar" ref="b"/><property name="x" ref="c"/></bean>
<bean id="b" class="Bar"/>
<bean id="c" class="Bar"/>"#,
    )]);
    let config = ws.config("beans.xml");
    let element = ReferenceElement::Property {
        bean: config.bean("a").unwrap(),
        name: "x".into(),
    };

    let references = bean_references(&element, &*config, false);

    assert_eq!(edges(&references), vec![(ReferenceKind::Standard, "a", "c")]);
}
