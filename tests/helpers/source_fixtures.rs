//! Common config fixtures for tests.

/// `a` (class Foo) refers to `b` (class Bar) through property `bar`.
pub const FOO_REFERS_TO_BAR: &str = r#"<bean id="a" class="Foo"><property name="bar" ref="b"/></bean>
<bean id="b" class="Bar"/>"#;

/// Same as [`FOO_REFERS_TO_BAR`] with `b` missing.
pub const FOO_REFERS_TO_MISSING: &str = r#"<bean id="a" class="Foo"><property name="bar" ref="b"/></bean>"#;

/// `child` inherits class and `x` from `base` and adds `y`.
pub const CHILD_OF_BASE: &str = r#"<bean id="base" class="Foo"><property name="x" value="1"/></bean>
<bean id="child" parent="base"><property name="y" value="2"/></bean>"#;

/// Three-level chain `a` ← `b` ← `c`.
pub const THREE_LEVEL_CHAIN: &str = r#"<bean id="a" class="Foo" lazy-init="true"><property name="x" value="a"/></bean>
<bean id="b" parent="a" scope="prototype"><property name="y" value="b"/></bean>
<bean id="c" parent="b"><property name="x" value="c"/></bean>"#;

/// `x` and `y` are each other's parent.
pub const PARENT_CYCLE: &str = r#"<bean id="x" parent="y"/>
<bean id="y" parent="x"/>"#;

/// Instance factory method on a missing factory bean.
pub const MISSING_FACTORY_BEAN: &str = r#"<bean id="a" factory-bean="f" factory-method="make"/>"#;
