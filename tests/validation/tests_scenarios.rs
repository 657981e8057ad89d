//! End-to-end validation of single configs.

use tokio_util::sync::CancellationToken;

use beanscope::validation::SUBJECT_KEY;
use beanscope::{Diagnostic, ValidationError, Validator, ValidatorSettings, codes};

use crate::helpers::diagnostic_helpers::{assert_clean, codes_of, errors};
use crate::helpers::source_fixtures::{
    CHILD_OF_BASE, FOO_REFERS_TO_BAR, FOO_REFERS_TO_MISSING, MISSING_FACTORY_BEAN,
};
use crate::helpers::workspace::{Workspace, type_index};

fn validate(ws: &Workspace, config: &str) -> Vec<Diagnostic> {
    Validator::new(type_index())
        .validate(&ws.project, &ws.config(config), &CancellationToken::new())
        .unwrap()
}

fn subject(diagnostic: &Diagnostic) -> Option<&str> {
    diagnostic
        .data
        .iter()
        .find(|(key, _)| &**key == SUBJECT_KEY)
        .map(|(_, value)| &**value)
}

#[test]
fn test_valid_reference_is_clean() {
    let ws = Workspace::new(&[("beans.xml", FOO_REFERS_TO_BAR)]);
    assert_clean(&validate(&ws, "beans.xml"));
}

#[test]
fn test_missing_reference_is_single_warning() {
    let ws = Workspace::new(&[("beans.xml", FOO_REFERS_TO_MISSING)]);

    let diagnostics = validate(&ws, "beans.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::UNDEFINED_REFERENCED_BEAN]);
    let warning = &diagnostics[0];
    assert!(warning.is_warning());
    assert_eq!(subject(warning), Some("b"));
    assert_eq!(warning.bean_id.as_deref(), Some("a"));
    assert_eq!(warning.resource.as_str(), "beans.xml");
}

#[test]
fn test_missing_factory_bean_skips_method_check() {
    let ws = Workspace::new(&[("beans.xml", MISSING_FACTORY_BEAN)]);

    let diagnostics = validate(&ws, "beans.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::UNDEFINED_FACTORY_BEAN]);
    assert_eq!(errors(&diagnostics).len(), 1);
    assert_eq!(&*diagnostics[0].message, "Factory bean 'f' not found");
}

#[test]
fn test_child_of_valid_parent_is_clean() {
    let ws = Workspace::new(&[("beans.xml", CHILD_OF_BASE)]);
    assert_clean(&validate(&ws, "beans.xml"));
}

#[test]
fn test_placeholder_property_name_is_skipped() {
    let ws = Workspace::new(&[(
        "beans.xml",
        r#"<bean id="a" class="Foo"><property name="${dynamic}" value="1"/><property name="nope" value="1"/></bean>"#,
    )]);

    let diagnostics = validate(&ws, "beans.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::NO_SETTER]);
    assert_eq!(
        &*diagnostics[0].message,
        "No setter found for property 'nope' in class 'Foo'"
    );
}

#[test]
fn test_parse_problems_come_first() {
    let ws = Workspace::new(&[("beans.xml", r#"<bean id="a" class="Foo">"#)]);

    let diagnostics = validate(&ws, "beans.xml");

    assert_eq!(codes_of(&diagnostics), vec![codes::PARSING_FAILED]);
}

#[test]
fn test_reference_into_import_resolves() {
    let ws = Workspace::new(&[
        ("main.xml", r#"<import resource="common.xml"/><bean id="a" class="Foo"><property name="bar" ref="shared"/></bean>"#),
        ("common.xml", r#"<bean id="shared" class="Bar"/>"#),
    ]);
    assert_clean(&validate(&ws, "main.xml"));
}

#[test]
fn test_ignorable_bean_setting() {
    let ws = Workspace::new(&[("beans.xml", FOO_REFERS_TO_MISSING)]);
    let validator = Validator::with_settings(type_index(), ValidatorSettings::default().with_ignorable_bean("b"));

    let diagnostics = validator
        .validate(&ws.project, &ws.config("beans.xml"), &CancellationToken::new())
        .unwrap();

    assert_clean(&diagnostics);
}

#[test]
fn test_validate_project_keeps_config_order() {
    let ws = Workspace::new(&[
        ("one.xml", FOO_REFERS_TO_BAR),
        ("two.xml", FOO_REFERS_TO_MISSING),
        ("three.xml", r#"<bean id="c" class="Missing"/>"#),
    ]);

    let results = Validator::new(type_index())
        .validate_project(&ws.project, &CancellationToken::new())
        .unwrap();

    let summary: Vec<(&str, Vec<&str>)> = results
        .iter()
        .map(|(name, diagnostics)| (name.as_str(), codes_of(diagnostics)))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("one.xml", vec![]),
            ("two.xml", vec![codes::UNDEFINED_REFERENCED_BEAN]),
            ("three.xml", vec![codes::CLASS_NOT_FOUND]),
        ]
    );
}

#[test]
fn test_canceled_validation() {
    let ws = Workspace::new(&[("one.xml", FOO_REFERS_TO_BAR), ("two.xml", FOO_REFERS_TO_BAR)]);
    let validator = Validator::new(type_index());
    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(
        validator.validate(&ws.project, &ws.config("one.xml"), &token),
        Err(ValidationError::Canceled)
    );
    assert_eq!(
        validator.validate_project(&ws.project, &token),
        Err(ValidationError::Canceled)
    );
}
