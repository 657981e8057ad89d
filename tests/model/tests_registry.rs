//! Model registry: lifecycle, external names, reload fan-out, staleness.

use std::sync::Arc;

use parking_lot::Mutex;

use beanscope::project::ModelEvent;
use beanscope::syntax::InMemoryDocuments;
use beanscope::{BeansModel, ConfigEnvironment, ModelError, Project, ProjectSettings};

use crate::helpers::workspace::{Workspace, beans};

fn recorded(model: &BeansModel) -> Arc<Mutex<Vec<ModelEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    model.subscribe(move |event: &ModelEvent| sink.lock().push(event.clone()));
    events
}

#[test]
fn test_reload_fans_out_to_config_sets() {
    let ws = Workspace::new(&[("one.xml", r#"<bean id="a" class="Foo"/>"#)]);
    let set = ws.project.add_config_set("all").unwrap();
    set.add_config("one.xml");
    assert!(set.bean("a").is_some());

    let model = BeansModel::new();
    model.open();
    model.add_project(ws.project.clone()).unwrap();
    let events = recorded(&model);

    model.reload("/demo/one.xml").unwrap();

    assert!(!set.is_populated());
    assert_eq!(
        *events.lock(),
        vec![
            ModelEvent::ConfigReset {
                project: "demo".into(),
                config: "one.xml".into(),
            },
            ModelEvent::ConfigSetReset {
                project: "demo".into(),
                config_set: "all".into(),
            },
        ]
    );
    assert_eq!(
        model.reload("/demo/missing.xml"),
        Err(ModelError::UnresolvedExternalName("/demo/missing.xml".into()))
    );
}

#[test]
fn test_refresh_changed_reloads_stale_configs() {
    let ws = Workspace::new(&[
        ("one.xml", r#"<bean id="a" class="Foo"/>"#),
        ("two.xml", r#"<bean id="b" class="Foo"/>"#),
    ]);
    let model = BeansModel::new();
    model.open();
    model.add_project(ws.project.clone()).unwrap();
    ws.config("one.xml").beans();
    ws.config("two.xml").beans();

    ws.edit("two.xml", r#"<bean id="c" class="Foo"/>"#);

    assert_eq!(model.refresh_changed().unwrap(), vec!["/demo/two.xml"]);
    assert!(ws.config("one.xml").is_populated());
    assert!(ws.config("two.xml").bean("c").is_some());
}

#[test]
fn test_config_set_with_member_from_another_project() {
    let docs = Arc::new(InMemoryDocuments::new());
    docs.insert("lib.xml", &beans(r#"<bean id="shared" class="Bar"/>"#));
    docs.insert("app.xml", &beans(r#"<bean id="app" class="Foo"/>"#));
    let env = || ConfigEnvironment::xml(docs.clone());

    let lib = Project::new("lib", env(), ProjectSettings::default());
    lib.add_config("lib.xml").unwrap();
    let app = Project::new("app", env(), ProjectSettings::default());
    app.add_config("app.xml").unwrap();

    let model = BeansModel::new();
    model.open();
    model.add_project(lib).unwrap();
    model.add_project(app.clone()).unwrap();

    let set = app.add_config_set("wired").unwrap();
    set.add_config("app.xml");
    set.add_config("/lib/lib.xml");

    assert!(set.bean("shared").is_some());
    assert!(set.bean("app").is_some());
    let (owner, config) = model.config("/lib/lib.xml").unwrap();
    assert_eq!(owner.name(), "lib");
    assert_eq!(config.name(), "lib.xml");
}

#[test]
fn test_closed_model_rejects_operations() {
    let model = BeansModel::new();
    model.open();
    model.close();
    assert!(!model.is_open());
    assert_eq!(model.refresh_changed(), Err(ModelError::Closed));
}
