//! Name lookup helpers over a [`LookupContext`].

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::model::{Bean, BeanConstructorArgument, ConfigSet, LookupContext};
use crate::project::Project;

/// Find a bean by name or alias, falling back to component beans.
pub fn find_bean(name: &str, context: &dyn LookupContext) -> Option<Arc<Bean>> {
    context.resolve(name)
}

/// Class name of a bean, taken from the nearest ancestor that declares one.
///
/// A cyclic or broken parent chain yields `None`.
pub fn bean_class(bean: &Bean, context: &dyn LookupContext) -> Option<SmolStr> {
    if let Some(class_name) = bean.class_name() {
        return Some(SmolStr::new(class_name));
    }
    let mut names: FxHashSet<SmolStr> = FxHashSet::default();
    names.insert(SmolStr::new(bean.name()));
    let mut parent_name = bean.parent_name().map(SmolStr::new);
    while let Some(name) = parent_name {
        if !names.insert(name.clone()) {
            trace!(bean = bean.name(), parent = %name, "parent chain cycle");
            return None;
        }
        let parent = context.resolve(&name)?;
        if let Some(class_name) = parent.class_name() {
            return Some(SmolStr::new(class_name));
        }
        parent_name = parent.parent_name().map(SmolStr::new);
    }
    None
}

/// Inner beans of `bean`, optionally at any depth.
pub fn inner_beans(bean: &Bean, recursive: bool) -> Vec<Arc<Bean>> {
    if recursive {
        bean.inner_beans_recursive()
    } else {
        bean.inner_beans()
    }
}

/// The constructor argument declared first in the source.
pub fn first_constructor_argument(bean: &Bean) -> Option<&BeanConstructorArgument> {
    bean.first_constructor_argument()
}

/// Config sets of `project` that include the named config.
pub fn config_sets_of(project: &Project, config: &str) -> Vec<Arc<ConfigSet>> {
    project.config_sets_of(config)
}
