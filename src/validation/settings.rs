use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::constants::FACTORY_BEAN_INTERFACE;
use crate::resolve::InterceptorRule;

/// Knobs of the [`Validator`](super::Validator).
#[derive(Clone, Debug)]
pub struct ValidatorSettings {
    /// Bean names never reported as undefined.
    pub ignorable_beans: FxHashSet<SmolStr>,
    /// List properties whose literal elements are bean names.
    pub interceptor_rules: Vec<InterceptorRule>,
    /// Interface of beans that produce another object instead of themselves.
    pub factory_bean_interface: SmolStr,
    /// Skip type and reference checks on infrastructure-role beans.
    pub skip_infrastructure: bool,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            ignorable_beans: FxHashSet::default(),
            interceptor_rules: vec![InterceptorRule::default()],
            factory_bean_interface: SmolStr::new(FACTORY_BEAN_INTERFACE),
            skip_infrastructure: true,
        }
    }
}

impl ValidatorSettings {
    pub fn with_ignorable_bean(mut self, name: impl Into<SmolStr>) -> Self {
        self.ignorable_beans.insert(name.into());
        self
    }

    pub fn with_interceptor_rules(mut self, rules: Vec<InterceptorRule>) -> Self {
        self.interceptor_rules = rules;
        self
    }

    pub fn with_factory_bean_interface(mut self, name: impl Into<SmolStr>) -> Self {
        self.factory_bean_interface = name.into();
        self
    }

    pub fn with_skip_infrastructure(mut self, skip: bool) -> Self {
        self.skip_infrastructure = skip;
        self
    }

    pub fn is_ignorable(&self, name: &str) -> bool {
        self.ignorable_beans.contains(name)
    }
}
