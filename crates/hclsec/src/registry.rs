//! Rule registry
//!
//! Registration and scanning are separate phases. All rules are added to a [RegistryBuilder]
//! during start up, [RegistryBuilder::build] freezes them into a [Registry] and from then on the
//! registry is only read. [Registry::install] makes one registry available process wide without
//! any locking on the read path.
use crate::rule::Rule;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("rule '{0}' has no required block types")]
    NoRequiredTypes(String),
    #[error("rule '{0}' has an empty short code or service")]
    InvalidName(String),
    #[error("a rule with id '{0}' is already registered")]
    AlreadyExists(String),
    #[error("a process wide registry is already installed")]
    AlreadyInstalled,
}

/// Write phase of the registry
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    rules: Vec<Rule>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule after checking the registration contract
    ///
    /// Violations are programming errors in the rule catalog and should stop start up.
    pub fn register_check_rule(&mut self, rule: Rule) -> Result<(), RegistryError> {
        let id = rule.id();

        if rule.short_code.trim().is_empty() || rule.service.trim().is_empty() {
            return Err(RegistryError::InvalidName(id));
        }

        if rule.required_types.is_empty()
            || rule.required_types.iter().any(|kind| kind.trim().is_empty())
        {
            return Err(RegistryError::NoRequiredTypes(id));
        }

        if self.rules.iter().any(|existing| existing.id() == id) {
            return Err(RegistryError::AlreadyExists(id));
        }

        tracing::trace!(rule=%id, "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    pub fn build(self) -> Registry {
        tracing::debug!(rules = self.rules.len(), "rule registry built");
        Registry { rules: self.rules }
    }
}

/// Read phase of the registry, rules in registration order
#[derive(Debug)]
pub struct Registry {
    rules: Vec<Rule>,
}

impl Registry {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Makes this registry the process wide one, can only happen once
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        GLOBAL
            .set(self)
            .map_err(|_| RegistryError::AlreadyInstalled)?;

        GLOBAL.get().ok_or(RegistryError::AlreadyInstalled)
    }

    /// The process wide registry, [None] until [Registry::install] was called
    pub fn global() -> Option<&'static Registry> {
        GLOBAL.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rule::{Provider, Severity};
    use pretty_assertions::assert_eq;

    fn rule(short_code: &'static str, required_types: &'static [&'static str]) -> Rule {
        Rule {
            provider: Provider::Aws,
            service: "ec2",
            short_code,
            documentation: Default::default(),
            required_types,
            required_labels: &[],
            default_severity: Severity::High,
            check: |_, _, _| {},
        }
    }

    #[test]
    fn keeps_registration_order() {
        let mut builder = RegistryBuilder::new();
        builder.register_check_rule(rule("b", &["resource"])).unwrap();
        builder.register_check_rule(rule("a", &["resource"])).unwrap();
        let registry = builder.build();

        let ids: Vec<_> = registry.rules().iter().map(Rule::id).collect();
        assert_eq!(ids, vec!["aws-ec2-b", "aws-ec2-a"]);
        assert!(registry.get("aws-ec2-a").is_some());
        assert!(registry.get("aws-ec2-c").is_none());
    }

    #[test]
    fn rejects_contract_violations() {
        let mut builder = RegistryBuilder::new();

        assert_eq!(
            builder.register_check_rule(rule("no-types", &[])),
            Err(RegistryError::NoRequiredTypes("aws-ec2-no-types".to_owned()))
        );
        assert_eq!(
            builder.register_check_rule(rule("blank-type", &[" "])),
            Err(RegistryError::NoRequiredTypes("aws-ec2-blank-type".to_owned()))
        );
        assert_eq!(
            builder.register_check_rule(rule(" ", &["resource"])),
            Err(RegistryError::InvalidName("aws-ec2- ".to_owned()))
        );

        builder.register_check_rule(rule("once", &["resource"])).unwrap();
        assert_eq!(
            builder.register_check_rule(rule("once", &["data"])),
            Err(RegistryError::AlreadyExists("aws-ec2-once".to_owned()))
        );

        assert_eq!(builder.build().len(), 1);
    }
}
