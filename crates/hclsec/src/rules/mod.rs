//! Built-in rule catalog
mod aws;
mod google;
mod kubernetes;

pub use aws::NO_PUBLIC_INGRESS_SGR;
pub use google::ENABLE_UBLA;
pub use kubernetes::NO_PUBLIC_INGRESS;

use crate::registry::{Registry, RegistryBuilder, RegistryError};
use crate::rule::Rule;

/// All built-in rules in registration order
pub fn builtin() -> Vec<Rule> {
    vec![ENABLE_UBLA, NO_PUBLIC_INGRESS, NO_PUBLIC_INGRESS_SGR]
}

pub fn register_builtin(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    for rule in builtin() {
        builder.register_check_rule(rule)?;
    }

    Ok(())
}

/// A registry holding only the built-in rules
pub fn registry() -> Result<Registry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    register_builtin(&mut builder)?;
    Ok(builder.build())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::EvaluationContext;
    use crate::hcl_documents::HclDocuments;
    use crate::scanner::{ScanReport, Scanner};

    fn scan_example(registry: &Registry, example: &str) -> ScanReport {
        let documents = HclDocuments::parse(example).expect("examples must parse");
        let context = EvaluationContext::from_documents(documents).expect("examples must be valid");
        Scanner::new(registry).scan(&context).unwrap()
    }

    #[test]
    fn documented_examples() {
        let registry = registry().unwrap();

        for rule in registry.rules() {
            assert!(!rule.documentation.bad_examples.is_empty(), "{}", rule.id());
            assert!(!rule.documentation.good_examples.is_empty(), "{}", rule.id());

            for example in rule.documentation.bad_examples {
                let report = scan_example(&registry, example);
                assert!(
                    report.findings.iter().any(|finding| finding.rule_id == rule.id()),
                    "{} misses its bad example",
                    rule.id()
                );
                assert!(report.faults.is_empty());
            }

            for example in rule.documentation.good_examples {
                let report = scan_example(&registry, example);
                assert!(
                    report.findings.iter().all(|finding| finding.rule_id != rule.id()),
                    "{} reports its good example: {:?}",
                    rule.id(),
                    report.findings
                );
                assert!(report.faults.is_empty());
            }
        }
    }

    #[test]
    fn builtin_ids() {
        let ids: Vec<_> = builtin().iter().map(Rule::id).collect();
        assert_eq!(
            ids,
            vec![
                "google-storage-enable-ubla",
                "kubernetes-network-no-public-ingress",
                "aws-vpc-no-public-ingress-sgr",
            ]
        );
    }
}
