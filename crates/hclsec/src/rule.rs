//! Rule descriptors
//!
//! A [Rule] is plain data plus a check function, so catalogs can be written as `static` items.
use crate::block::Block;
use crate::context::EvaluationContext;
use crate::result::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Google,
    Kubernetes,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Aws => f.write_str("aws"),
            Provider::Google => f.write_str("google"),
            Provider::Kubernetes => f.write_str("kubernetes"),
        }
    }
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => f.write_str("LOW"),
            Severity::Medium => f.write_str("MEDIUM"),
            Severity::High => f.write_str("HIGH"),
            Severity::Critical => f.write_str("CRITICAL"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ParseSeverityError(s.to_owned())),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown severity '{0}', expected one of low, medium, high, critical")]
pub struct ParseSeverityError(String);

/// Human facing documentation, never evaluated
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RuleDocumentation {
    pub summary: &'static str,
    pub impact: &'static str,
    pub resolution: &'static str,
    pub explanation: &'static str,
    pub bad_examples: &'static [&'static str],
    pub good_examples: &'static [&'static str],
    pub links: &'static [&'static str],
}

/// Inspects one matching block and records findings in the [ResultSet]
pub type CheckFunc = fn(&mut ResultSet, Block<'_>, &EvaluationContext);

#[derive(Clone, serde::Serialize)]
pub struct Rule {
    pub provider: Provider,
    pub service: &'static str,
    pub short_code: &'static str,
    pub documentation: RuleDocumentation,
    /// block kinds this rule applies to, must not be empty
    pub required_types: &'static [&'static str],
    /// positional prefix of the block labels, empty matches any labels
    pub required_labels: &'static [&'static str],
    pub default_severity: Severity,
    #[serde(skip)]
    pub check: CheckFunc,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id())
            .field("required_types", &self.required_types)
            .field("required_labels", &self.required_labels)
            .field("default_severity", &self.default_severity)
            .finish_non_exhaustive()
    }
}

impl Rule {
    /// `<provider>-<service>-<short code>`
    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.provider, self.service, self.short_code)
    }

    pub fn matches(&self, block: &Block) -> bool {
        if !self.required_types.contains(&block.kind()) {
            return false;
        }

        let labels = block.labels();
        labels.len() >= self.required_labels.len()
            && self
                .required_labels
                .iter()
                .zip(labels)
                .all(|(required, label)| *required == label.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hcl_documents;
    use pretty_assertions::assert_eq;

    fn noop(_: &mut ResultSet, _: Block<'_>, _: &EvaluationContext) {}

    fn rule(
        required_types: &'static [&'static str],
        required_labels: &'static [&'static str],
    ) -> Rule {
        Rule {
            provider: Provider::Google,
            service: "storage",
            short_code: "test",
            documentation: Default::default(),
            required_types,
            required_labels,
            default_severity: Severity::Low,
            check: noop,
        }
    }

    #[test]
    fn id() {
        assert_eq!(rule(&["resource"], &[]).id(), "google-storage-test");
    }

    #[test]
    fn severity_order_and_parsing() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!("High".parse::<Severity>(), Ok(Severity::High));
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert!("urgent".parse::<Severity>().is_err());
        assert_eq!(Severity::Medium.to_string(), "MEDIUM");
    }

    #[test]
    fn matching() {
        let context = crate::context::EvaluationContext::from_documents(hcl_documents! {r#"
        resource "google_storage_bucket" "bucket" {}
        data "google_storage_bucket" "bucket" {}
        resource "google_storage_bucket_object" "object" {}
        "#})
        .unwrap();
        let blocks = context.blocks();

        let any_resource = rule(&["resource"], &[]);
        assert!(any_resource.matches(&blocks[0]));
        assert!(!any_resource.matches(&blocks[1]));
        assert!(any_resource.matches(&blocks[2]));

        let bucket = rule(&["resource", "data"], &["google_storage_bucket"]);
        assert!(bucket.matches(&blocks[0]));
        assert!(bucket.matches(&blocks[1]));
        // labels are compared whole, not as string prefixes
        assert!(!bucket.matches(&blocks[2]));

        let named = rule(&["resource"], &["google_storage_bucket", "bucket"]);
        assert!(named.matches(&blocks[0]));

        let too_specific = rule(&["resource"], &["google_storage_bucket", "bucket", "extra"]);
        assert!(!too_specific.matches(&blocks[0]));
    }
}
