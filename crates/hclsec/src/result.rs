//! Findings
//!
//! A check function appends [PendingResult]s to the [ResultSet] it was given. The scanner turns
//! them into [Finding]s afterwards, filling in the rule's severity and the block's range wherever
//! the check did not set them.
use crate::block::{Attribute, Block};
use crate::range::SourceRange;
use crate::rule::{Rule, Severity};
use crate::value::Value;

/// Results of one rule applied to one block
#[derive(Debug, Default)]
pub struct ResultSet {
    results: Vec<PendingResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty result and returns it for further configuration
    pub fn add_result(&mut self) -> &mut PendingResult {
        self.results.push(PendingResult::default());
        let last = self.results.len() - 1;
        &mut self.results[last]
    }

    pub fn add(&mut self, result: PendingResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingResult> {
        self.results.iter()
    }

    pub(crate) fn into_findings(self, rule: &Rule, block: &Block) -> Vec<Finding> {
        let rule_id = rule.id();
        let block_name = block.full_name();

        self.results
            .into_iter()
            .map(|result| Finding {
                rule_id: rule_id.clone(),
                description: result.description,
                severity: result.severity.unwrap_or(rule.default_severity),
                range: result
                    .range
                    .or_else(|| block.range().cloned())
                    .unwrap_or_default(),
                block: block_name.clone(),
                annotation: result.annotation,
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PendingResult {
    pub description: String,
    pub severity: Option<Severity>,
    pub range: Option<SourceRange>,
    pub annotation: Option<Annotation>,
}

impl PendingResult {
    pub fn with_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Overrides the rule's default severity
    pub fn with_severity(&mut self, severity: Severity) -> &mut Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_range(&mut self, range: &SourceRange) -> &mut Self {
        self.range = Some(range.clone());
        self
    }

    /// Points the result at an attribute: its range and its value become part of the finding
    ///
    /// Nil attributes leave the result untouched.
    pub fn with_attribute(&mut self, attribute: &Attribute) -> &mut Self {
        if let Some(range) = attribute.range() {
            self.range = Some(range.clone());
            self.annotation = Some(Annotation::new(attribute));
        }
        self
    }
}

/// The attribute that triggered a finding
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Annotation {
    pub attribute: String,
    pub value: String,
}

impl Annotation {
    fn new(attribute: &Attribute) -> Self {
        let value = match attribute.value() {
            Value::Known(literal) => literal.to_string(),
            Value::Unknown => "(unknown)".to_owned(),
            Value::Absent => "null".to_owned(),
        };

        Self {
            attribute: attribute.name().to_owned(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub description: String,
    pub severity: Severity,
    pub range: SourceRange,
    /// full name of the block the rule was applied to
    pub block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::EvaluationContext;
    use crate::hcl_documents;
    use crate::rule::{Provider, RuleDocumentation};
    use pretty_assertions::assert_eq;

    fn rule() -> Rule {
        Rule {
            provider: Provider::Google,
            service: "storage",
            short_code: "test",
            documentation: RuleDocumentation::default(),
            required_types: &["resource"],
            required_labels: &[],
            default_severity: Severity::Medium,
            check: |_, _, _| {},
        }
    }

    #[test]
    fn defaults_come_from_rule_and_block() {
        let context = EvaluationContext::from_documents(hcl_documents! {r#"
        resource "a" "b" {
          flag = false
        }
        "#})
        .unwrap();
        let block = context.blocks()[0];

        let mut set = ResultSet::new();
        set.add_result().with_description("plain");
        set.add_result()
            .with_description("annotated")
            .with_severity(Severity::Critical)
            .with_attribute(&block.get_attribute("flag"));
        set.add_result()
            .with_description("nil attribute")
            .with_attribute(&block.get_attribute("missing"));
        assert_eq!(set.len(), 3);

        let findings = set.into_findings(&rule(), &block);

        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(Some(&findings[0].range), block.range());
        assert_eq!(findings[0].block, "a.b");
        assert_eq!(findings[0].rule_id, "google-storage-test");
        assert_eq!(findings[0].annotation, None);

        assert_eq!(findings[1].severity, Severity::Critical);
        assert_eq!(Some(&findings[1].range), block.get_attribute("flag").range());
        assert_eq!(
            findings[1].annotation,
            Some(Annotation {
                attribute: "flag".to_owned(),
                value: "false".to_owned()
            })
        );

        assert_eq!(Some(&findings[2].range), block.range());
        assert_eq!(findings[2].annotation, None);
    }
}
