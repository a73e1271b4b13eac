use crate::block::Block;
use crate::context::EvaluationContext;
use crate::result::ResultSet;
use crate::rule::{Provider, Rule, RuleDocumentation, Severity};

pub const ENABLE_UBLA: Rule = Rule {
    provider: Provider::Google,
    service: "storage",
    short_code: "enable-ubla",
    documentation: RuleDocumentation {
        summary: "Ensure that Cloud Storage buckets have uniform bucket-level access enabled",
        impact: "ACLs are difficult to manage and often lead to incorrect/unintended configurations.",
        resolution: "Enable uniform bucket level access to provide a uniform permissioning system.",
        explanation: "With uniform bucket-level access enabled, object ACLs are disabled and only \
            bucket-level IAM permissions grant access to the bucket and its objects.",
        bad_examples: &[r#"
resource "google_storage_bucket" "static-site" {
  name     = "image-store.com"
  location = "EU"

  uniform_bucket_level_access = false
}
"#],
        good_examples: &[r#"
resource "google_storage_bucket" "static-site" {
  name     = "image-store.com"
  location = "EU"

  uniform_bucket_level_access = true
}
"#],
        links: &[
            "https://registry.terraform.io/providers/hashicorp/google/latest/docs/resources/storage_bucket#uniform_bucket_level_access",
            "https://cloud.google.com/storage/docs/uniform-bucket-level-access",
        ],
    },
    required_types: &["resource"],
    required_labels: &["google_storage_bucket"],
    default_severity: Severity::Medium,
    check: check_ubla,
};

fn check_ubla(set: &mut ResultSet, block: Block<'_>, _: &EvaluationContext) {
    let ubla = block.get_attribute("uniform_bucket_level_access");

    if ubla.is_nil() || ubla.value().is_absent() {
        set.add_result().with_description(format!(
            "Resource '{}' does not have uniform_bucket_level_access enabled.",
            block.full_name()
        ));
    } else if ubla.is_known() && !ubla.is_true() {
        set.add_result()
            .with_description(format!(
                "Resource '{}' has uniform_bucket_level_access explicitly disabled.",
                block.full_name()
            ))
            .with_attribute(&ubla);
    }
}
