use crate::block::Block;
use crate::cidr;
use crate::context::EvaluationContext;
use crate::result::ResultSet;
use crate::rule::{Provider, Rule, RuleDocumentation, Severity};

pub const NO_PUBLIC_INGRESS_SGR: Rule = Rule {
    provider: Provider::Aws,
    service: "vpc",
    short_code: "no-public-ingress-sgr",
    documentation: RuleDocumentation {
        summary: "An ingress security group rule allows traffic from /0.",
        impact: "The port is exposed for ingress from the internet",
        resolution: "Set a more restrictive cidr range",
        explanation: "Opening up ports to the public internet is generally to be avoided. You should \
            restrict access to IP addresses or ranges that explicitly require it where possible.",
        bad_examples: &[r#"
resource "aws_security_group_rule" "bad_example" {
  type        = "ingress"
  from_port   = 443
  to_port     = 443
  protocol    = "tcp"
  cidr_blocks = ["0.0.0.0/0"]
}
"#],
        good_examples: &[r#"
resource "aws_security_group_rule" "good_example" {
  type        = "ingress"
  from_port   = 443
  to_port     = 443
  protocol    = "tcp"
  cidr_blocks = ["10.0.0.0/16"]
}
"#],
        links: &[
            "https://registry.terraform.io/providers/hashicorp/aws/latest/docs/resources/security_group_rule#cidr_blocks",
            "https://docs.aws.amazon.com/vpc/latest/userguide/security-group-rules.html",
        ],
    },
    required_types: &["resource"],
    required_labels: &["aws_security_group_rule"],
    default_severity: Severity::Critical,
    check: check_public_ingress,
};

fn check_public_ingress(set: &mut ResultSet, block: Block<'_>, _: &EvaluationContext) {
    // egress rules and rules with a computed type are not our concern
    if !block.get_attribute("type").equals("ingress") {
        return;
    }

    for name in ["cidr_blocks", "ipv6_cidr_blocks"] {
        let cidr_blocks = block.get_attribute(name);
        if cidr::is_any_open(&cidr_blocks) {
            set.add_result()
                .with_description(format!(
                    "Resource '{}' defines a fully open ingress security group rule.",
                    block.full_name()
                ))
                .with_attribute(&cidr_blocks);
        }
    }
}
