use crate::block::Block;
use crate::cidr;
use crate::context::EvaluationContext;
use crate::result::ResultSet;
use crate::rule::{Provider, Rule, RuleDocumentation, Severity};

pub const NO_PUBLIC_INGRESS: Rule = Rule {
    provider: Provider::Kubernetes,
    service: "network",
    short_code: "no-public-ingress",
    documentation: RuleDocumentation {
        summary: "Public ingress should not be allowed via network policies",
        impact: "Exposure of infrastructure to the public internet",
        resolution: "Remove public access except where explicitly required",
        explanation: "You should not expose infrastructure to the public internet except where explicitly required",
        bad_examples: &[r#"
resource "kubernetes_network_policy" "bad_example" {
  metadata {
    name      = "terraform-example-network-policy"
    namespace = "default"
  }

  spec {
    pod_selector {
      match_expressions {
        key      = "name"
        operator = "In"
        values   = ["webfront", "api"]
      }
    }

    ingress {
      ports {
        port     = "http"
        protocol = "TCP"
      }

      from {
        ip_block {
          cidr   = "0.0.0.0/0"
          except = ["10.0.0.0/24", "10.0.1.0/24"]
        }
      }
    }

    policy_types = ["Ingress"]
  }
}
"#],
        good_examples: &[r#"
resource "kubernetes_network_policy" "good_example" {
  metadata {
    name      = "terraform-example-network-policy"
    namespace = "default"
  }

  spec {
    pod_selector {
      match_expressions {
        key      = "name"
        operator = "In"
        values   = ["webfront", "api"]
      }
    }

    ingress {
      ports {
        port     = "http"
        protocol = "TCP"
      }

      from {
        ip_block {
          cidr   = "10.0.0.0/16"
          except = ["10.0.0.0/24", "10.0.1.0/24"]
        }
      }
    }

    egress {
      to {
        ip_block {
          cidr = "0.0.0.0/0"
        }
      }
    }

    policy_types = ["Ingress", "Egress"]
  }
}
"#],
        links: &[
            "https://registry.terraform.io/providers/hashicorp/kubernetes/latest/docs/resources/network_policy#spec.ingress.from.ip_block.cidr",
        ],
    },
    required_types: &["resource"],
    required_labels: &["kubernetes_network_policy"],
    default_severity: Severity::High,
    check: check_public_ingress,
};

fn check_public_ingress(set: &mut ResultSet, block: Block<'_>, _: &EvaluationContext) {
    let ingress = block.get_block("spec").get_block("ingress");
    let sources = ingress.get_blocks("from");

    if sources.is_empty() {
        set.add_result().with_description(format!(
            "Resource '{}' allows all ingress traffic by default",
            block.full_name()
        ));
        return;
    }

    // `except` lists do not make an open range private
    for from in sources {
        let cidr = from.get_block("ip_block").get_attribute("cidr");
        if cidr.is_string() && cidr::is_open(&cidr) {
            set.add_result()
                .with_description(format!(
                    "Resource '{}' allows ingress traffic from the internet",
                    block.full_name()
                ))
                .with_attribute(&cidr);
        }
    }
}
