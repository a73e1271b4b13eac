//! CIDR openness
//!
//! A range is open when it covers the whole address space of its family, i.e. `0.0.0.0/0` or
//! `::/0`. Large but restricted ranges (`10.0.0.0/8`) are not open. Values that are unknown or
//! fail to parse are never open; malformed ranges are left for dedicated rules to report.
use crate::block::Attribute;
use crate::value::{Literal, Value};
use ipnet::IpNet;

/// Does the attribute hold a single open CIDR range
pub fn is_open(attribute: &Attribute) -> bool {
    is_open_value(attribute.value())
}

/// Does the attribute hold an open CIDR range, either directly or as any element of a list
///
/// Useful for attributes like `cidr_blocks = ["10.0.0.0/8", "0.0.0.0/0"]`. A list with any unknown
/// element is unknown as a whole and therefore never open.
pub fn is_any_open(attribute: &Attribute) -> bool {
    match attribute.value() {
        Value::Known(Literal::Array(elements)) => elements.iter().any(is_open_literal),
        value => is_open_value(value),
    }
}

pub fn is_open_value(value: &Value) -> bool {
    value.as_literal().map(is_open_literal).unwrap_or(false)
}

fn is_open_literal(literal: &Literal) -> bool {
    match literal {
        Literal::String(cidr) => is_open_str(cidr),
        _ => false,
    }
}

pub fn is_open_str(cidr: &str) -> bool {
    match cidr.trim().parse::<IpNet>() {
        Ok(network) => network.prefix_len() == 0,
        Err(err) => {
            tracing::trace!(%cidr, %err, "not a cidr range");
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::EvaluationContext;
    use crate::hcl_documents;

    #[test]
    fn open_ranges() {
        assert!(is_open_str("0.0.0.0/0"));
        assert!(is_open_str("::/0"));
        assert!(is_open_str(" 0.0.0.0/0 "));
    }

    #[test]
    fn restricted_ranges() {
        assert!(!is_open_str("10.0.0.0/16"));
        assert!(!is_open_str("0.0.0.0/1"));
        assert!(!is_open_str("2001:db8::/32"));
        assert!(!is_open_str("::/1"));
    }

    #[test]
    fn malformed_ranges() {
        assert!(!is_open_str("not-a-cidr"));
        assert!(!is_open_str("0.0.0.0"));
        assert!(!is_open_str("0.0.0.0/33"));
        assert!(!is_open_str(""));
    }

    #[test]
    fn values() {
        assert!(is_open_value(&Value::Known("0.0.0.0/0".into())));
        assert!(!is_open_value(&Value::Unknown));
        assert!(!is_open_value(&Value::Absent));
        assert!(!is_open_value(&Value::Known(Literal::Integer(0))));
    }

    #[test]
    fn attributes() {
        let context = EvaluationContext::from_documents(hcl_documents! {r#"
        variable "cidr" {}

        resource "a" "b" {
          open       = "0.0.0.0/0"
          closed     = "10.0.0.0/16"
          unknown    = var.cidr
          list       = ["10.0.0.0/8", "::/0"]
          closed_list = ["10.0.0.0/8", var.cidr]
        }
        "#})
        .unwrap();

        let block = context.blocks()[1];

        assert!(is_open(&block.get_attribute("open")));
        assert!(!is_open(&block.get_attribute("closed")));
        assert!(!is_open(&block.get_attribute("unknown")));
        assert!(!is_open(&block.get_attribute("missing")));
        assert!(!is_open(&block.get_attribute("list")));

        assert!(is_any_open(&block.get_attribute("list")));
        assert!(is_any_open(&block.get_attribute("open")));
        assert!(!is_any_open(&block.get_attribute("closed_list")));
        assert!(!is_any_open(&block.get_block("nope").get_attribute("list")));
    }
}
