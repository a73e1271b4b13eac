//! Block and attribute handles
//!
//! [Block] and [Attribute] are cheap, copyable views into an [EvaluationContext]. A handle either
//! points at a real node or is nil. Every lookup on a nil handle returns another nil handle and
//! every predicate on a nil attribute is `false`, so checks can be written as straight chains:
//!
//! ```
//! # use hclsec::{hcl_documents, context::EvaluationContext};
//! let context = EvaluationContext::from_documents(hcl_documents! {r#"
//! resource "kubernetes_network_policy" "policy" {
//!   spec {}
//! }
//! "#}).unwrap();
//!
//! let block = context.blocks()[0];
//! let cidr = block
//!     .get_block("spec")
//!     .get_block("ingress")
//!     .get_block("from")
//!     .get_attribute("cidr");
//!
//! assert!(cidr.is_nil());
//! assert!(!cidr.is_string());
//! ```
use crate::context::{AttributeId, BlockId, EvaluationContext};
use crate::range::SourceRange;
use crate::value::{Literal, Value};

static ABSENT: Value = Value::Absent;

#[derive(Clone, Copy)]
pub struct Block<'a> {
    context: &'a EvaluationContext,
    id: Option<BlockId>,
}

impl<'a> Block<'a> {
    pub(crate) fn new(context: &'a EvaluationContext, id: BlockId) -> Self {
        Self {
            context,
            id: Some(id),
        }
    }

    pub fn nil(context: &'a EvaluationContext) -> Self {
        Self { context, id: None }
    }

    pub fn is_nil(&self) -> bool {
        self.id.is_none()
    }

    /// Block type (`resource`, `ingress`, ...), empty for nil blocks
    pub fn kind(&self) -> &'a str {
        self.id
            .map(|id| self.context.block(id).kind.as_str())
            .unwrap_or_default()
    }

    pub fn labels(&self) -> &'a [String] {
        self.id
            .map(|id| self.context.block(id).labels.as_slice())
            .unwrap_or_default()
    }

    /// First label, the resource type of `resource "google_storage_bucket" "x"`
    pub fn type_label(&self) -> &'a str {
        self.labels().first().map(String::as_str).unwrap_or_default()
    }

    /// Second label, the name of `resource "google_storage_bucket" "x"`
    pub fn name_label(&self) -> &'a str {
        self.labels().get(1).map(String::as_str).unwrap_or_default()
    }

    pub fn range(&self) -> Option<&'a SourceRange> {
        self.id.map(|id| &self.context.block(id).range)
    }

    pub fn context(&self) -> &'a EvaluationContext {
        self.context
    }

    /// The enclosing block, nil for top level blocks
    pub fn parent(&self) -> Block<'a> {
        Block {
            context: self.context,
            id: self.id.and_then(|id| self.context.block(id).parent),
        }
    }

    /// First child block of the given type
    pub fn get_block(&self, kind: &str) -> Block<'a> {
        let id = self.children().find(|child| child.kind() == kind).and_then(|child| child.id);
        Block {
            context: self.context,
            id,
        }
    }

    /// All child blocks of the given type in declaration order
    pub fn get_blocks(&self, kind: &str) -> Vec<Block<'a>> {
        self.children().filter(|child| child.kind() == kind).collect()
    }

    /// All child blocks in declaration order
    pub fn blocks(&self) -> Vec<Block<'a>> {
        self.children().collect()
    }

    fn children(&self) -> impl Iterator<Item = Block<'a>> + 'a {
        let context = self.context;
        self.id
            .map(|id| context.block(id).children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |id| Block::new(context, *id))
    }

    pub fn get_attribute(&self, name: &str) -> Attribute<'a> {
        Attribute {
            context: self.context,
            id: self
                .id
                .and_then(|id| self.context.block(id).attributes.get(name).copied()),
        }
    }

    /// Follows blocks by type and ends with an attribute: `"spec.ingress.from.cidr"`
    pub fn get_nested_attribute(&self, path: &str) -> Attribute<'a> {
        let mut parts: Vec<&str> = path.split('.').collect();
        let name = parts.pop().unwrap_or_default();

        parts
            .into_iter()
            .fold(*self, |block, kind| block.get_block(kind))
            .get_attribute(name)
    }

    /// All attributes in declaration order
    pub fn attributes(&self) -> Vec<Attribute<'a>> {
        let context = self.context;
        self.id
            .map(|id| {
                context
                    .block(id)
                    .attributes
                    .values()
                    .map(|id| Attribute {
                        context,
                        id: Some(*id),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Is there an attribute or a child block with this name
    pub fn has_child(&self, name: &str) -> bool {
        !self.get_attribute(name).is_nil() || !self.get_block(name).is_nil()
    }

    /// Address style name for diagnostics
    ///
    /// - `resource "a" "b"` => `a.b`
    /// - `data "a" "b"` => `data.a.b`
    /// - `spec` nested in `resource "a" "b"` => `a.b.spec`
    /// - blocks in a module called `m` are prefixed with `module.m.`
    pub fn full_name(&self) -> String {
        let Some(id) = self.id else {
            return "<nil>".to_owned();
        };

        let data = self.context.block(id);
        let own = if data.kind == "resource" && !data.labels.is_empty() {
            data.labels.join(".")
        } else if data.labels.is_empty() {
            data.kind.clone()
        } else {
            format!("{}.{}", data.kind, data.labels.join("."))
        };

        let parent = self.parent();
        if !parent.is_nil() {
            return format!("{}.{own}", parent.full_name());
        }

        let address = &self.context.module(data.module).address;
        if address.is_empty() {
            own
        } else {
            format!("{address}.{own}")
        }
    }
}

impl PartialEq for Block<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.context, other.context) && self.id == other.id
    }
}

impl std::fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Block").field(&self.full_name()).finish()
    }
}

#[derive(Clone, Copy)]
pub struct Attribute<'a> {
    context: &'a EvaluationContext,
    id: Option<AttributeId>,
}

impl<'a> Attribute<'a> {
    pub fn nil(context: &'a EvaluationContext) -> Self {
        Self { context, id: None }
    }

    pub fn is_nil(&self) -> bool {
        self.id.is_none()
    }

    /// Attribute name, empty for nil attributes
    pub fn name(&self) -> &'a str {
        self.id
            .map(|id| self.context.attribute(id).name.as_str())
            .unwrap_or_default()
    }

    /// Resolved value, [Value::Absent] for nil attributes
    pub fn value(&self) -> &'a Value {
        match self.id {
            Some(id) => self.context.attribute_value(id),
            None => &ABSENT,
        }
    }

    pub fn range(&self) -> Option<&'a SourceRange> {
        self.id.map(|id| &self.context.attribute(id).range)
    }

    /// The owning block, nil for nil attributes
    pub fn block(&self) -> Block<'a> {
        Block {
            context: self.context,
            id: self.id.map(|id| self.context.attribute(id).block),
        }
    }

    pub fn is_known(&self) -> bool {
        self.value().is_known()
    }

    pub fn is_unknown(&self) -> bool {
        self.value().is_unknown()
    }

    pub fn is_string(&self) -> bool {
        matches!(self.value(), Value::Known(Literal::String(_)))
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self.value(),
            Value::Known(Literal::Integer(_) | Literal::Decimal(_))
        )
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.value(), Value::Known(Literal::Boolean(_)))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.value(), Value::Known(Literal::Array(_)))
    }

    pub fn is_true(&self) -> bool {
        self.value().as_bool() == Some(true)
    }

    pub fn is_false(&self) -> bool {
        self.value().as_bool() == Some(false)
    }

    /// Known and empty (`""`, `[]`, `{}`)
    pub fn is_empty(&self) -> bool {
        self.value()
            .as_literal()
            .map(Literal::is_empty)
            .unwrap_or(false)
    }

    pub fn equals(&self, other: impl Into<Literal>) -> bool {
        self.value().as_literal() == Some(&other.into())
    }

    pub fn is_one_of<I, T>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<Literal>,
    {
        let Some(literal) = self.value().as_literal() else {
            return false;
        };

        candidates
            .into_iter()
            .any(|candidate| &candidate.into() == literal)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_str().map(|s| s.starts_with(prefix)).unwrap_or(false)
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.as_str().map(|s| s.ends_with(suffix)).unwrap_or(false)
    }

    /// Substring of a string or element of a list
    pub fn contains(&self, needle: impl Into<Literal>) -> bool {
        match (self.value().as_literal(), needle.into()) {
            (Some(Literal::String(haystack)), Literal::String(needle)) => {
                haystack.contains(&needle)
            }
            (Some(Literal::Array(elements)), needle) => elements.contains(&needle),
            (Some(Literal::Object(entries)), Literal::String(key)) => entries.contains_key(&key),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value().as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().as_bool()
    }

    pub fn as_list(&self) -> Option<&'a [Literal]> {
        self.value().as_list()
    }
}

impl PartialEq for Attribute<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.context, other.context) && self.id == other.id
    }
}

impl std::fmt::Debug for Attribute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("block", &self.block())
            .field("name", &self.name())
            .field("value", self.value())
            .finish()
    }
}
