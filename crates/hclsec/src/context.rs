//! Evaluation context: all blocks of all modules plus everything needed to resolve references
use crate::block::Block;
use crate::hcl_documents::{HclDocuments, Source};
use crate::modules::ModuleTree;
use crate::range::SourceRange;
use crate::util::ReferenceRewriter;
use crate::value::{Literal, Value};
use crate::visit;
use hcl::eval::Evaluate;
use hcl::Identifier;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    pub const ROOT: ModuleId = ModuleId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BlockId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct AttributeId(pub(crate) usize);

/// Immutable, fully materialized configuration
///
/// Blocks and attributes live in flat arenas and are handed out as [Block] and
/// [crate::block::Attribute] handles. Attribute values are resolved on first access and memoized.
/// After construction nothing but those memo cells changes, so a context can be shared between
/// any number of threads.
#[derive(Debug)]
pub struct EvaluationContext {
    modules: Vec<ModuleData>,
    blocks: Vec<BlockData>,
    attributes: Vec<AttributeData>,
    /// variable values for the root module (tfvars, command line)
    inputs: indexmap::IndexMap<String, Literal>,
}

#[derive(Debug)]
pub(crate) struct ModuleData {
    pub name: Option<String>,
    /// `module.a.module.b` or empty for the root module
    pub address: String,
    pub parent: Option<ModuleId>,
    /// the `module` block in the parent that provides the input variables
    pub call: Option<BlockId>,
    pub dir: Option<PathBuf>,
    pub blocks: Vec<BlockId>,
}

#[derive(Debug)]
pub(crate) struct BlockData {
    pub kind: String,
    pub labels: Vec<String>,
    pub attributes: indexmap::IndexMap<String, AttributeId>,
    pub children: Vec<BlockId>,
    pub range: SourceRange,
    pub module: ModuleId,
    pub parent: Option<BlockId>,
}

#[derive(Debug)]
pub(crate) struct AttributeData {
    pub name: String,
    pub expression: hcl::Expression,
    pub range: SourceRange,
    pub block: BlockId,
    value: OnceLock<Value>,
}

impl EvaluationContext {
    pub fn new(tree: &ModuleTree) -> Result<Self, ContextErrors> {
        Self::with_inputs(tree, Default::default())
    }

    /// Single module context
    pub fn from_documents(documents: HclDocuments) -> Result<Self, ContextErrors> {
        Self::new(&ModuleTree::new(documents))
    }

    pub fn with_inputs(
        tree: &ModuleTree,
        inputs: indexmap::IndexMap<String, Literal>,
    ) -> Result<Self, ContextErrors> {
        let mut _self = Self {
            modules: Default::default(),
            blocks: Default::default(),
            attributes: Default::default(),
            inputs,
        };

        let mut e = ContextErrors::new();

        for loaded in tree.modules() {
            let module = ModuleId(_self.modules.len());

            let parent = loaded.parent.map(ModuleId);
            let address = match (parent, &loaded.name) {
                (Some(parent), Some(name)) => {
                    let parent_address = &_self.modules[parent.0].address;
                    if parent_address.is_empty() {
                        format!("module.{name}")
                    } else {
                        format!("{parent_address}.module.{name}")
                    }
                }
                _ => String::new(),
            };
            let call = parent
                .zip(loaded.call)
                .and_then(|(parent, call)| _self.modules[parent.0].blocks.get(call).copied());

            _self.modules.push(ModuleData {
                name: loaded.name.clone(),
                address,
                parent,
                call,
                dir: loaded.dir.clone(),
                blocks: vec![],
            });

            for (_index, source, attribute) in loaded.documents.attributes() {
                e.log(Issue::RootAttribute {
                    name: attribute.key.value().as_str().to_owned(),
                    range: source.attribute_range(attribute),
                });
            }

            for (_index, source, block) in loaded.documents.blocks() {
                let id = _self.insert_block(module, None, source, block, &mut e);

                let data = &_self.blocks[id.0];
                let expected = required_label_count(&data.kind);
                if data.labels.len() < expected {
                    e.log(Issue::MissingLabels {
                        kind: data.kind.clone(),
                        expected,
                        range: data.range.clone(),
                    });
                }

                _self.modules[module.0].blocks.push(id);
            }
        }

        if !e.issues.is_empty() {
            return Err(e);
        }

        tracing::debug!(
            modules = _self.modules.len(),
            blocks = _self.blocks.len(),
            attributes = _self.attributes.len(),
            "evaluation context ready"
        );

        Ok(_self)
    }

    fn insert_block(
        &mut self,
        module: ModuleId,
        parent: Option<BlockId>,
        source: &Source,
        block: &hcl_edit::structure::Block,
        e: &mut ContextErrors,
    ) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BlockData {
            kind: block.ident.value().as_str().to_owned(),
            labels: block
                .labels
                .iter()
                .map(|label| label.as_str().to_owned())
                .collect(),
            attributes: Default::default(),
            children: vec![],
            range: source.block_range(block),
            module,
            parent,
        });

        for attribute in block.body.attributes() {
            let name = attribute.key.value().as_str().to_owned();
            let range = source.attribute_range(attribute);

            if self.blocks[id.0].attributes.contains_key(&name) {
                e.log(Issue::DuplicateAttribute { name, range });
                continue;
            }

            let attribute_id = AttributeId(self.attributes.len());
            self.attributes.push(AttributeData {
                name: name.clone(),
                expression: attribute.value.clone().into(),
                range,
                block: id,
                value: OnceLock::new(),
            });
            self.blocks[id.0].attributes.insert(name, attribute_id);
        }

        for child in block.body.blocks() {
            let child_id = self.insert_block(module, Some(id), source, child, e);
            self.blocks[id.0].children.push(child_id);
        }

        id
    }

    /// Top level blocks of all modules, root module first
    pub fn blocks(&self) -> Vec<Block<'_>> {
        self.modules
            .iter()
            .flat_map(|module| module.blocks.iter())
            .map(|id| Block::new(self, *id))
            .collect()
    }

    /// Top level blocks of one module
    pub fn module_blocks(&self, module: ModuleId) -> Vec<Block<'_>> {
        self.modules
            .get(module.0)
            .map(|module| module.blocks.iter().map(|id| Block::new(self, *id)).collect())
            .unwrap_or_default()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn inputs(&self) -> &indexmap::IndexMap<String, Literal> {
        &self.inputs
    }

    /// Resolve an expression as if it was written in the root module
    pub fn evaluate_in_context(&self, expression: &hcl::Expression) -> Value {
        self.evaluate(ModuleId::ROOT, expression, &mut ResolutionGuard::default())
    }

    pub(crate) fn module(&self, id: ModuleId) -> &ModuleData {
        &self.modules[id.0]
    }

    pub(crate) fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.0]
    }

    pub(crate) fn attribute(&self, id: AttributeId) -> &AttributeData {
        &self.attributes[id.0]
    }

    /// Memoized value of an attribute
    pub(crate) fn attribute_value(&self, id: AttributeId) -> &Value {
        self.attributes[id.0]
            .value
            .get_or_init(|| self.resolve_attribute(id, &mut ResolutionGuard::default()))
    }
}

/// Reference resolution
impl EvaluationContext {
    /// Resolves without touching the memo of any attribute but the outermost one.
    ///
    /// Nested resolutions only read memos that are already complete, which keeps concurrent
    /// resolution of mutually dependent attributes from waiting on each other. Within one
    /// resolution every attribute is evaluated at most once, see [ResolutionGuard].
    fn resolve_attribute(&self, id: AttributeId, guard: &mut ResolutionGuard) -> Value {
        let data = &self.attributes[id.0];
        if let Some(value) = data.value.get() {
            return value.clone();
        }
        if let Some(value) = guard.resolved.get(&id) {
            return value.clone();
        }

        let Some(depth) = guard.enter(id) else {
            tracing::trace!(attribute=%data.name, range=%data.range, "reference cycle");
            return Value::Unknown;
        };

        let module = self.blocks[data.block.0].module;
        let value = self.evaluate(module, &data.expression, guard);

        guard.leave(id, depth, &value);
        value
    }

    fn evaluate(
        &self,
        module: ModuleId,
        expression: &hcl::Expression,
        guard: &mut ResolutionGuard,
    ) -> Value {
        let mut expression = expression.clone();

        let mut rewriter = ReferenceRewriter::new(self, module, guard);
        visit::walk_expression(&mut expression, &mut rewriter);
        if rewriter.unknown {
            return Value::Unknown;
        }

        match expression.evaluate(&hcl::eval::Context::new()) {
            Ok(value) => value.into(),
            Err(errors) => {
                tracing::trace!(%errors, "expression is not statically known");
                Value::Unknown
            }
        }
    }

    /// Resolve the longest attribute path of a traversal (`var.name`, `module.call.output`, ...)
    pub(crate) fn resolve_reference(
        &self,
        module: ModuleId,
        path: &[Identifier],
        guard: &mut ResolutionGuard,
    ) -> Reference {
        let Some(root) = path.first() else {
            return Reference::NotAReference;
        };

        match root.as_str() {
            "var" => match path.get(1) {
                Some(name) => Reference::new(self.resolve_variable(module, name, guard), 2),
                None => Reference::Unknown,
            },
            "local" => match path.get(1) {
                Some(name) => Reference::new(self.resolve_local(module, name, guard), 2),
                None => Reference::Unknown,
            },
            "module" => match (path.get(1), path.get(2)) {
                (Some(call), Some(output)) => {
                    Reference::new(self.resolve_output(module, call, output, guard), 3)
                }
                _ => Reference::Unknown,
            },
            "path" => {
                let dir = match path.get(1).map(|ident| ident.as_str()) {
                    Some("module") => self.modules[module.0].dir.as_ref(),
                    Some("root") => self.modules[ModuleId::ROOT.0].dir.as_ref(),
                    _ => None,
                };

                match dir {
                    Some(dir) => Reference::Resolved {
                        literal: Literal::String(dir.display().to_string()),
                        consumed: 2,
                    },
                    None => Reference::Unknown,
                }
            }
            // only known once applied
            "data" | "count" | "each" | "self" | "terraform" => Reference::Unknown,
            kind => {
                let Some(name) = path.get(1) else {
                    return Reference::NotAReference;
                };

                let Some(resource) = self.find_block(module, "resource", &[kind, name.as_str()])
                else {
                    return Reference::NotAReference;
                };

                // undeclared attributes of resources are computed by the provider
                let attributes = &self.blocks[resource.0].attributes;
                match path.get(2).and_then(|attribute| attributes.get(attribute.as_str())) {
                    Some(attribute) => Reference::new(self.resolve_attribute(*attribute, guard), 3),
                    None => Reference::Unknown,
                }
            }
        }
    }

    fn resolve_variable(
        &self,
        module: ModuleId,
        name: &Identifier,
        guard: &mut ResolutionGuard,
    ) -> Value {
        if let Some(call) = self.modules[module.0].call {
            if let Some(input) = self.blocks[call.0].attributes.get(name.as_str()) {
                return self.resolve_attribute(*input, guard);
            }
        } else if module == ModuleId::ROOT {
            if let Some(literal) = self.inputs.get(name.as_str()) {
                return Value::Known(literal.clone());
            }
        }

        let Some(variable) = self.find_block(module, "variable", &[name.as_str()]) else {
            tracing::trace!(variable=%name, "undeclared variable");
            return Value::Unknown;
        };

        match self.blocks[variable.0].attributes.get("default") {
            Some(default) => self.resolve_attribute(*default, guard),
            // supplied at apply time
            None => Value::Unknown,
        }
    }

    fn resolve_local(
        &self,
        module: ModuleId,
        name: &Identifier,
        guard: &mut ResolutionGuard,
    ) -> Value {
        let local = self.modules[module.0]
            .blocks
            .iter()
            .map(|id| &self.blocks[id.0])
            .filter(|block| block.kind == "locals")
            .find_map(|block| block.attributes.get(name.as_str()));

        match local {
            Some(local) => self.resolve_attribute(*local, guard),
            None => Value::Unknown,
        }
    }

    fn resolve_output(
        &self,
        module: ModuleId,
        call: &Identifier,
        output: &Identifier,
        guard: &mut ResolutionGuard,
    ) -> Value {
        let child = self.modules.iter().position(|candidate| {
            candidate.parent == Some(module) && candidate.name.as_deref() == Some(call.as_str())
        });

        let Some(child) = child else {
            tracing::trace!(module=%call, "module not loaded");
            return Value::Unknown;
        };

        let value = self
            .find_block(ModuleId(child), "output", &[output.as_str()])
            .and_then(|block| self.blocks[block.0].attributes.get("value"));

        match value {
            Some(value) => self.resolve_attribute(*value, guard),
            None => Value::Unknown,
        }
    }

    fn find_block(&self, module: ModuleId, kind: &str, labels: &[&str]) -> Option<BlockId> {
        self.modules[module.0].blocks.iter().copied().find(|id| {
            let block = &self.blocks[id.0];
            block.kind == kind && block.labels.iter().map(String::as_str).eq(labels.iter().copied())
        })
    }
}

/// State of one resolution: the attributes currently being resolved further up the stack and
/// the values already resolved on the way
#[derive(Debug, Default)]
pub(crate) struct ResolutionGuard {
    /// stack of attributes being resolved, each with the `cut` of its caller
    visiting: indexmap::IndexMap<AttributeId, Option<usize>>,
    resolved: HashMap<AttributeId, Value>,
    /// shallowest stack position a cycle was cut at within the innermost resolution
    cut: Option<usize>,
}

impl ResolutionGuard {
    /// `None` when `id` is already being resolved, the stack depth of `id` otherwise
    fn enter(&mut self, id: AttributeId) -> Option<usize> {
        if let Some(depth) = self.visiting.get_index_of(&id) {
            self.cut = Some(self.cut.map_or(depth, |cut| cut.min(depth)));
            return None;
        }

        let outer = self.cut.take();
        self.visiting.insert(id, outer);
        Some(self.visiting.len() - 1)
    }

    /// A value is only reused when no cycle was cut above `depth`, otherwise it depends on
    /// where the resolution started.
    fn leave(&mut self, id: AttributeId, depth: usize, value: &Value) {
        let outer = self.visiting.pop().and_then(|(_, outer)| outer);
        let above = self.cut.filter(|cut| *cut < depth);

        if above.is_none() {
            self.resolved.insert(id, value.clone());
        }

        self.cut = match (outer, above) {
            (Some(outer), Some(above)) => Some(outer.min(above)),
            (outer, above) => outer.or(above),
        };
    }
}

/// Outcome of resolving a traversal root
#[derive(Debug)]
pub(crate) enum Reference {
    /// not something the context knows about (for expression variables, ...)
    NotAReference,
    Unknown,
    /// `consumed` path elements are replaced by `literal`
    Resolved { literal: Literal, consumed: usize },
}

impl Reference {
    fn new(value: Value, consumed: usize) -> Self {
        match value {
            Value::Known(literal) => Reference::Resolved { literal, consumed },
            Value::Absent => Reference::Resolved {
                literal: Literal::Null,
                consumed,
            },
            Value::Unknown => Reference::Unknown,
        }
    }
}

fn required_label_count(kind: &str) -> usize {
    match kind {
        "resource" | "data" => 2,
        "variable" | "output" | "module" | "provider" => 1,
        _ => 0,
    }
}

#[derive(derive_new::new, Debug)]
pub struct ContextErrors {
    #[new(default)]
    issues: Vec<Issue>,
}

impl ContextErrors {
    pub fn log(&mut self, issue: Issue) {
        tracing::trace!(?issue, "issue found");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl std::error::Error for ContextErrors {}

impl std::fmt::Display for ContextErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.issues.as_slice() {
            [] => f.write_str("no issues"),
            [issue] => write!(f, "{issue}"),
            [issue, rest @ ..] => write!(f, "{issue} (and {} more)", rest.len()),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Issue {
    #[error("{range}: attribute '{name}' is not allowed outside of a block")]
    RootAttribute { name: String, range: SourceRange },
    #[error("{range}: '{kind}' block requires {expected} label(s)")]
    MissingLabels {
        kind: String,
        expected: usize,
        range: SourceRange,
    },
    #[error("{range}: attribute '{name}' is declared more than once")]
    DuplicateAttribute { name: String, range: SourceRange },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hcl_documents;
    use pretty_assertions::assert_eq;

    fn context_for(doc: HclDocuments) -> EvaluationContext {
        EvaluationContext::from_documents(doc).expect("must be a valid configuration")
    }

    fn value_of(context: &EvaluationContext, block: &str, attribute: &str) -> Value {
        context
            .blocks()
            .into_iter()
            .find(|candidate| candidate.full_name() == block)
            .expect("block must exist")
            .get_attribute(attribute)
            .value()
            .clone()
    }

    fn known(literal: impl Into<Literal>) -> Value {
        Value::Known(literal.into())
    }

    #[test]
    fn literals() {
        let context = context_for(hcl_documents! {r#"
        resource "a" "b" {
          string = "x"
          number = 42
          list   = [1, "two"]
          nulled = null
        }
        "#});

        assert_eq!(value_of(&context, "a.b", "string"), known("x"));
        assert_eq!(value_of(&context, "a.b", "number"), known(42i64));
        assert_eq!(
            value_of(&context, "a.b", "list"),
            known(Literal::Array(vec![Literal::Integer(1), "two".into()]))
        );
        assert_eq!(value_of(&context, "a.b", "nulled"), Value::Absent);
        assert_eq!(value_of(&context, "a.b", "missing"), Value::Absent);
    }

    #[test]
    fn variables() {
        let context = context_for(hcl_documents! {r#"
        variable "region" {
          default = "eu"
        }
        variable "supplied_later" {}
        resource "a" "b" {
          region = var.region
          later  = var.supplied_later
          nope   = var.undeclared
        }
        "#});

        assert_eq!(value_of(&context, "a.b", "region"), known("eu"));
        assert_eq!(value_of(&context, "a.b", "later"), Value::Unknown);
        assert_eq!(value_of(&context, "a.b", "nope"), Value::Unknown);
    }

    #[test]
    fn inputs_override_defaults() {
        let tree = ModuleTree::new(hcl_documents! {r#"
        variable "region" {
          default = "eu"
        }
        resource "a" "b" {
          region = var.region
        }
        "#});

        let mut inputs = indexmap::IndexMap::new();
        inputs.insert("region".to_owned(), Literal::from("us"));
        let context = EvaluationContext::with_inputs(&tree, inputs).unwrap();

        assert_eq!(value_of(&context, "a.b", "region"), known("us"));
    }

    #[test]
    fn locals_templates_and_indices() {
        let context = context_for(hcl_documents! {r#"
        locals {
          prefix = "app"
          ports  = [22, 80]
          twice  = "${local.prefix}${local.prefix}"
        }
        resource "a" "b" {
          name  = "${local.prefix}-bucket"
          port  = local.ports[1]
          twice = local.twice
          labels = [for port in local.ports : "port-${port}"]
        }
        "#});

        assert_eq!(value_of(&context, "a.b", "name"), known("app-bucket"));
        assert_eq!(value_of(&context, "a.b", "port"), known(80i64));
        assert_eq!(value_of(&context, "a.b", "twice"), known("appapp"));
        assert_eq!(
            value_of(&context, "a.b", "labels"),
            known(Literal::Array(vec!["port-22".into(), "port-80".into()]))
        );
    }

    #[test]
    fn conditionals() {
        let context = context_for(hcl_documents! {r#"
        variable "enabled" {
          default = true
        }
        resource "a" "b" {
          mode = var.enabled ? "on" : "off"
        }
        "#});

        assert_eq!(value_of(&context, "a.b", "mode"), known("on"));
    }

    #[test]
    fn resource_references() {
        let context = context_for(hcl_documents! {r#"
        resource "a" "b" {
          name = "declared"
        }
        resource "c" "d" {
          declared = a.b.name
          computed = a.b.id
          missing  = x.y.name
        }
        "#});

        assert_eq!(value_of(&context, "c.d", "declared"), known("declared"));
        assert_eq!(value_of(&context, "c.d", "computed"), Value::Unknown);
        assert_eq!(value_of(&context, "c.d", "missing"), Value::Unknown);
    }

    #[test]
    fn apply_time_values_are_unknown() {
        let context = context_for(hcl_documents! {r#"
        data "a" "b" {
          name = "static"
        }
        resource "a" "b" {
          from_data = data.a.b.name
          function  = upper("x")
          counted   = count.index
        }
        "#});

        assert_eq!(value_of(&context, "a.b", "from_data"), Value::Unknown);
        assert_eq!(value_of(&context, "a.b", "function"), Value::Unknown);
        assert_eq!(value_of(&context, "a.b", "counted"), Value::Unknown);
    }

    #[test]
    fn cycles_are_unknown() {
        let context = context_for(hcl_documents! {r#"
        locals {
          a    = local.b
          b    = local.a
          self = "${local.self}-x"
        }
        resource "a" "b" {
          cyclic = local.a
          own    = local.self
        }
        "#});

        assert_eq!(value_of(&context, "a.b", "cyclic"), Value::Unknown);
        assert_eq!(value_of(&context, "a.b", "own"), Value::Unknown);
        assert_eq!(value_of(&context, "locals", "a"), Value::Unknown);
    }

    #[test]
    fn resolution_is_memoized() {
        let context = context_for(hcl_documents! {r#"
        resource "a" "b" {
          name = "x"
        }
        "#});

        let block = context.blocks()[0];
        let first = block.get_attribute("name").value();
        let second = block.get_attribute("name").value();

        assert!(std::ptr::eq(first, second));
    }

    fn diamond(depth: usize) -> HclDocuments {
        let mut text = String::from("locals {\n  l0 = true\n");
        for i in 1..=depth {
            text.push_str(&format!("  l{i} = local.l{0} && local.l{0}\n", i - 1));
        }
        text.push_str(&format!("}}\nresource \"a\" \"b\" {{\n  flag = local.l{depth}\n}}\n"));
        HclDocuments::parse(&text).unwrap()
    }

    fn local_id(context: &EvaluationContext, name: &str) -> AttributeId {
        context
            .blocks
            .iter()
            .filter(|block| block.kind == "locals")
            .find_map(|block| block.attributes.get(name).copied())
            .expect("local must exist")
    }

    #[test]
    fn shared_references_resolve_once() {
        let context = context_for(diamond(64));

        // every reference doubles the work without reuse inside a single resolution
        assert_eq!(value_of(&context, "a.b", "flag"), known(true));

        let mut guard = ResolutionGuard::default();
        let top = local_id(&context, "l64");
        assert_eq!(context.resolve_attribute(top, &mut guard), known(true));
        assert_eq!(guard.resolved.len(), 65);
        assert!(guard.visiting.is_empty());
    }

    #[test]
    fn values_cut_by_a_cycle_are_not_reused() {
        let context = context_for(hcl_documents! {r#"
        locals {
          a     = local.b
          b     = local.a
          plain = "x"
          mixed = [local.a, local.plain]
        }
        "#});

        let mut guard = ResolutionGuard::default();
        let mixed = local_id(&context, "mixed");
        assert_eq!(context.resolve_attribute(mixed, &mut guard), Value::Unknown);

        // `b` was cut at `a`, `a` only at itself
        assert!(guard.resolved.contains_key(&local_id(&context, "a")));
        assert!(!guard.resolved.contains_key(&local_id(&context, "b")));
        assert!(guard.resolved.contains_key(&mixed));
        assert_eq!(guard.cut, None);
    }

    #[test]
    fn module_inputs_and_outputs() {
        let mut tree = ModuleTree::new(hcl_documents! {r#"
        variable "cidr" {
          default = "10.0.0.0/16"
        }
        module "network" {
          source = "./network"
          cidr   = var.cidr
        }
        resource "a" "b" {
          cidr    = module.network.cidr
          missing = module.storage.bucket
        }
        "#});
        tree.add_child(
            0,
            "network",
            hcl_documents! {r#"
            variable "cidr" {}
            resource "net" "work" {
              cidr = var.cidr
            }
            output "cidr" {
              value = net.work.cidr
            }
            "#},
        )
        .unwrap();

        let context = EvaluationContext::new(&tree).unwrap();

        assert_eq!(value_of(&context, "a.b", "cidr"), known("10.0.0.0/16"));
        assert_eq!(value_of(&context, "a.b", "missing"), Value::Unknown);
        assert_eq!(
            value_of(&context, "module.network.net.work", "cidr"),
            known("10.0.0.0/16")
        );
        assert_eq!(context.module_blocks(ModuleId(1)).len(), 3);
    }

    #[test]
    fn evaluate_in_context() {
        let context = context_for(hcl_documents! {r#"
        locals {
          name = "x"
        }
        "#});

        let expression: hcl_edit::expr::Expression = r#""${local.name}-y""#.parse().unwrap();
        assert_eq!(
            context.evaluate_in_context(&expression.into()),
            known("x-y")
        );
    }

    #[test]
    fn root_attribute_errors() {
        let errors = EvaluationContext::from_documents(hcl_documents! {"root_attr = 1"})
            .expect_err("must error");

        assert!(matches!(
            errors.issues(),
            [Issue::RootAttribute { name, .. }] if name == "root_attr"
        ));
    }

    #[test]
    fn missing_labels_error() {
        let errors =
            EvaluationContext::from_documents(hcl_documents! {r#"resource "only_type" {}"#})
                .expect_err("must error");

        assert!(matches!(
            errors.issues(),
            [Issue::MissingLabels { kind, expected: 2, .. }] if kind == "resource"
        ));
    }
}
