//! # hclsec - static security checks for terraform style hcl
//!
//! For CLI usage see the README.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hclsec` works internally.
//!
//! ### HCL Terms
//!
//! Quick introduction to terms used to describe elements of HCL documents.
//!
//! In hcl terms...
//! - a file gets parsed as a `body`
//! - ...which is just a list of `structures`
//! - ...where there are two kinds:
//!   - `attribute`: a "key = value" pair
//!   - or `block`:
//!     - 1 `identifier` (we call it the block `kind`)
//!     - followed by 0 or more `labels`
//!     - and a `body` enclosed in `{` and `}`
//!
//! ```hcl
//! resource "google_storage_bucket" "assets" {
//!   name                        = "${var.prefix}-assets"
//!   uniform_bucket_level_access = false
//!
//!   website {
//!     main_page_suffix = "index.html"
//!   }
//! }
//! ```
//!
//! Here `resource` is the kind, `google_storage_bucket` and `assets` are labels and `website` is a
//! nested block.
//!
//! ### Loading files
//!
//! Every `.tf` file of a directory is parsed as a `body` ([hcl_edit::structure::Body]) and stored
//! in [hcl_documents::HclDocuments] together with its path, so findings can point back to a file
//! and line. [modules::ModuleTree] loads the root directory and follows every `module` block with
//! a local `source` (`./...`, `../...`). Remote modules are not fetched.
//!
//! ### Evaluation context
//!
//! see [context::EvaluationContext::new]
//!
//! All blocks and attributes of all modules are copied into flat arenas. Rules never see the
//! parser types, they get [block::Block] and [block::Attribute] handles. A handle may be nil, and
//! lookups on nil handles return nil handles again:
//!
//! ```text
//! block.get_block("spec").get_block("ingress").get_attribute("cidr")  // never fails
//! ```
//!
//! ### Resolution
//!
//! An attribute's expression is only resolved when a rule asks for its value. Resolution works in
//! two steps.
//!
//! First we walk the expression tree and find all [hcl::expr::Traversal]s (`var.a`, `local.b[0]`,
//! `module.c.out`, `aws_s3_bucket.d.name`, ...) and replace each with the literal it resolves to.
//! Resolving a reference means resolving another attribute, so this recurses. A set of attributes
//! currently being resolved breaks reference cycles.
//!
//! Then the rewritten expression is handed to [hcl::eval] without any variables or functions.
//! Whatever still fails to evaluate depends on something we can't know before apply time.
//!
//! The outcome is a [value::Value]:
//!
//! | **expression**              | **value**                   |
//! |-----------------------------|-----------------------------|
//! | `"${local.prefix}-assets"`  | `Known("app-assets")`       |
//! | `data.x.y.id`               | `Unknown`                   |
//! | `lower("X")`                | `Unknown`                   |
//! | `null` or not declared      | `Absent`                    |
//!
//! Values are memoized per attribute.
//!
//! ### Rules and scanning
//!
//! A [rule::Rule] names the block kinds and leading labels it applies to and carries a check
//! function. Rules are collected in a [registry::RegistryBuilder] at start up and frozen into a
//! [registry::Registry]. The [scanner::Scanner] pairs every top level block with every matching
//! rule, runs the pairs in parallel and merges the [result::Finding]s in a fixed order. A check
//! that panics is reported as a [scanner::RuleFault] without affecting any other pair.
//!
pub mod block;
pub mod cidr;
pub mod context;
pub mod hcl_documents;
pub mod modules;
pub mod range;
pub mod registry;
pub mod result;
pub mod rule;
pub mod rules;
pub mod scanner;
mod util;
pub mod value;
mod visit;
