//! Module trees loaded from the fixture directories

use hclsec::context::{EvaluationContext, ModuleId};
use hclsec::modules::ModuleTree;
use hclsec::scanner::Scanner;
use hclsec::value::{Literal, Value};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/modules")
        .join(name)
}

fn module_names(tree: &ModuleTree) -> Vec<Option<&str>> {
    tree.modules()
        .iter()
        .map(|module| module.name.as_deref())
        .collect()
}

#[test]
fn follows_local_sources_only() {
    let tree = ModuleTree::load(&fixture("root")).unwrap();

    // the remote vpc module is not loaded, the looping module does not load itself again
    assert_eq!(
        module_names(&tree),
        vec![None, Some("assets"), Some("logs"), Some("loop")]
    );
    assert_eq!(tree.modules()[1].parent, Some(0));
    assert_eq!(tree.modules()[1].dir, tree.modules()[2].dir);
    assert_eq!(
        tree.modules()[3].dir.as_deref(),
        Some(fixture("root/modules/looping").canonicalize().unwrap().as_path())
    );
}

#[test]
fn directories_without_configuration_are_skipped() {
    let tree = ModuleTree::load(&fixture("empty_child")).unwrap();

    assert_eq!(module_names(&tree), vec![None]);
}

#[test]
fn values_cross_module_boundaries() {
    let tree = ModuleTree::load(&fixture("root")).unwrap();
    let context = EvaluationContext::new(&tree).unwrap();
    assert_eq!(context.module_count(), 4);

    let root_bucket = context
        .module_blocks(ModuleId::ROOT)
        .into_iter()
        .find(|block| block.full_name() == "google_storage_bucket.root")
        .unwrap();
    assert_eq!(
        root_bucket.get_attribute("name").value(),
        &Value::Known(Literal::from("acme-staging-assets"))
    );

    let loop_path = context.evaluate_in_context(&hcl::Expression::from(
        hcl::Traversal::builder(hcl::Variable::unchecked("module"))
            .attr("loop")
            .attr("path")
            .build(),
    ));
    let expected = fixture("root/modules/looping").canonicalize().unwrap();
    assert_eq!(loop_path.as_str(), Some(expected.display().to_string().as_str()));
}

#[test]
fn scan_reports_module_addresses() {
    let tree = ModuleTree::load(&fixture("root")).unwrap();
    let context = EvaluationContext::new(&tree).unwrap();
    let registry = hclsec::rules::registry().unwrap();

    let report = Scanner::new(&registry).scan(&context).unwrap();

    let findings: Vec<_> = report
        .findings
        .iter()
        .map(|finding| finding.description.as_str())
        .collect();

    insta::assert_debug_snapshot!(findings, @r###"
    [
        "Resource 'module.assets.google_storage_bucket.this' has uniform_bucket_level_access explicitly disabled.",
    ]
    "###);

    let range = &report.findings[0].range;
    assert!(range
        .path
        .as_deref()
        .unwrap()
        .ends_with("modules/bucket/main.tf"));
    assert_eq!(range.start.line, 10);
}
