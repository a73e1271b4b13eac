//! Fixture sweep
//!
//! Loads each *.tf file in /tests/fixtures/ individually, scans it with the built-in rules and
//! checks that no rule fails and that the outcome does not depend on how the scan is scheduled.

use hclsec::context::EvaluationContext;
use hclsec::hcl_documents::HclDocuments;
use hclsec::scanner::{ScanOptions, Scanner};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

#[test]
fn fixtures_scan_cleanly() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLSEC_LOG"))
        .with_test_writer()
        .try_init();

    let registry = hclsec::rules::registry().unwrap();
    let mut counts = BTreeMap::new();

    insta::glob!("fixtures/*.tf", |path| {
        let mut documents = HclDocuments::default();
        documents.load_file(path).unwrap();
        let context = EvaluationContext::from_documents(documents).expect("valid configuration");

        let parallel = Scanner::new(&registry).scan(&context).unwrap();
        let sequential = Scanner::new(&registry)
            .with_options(ScanOptions {
                parallelism: NonZeroUsize::new(1),
                ..Default::default()
            })
            .scan(&context)
            .unwrap();

        assert!(parallel.faults.is_empty(), "{:?}", parallel.faults);
        assert_eq!(parallel, sequential);

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        counts.insert(name, parallel.findings.len());
    });

    insta::assert_debug_snapshot!(counts, @r###"
    {
        "network_policy.tf": 2,
        "security_group.tf": 1,
        "storage.tf": 2,
        "unresolvable.tf": 0,
    }
    "###);
}
