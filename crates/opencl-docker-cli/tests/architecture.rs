use std::path::{Path, PathBuf};

use arch_lint::rules::{NoErrorSwallowing, NoSilentResultDrop};
use arch_lint::{Analyzer, Severity};

const CRATES: [&str; 3] = ["opencl-docker-core", "opencl-docker-build", "opencl-docker-cli"];

fn crates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates directory")
        .to_path_buf()
}

/// Library and binary sources must propagate errors: no swallowed `Err`
/// arms and no `let _ =` on a `Result`. Test code is out of scope.
#[test]
fn crate_sources_propagate_errors() {
    let mut reports = Vec::new();

    for name in CRATES {
        let src = crates_dir().join(name).join("src");
        assert!(src.is_dir(), "{} missing", src.display());

        let analyzer = Analyzer::builder()
            .root(src.as_path())
            .exclude("**/target/**")
            .rule(NoErrorSwallowing::new())
            .rule(NoSilentResultDrop::new())
            .build()
            .unwrap_or_else(|e| panic!("analyzer for {name}: {e:?}"));
        let result = analyzer
            .analyze()
            .unwrap_or_else(|e| panic!("analyze {name}: {e:?}"));

        if result.has_violations_at(Severity::Warning) {
            reports.push(format!(
                "── {name} ──\n{}",
                result.format_test_report(Severity::Warning)
            ));
        }
    }

    assert!(reports.is_empty(), "{}", reports.join("\n"));
}
