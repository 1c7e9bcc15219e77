//! Scan pipeline tests: lock file in, rendered report out

mod helper;

use std::sync::Arc;

use mockito::Server;

use deps_scanner::config::ScanConfig;
use deps_scanner::parser::{load_direct_dependencies, load_lock_file};
use deps_scanner::report::{ReportFormat, render};
use deps_scanner::scan::{DependencyClassification, ScanOutcome, ScanReport, Scanner};
use deps_scanner::version::error::{ClientError, ErrorKind};
use deps_scanner::version::registries::PypiIndexClient;

use helper::{StubIndexClient, write_temp_file};

const LOCK_FILE: &str = r#"
[[package]]
name = "flask"
version = "2.0.0"

[[package]]
name = "click"
version = "8.1.7"

[[package]]
name = "broken"
version = "1.0.0"

[[package]]
name = "forked"
version = "0.3.0"

[package.source]
type = "git"
url = "https://github.com/example/forked.git"
reference = "main"
resolved_reference = "0123456789abcdef"

[metadata]
lock-version = "2.0"
python-versions = "^3.11"
content-hash = "abc"
"#;

const PYPROJECT: &str = r#"
[tool.poetry]
name = "service"
version = "0.1.0"

[tool.poetry.dependencies]
python = "^3.11"
Flask = "^2.0"
forked = { git = "https://github.com/example/forked.git" }
"#;

fn config() -> ScanConfig {
    ScanConfig {
        max_concurrency: 4,
        ..ScanConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_reports_each_package_against_index_over_http() {
    let mut server = Server::new_async().await;
    let flask = server
        .mock("GET", "/pypi/flask/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"info": {"version": "3.0.3"}, "releases": {"2.0.0": [{}], "3.0.3": [{}], "3.1.0rc1": [{}], "3.2.0": []}}"#)
        .create_async()
        .await;
    let click = server
        .mock("GET", "/pypi/click/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"info": {"version": "8.1.7"}, "releases": {"8.1.6": [{}], "8.1.7": [{}]}}"#)
        .create_async()
        .await;
    let broken = server
        .mock("GET", "/pypi/broken/json")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>maintenance</body></html>")
        .create_async()
        .await;
    let forked = server
        .mock("GET", "/pypi/forked/json")
        .expect(0)
        .create_async()
        .await;

    let lock_file = write_temp_file(LOCK_FILE);
    let manifest = write_temp_file(PYPROJECT);
    let packages = load_lock_file(lock_file.path()).unwrap();
    let direct = load_direct_dependencies(manifest.path()).unwrap();

    let config = ScanConfig {
        public_index_url: format!("{}/pypi/", server.url()),
        ..config()
    };
    let client = PypiIndexClient::new(config.fetch_timeout).unwrap();
    let scanner = Scanner::new(Arc::new(client), &config);

    let entries = scanner.scan_all(packages, direct.as_ref()).await;

    flask.assert_async().await;
    click.assert_async().await;
    broken.assert_async().await;
    forked.assert_async().await;

    let summary: Vec<_> = entries
        .iter()
        .map(|e| (e.package.name.as_str(), e.classification))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("flask", DependencyClassification::Direct),
            ("forked", DependencyClassification::Direct),
            ("broken", DependencyClassification::Transitive),
            ("click", DependencyClassification::Transitive),
        ]
    );

    assert_eq!(
        entries[0].outcome,
        ScanOutcome::Outdated {
            current_version: "2.0.0".to_string(),
            latest_version: "3.0.3".to_string(),
            origin_label: "public".to_string(),
        }
    );
    assert_eq!(
        entries[1].outcome,
        ScanOutcome::Incomparable {
            reason: "Couldn't compare versions.".to_string()
        }
    );
    assert_eq!(entries[1].origin_label.as_deref(), Some("github.com"));
    assert!(matches!(
        entries[2].outcome,
        ScanOutcome::Errored {
            kind: ErrorKind::UnsupportedFormat,
            ..
        }
    ));
    assert_eq!(entries[3].outcome, ScanOutcome::UpToDate);
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_isolates_panicking_and_failing_checks() {
    let client = StubIndexClient::new()
        .with_versions("attrs", vec!["23.1.0", "23.2.0"])
        .with_versions("idna", vec!["3.7"])
        .with_error("certifi", ClientError::Timeout("deadline elapsed".to_string()))
        .panicking_on("zipp");
    let scanner = Scanner::new(Arc::new(client), &config());

    let packages = load_lock_file(
        write_temp_file(
            r#"
[[package]]
name = "zipp"
version = "3.18.0"

[[package]]
name = "attrs"
version = "23.1.0"

[[package]]
name = "certifi"
version = "2024.2.2"

[[package]]
name = "idna"
version = "3.7"
"#,
        )
        .path(),
    )
    .unwrap();

    let entries = scanner.scan_all(packages, None).await;

    let outcomes: Vec<_> = entries
        .iter()
        .map(|e| (e.package.name.as_str(), e.classification, &e.outcome))
        .collect();

    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].0, "attrs");
    assert_eq!(outcomes[0].1, DependencyClassification::Unknown);
    assert!(matches!(outcomes[0].2, ScanOutcome::Outdated { .. }));
    assert_eq!(outcomes[1].0, "certifi");
    assert!(matches!(
        outcomes[1].2,
        ScanOutcome::Errored {
            kind: ErrorKind::Timeout,
            ..
        }
    ));
    assert_eq!(outcomes[2], ("idna", DependencyClassification::Unknown, &ScanOutcome::UpToDate));
    assert_eq!(outcomes[3].0, "zipp");
    assert!(matches!(
        outcomes[3].2,
        ScanOutcome::Errored {
            kind: ErrorKind::TaskFailed,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_renders_identically_across_runs() {
    let client = Arc::new(
        StubIndexClient::new()
            .with_versions("flask", vec!["2.0.0", "3.0.3"])
            .with_versions("click", vec!["8.1.6", "8.1.7", "9.0.0.dev1"])
            .with_versions("broken", vec!["1.0.0"]),
    );
    let scanner = Scanner::new(client, &config());
    let lock_file = write_temp_file(LOCK_FILE);
    let direct = load_direct_dependencies(write_temp_file(PYPROJECT).path()).unwrap();

    let first = scanner
        .scan(load_lock_file(lock_file.path()).unwrap(), direct.as_ref())
        .await;
    let second = scanner
        .scan(load_lock_file(lock_file.path()).unwrap(), direct.as_ref())
        .await;

    assert_eq!(first, second);
    assert_eq!(
        render(&first, ReportFormat::Table),
        render(&second, ReportFormat::Table)
    );
    assert_eq!(
        render(&first, ReportFormat::Text),
        "direct public flask: current=2.0.0 -> latest=3.0.3\n\
         direct github.com forked: Couldn't compare versions."
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_with_everything_current_prints_up_to_date() {
    let client = StubIndexClient::new()
        .with_versions("requests", vec!["2.31.0", "2.32.0a1"])
        .with_versions("urllib3", vec!["2.2.1"]);
    let scanner = Scanner::new(Arc::new(client), &config());
    let lock_file = write_temp_file(
        r#"
[[package]]
name = "requests"
version = "2.31.0"

[[package]]
name = "urllib3"
version = "2.2.1"
"#,
    );

    let report = scanner
        .scan(load_lock_file(lock_file.path()).unwrap(), None)
        .await;

    assert_eq!(report, ScanReport::NothingToReport);
    assert_eq!(render(&report, ReportFormat::Table), "Everything up to date.");
}

#[tokio::test]
async fn scan_of_lock_file_without_packages_has_nothing_to_report() {
    let scanner = Scanner::new(Arc::new(StubIndexClient::new()), &config());
    let lock_file = write_temp_file("[metadata]\nlock-version = \"2.0\"\n");

    let report = scanner
        .scan(load_lock_file(lock_file.path()).unwrap(), None)
        .await;

    assert_eq!(report, ScanReport::NothingToReport);
}
