//! Rendering experiment results as text or JSON.

use serde::Serialize;

use bumpcheck_maven::{BuildStatus, CompilationDiagnostic};

use crate::error::EngineError;
use crate::experiment::ExperimentResult;

#[derive(Serialize)]
struct JsonReport<'a> {
    client: String,
    archive: String,
    sha256: &'a str,
    library: String,
    from: &'a str,
    to: &'a str,
    /// Coordinate whose `sources` classifier the build unpacks.
    sources_of: String,
    plugins_added: usize,
    exit_code: Option<i32>,
    diagnostics: &'a [CompilationDiagnostic],
}

/// One `path:line:column: message {key=value, ...}` line per diagnostic.
pub fn render_text(diagnostics: &[CompilationDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}

/// Pretty-printed JSON document describing the whole experiment.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_json(result: &ExperimentResult) -> Result<String, EngineError> {
    let report = JsonReport {
        client: result.client.to_string(),
        archive: result.archive.display().to_string(),
        sha256: &result.sha256,
        library: result.upgrade.library.to_string(),
        from: &result.upgrade.from,
        to: &result.upgrade.to,
        sources_of: result.mutation.sources_of.to_string(),
        plugins_added: result.mutation.plugins_added,
        exit_code: result.status.exit_code,
        diagnostics: &result.diagnostics,
    };
    to_pretty_json(&report)
}

/// Pretty-printed JSON array of diagnostics.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_diagnostics_json(diagnostics: &[CompilationDiagnostic]) -> Result<String, EngineError> {
    to_pretty_json(&diagnostics)
}

/// Human summary, e.g. `2 compilation error(s), mvn exited with code 1`.
pub fn summary(diagnostics: &[CompilationDiagnostic], status: Option<&BuildStatus>) -> String {
    let count = diagnostics.len();
    match status.map(|s| (s.success, s.exit_code)) {
        None => format!("{count} compilation error(s)"),
        Some((true, _)) => format!("{count} compilation error(s), mvn succeeded"),
        Some((false, Some(code))) => {
            format!("{count} compilation error(s), mvn exited with code {code}")
        }
        Some((false, None)) => format!("{count} compilation error(s), mvn was terminated by a signal"),
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, EngineError> {
    serde_json::to_string_pretty(value).map_err(|e| EngineError::Report {
        message: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use bumpcheck_pom::{DependencyUpdate, MutationReport, Upgrade};
    use bumpcheck_util::maven::{ArtifactKey, MavenCoordinate};
    use indexmap::IndexMap;

    use super::*;
    use crate::client::ClientRef;

    fn diagnostic(path: &str, line: u32, params: &[(&str, &str)]) -> CompilationDiagnostic {
        CompilationDiagnostic {
            source_path: path.to_owned(),
            line,
            column: 5,
            message: "cannot find symbol".to_owned(),
            parameters: params
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    fn result(diagnostics: Vec<CompilationDiagnostic>) -> ExperimentResult {
        let client = MavenCoordinate::new("maracas-data", "comp-changes-client", "0.0.1");
        ExperimentResult {
            client: ClientRef::Remote(client.clone()),
            archive: PathBuf::from(
                "local-repo/maracas-data/comp-changes-client/0.0.1/comp-changes-client-0.0.1.jar",
            ),
            sha256: "ab".repeat(32),
            upgrade: Upgrade {
                library: ArtifactKey::new("maracas-data", "comp-changes"),
                from: "0.0.1".to_owned(),
                to: "0.0.2".to_owned(),
            },
            work_dir: PathBuf::from("comp-changes-client-0.0.1"),
            descriptor: PathBuf::from("comp-changes-client-0.0.1/pom.xml"),
            mutation: MutationReport {
                dependency: DependencyUpdate::Updated {
                    previous: Some("0.0.1".to_owned()),
                },
                sources_of: client,
                plugins_added: 2,
            },
            status: BuildStatus {
                success: false,
                exit_code: Some(1),
            },
            diagnostics,
            duration: Duration::from_secs(3),
        }
    }

    #[test]
    fn text_one_line_per_diagnostic() {
        let text = render_text(&[
            diagnostic("/src/Foo.java", 10, &[("symbol", "class Bar"), ("location", "class Foo")]),
            diagnostic("/src/Baz.java", 3, &[]),
        ]);
        assert_eq!(
            text,
            "/src/Foo.java:10:5: cannot find symbol {symbol=class Bar, location=class Foo}\n\
             /src/Baz.java:3:5: cannot find symbol {}\n"
        );
    }

    #[test]
    fn text_empty_for_no_diagnostics() {
        assert_eq!(render_text(&[]), "");
    }

    #[test]
    fn json_report_shape() {
        let json = render_json(&result(vec![diagnostic(
            "/src/Foo.java",
            10,
            &[("symbol", "class Bar")],
        )]))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["client"], "maracas-data:comp-changes-client:0.0.1");
        assert_eq!(
            value["archive"],
            "local-repo/maracas-data/comp-changes-client/0.0.1/comp-changes-client-0.0.1.jar"
        );
        assert_eq!(value["sha256"], "ab".repeat(32));
        assert_eq!(value["sources_of"], "maracas-data:comp-changes-client:0.0.1");
        assert_eq!(value["plugins_added"], 2);
        assert_eq!(value["library"], "maracas-data:comp-changes");
        assert_eq!(value["from"], "0.0.1");
        assert_eq!(value["to"], "0.0.2");
        assert_eq!(value["exit_code"], 1);
        assert_eq!(value["diagnostics"][0]["source_path"], "/src/Foo.java");
        assert_eq!(value["diagnostics"][0]["column"], 5);
        assert_eq!(value["diagnostics"][0]["parameters"]["symbol"], "class Bar");
    }

    #[test]
    fn json_diagnostics_array() {
        let json = render_diagnostics_json(&[]).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn summary_variants() {
        let diagnostics = vec![diagnostic("/a", 1, &[]), diagnostic("/b", 2, &[])];
        assert_eq!(summary(&diagnostics, None), "2 compilation error(s)");
        assert_eq!(
            summary(
                &diagnostics,
                Some(&BuildStatus {
                    success: false,
                    exit_code: Some(1)
                })
            ),
            "2 compilation error(s), mvn exited with code 1"
        );
        assert_eq!(
            summary(
                &[],
                Some(&BuildStatus {
                    success: true,
                    exit_code: Some(0)
                })
            ),
            "0 compilation error(s), mvn succeeded"
        );
    }
}
