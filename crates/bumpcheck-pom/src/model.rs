//! The build descriptor model: typed views over a POM's element tree.

use std::path::Path;

use bumpcheck_util::maven::{ArtifactKey, MavenCoordinate};

use crate::error::PomError;
use crate::xml::{Element, XmlDocument};

/// Canonical file name of a Maven build descriptor.
pub const DESCRIPTOR_FILE: &str = "pom.xml";

/// Group applied by Maven to plugins declared without one.
const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// A `<dependency>` entry of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    /// Absent when the version is managed elsewhere (e.g. a parent's dependencyManagement).
    pub version: Option<String>,
}

impl Dependency {
    fn from_element(element: &Element) -> Self {
        Self {
            group_id: element.child_text("groupId").unwrap_or_default(),
            artifact_id: element.child_text("artifactId").unwrap_or_default(),
            version: element.child_text("version"),
        }
    }

    fn matches(element: &Element, key: &ArtifactKey) -> bool {
        element.child_text("groupId").as_deref() == Some(key.group_id.as_str())
            && element.child_text("artifactId").as_deref() == Some(key.artifact_id.as_str())
    }
}

/// Outcome of a dependency version rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyUpdate {
    /// The first matching dependency was rewritten; `previous` is its old version.
    Updated { previous: Option<String> },
    /// No dependency matched; nothing was changed.
    NotFound,
}

/// A single `<execution>` of a build plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginExecution {
    pub id: Option<String>,
    pub phase: Option<String>,
    pub goals: Vec<String>,
    /// Opaque `<configuration>` payload.
    pub configuration: Option<Element>,
}

impl PluginExecution {
    fn to_element(&self) -> Element {
        let mut element = Element::new("execution");
        if let Some(id) = &self.id {
            element.push(Element::with_text("id", id));
        }
        if let Some(phase) = &self.phase {
            element.push(Element::with_text("phase", phase));
        }
        if !self.goals.is_empty() {
            let mut goals = Element::new("goals");
            for goal in &self.goals {
                goals.push(Element::with_text("goal", goal));
            }
            element.push(goals);
        }
        if let Some(configuration) = &self.configuration {
            element.push(configuration.clone());
        }
        element
    }

    fn from_element(element: &Element) -> Self {
        Self {
            id: element.child_text("id"),
            phase: element.child_text("phase"),
            goals: element
                .child("goals")
                .map(|goals| {
                    goals
                        .children_named("goal")
                        .map(Element::text)
                        .filter(|g| !g.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            configuration: element.child("configuration").cloned(),
        }
    }
}

/// A `<plugin>` declaration under `<build><plugins>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub executions: Vec<PluginExecution>,
}

impl Plugin {
    pub(crate) fn to_element(&self) -> Element {
        let mut element = Element::new("plugin")
            .with_child(Element::with_text("groupId", &self.group_id))
            .with_child(Element::with_text("artifactId", &self.artifact_id));
        if let Some(version) = &self.version {
            element.push(Element::with_text("version", version));
        }
        if !self.executions.is_empty() {
            let mut executions = Element::new("executions");
            for execution in &self.executions {
                executions.push(execution.to_element());
            }
            element.push(executions);
        }
        element
    }

    fn from_element(element: &Element) -> Self {
        Self {
            group_id: element
                .child_text("groupId")
                .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_owned()),
            artifact_id: element.child_text("artifactId").unwrap_or_default(),
            version: element.child_text("version"),
            executions: element
                .child("executions")
                .map(|executions| {
                    executions
                        .children_named("execution")
                        .map(PluginExecution::from_element)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// An in-memory Maven POM.
///
/// Only the parts bumpcheck touches are typed; everything else in the document
/// is carried through the element tree untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pom {
    origin: String,
    document: XmlDocument,
}

impl Pom {
    /// Parse POM text. `origin` names the source in error messages.
    ///
    /// # Errors
    /// Returns an error if the text is not well-formed XML or its root is not `<project>`.
    pub fn parse(xml: &str, origin: &str) -> Result<Self, PomError> {
        let document = XmlDocument::parse(xml).map_err(|e| PomError::Parse {
            path: origin.to_owned(),
            message: e.to_string(),
        })?;
        if document.root.name != "project" {
            return Err(PomError::NotAProject {
                path: origin.to_owned(),
                root: document.root.name,
            });
        }
        Ok(Self {
            origin: origin.to_owned(),
            document,
        })
    }

    /// Read and parse a POM file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid POM.
    pub fn from_path(path: &Path) -> Result<Self, PomError> {
        let content = std::fs::read_to_string(path).map_err(|source| PomError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Serialize the whole model to `path`, replacing its previous content.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), PomError> {
        std::fs::write(path, self.to_xml_string()).map_err(|source| PomError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn to_xml_string(&self) -> String {
        self.document.to_xml_string()
    }

    /// Where this model was read from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn project(&self) -> &Element {
        &self.document.root
    }

    /// The project's own coordinate, inheriting `groupId` and `version` from
    /// `<parent>` when the project omits them.
    ///
    /// # Errors
    /// Returns `PomError::MissingCoordinate` naming the first field that cannot be resolved.
    pub fn coordinate(&self) -> Result<MavenCoordinate, PomError> {
        let project = self.project();
        let parent = project.child("parent");
        let inherited = |field: &str| {
            project
                .child_text(field)
                .or_else(|| parent.and_then(|p| p.child_text(field)))
        };

        let missing = |field: &'static str| PomError::MissingCoordinate {
            path: self.origin.clone(),
            field,
        };
        let group_id = inherited("groupId").ok_or_else(|| missing("groupId"))?;
        let artifact_id = project
            .child_text("artifactId")
            .ok_or_else(|| missing("artifactId"))?;
        let version = inherited("version").ok_or_else(|| missing("version"))?;

        Ok(MavenCoordinate::new(&group_id, &artifact_id, &version))
    }

    /// The project's direct dependencies in declaration order.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.project()
            .child("dependencies")
            .map(|deps| {
                deps.children_named("dependency")
                    .map(Dependency::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rewrite the version of the first dependency matching `key`.
    ///
    /// Scanning stops at the first match; later duplicates are left alone.
    pub fn update_dependency_version(&mut self, key: &ArtifactKey, version: &str) -> DependencyUpdate {
        let matched = self
            .document
            .root
            .child_mut("dependencies")
            .and_then(|deps| {
                deps.children_named_mut("dependency")
                    .find(|d| Dependency::matches(d, key))
            });

        match matched {
            Some(dependency) => {
                let previous = dependency.child_text("version");
                dependency.edit_child("version", |v| v.set_text(version));
                DependencyUpdate::Updated { previous }
            }
            None => DependencyUpdate::NotFound,
        }
    }

    /// Declared build plugins in order.
    pub fn plugins(&self) -> Vec<Plugin> {
        self.project()
            .child("build")
            .and_then(|build| build.child("plugins"))
            .map(|plugins| {
                plugins
                    .children_named("plugin")
                    .map(Plugin::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append a plugin declaration to `<build><plugins>`, creating both as needed.
    ///
    /// No attempt is made to merge with an existing declaration of the same plugin.
    pub fn add_plugin(&mut self, plugin: &Plugin) {
        self.document.root.edit_child("build", |build| {
            build.edit_child("plugins", |plugins| plugins.push(plugin.to_element()));
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CLIENT_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>maracas-data</groupId>
  <artifactId>comp-changes-client</artifactId>
  <version>0.0.1</version>
  <dependencies>
    <dependency>
      <groupId>maracas-data</groupId>
      <artifactId>comp-changes</artifactId>
      <version>0.0.1</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#;

    fn client() -> Pom {
        Pom::parse(CLIENT_POM, "pom.xml").unwrap()
    }

    #[test]
    fn parse_rejects_non_project_root() {
        let err = Pom::parse("<settings/>", "settings.xml").unwrap_err().to_string();
        assert!(err.contains("not a Maven POM"), "error was: {err}");
        assert!(err.contains("<settings>"), "error was: {err}");
    }

    #[test]
    fn parse_reports_origin_on_malformed_xml() {
        let err = Pom::parse("<project>", "client/pom.xml")
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot parse client/pom.xml"), "error was: {err}");
    }

    #[test]
    fn dependencies_in_order() {
        let deps = client().dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps.first().unwrap().artifact_id, "comp-changes");
        assert_eq!(deps.first().unwrap().version.as_deref(), Some("0.0.1"));
        assert_eq!(deps.get(1).unwrap().version, None);
    }

    #[test]
    fn coordinate_from_project() {
        let coord = client().coordinate().unwrap();
        assert_eq!(coord.to_string(), "maracas-data:comp-changes-client:0.0.1");
    }

    #[test]
    fn coordinate_inherits_from_parent() {
        let pom = Pom::parse(
            "<project><parent><groupId>org.acme</groupId><artifactId>acme-parent</artifactId><version>7</version></parent><artifactId>widget</artifactId></project>",
            "pom.xml",
        )
        .unwrap();
        assert_eq!(pom.coordinate().unwrap().to_string(), "org.acme:widget:7");
    }

    #[test]
    fn coordinate_missing_version_errors() {
        let pom = Pom::parse(
            "<project><groupId>g</groupId><artifactId>a</artifactId></project>",
            "pom.xml",
        )
        .unwrap();
        let err = pom.coordinate().unwrap_err().to_string();
        assert!(err.contains("version"), "error was: {err}");
    }

    #[test]
    fn update_dependency_version_first_match_wins() {
        let mut pom = Pom::parse(
            "<project><dependencies>\
             <dependency><groupId>g</groupId><artifactId>a</artifactId><version>1</version></dependency>\
             <dependency><groupId>g</groupId><artifactId>a</artifactId><version>1</version></dependency>\
             </dependencies></project>",
            "pom.xml",
        )
        .unwrap();

        let outcome = pom.update_dependency_version(&ArtifactKey::new("g", "a"), "2");

        assert_eq!(
            outcome,
            DependencyUpdate::Updated {
                previous: Some("1".to_owned())
            }
        );
        let versions: Vec<_> = pom.dependencies().into_iter().map(|d| d.version).collect();
        assert_eq!(versions, vec![Some("2".to_owned()), Some("1".to_owned())]);
    }

    #[test]
    fn update_dependency_version_adds_missing_version_element() {
        let mut pom = client();
        let outcome = pom.update_dependency_version(&ArtifactKey::new("junit", "junit"), "4.13.2");
        assert_eq!(outcome, DependencyUpdate::Updated { previous: None });
        assert_eq!(
            pom.dependencies().get(1).unwrap().version.as_deref(),
            Some("4.13.2")
        );
    }

    #[test]
    fn update_dependency_version_not_found_changes_nothing() {
        let mut pom = client();
        let before = pom.clone();
        let outcome = pom.update_dependency_version(&ArtifactKey::new("com.google.guava", "guava"), "18.0");
        assert_eq!(outcome, DependencyUpdate::NotFound);
        assert_eq!(pom, before);
    }

    #[test]
    fn update_dependency_version_without_dependencies_section() {
        let mut pom = Pom::parse("<project/>", "pom.xml").unwrap();
        let outcome = pom.update_dependency_version(&ArtifactKey::new("g", "a"), "2");
        assert_eq!(outcome, DependencyUpdate::NotFound);
    }

    #[test]
    fn add_plugin_creates_build_and_plugins() {
        let mut pom = client();
        assert!(!pom.to_xml_string().contains("<build>"));

        let plugin = Plugin {
            group_id: "org.codehaus.mojo".to_owned(),
            artifact_id: "build-helper-maven-plugin".to_owned(),
            version: Some("3.0.0".to_owned()),
            executions: vec![PluginExecution {
                id: Some("add-source".to_owned()),
                phase: Some("generate-sources".to_owned()),
                goals: vec!["add-source".to_owned()],
                configuration: Some(Element::new("configuration")),
            }],
        };
        pom.add_plugin(&plugin);
        pom.add_plugin(&plugin);

        let xml = pom.to_xml_string();
        assert_eq!(xml.matches("<build>").count(), 1);
        assert_eq!(xml.matches("<plugins>").count(), 1);
        assert_eq!(pom.plugins(), vec![plugin.clone(), plugin]);
    }

    #[test]
    fn plugin_group_defaults_when_omitted() {
        let pom = Pom::parse(
            "<project><build><plugins><plugin><artifactId>maven-compiler-plugin</artifactId></plugin></plugins></build></project>",
            "pom.xml",
        )
        .unwrap();
        let plugins = pom.plugins();
        assert_eq!(plugins.first().unwrap().group_id, "org.apache.maven.plugins");
        assert!(plugins.first().unwrap().executions.is_empty());
    }

    #[test]
    fn write_to_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTOR_FILE);
        let mut pom = client();
        pom.update_dependency_version(&ArtifactKey::new("maracas-data", "comp-changes"), "0.0.2");
        pom.write_to(&path).unwrap();

        let reread = Pom::from_path(&path).unwrap();
        assert_eq!(
            reread.dependencies().first().unwrap().version.as_deref(),
            Some("0.0.2")
        );
        assert_eq!(reread.origin(), path.display().to_string());
    }

    #[test]
    fn from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Pom::from_path(&dir.path().join(DESCRIPTOR_FILE))
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot access"), "error was: {err}");
    }
}
