//! Plugin declarations injected into a client's POM so that `mvn compile`
//! rebuilds the client from its published sources.
//!
//! The dependency plugin unpacks the client's own `sources` artifact during
//! `process-sources`; the build-helper plugin registers the unpacked tree as an
//! extra source root during `generate-sources`.

use bumpcheck_util::maven::MavenCoordinate;

use crate::model::{Plugin, PluginExecution};
use crate::xml::Element;

/// Build-relative directory the client sources are unpacked into.
pub const EXTRACTED_SOURCES_DIR: &str = "${project.build.directory}/extracted-sources";

const UNPACK_GROUP: &str = "org.apache.maven.plugins";
const UNPACK_ARTIFACT: &str = "maven-dependency-plugin";
const UNPACK_VERSION: &str = "3.1.1";

const SOURCE_ROOT_GROUP: &str = "org.codehaus.mojo";
const SOURCE_ROOT_ARTIFACT: &str = "build-helper-maven-plugin";
const SOURCE_ROOT_VERSION: &str = "3.0.0";

/// `maven-dependency-plugin` execution unpacking `client`'s sources classifier
/// into [`EXTRACTED_SOURCES_DIR`].
pub fn dependency_unpack_plugin(client: &MavenCoordinate) -> Plugin {
    let artifact_item = Element::new("artifactItem")
        .with_child(Element::with_text("groupId", &client.group_id))
        .with_child(Element::with_text("artifactId", &client.artifact_id))
        .with_child(Element::with_text("version", &client.version))
        .with_child(Element::with_text("classifier", "sources"))
        .with_child(Element::with_text("overWrite", "true"))
        .with_child(Element::with_text("outputDirectory", EXTRACTED_SOURCES_DIR));

    let configuration = Element::new("configuration")
        .with_child(Element::new("artifactItems").with_child(artifact_item));

    Plugin {
        group_id: UNPACK_GROUP.to_owned(),
        artifact_id: UNPACK_ARTIFACT.to_owned(),
        version: Some(UNPACK_VERSION.to_owned()),
        executions: vec![PluginExecution {
            id: Some("unpack".to_owned()),
            phase: Some("process-sources".to_owned()),
            goals: vec!["unpack".to_owned()],
            configuration: Some(configuration),
        }],
    }
}

/// `build-helper-maven-plugin` execution adding [`EXTRACTED_SOURCES_DIR`] as a source root.
pub fn source_root_plugin() -> Plugin {
    let configuration = Element::new("configuration").with_child(
        Element::new("sources").with_child(Element::with_text("source", EXTRACTED_SOURCES_DIR)),
    );

    Plugin {
        group_id: SOURCE_ROOT_GROUP.to_owned(),
        artifact_id: SOURCE_ROOT_ARTIFACT.to_owned(),
        version: Some(SOURCE_ROOT_VERSION.to_owned()),
        executions: vec![PluginExecution {
            id: Some("add-source".to_owned()),
            phase: Some("generate-sources".to_owned()),
            goals: vec!["add-source".to_owned()],
            configuration: Some(configuration),
        }],
    }
}
