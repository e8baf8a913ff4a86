//! Snapshot construction
//!
//! A rebuild materializes the whole bean hierarchy into a fresh root
//! directory. Failures are scoped: one bean failing to introspect gets an
//! `error` file inside its own directory; the bean enumeration itself
//! failing gets a root-level `error` file. Either way a servable snapshot
//! comes out.

use std::sync::Arc;

use connector::{Bean, Connector};
use tracing::{debug, error, warn};

use super::cache::{CacheControl, RescanFile};
use crate::node::{build_operation_dir, AttributeFile, Directory, Node, StaticFile};

/// Build a complete root directory from the connector's current view.
pub(super) async fn build_root(
    connector: &Arc<dyn Connector>,
    control: &Arc<CacheControl>,
) -> Arc<Directory> {
    debug!("building tree");
    let root = Directory::root();

    root.add_child(Node::File(Arc::new(StaticFile::new(
        "connection_info",
        connector.endpoint(),
    ))));
    root.add_child(Node::File(Arc::new(RescanFile::new(control.clone()))));

    match connector.list_beans().await {
        Ok(beans) => {
            debug!(count = beans.len(), "enumerated beans");
            for bean in beans {
                attach_bean(&root, connector, bean).await;
            }
        }
        Err(e) => {
            // The tree stays servable on a partial snapshot; the failure
            // is readable at the root instead of failing every lookup.
            error!(error = %e, "bean enumeration failed");
            root.add_child(Node::File(Arc::new(StaticFile::new(
                "error",
                e.to_string(),
            ))));
        }
    }

    root
}

/// Mount one bean under its derived segment path.
async fn attach_bean(root: &Arc<Directory>, connector: &Arc<dyn Connector>, bean: Bean) {
    let segments = bean.path_segments();
    let Some((tail, parents)) = segments.split_last() else {
        warn!(bean = %bean, "bean derives no path segments, skipping");
        return;
    };

    let mut parent = root.clone();
    for segment in parents {
        parent = parent.add_directory(segment);
    }

    // Derived segment collisions between beans are not detected; the later
    // bean replaces the earlier one's entry (add_child logs the replace).
    let dir = build_bean_dir(connector, &bean, tail).await;
    parent.add_child(Node::Dir(dir));
}

/// Build the directory for one bean: metadata files, attributes, and (when
/// present) operations. Introspection failures are collected into an
/// `error` file inside this directory; whatever was synthesized before the
/// failure stays usable.
async fn build_bean_dir(
    connector: &Arc<dyn Connector>,
    bean: &Bean,
    name: &str,
) -> Arc<Directory> {
    let dir = Directory::new(name);

    dir.add_child(Node::File(Arc::new(StaticFile::new(
        "objectname",
        bean.object_name(),
    ))));
    // The shallow Jolokia listing carries neither a class name nor a
    // description; the files exist with empty content for layout parity.
    dir.add_child(Node::File(Arc::new(StaticFile::new("classname", ""))));
    dir.add_child(Node::File(Arc::new(StaticFile::new("description", ""))));

    let mut failures = String::new();

    match connector.list_attributes(bean).await {
        Ok(attributes) => {
            let attributes_dir = dir.add_directory("attributes");
            for attribute in attributes {
                debug!(bean = %bean, attribute = %attribute.name, "attribute file");
                attributes_dir.add_child(Node::File(Arc::new(AttributeFile::new(
                    bean.clone(),
                    attribute,
                    connector.clone(),
                ))));
            }
        }
        Err(e) => failures.push_str(&format!("{}\n", e)),
    }

    match connector.list_operations(bean).await {
        Ok(operations) if !operations.is_empty() => {
            let operations_dir = dir.add_directory("operations");
            for operation in operations {
                debug!(bean = %bean, operation = %operation.name, "operation directory");
                let op_dir = build_operation_dir(connector.clone(), bean, operation);
                operations_dir.add_child(Node::Dir(op_dir));
            }
        }
        Ok(_) => {}
        Err(e) => failures.push_str(&format!("{}\n", e)),
    }

    if !failures.is_empty() {
        warn!(bean = %bean, failures = %failures, "bean introspection failed");
        dir.add_child(Node::File(Arc::new(StaticFile::new("error", failures))));
    }

    dir
}
