// src/templates.rs
//! On-disk template directories and copying them into a project.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::{TemplateDescriptor, TemplateName};

/// Placeholder for `<subModule>.<feature>` intl keys.
pub const FEATURE_KEY_PLACEHOLDER: &str = "子模块名称.功能名称";
/// Placeholder for the bare sub-module name.
pub const SUB_MODULE_PLACEHOLDER: &str = "子模块名称";

/// Root directory holding one sub-directory per template.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TemplateStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a template directory; fails if it does not exist.
    pub fn descriptor(&self, name: &str, placeholders: IndexMap<String, String>) -> Result<TemplateDescriptor> {
        let source_dir = self.root.join(name);
        if !source_dir.is_dir() {
            return Err(Error::TemplateNotFound {
                name: name.to_string(),
                dir: source_dir,
            });
        }
        let text_files = name
            .parse::<TemplateName>()
            .map(|t| t.placeholder_files().iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        Ok(TemplateDescriptor {
            name: name.to_string(),
            source_dir,
            placeholders,
            text_files,
        })
    }

    /// Copy `template` into `destination`.
    ///
    /// Files are first copied into a private staging directory where the
    /// placeholders are substituted, then the staged tree is copied into
    /// `destination` and the staging directory is removed. The destination is
    /// assumed to have passed the safety check already.
    pub fn copy_template(&self, template: &TemplateDescriptor, destination: &Path) -> Result<()> {
        if !template.source_dir.is_dir() {
            return Err(Error::TemplateNotFound {
                name: template.name.clone(),
                dir: template.source_dir.clone(),
            });
        }

        let staging = tempfile::Builder::new().prefix("h0-template-").tempdir()?;
        debug!("staging {} in {:?}", template.name, staging.path());

        copy_dir(&template.source_dir, staging.path())?;
        apply_placeholders(staging.path(), template)?;
        copy_dir(staging.path(), destination)?;

        staging.close()?;
        Ok(())
    }
}

/// The substitutions for an H0 page template, longest key first.
pub fn h0_placeholders(sub_module: &str, feature: &str) -> IndexMap<String, String> {
    IndexMap::from([
        (FEATURE_KEY_PLACEHOLDER.to_string(), format!("{sub_module}.{feature}")),
        (SUB_MODULE_PLACEHOLDER.to_string(), sub_module.to_string()),
    ])
}

/// Literal, case-sensitive replacement of every placeholder occurrence, in
/// map order.
pub fn substitute(content: &str, placeholders: &IndexMap<String, String>) -> String {
    placeholders
        .iter()
        .fold(content.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

fn apply_placeholders(staged: &Path, template: &TemplateDescriptor) -> Result<()> {
    for rel in &template.text_files {
        let file = staged.join(rel);
        if !file.is_file() {
            debug!("template {} has no {:?}, nothing to substitute", template.name, rel);
            continue;
        }
        // skip anything that is not text
        let Ok(content) = fs::read_to_string(&file) else {
            debug!("{:?} is not UTF-8 text, left as is", rel);
            continue;
        };
        fs::write(&file, substitute(&content, &template.placeholders))?;
    }
    Ok(())
}

/// Recursively copy `from` into `to`, creating directories as needed and
/// overwriting files.
fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).into_iter() {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory loop while copying template"))
        })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_list_page(tmp: &Path) -> TemplateStore {
        let list = tmp.join("templates/listPage/list");
        let stores = tmp.join("templates/listPage/stores");
        fs::create_dir_all(&list).unwrap();
        fs::create_dir_all(&stores).unwrap();
        fs::write(
            list.join("listPage.tsx"),
            "const modelPrompt = 'tarzan.子模块名称.功能名称';\ncode: ['tarzan.子模块名称.common'];\n",
        )
        .unwrap();
        fs::write(stores.join("listPageDs.ts"), "const p = 'tarzan.子模块名称.功能名称';\n").unwrap();
        fs::write(list.join("logo.svg"), "<svg>子模块名称</svg>").unwrap();
        TemplateStore::new(tmp.join("templates"))
    }

    #[test]
    fn substitution_replaces_longest_key_first() {
        let map = h0_placeholders("aps", "order");
        assert_eq!(
            substitute("a.子模块名称.功能名称 b.子模块名称 c.子模块名称.功能名称", &map),
            "a.aps.order b.aps c.aps.order"
        );
    }

    #[test]
    fn copy_substitutes_declared_files_only() {
        let tmp = TempDir::new().unwrap();
        let store = store_with_list_page(tmp.path());
        let dest = tmp.path().join("src/pages/Order");

        let template = store.descriptor("listPage", h0_placeholders("aps", "order")).unwrap();
        store.copy_template(&template, &dest).unwrap();

        let page = fs::read_to_string(dest.join("list/listPage.tsx")).unwrap();
        assert!(page.contains("'tarzan.aps.order'"));
        assert!(page.contains("'tarzan.aps.common'"));
        let ds = fs::read_to_string(dest.join("stores/listPageDs.ts")).unwrap();
        assert!(ds.contains("'tarzan.aps.order'"));
        // not a declared text file
        let svg = fs::read_to_string(dest.join("list/logo.svg")).unwrap();
        assert_eq!(svg, "<svg>子模块名称</svg>");

        // template source is untouched
        let source = fs::read_to_string(store.root().join("listPage/list/listPage.tsx")).unwrap();
        assert!(source.contains(FEATURE_KEY_PLACEHOLDER));
    }

    #[test]
    fn unknown_template_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = store_with_list_page(tmp.path());

        let err = store.descriptor("filterList", IndexMap::new()).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { ref name, .. } if name == "filterList"));
    }
}
