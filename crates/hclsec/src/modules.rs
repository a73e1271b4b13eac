//! module tree
//!
//! A configuration is a root module plus every child module it calls. Only calls with a local
//! `source` (`./...` or `../...`) can be followed. Everything else (registry, git, ...) stays
//! unloaded and references into such modules resolve to unknown values.
use crate::hcl_documents::{HclDocuments, LoadError};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ModuleTree {
    modules: Vec<LoadedModule>,
}

/// One module instance
#[derive(Debug)]
pub struct LoadedModule {
    /// name of the `module` block that called this module, `None` for the root
    pub name: Option<String>,
    /// index of the calling module
    pub parent: Option<usize>,
    /// index of the calling `module` block in the parent's [HclDocuments::blocks]
    pub call: Option<usize>,
    pub dir: Option<PathBuf>,
    pub documents: HclDocuments,
}

impl ModuleTree {
    pub fn new(root: HclDocuments) -> Self {
        Self {
            modules: vec![LoadedModule {
                name: None,
                parent: None,
                call: None,
                dir: None,
                documents: root,
            }],
        }
    }

    /// Load the root module from a directory and follow all local module calls
    pub fn load(root_dir: &Path) -> Result<Self, LoadError> {
        let root_dir = root_dir.canonicalize()?;

        let mut documents = HclDocuments::default();
        documents.load_directory(&root_dir)?;

        let mut tree = Self::new(documents);
        tree.modules[0].dir = Some(root_dir);

        // modules are appended while walking, so this visits parents before children
        let mut next = 0;
        while next < tree.modules.len() {
            for (call, name, dir) in tree.local_calls(next) {
                if tree.is_ancestor_dir(next, &dir) {
                    tracing::warn!(module=%name, dir=%dir.display(), "module calls itself, skipping");
                    continue;
                }

                let mut documents = HclDocuments::default();
                match documents.load_directory(&dir) {
                    Ok(()) => {}
                    Err(LoadError::NoFilesFound) => {
                        tracing::warn!(module=%name, dir=%dir.display(), "module directory contains no .tf files");
                        continue;
                    }
                    Err(err) => return Err(err),
                }

                tracing::info!(module=%name, dir=%dir.display(), "loaded module");
                tree.modules.push(LoadedModule {
                    name: Some(name),
                    parent: Some(next),
                    call: Some(call),
                    dir: Some(dir),
                    documents,
                });
            }

            next += 1;
        }

        Ok(tree)
    }

    /// Attach an already loaded module as the target of the `module "<name>"` block in `parent`
    ///
    /// Returns the index of the new module or [None] when the parent has no such module block.
    pub fn add_child(
        &mut self,
        parent: usize,
        name: &str,
        documents: HclDocuments,
    ) -> Option<usize> {
        let call = self.find_call(parent, name)?;

        self.modules.push(LoadedModule {
            name: Some(name.to_owned()),
            parent: Some(parent),
            call: Some(call),
            dir: None,
            documents,
        });

        Some(self.modules.len() - 1)
    }

    pub fn modules(&self) -> &[LoadedModule] {
        &self.modules
    }

    pub fn root(&self) -> &LoadedModule {
        &self.modules[0]
    }

    fn find_call(&self, module: usize, name: &str) -> Option<usize> {
        self.modules
            .get(module)?
            .documents
            .blocks()
            .find(|(_, _, block)| {
                block.ident.value().as_str() == "module"
                    && block.labels.first().map(|label| label.as_str()) == Some(name)
            })
            .map(|(index, _, _)| index)
    }

    /// `(block index, call name, canonical directory)` of every followable module call
    fn local_calls(&self, module: usize) -> Vec<(usize, String, PathBuf)> {
        let module = &self.modules[module];
        let Some(dir) = &module.dir else {
            return vec![];
        };

        let mut calls = vec![];
        for (index, _source, block) in module.documents.blocks() {
            if block.ident.value().as_str() != "module" {
                continue;
            }

            let Some(name) = block.labels.first().map(|label| label.as_str().to_owned()) else {
                continue;
            };

            let Some(source) = block
                .body
                .attributes()
                .find(|attribute| attribute.key.value().as_str() == "source")
                .map(|attribute| hcl::Expression::from(attribute.value.clone()))
            else {
                continue;
            };

            let hcl::Expression::String(source) = source else {
                tracing::debug!(module=%name, "module source is not a string literal");
                continue;
            };

            if !is_local_source(&source) {
                tracing::debug!(module=%name, %source, "skipping remote module source");
                continue;
            }

            match dir.join(&source).canonicalize() {
                Ok(child_dir) => calls.push((index, name, child_dir)),
                Err(err) => {
                    tracing::warn!(module=%name, %source, %err, "unable to resolve module source")
                }
            }
        }

        calls
    }

    fn is_ancestor_dir(&self, module: usize, dir: &Path) -> bool {
        let mut current = Some(module);
        while let Some(index) = current {
            let module = &self.modules[index];
            if module.dir.as_deref() == Some(dir) {
                return true;
            }
            current = module.parent;
        }

        false
    }
}

fn is_local_source(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../")
}
