//! collection of hcl documents ([Body] and its source file) that make up one module
//!
//! [HclDocuments] tracks
//! - the source path and a line index of its text
//! - the root blocks
//! - the root attributes
//! and defines a numeric index for each. Once added those indices are stable (removal is not possible)
use crate::range::{LineIndex, SourceRange};
use crate::value::{Literal, Value};
use hcl::eval::Evaluate;
use hcl_edit::structure::{Attribute, Block, Body, Structure};
use hcl_edit::Span;
use std::path::{Path, PathBuf};

#[derive(Default, Debug)]
pub struct HclDocuments {
    sources: Vec<Source>,
    root_attributes: Vec<(usize, Attribute)>,
    root_blocks: Vec<(usize, Block)>,
}

impl HclDocuments {
    /// Parses and indexes an hcl document
    pub fn insert(
        &mut self,
        text: &str,
        path: impl Into<Option<PathBuf>>,
    ) -> Result<(), LoadError> {
        let document = hcl_edit::parser::parse_body(text)?;
        self.insert_body(document, Source::new(path.into(), text));
        Ok(())
    }

    fn insert_body(&mut self, document: Body, source: Source) {
        let source_index = self.sources.len();
        self.sources.push(source);

        for structure in document.into_iter() {
            match structure {
                Structure::Block(block) => self.root_blocks.push((source_index, block)),
                Structure::Attribute(attribute) => {
                    self.root_attributes.push((source_index, attribute))
                }
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut documents = Self::default();
        documents.insert(text, None)?;
        Ok(documents)
    }

    pub fn get_attribute(&self, index: usize) -> SourceAttribute<'_> {
        let (source_index, attribute) = &self.root_attributes[index];
        (index, &self.sources[*source_index], attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = SourceAttribute<'_>> {
        self.root_attributes
            .iter()
            .enumerate()
            .map(|(index, (source_index, attribute))| {
                (index, &self.sources[*source_index], attribute)
            })
    }

    pub fn get_block(&self, index: usize) -> SourceBlock<'_> {
        let (source_index, block) = &self.root_blocks[index];
        (index, &self.sources[*source_index], block)
    }

    pub fn blocks(&self) -> impl Iterator<Item = SourceBlock<'_>> {
        self.root_blocks
            .iter()
            .enumerate()
            .map(|(index, (source_index, block))| (index, &self.sources[*source_index], block))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl HclDocuments {
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        self.insert(&file_contents, Some(file_path))
    }

    /// Loads all `*.tf` files of a directory (not recursive) in file name order
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let is_tf_file = dir_entry.file_name().to_string_lossy().ends_with(".tf");
            if !is_tf_file {
                continue;
            }

            file_paths.push(dir_entry.path());
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound);
        }

        // read_dir order is platform dependent
        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }
}

/// Reads a `.tfvars` file
///
/// Every attribute must evaluate to a literal without any context.
pub fn load_variable_file(
    file_path: &Path,
) -> Result<indexmap::IndexMap<String, Literal>, LoadError> {
    tracing::info!(path=%file_path.display(), "loading variable file");

    let file_contents = std::fs::read_to_string(file_path)?;
    parse_variables(&file_contents)
}

pub fn parse_variables(text: &str) -> Result<indexmap::IndexMap<String, Literal>, LoadError> {
    let body = hcl_edit::parser::parse_body(text)?;

    let mut variables = indexmap::IndexMap::new();
    for attribute in body.attributes() {
        let name = attribute.key.value().as_str().to_owned();
        let expression: hcl::Expression = attribute.value.clone().into();

        let value = expression
            .evaluate(&hcl::eval::Context::new())
            .map(Value::from)
            .unwrap_or(Value::Unknown);

        let Value::Known(literal) = value else {
            return Err(LoadError::NotALiteral(name));
        };

        variables.insert(name, literal);
    }

    Ok(variables)
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No .tf files found in directory")]
    NoFilesFound,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
    #[error("Variable {0} is not a literal value")]
    NotALiteral(String),
}

/// Utility macro to create [HclDocuments]
///
/// Create from a single document
/// ```
/// # use hclsec::hcl_documents;
/// hcl_documents!(r#"resource "a" "b" {}"#);
/// ```
///
/// Create from multiple documents (path required)
/// ```
/// # use hclsec::hcl_documents;
/// hcl_documents! {
///   "one.tf" => r#"variable "one" {}"#,
///   "two.tf" => r#"variable "two" {}"#
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use hclsec::hcl_documents;
/// hcl_documents!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! hcl_documents {
    // single document without source
    { $expr:expr } => {
        $crate::hcl_documents::HclDocuments::parse($expr).expect("body must parse")
    };
    // multi document with sources
    { $($source:expr => $expr:expr),+ } => {{
        let mut docs = $crate::hcl_documents::HclDocuments::default();
        $(
            docs.insert($expr, Some(::std::path::PathBuf::from($source))).expect("body must parse");
        )+

        docs
    }};
}

/// Origin of a document
#[derive(Debug)]
pub struct Source {
    pub path: Option<PathBuf>,
    lines: LineIndex,
}

impl Source {
    fn new(path: Option<PathBuf>, text: &str) -> Self {
        Self {
            path,
            lines: LineIndex::new(text),
        }
    }

    /// Maps a parser span onto lines and columns
    pub fn range(&self, span: Option<std::ops::Range<usize>>) -> SourceRange {
        let span = span.unwrap_or_default();
        SourceRange {
            path: self.path.clone(),
            start: self.lines.position(span.start),
            end: self.lines.position(span.end),
        }
    }

    pub fn block_range(&self, block: &Block) -> SourceRange {
        self.range(block.span())
    }

    pub fn attribute_range(&self, attribute: &Attribute) -> SourceRange {
        self.range(attribute.span())
    }
}

pub type SourceAttribute<'a> = (usize, &'a Source, &'a Attribute);
pub type SourceBlock<'a> = (usize, &'a Source, &'a Block);

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn iterators() {
        let hcl_documents = hcl_documents! {r#"
        attr_1 = 1
        one two {}
        three four five {}
        attr_2 = 2
        attr_3 = 3
        "#};

        assert_eq!(hcl_documents.attributes().count(), 3);
        assert_eq!(hcl_documents.blocks().count(), 2);
    }

    #[test]
    fn multiple_sources() {
        let hcl_documents = hcl_documents! {
            "one.tf" => "one {}",
            "two.tf" => "two {}\nthree {}"
        };

        assert_eq!(hcl_documents.source_count(), 2);
        let (_, source, _) = hcl_documents.get_block(2);
        assert_eq!(source.path, Some(PathBuf::from("two.tf")));
    }

    #[test]
    fn block_range_lines() {
        let hcl_documents = hcl_documents! {"\n\nresource \"a\" \"b\" {\n  x = 1\n}\n"};

        let (_, source, block) = hcl_documents.get_block(0);
        let range = source.block_range(block);
        assert_eq!(range.start.line, 3);
        assert_eq!(range.start.column, 1);
        assert!(range.end.line >= 5);
    }

    #[test]
    fn variables() {
        let variables = parse_variables("region = \"eu\"\nports = [80, 443]").unwrap();

        assert_eq!(variables["region"], Literal::from("eu"));
        assert_eq!(
            variables["ports"],
            Literal::Array(vec![Literal::Integer(80), Literal::Integer(443)])
        );
    }

    #[test]
    fn variables_must_be_literals() {
        let error = parse_variables("region = var.other").unwrap_err();
        assert!(matches!(error, LoadError::NotALiteral(name) if name == "region"));
    }
}
