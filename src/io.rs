use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use phylotree::tree::Tree;
use std::collections::HashMap;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::assign::{CladeAssignment, Representative};
use crate::color::CladeColoring;
use crate::error::{MedoidError, Result};
use crate::tree::BinaryTree;

/// Strip bracketed annotations from Newick strings.
///
/// BEAST and FigTree write annotations like `:[&rate=0.123]2.45` or `a[&!color=#ff0000]:1`.
/// This function removes the `[&...]` annotations while preserving the branch lengths.
fn strip_annotations(newick: &str) -> String {
    let mut result = String::with_capacity(newick.len());
    let mut in_annotation = false;
    let mut chars = newick.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '[' && chars.peek() == Some(&'&') {
            in_annotation = true;
        } else if ch == ']' && in_annotation {
            in_annotation = false;
        } else if !in_annotation {
            result.push(ch);
        }
    }

    result
}

/// Read a tree file into a binarized tree.
///
/// The file may be NEWICK or NEXUS (detected by a leading `#NEXUS`), plain or
/// gzip-compressed (`.gz`). For NEXUS the first tree of the TREES block is used
/// and a TRANSLATE table, when present, renames the leaves.
pub fn read_tree<P: AsRef<Path>>(path: P) -> Result<BinaryTree> {
    let p = path.as_ref();
    let mut content = String::new();
    if p.to_string_lossy().ends_with(".gz") {
        GzDecoder::new(File::open(p)?).read_to_string(&mut content)?;
    } else {
        File::open(p)?.read_to_string(&mut content)?;
    }
    parse_tree(&content)
}

/// Parse NEWICK or NEXUS text, see [`read_tree`].
pub fn parse_tree(content: &str) -> Result<BinaryTree> {
    let is_nexus = content.trim_start().to_ascii_uppercase().starts_with("#NEXUS");
    if !is_nexus {
        let stripped = strip_annotations(content);
        let newick = match stripped.find(';') {
            Some(end) => &stripped[..=end],
            None => stripped.trim(),
        };
        return BinaryTree::from_newick(newick.trim());
    }

    let taxons = parse_taxon_block(content);
    let block = collect_tree_blocks(content)
        .into_iter()
        .next()
        .ok_or_else(|| MedoidError::Newick("NEXUS file has no tree in its TREES block".to_string()))?;
    tracing::debug!(tree = block.header, translated = taxons.len(), "reading NEXUS tree");

    let newick = strip_annotations(&block.body);
    let mut phylo_tree = Tree::from_newick(newick.trim()).map_err(|e| MedoidError::Newick(e.to_string()))?;
    if !taxons.is_empty() {
        rename_leaf_nodes(&mut phylo_tree, &taxons);
    }
    BinaryTree::from_phylo(&phylo_tree)
}

struct TreeBlock<'a> { header: &'a str, body: String }

fn collect_tree_blocks(content: &str) -> Vec<TreeBlock<'_>> {
    content
        .lines()
        .map(str::trim)
        .skip_while(|line| !line.to_ascii_uppercase().starts_with("TREE "))
        .take_while(|line| !line.to_ascii_uppercase().starts_with("END;"))
        .filter_map(|line| {
            let mut parts = line.splitn(2, " = ");
            let header = parts.next()?.trim();
            let body = parts.next()?.trim().to_string();
            Some(TreeBlock { header, body })
        })
        .collect()
}

fn parse_taxon_block(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .skip_while(|line| !line.trim().to_ascii_uppercase().starts_with("TRANSLATE"))
        .skip(1)
        .take_while(|line| !line.trim().to_ascii_uppercase().starts_with(";"))
        // STRUCTURE:
        // 1 'A/swine/Iowa/A01/2019',
        // 2 'A/swine/Ohio/A02/2019'
        .filter_map(|line| {
            let line = line.trim().trim_end_matches([',', ';']);
            let mut parts = line.split_whitespace();
            let id = parts.next()?.to_string();
            let label = parts.next()?.trim_matches('\'').to_string();
            Some((id, label))
        })
        .collect::<HashMap<_, _>>()
}

/// Rename leaves through a TRANSLATE table; unknown names are kept.
pub fn rename_leaf_nodes(phylo_tree: &mut Tree, translate: &HashMap<String, String>) {
    for leaf_id in phylo_tree.get_leaves() {
        if let Ok(node) = phylo_tree.get_mut(&leaf_id) {
            node.name = node
                .name
                .as_ref()
                .map(|n| translate.get(n).cloned().unwrap_or_else(|| n.clone()));
        }
    }
}

/// Output sink; gzip streams must be closed with [`Output::finish`] to write the trailer.
enum Output {
    Plain(BufWriter<Box<dyn Write>>),
    Gzip(BufWriter<GzEncoder<File>>),
}

impl Output {
    fn finish(self) -> io::Result<()> {
        match self {
            Output::Plain(mut w) => w.flush(),
            Output::Gzip(w) => {
                w.into_inner().map_err(|e| e.into_error())?.finish()?;
                Ok(())
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Plain(w) => w.write(buf),
            Output::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Plain(w) => w.flush(),
            Output::Gzip(w) => w.flush(),
        }
    }
}

/// Open `path` for writing; `-` is stdout, a `.gz` suffix gzip-compresses.
fn create_output(path: &Path) -> io::Result<Output> {
    if path.as_os_str() == "-" {
        return Ok(Output::Plain(BufWriter::new(Box::new(io::stdout()))));
    }
    let f = File::create(path)?;
    if path.to_string_lossy().ends_with(".gz") {
        Ok(Output::Gzip(BufWriter::new(GzEncoder::new(f, Compression::default()))))
    } else {
        Ok(Output::Plain(BufWriter::new(Box::new(f))))
    }
}

/// Write the per-leaf nearest-representative table as TSV.
///
/// Columns: taxon, representative (empty when unassigned), distance, kind
/// (`selected`, `prior` or `none`).
pub fn write_assignments_tsv<P: AsRef<Path>>(path: P, assignment: &CladeAssignment) -> io::Result<()> {
    let mut out = create_output(path.as_ref())?;
    let tree = assignment.tree();

    writeln!(&mut out, "taxon\trepresentative\tdistance\tkind")?;
    for (label, a) in assignment.leaves() {
        let (center, kind) = match a.representative {
            Some(Representative::Selected(_)) => (a.center.and_then(|c| tree.label(c)), "selected"),
            Some(Representative::Prior(_)) => (a.center.and_then(|c| tree.label(c)), "prior"),
            None => (None, "none"),
        };
        writeln!(&mut out, "{}\t{}\t{}\t{}", label, center.unwrap_or(""), a.distance, kind)?;
    }

    out.finish()
}

/// Labels with anything beyond `[A-Za-z0-9_.]` are single-quoted, inner quotes doubled.
fn quote_label(label: &str) -> String {
    if !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
        label.to_string()
    } else {
        format!("'{}'", label.replace('\'', "''"))
    }
}

fn color_annotation(color: &str) -> String {
    format!("[&!color={color}]")
}

/// NEWICK text of the (binarized) tree with FigTree edge colors.
pub fn to_colored_newick(tree: &BinaryTree, coloring: &CladeColoring) -> String {
    enum Step { Open(usize), Close(usize), Comma }

    let mut out = String::new();
    let suffix = |out: &mut String, v: usize| {
        if let Some(color) = coloring.edge_color(v) {
            out.push_str(&color_annotation(color));
        }
        if tree.parent(v).is_some() {
            out.push_str(&format!(":{}", tree.edge(v)));
        }
    };

    let mut stack = vec![Step::Open(tree.root())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(v) => {
                let children = &tree.node(v).children;
                if children.is_empty() {
                    out.push_str(&quote_label(tree.label(v).unwrap_or_default()));
                    suffix(&mut out, v);
                    continue;
                }
                out.push('(');
                stack.push(Step::Close(v));
                for (i, &c) in children.iter().enumerate().rev() {
                    stack.push(Step::Open(c));
                    if i > 0 {
                        stack.push(Step::Comma);
                    }
                }
            }
            Step::Close(v) => {
                out.push(')');
                suffix(&mut out, v);
            }
            Step::Comma => out.push(','),
        }
    }
    out.push(';');
    out
}

/// Write the colored tree as a NEXUS file readable by FigTree.
pub fn write_colored_nexus<P: AsRef<Path>>(path: P, tree: &BinaryTree, coloring: &CladeColoring) -> io::Result<()> {
    let mut out = create_output(path.as_ref())?;

    writeln!(&mut out, "#NEXUS")?;
    writeln!(&mut out)?;
    writeln!(&mut out, "BEGIN TAXA;")?;
    writeln!(&mut out, "\tDIMENSIONS NTAX={};", tree.n_leaves())?;
    writeln!(&mut out, "\tTAXLABELS")?;
    for label in tree.leaf_labels() {
        let color = coloring.taxon_color(label).map(color_annotation).unwrap_or_default();
        writeln!(&mut out, "\t\t{}{}", quote_label(label), color)?;
    }
    writeln!(&mut out, "\t;")?;
    writeln!(&mut out, "END;")?;
    writeln!(&mut out)?;
    writeln!(&mut out, "BEGIN TREES;")?;
    writeln!(&mut out, "\tTREE tree_1 = [&R] {}", to_colored_newick(tree, coloring))?;
    writeln!(&mut out, "END;")?;

    out.finish()
}
