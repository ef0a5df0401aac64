/*!
 * SMIL timing documents and their paired XHTML text documents.
 *
 * Both documents are parsed into owned, read-only structures. The text
 * document keeps an id index built once at load time so every anchor
 * reference from the timing document is a single map lookup.
 */

use roxmltree::{Document, Node, ParsingOptions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{CorpusError, CorpusResult};
use crate::file_utils::FileManager;

// @const: SMIL 3.0 namespace used by EPUB media overlays
pub const SMIL_NAMESPACE: &str = "http://www.w3.org/ns/SMIL";

/// One `<par>` element: a text anchor synchronized with an audio clip
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPair {
    /// Id of the anchored element in the text document
    pub text_id: String,

    /// Audio reference as written in the document (e.g. `../Audio/p1.mp3`)
    pub audio_src: String,

    /// Raw `clipBegin` clock value
    pub clip_begin: String,

    /// Raw `clipEnd` clock value
    pub clip_end: String,
}

impl SyncPair {
    /// Base name of the referenced audio file, which names the track
    pub fn audio_name(&self) -> String {
        FileManager::stem(&self.audio_src)
    }
}

/// Parsed timing document for one content page
#[derive(Debug, Clone)]
pub struct TimingDocument {
    pub path: PathBuf,
    pub pairs: Vec<SyncPair>,
}

impl TimingDocument {
    /// Load and parse a timing document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> CorpusResult<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse timing document content; `path` is used for error context
    pub fn parse<P: AsRef<Path>>(path: P, content: &str) -> CorpusResult<Self> {
        let path = path.as_ref();
        let doc = parse_xml(path, content)?;

        let pairs = doc
            .descendants()
            .filter(|n| is_smil_element(n, "par"))
            .map(|par| Self::parse_pair(path, par))
            .collect::<CorpusResult<Vec<_>>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            pairs,
        })
    }

    /// Path of the paired text document: the timing file name minus its final extension
    pub fn text_document_path(&self) -> PathBuf {
        self.path.with_extension("")
    }

    fn parse_pair(path: &Path, par: Node) -> CorpusResult<SyncPair> {
        let text = par
            .children()
            .find(|n| is_smil_element(n, "text"))
            .ok_or_else(|| CorpusError::structural(path, "<par> without <text> child"))?;
        let audio = par
            .children()
            .find(|n| is_smil_element(n, "audio"))
            .ok_or_else(|| CorpusError::structural(path, "<par> without <audio> child"))?;

        let text_src = required_attribute(path, text, "src")?;
        let text_id = text_src
            .split_once('#')
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CorpusError::structural(path, format!("text reference {:?} has no fragment id", text_src))
            })?;

        Ok(SyncPair {
            text_id: text_id.to_string(),
            audio_src: required_attribute(path, audio, "src")?.to_string(),
            clip_begin: required_attribute(path, audio, "clipBegin")?.to_string(),
            clip_end: required_attribute(path, audio, "clipEnd")?.to_string(),
        })
    }
}

/// Parsed text document with its id index
#[derive(Debug, Clone)]
pub struct TextDocument {
    pub path: PathBuf,
    anchors: HashMap<String, String>,
}

impl TextDocument {
    /// Load the text document; a missing file is a structural error
    pub fn load<P: AsRef<Path>>(path: P) -> CorpusResult<Self> {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            return Err(CorpusError::structural(path, "paired text document not found"));
        }
        let content = FileManager::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse text document content and index every element carrying an id
    pub fn parse<P: AsRef<Path>>(path: P, content: &str) -> CorpusResult<Self> {
        let path = path.as_ref();
        let doc = parse_xml(path, content)?;

        let mut anchors = HashMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            if let Some(id) = node.attribute("id") {
                // First occurrence wins for duplicated ids
                anchors
                    .entry(id.to_string())
                    .or_insert_with(|| element_text(node));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            anchors,
        })
    }

    /// Trimmed text content of the element with the given id
    pub fn anchor_text(&self, id: &str) -> CorpusResult<&str> {
        self.anchors
            .get(id)
            .map(|text| text.trim())
            .ok_or_else(|| CorpusError::structural(&self.path, format!("unresolved id reference '{}'", id)))
    }
}

fn parse_xml<'input>(path: &Path, content: &'input str) -> CorpusResult<Document<'input>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(content, options)
        .map_err(|e| CorpusError::structural(path, format!("malformed XML: {}", e)))
}

fn is_smil_element(node: &Node, local_name: &str) -> bool {
    let tag = node.tag_name();
    node.is_element()
        && tag.name() == local_name
        && tag.namespace().is_none_or(|ns| ns == SMIL_NAMESPACE)
}

fn required_attribute<'a>(path: &Path, node: Node<'a, '_>, name: &str) -> CorpusResult<&'a str> {
    node.attribute(name).ok_or_else(|| {
        CorpusError::structural(
            path,
            format!("<{}> is missing the '{}' attribute", node.tag_name().name(), name),
        )
    })
}

// Text of the element and all of its descendants, in document order
fn element_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
