use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use log::{debug, info};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use xz::bufread::XzDecoder;

use crate::data::osm::{Document, Element};
use crate::errors::{Error, Result};

/// General entities declared in the internal DTD subset, name to replacement text.
type Entities = HashMap<String, String>;

/// Matches `<!ENTITY name "value">` and `<!ENTITY name 'value'>`. Parameter
/// entities (`%`) and external (`SYSTEM`/`PUBLIC`) entities never match.
const ENTITY_DECL_PATTERN: &str = r#"<!ENTITY\s+([^\s%"'<>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#;

fn predefined_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

/// Collects the entity declarations of a `<!DOCTYPE ...>` body.
/// The first declaration of a name wins.
fn parse_entity_declarations(doctype: &str, entities: &mut Entities) -> Result<()> {
    let re = Regex::new(ENTITY_DECL_PATTERN).map_err(Error::parse)?;
    for caps in re.captures_iter(doctype) {
        let name = caps[1].to_string();
        let raw = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        // Character references inside the literal are expanded at declaration time.
        let value = unescape(raw).map(|v| v.into_owned()).unwrap_or_else(|_| raw.to_string());
        entities.entry(name).or_insert(value);
    }
    Ok(())
}

fn parse_element(el: &BytesStart, entities: &Entities) -> Result<Element> {
    let mut element = Element::new(str::from_utf8(el.name().as_ref())?);
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value_with(|name| {
            predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
        })?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Hangs a finished element under the open parent, or makes it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(Error::parse("junk after document element")),
        None => *root = Some(element),
    }
    Ok(())
}

fn read_document<R: BufRead>(reader: &mut Reader<R>) -> Result<Document> {
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut entities = Entities::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::DocType(e) => {
                parse_entity_declarations(str::from_utf8(&e)?, &mut entities)?;
            },
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(Error::parse("junk after document element"));
                }
                stack.push(parse_element(&e, &entities)?);
            },
            Event::Empty(e) => {
                let element = parse_element(&e, &entities)?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::End(e) => {
                let element = stack.pop()
                    .ok_or_else(|| Error::parse("closing tag without matching opening tag"))?;
                if element.name.as_bytes() != e.name().as_ref() {
                    return Err(Error::parse(format!(
                        "mismatched tag: expected </{}>, found </{}>",
                        element.name,
                        String::from_utf8_lossy(e.name().as_ref()),
                    )));
                }
                attach(&mut stack, &mut root, element)?;
            },
            Event::Text(e) => {
                if stack.is_empty() && !e.is_empty() {
                    return Err(Error::parse("text outside of the document element"));
                }
            },
            // Declarations, comments, CDATA and processing instructions carry no tags.
            _ => (),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse(format!("unclosed element <{}>", open.name)));
    }
    let root = root.ok_or_else(|| Error::parse("no element found"))?;
    Ok(Document { root })
}

/// Parses an in-memory XML buffer or any other buffered source.
pub fn parse_document<R: BufRead>(source: R) -> Result<Document> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    read_document(&mut reader).map_err(|err| {
        Error::parse(format!("{} (at byte {})", err.message, reader.buffer_position()))
    })
}

fn open_osm_source(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = fs::File::open(path)
        .map_err(|err| Error::parse(format!("{}: {}", path.display(), err)))?;
    let file_reader = BufReader::new(file);

    if path.extension().is_some_and(|ext| ext == "xz") {
        debug!(path = path.display().to_string(); "Decompressing xz input");
        let xz_reader = XzDecoder::new(file_reader);
        Ok(Box::new(BufReader::new(xz_reader)))
    } else {
        Ok(Box::new(file_reader))
    }
}

/// Loads an .osm (or .osm.xz) file. The file is closed when this returns,
/// whether parsing succeeded or not.
pub fn load_document(path: &Path) -> Result<Document> {
    let source = open_osm_source(path)?;
    let document = parse_document(source)?;
    info!(path = path.display().to_string(), root = document.root.name; "Parsed OSM document");
    Ok(document)
}
