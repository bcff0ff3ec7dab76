use std::collections::HashMap;

/// Name of the child element carrying an OSM key/value pair.
pub const TAG_ELEMENT: &str = "tag";

/// Parsed XML tree of an .osm file. Owned for the duration of a run.
#[derive(Debug, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    /// `None` when the `tag` element has a `k` but no `v` attribute.
    pub value: Option<String>,
}

/// Key to value lookup built from the direct `tag` children of one element.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagMap {
    tags: HashMap<String, Option<String>>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct `tag` children in document order. Tags without a `k` are skipped.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.children.iter()
            .filter(|child| child.name == TAG_ELEMENT)
            .filter_map(|child| {
                let key = child.attribute("k")?;
                Some(Tag {
                    key: key.to_string(),
                    value: child.attribute("v").map(str::to_string),
                })
            })
    }

    pub fn has_tag_key(&self, key: &str) -> bool {
        self.tags().any(|tag| tag.key == key)
    }

    pub fn tag_map(&self) -> TagMap {
        TagMap::from_tags(self.tags())
    }

    /// Depth-first pre-order walk over this element and all its descendants.
    /// Every element is yielded exactly once.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Children are torn down from an explicit stack so that deeply nested
/// documents do not exhaust the call stack.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

impl Document {
    /// Elements owning at least one direct `tag` child whose `k` equals `key`.
    /// A `k` attribute on the element itself does not count.
    pub fn elements_with_tag<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.root.descendants()
            .filter(move |element| element.has_tag_key(key))
    }
}

impl TagMap {
    /// Later tags overwrite earlier ones with the same key, so for
    /// `width=2` followed by `width=3` the map holds `3`.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> TagMap {
        let mut map = TagMap::default();
        for tag in tags {
            map.tags.insert(tag.key, tag.value);
        }
        map
    }

    /// Value for `key`, `default` when the key is absent.
    /// A key present without a value yields `"None"`.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        match self.tags.get(key) {
            Some(Some(value)) => value.clone(),
            Some(None) => MISSING_VALUE.to_string(),
            None => default.to_string(),
        }
    }
}

/// Rendered in place of a value that is expected but missing.
pub const MISSING_VALUE: &str = "None";

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(k: &str, v: &str) -> Element {
        Element {
            name: TAG_ELEMENT.to_string(),
            attributes: vec![("k".to_string(), k.to_string()), ("v".to_string(), v.to_string())],
            children: Vec::new(),
        }
    }

    fn way(tags: Vec<Element>) -> Element {
        Element {
            name: "way".to_string(),
            attributes: vec![("id".to_string(), "1".to_string())],
            children: tags,
        }
    }

    #[test]
    fn later_tag_overwrites_earlier() {
        let element = way(vec![tag("width", "2"), tag("highway", "track"), tag("width", "3")]);
        let tags = element.tag_map();
        assert_eq!(tags.get_or("highway", "N/A"), "track");
        assert_eq!(tags.get_or("width", "N/A"), "3");
    }

    #[test]
    fn absent_key_uses_default() {
        let tags = way(vec![tag("highway", "primary")]).tag_map();
        assert_eq!(tags.get_or("surface", "N/A"), "N/A");
        assert_eq!(tags.get_or("highway", "N/A"), "primary");
    }

    #[test]
    fn key_without_value_is_none() {
        let mut valueless = Element::new(TAG_ELEMENT);
        valueless.attributes.push(("k".to_string(), "surface".to_string()));
        let tags = way(vec![valueless]).tag_map();
        assert_eq!(tags.get_or("surface", "N/A"), "None");
    }

    #[test]
    fn only_tag_children_count() {
        let mut nd = Element::new("nd");
        nd.attributes.push(("k".to_string(), "highway".to_string()));
        let element = way(vec![nd]);
        assert!(!element.has_tag_key("highway"));
        assert_eq!(element.tag_map(), TagMap::default());
    }

    #[test]
    fn selection_ignores_own_attributes_and_grandchildren() {
        // <osm>
        //   <node k="highway"/>                          own attribute only
        //   <relation><member><tag k="highway"/></member></relation>
        //   <way><tag k="highway" v="service"/></way>
        // </osm>
        let mut node = Element::new("node");
        node.attributes.push(("k".to_string(), "highway".to_string()));
        let mut member = Element::new("member");
        member.children.push(tag("highway", "footway"));
        let mut relation = Element::new("relation");
        relation.children.push(member);
        let mut root = Element::new("osm");
        root.children = vec![node, relation, way(vec![tag("highway", "service")])];
        let doc = Document { root };

        let selected: Vec<&str> = doc.elements_with_tag("highway")
            .map(|element| element.name.as_str())
            .collect();
        assert_eq!(selected, vec!["member", "way"]);
    }

    #[test]
    fn element_with_many_highway_tags_selected_once() {
        let mut root = Element::new("osm");
        root.children.push(way(vec![tag("highway", "a"), tag("highway", "b")]));
        let doc = Document { root };
        assert_eq!(doc.elements_with_tag("highway").count(), 1);
    }

    #[test]
    fn deeply_nested_tree_walks_and_drops() {
        let mut innermost = Element::new("a");
        innermost.children.push(tag("highway", "x"));
        let mut element = innermost;
        for _ in 0..200_000 {
            let mut parent = Element::new("a");
            parent.children.push(element);
            element = parent;
        }
        let doc = Document { root: element };
        assert_eq!(doc.root.descendants().count(), 200_002);
        assert_eq!(doc.elements_with_tag("highway").count(), 1);
        drop(doc);
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut a = Element::new("a");
        a.children.push(Element::new("b"));
        let mut root = Element::new("root");
        root.children = vec![a, Element::new("c")];
        let names: Vec<&str> = root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "b", "c"]);
    }
}
