//! Read-only helpers that pull text out of parsed EML elements.
//!
//! Every helper accepts a missing node and answers with "nothing"
//! rather than failing; absent data is normal in partially filled
//! metadata. Child names match without regard to case.

use crate::dom::Element;

/// The first direct child named `name`.
pub fn child<'d>(node: Option<Element<'d>>, name: &str) -> Option<Element<'d>> {
    node?.element_children().into_iter().find(|e| e.is_named(name))
}

/// Every direct child named `name`, in document order.
pub fn children<'d>(node: Option<Element<'d>>, name: &str) -> Vec<Element<'d>> {
    match node {
        Some(node) => node.element_children().into_iter().filter(|e| e.is_named(name)).collect(),
        None => Vec::new(),
    }
}

/// Follows `path` one direct child at a time.
pub fn descendant<'d>(node: Option<Element<'d>>, path: &[&str]) -> Option<Element<'d>> {
    path.iter().try_fold(node?, |current, name| child(Some(current), name))
}

/// The first element named `name` anywhere below `node`, depth first.
pub fn find<'d>(node: Option<Element<'d>>, name: &str) -> Option<Element<'d>> {
    let mut todo = node?.element_children();
    todo.reverse();

    while let Some(e) = todo.pop() {
        if e.is_named(name) {
            return Some(e);
        }
        let mut element_children = e.element_children();
        element_children.reverse();
        todo.extend(element_children);
    }

    None
}

/// Trimmed text of the first direct child named `name`.
pub fn scalar_text(node: Option<Element<'_>>, name: &str) -> Option<String> {
    child(node, name).map(|e| e.text_content().trim().to_owned())
}

/// Like [`scalar_text`], but an empty value counts as absent.
pub fn non_empty_text(node: Option<Element<'_>>, name: &str) -> Option<String> {
    scalar_text(node, name).filter(|s| !s.is_empty())
}

/// Trimmed text of every direct child named `name`.
pub fn list_text(node: Option<Element<'_>>, name: &str) -> Vec<String> {
    children(node, name)
        .into_iter()
        .map(|e| e.text_content().trim().to_owned())
        .collect()
}

/// Non-empty, trimmed text of every leaf element below `node`, in
/// document order. A node without element children is its own leaf.
pub fn paragraphs(node: Option<Element<'_>>) -> Vec<String> {
    let node = match node {
        Some(node) => node,
        None => return Vec::new(),
    };

    let mut found = Vec::new();
    let mut todo = vec![node];

    while let Some(e) = todo.pop() {
        let mut element_children = e.element_children();
        if element_children.is_empty() {
            let text = e.text_content();
            let text = text.trim();
            if !text.is_empty() {
                found.push(text.to_owned());
            }
        } else {
            element_children.reverse();
            todo.extend(element_children);
        }
    }

    found
}

/// Trimmed text of an attribute.
pub fn attribute_text(node: Option<Element<'_>>, name: &str) -> Option<String> {
    node?
        .attribute_value(name)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Fragment;

    fn fragment(xml: &str) -> Fragment {
        Fragment::parse(xml).unwrap()
    }

    #[test]
    fn scalar_text_trims_the_first_match() {
        let f = fragment("<keywordset><keywordthesaurus>  LTER  </keywordthesaurus><keywordthesaurus>x</keywordthesaurus></keywordset>");

        assert_eq!(Some("LTER".to_owned()), scalar_text(Some(f.element()), "keywordThesaurus"));
    }

    #[test]
    fn scalar_text_of_a_missing_child_or_node_is_none() {
        let f = fragment("<keywordset/>");

        assert_eq!(None, scalar_text(Some(f.element()), "keywordThesaurus"));
        assert_eq!(None, scalar_text(None, "keywordThesaurus"));
    }

    #[test]
    fn scalar_text_only_looks_at_direct_children() {
        let f = fragment("<a><b><c>deep</c></b></a>");

        assert_eq!(None, scalar_text(Some(f.element()), "c"));
        assert_eq!(Some("deep".to_owned()), scalar_text(Some(f.element()), "b"));
    }

    #[test]
    fn non_empty_text_treats_blank_as_absent() {
        let f = fragment("<a><b>   </b></a>");

        assert_eq!(Some(String::new()), scalar_text(Some(f.element()), "b"));
        assert_eq!(None, non_empty_text(Some(f.element()), "b"));
    }

    #[test]
    fn list_text_keeps_document_order() {
        let f = fragment("<keywordset><keyword>soil</keyword><other/><keyword> water </keyword></keywordset>");

        assert_eq!(vec!["soil", "water"], list_text(Some(f.element()), "keyword"));
        assert!(list_text(None, "keyword").is_empty());
    }

    #[test]
    fn paragraphs_flatten_leaves_in_order() {
        let f = fragment(
            "<abstract><section><title>Intro</title><para>One</para></section><para> </para><para>Two</para></abstract>",
        );

        assert_eq!(vec!["Intro", "One", "Two"], paragraphs(Some(f.element())));
    }

    #[test]
    fn paragraphs_of_plain_text() {
        let f = fragment("<funding>  NSF  </funding>");

        assert_eq!(vec!["NSF"], paragraphs(Some(f.element())));
        assert!(paragraphs(None).is_empty());
    }

    #[test]
    fn descendant_follows_a_path() {
        let f = fragment("<methods><sampling><studyextent><description><para>x</para></description></studyextent></sampling></methods>");

        let found = descendant(Some(f.element()), &["sampling", "studyExtent", "description"]);
        assert_eq!(Some("description"), found.map(|e| e.name()));
        assert!(descendant(Some(f.element()), &["sampling", "missing"]).is_none());
    }

    #[test]
    fn find_searches_depth_first() {
        let f = fragment("<entity><physical><size>10</size><dataformat><size>x</size></dataformat></physical><size>late</size></entity>");

        let found = find(Some(f.element()), "size").map(|e| e.text_content());
        assert_eq!(Some("10".to_owned()), found);
        assert!(find(Some(f.element()), "entity").is_none());
    }

    #[test]
    fn attribute_text_ignores_blank_values() {
        let f = fragment("<url function=' download '/>");
        let g = fragment("<url function=''/>");

        assert_eq!(Some("download".to_owned()), attribute_text(Some(f.element()), "function"));
        assert_eq!(None, attribute_text(Some(g.element()), "function"));
    }
}
