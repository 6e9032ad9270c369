//! XPath 1.0 evaluation over `roxmltree` documents
//!
//! [`XPathEvaluator`] compiles a locator into an expression tree and evaluates
//! it with the document node as context. The whole XPath 1.0 expression
//! language is understood: every axis except `namespace::`, node tests,
//! predicates, filter expressions, operators and the core function library.
//! Variables are never bound. A locator must select nodes; the first one in
//! document order is the match.
//!
//! Name tests with a prefix resolve it against the namespace declarations in
//! scope on the candidate node and compare namespace and local name. Element
//! name tests without a prefix compare the local name only, so documents with
//! a default namespace can be addressed without a prefix.

mod eval;
mod lexer;
mod syntax;

use super::error::PathError;
use roxmltree::{Attribute, Document, Node};

/// Resolves a locator expression to at most one node of a document.
pub trait PathEvaluator: Send + Sync {
    fn evaluate<'a, 'input>(
        &self,
        expression: &str,
        document: &'a Document<'input>,
    ) -> Result<Option<NodeMatch<'a, 'input>>, PathError>;
}

/// Default evaluator. Compiles the expression on every call and returns the
/// first match in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct XPathEvaluator;

impl PathEvaluator for XPathEvaluator {
    fn evaluate<'a, 'input>(
        &self,
        expression: &str,
        document: &'a Document<'input>,
    ) -> Result<Option<NodeMatch<'a, 'input>>, PathError> {
        CompiledPath::compile(expression)?.select_first(document)
    }
}

/// A node a locator resolved to: a tree node or one attribute of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeMatch<'a, 'input: 'a> {
    Node(Node<'a, 'input>),
    /// Attribute number `position` of `owner`, in source order.
    Attribute {
        owner: Node<'a, 'input>,
        position: usize,
    },
}

impl<'a, 'input: 'a> NodeMatch<'a, 'input> {
    /// String value of the match: attribute value, text or comment content,
    /// processing instruction data, or for elements the concatenation of all
    /// descendant text.
    pub fn text(&self) -> String {
        match self {
            NodeMatch::Node(node) if node.is_element() || node.is_root() => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
            NodeMatch::Node(node) if node.is_pi() => node
                .pi()
                .and_then(|pi| pi.value)
                .unwrap_or_default()
                .to_string(),
            NodeMatch::Node(node) => node.text().unwrap_or_default().to_string(),
            NodeMatch::Attribute { .. } => self
                .attribute()
                .map(|a| a.value().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, NodeMatch::Attribute { .. })
    }

    pub fn attribute(&self) -> Option<Attribute<'a, 'input>> {
        match self {
            NodeMatch::Attribute { owner, position } => owner.attributes().nth(*position),
            NodeMatch::Node(_) => None,
        }
    }

    /// Local part of the name; empty for unnamed nodes.
    pub fn local_name(&self) -> String {
        match self {
            NodeMatch::Node(node) if node.is_element() => node.tag_name().name().to_string(),
            NodeMatch::Node(node) => node
                .pi()
                .map(|pi| pi.target.to_string())
                .unwrap_or_default(),
            NodeMatch::Attribute { .. } => self
                .attribute()
                .map(|a| a.name().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn namespace_uri(&self) -> Option<String> {
        match self {
            NodeMatch::Node(node) => node.tag_name().namespace().map(str::to_string),
            NodeMatch::Attribute { .. } => self
                .attribute()
                .and_then(|a| a.namespace().map(str::to_string)),
        }
    }

    /// Name with the prefix bound to its namespace at this node, if any.
    pub fn qualified_name(&self) -> String {
        let scope = match self {
            NodeMatch::Node(node) => *node,
            NodeMatch::Attribute { owner, .. } => *owner,
        };
        let local = self.local_name();
        match self
            .namespace_uri()
            .and_then(|uri| scope.lookup_prefix(&uri))
            .filter(|prefix| !prefix.is_empty())
        {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local,
        }
    }

    /// Document order: a node, then its attributes in source order.
    fn order_key(&self) -> (usize, usize) {
        match self {
            NodeMatch::Node(node) => (node.id().get_usize(), 0),
            NodeMatch::Attribute { owner, position } => (owner.id().get_usize(), position + 1),
        }
    }
}

/// A compiled locator expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPath {
    expression: String,
    expr: syntax::Expr,
}

impl CompiledPath {
    pub fn compile(expression: &str) -> Result<Self, PathError> {
        let src = expression.trim();
        if src.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self {
            expression: expression.to_string(),
            expr: syntax::parse(src)?,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// All selected nodes in document order. Fails when the expression
    /// evaluates to a string, number or boolean.
    pub fn select<'a, 'input>(
        &self,
        document: &'a Document<'input>,
    ) -> Result<Vec<NodeMatch<'a, 'input>>, PathError> {
        match eval::evaluate(&self.expr, document)? {
            eval::XValue::NodeSet(nodes) => Ok(nodes),
            _ => Err(PathError::NotANodeSet),
        }
    }

    pub fn select_first<'a, 'input>(
        &self,
        document: &'a Document<'input>,
    ) -> Result<Option<NodeMatch<'a, 'input>>, PathError> {
        Ok(self.select(document)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    const PETS: &str = r#"<?xml version="1.0"?>
<pets>
   <item id="PetRequestId">
       <name>Meatball</name>
       <breed>Persian</breed>
       <age>
           <years>3</years>
           <months>4</months>
       </age>
       <favourite>true</favourite>
       <description color="white"/>
   </item>
   <item id="Second">
       <name>Noodle</name>
   </item>
</pets>"#;

    const SHORT: &str = r#"<pets><item id="A"><name>Rex</name></item><item id="B"/></pets>"#;

    fn first_in(xml: &str, expression: &str) -> Option<String> {
        let document = Document::parse(xml).unwrap();
        XPathEvaluator
            .evaluate(expression, &document)
            .unwrap()
            .map(|m| m.text())
    }

    fn first(expression: &str) -> Option<String> {
        first_in(PETS, expression)
    }

    #[test]
    fn test_attribute_path() {
        assert_eq!(first("/pets/item/@id").as_deref(), Some("PetRequestId"));
        assert_eq!(
            first("/pets/item/description/@color").as_deref(),
            Some("white")
        );
    }

    #[test]
    fn test_text_path() {
        assert_eq!(first("/pets/item/age/years/text()").as_deref(), Some("3"));
        assert_eq!(first("/pets/item/name/text()").as_deref(), Some("Meatball"));
    }

    #[test]
    fn test_missing_nodes_resolve_to_none() {
        assert_eq!(first("/pets/item/age/days/text()"), None);
        assert_eq!(first("/pets/item/description/text()"), None);
        assert_eq!(first("/pets/item/@missing"), None);
        assert_eq!(first("/nope"), None);
        assert_eq!(first("/pets/item[0]"), None);
    }

    #[test]
    fn test_element_text_is_concatenated() {
        let age = first("/pets/item/age").unwrap();
        assert!(age.contains('3'));
        assert!(age.contains('4'));
        assert_eq!(first("/pets/item/favourite").as_deref(), Some("true"));
    }

    #[test]
    fn test_relative_path_starts_at_document() {
        assert_eq!(first("pets/item/@id").as_deref(), Some("PetRequestId"));
        assert_eq!(first("years"), None);
    }

    #[test]
    fn test_descendant_and_wildcard() {
        assert_eq!(first("//years/text()").as_deref(), Some("3"));
        assert_eq!(first("/pets/*/breed/text()").as_deref(), Some("Persian"));
        assert_eq!(first("//item/@*").as_deref(), Some("PetRequestId"));
    }

    #[test]
    fn test_parent_and_self() {
        assert_eq!(first("//years/../months/text()").as_deref(), Some("4"));
        assert_eq!(first("/pets/item/./name/text()").as_deref(), Some("Meatball"));
        assert_eq!(
            first("/pets/item/@id/..").map(|t| t.contains("Meatball")),
            Some(true)
        );
    }

    #[test]
    fn test_predicates() {
        assert_eq!(first("/pets/item[2]/name/text()").as_deref(), Some("Noodle"));
        assert_eq!(
            first("/pets/item[@id='Second']/name/text()").as_deref(),
            Some("Noodle")
        );
        assert_eq!(
            first("/pets/item[name=\"Noodle\"]/@id").as_deref(),
            Some("Second")
        );
        assert_eq!(first("/pets/item[breed]/@id").as_deref(), Some("PetRequestId"));
        assert_eq!(first("/pets/item[3]"), None);
    }

    #[parameterized(
        last_function = { "/pets/item[last()]/@id", "B" },
        position_comparison = { "/pets/item[position()=2]/@id", "B" },
        explicit_child_axis = { "child::pets/item/@id", "A" },
        not_equal = { "/pets/item[@id!='A']/@id", "B" },
        parenthesised_filter = { "(/pets/item)[2]/@id", "B" },
        explicit_attribute_axis = { "/pets/item[2]/attribute::id", "B" },
        count_in_predicate = { "/pets[count(item)=2]/item/@id", "A" },
        arithmetic_position = { "/pets/item[position() = 3 - 1]/@id", "B" },
        boolean_operators = { "/pets/item[@id='B' or name='Rex' and false()]/@id", "B" },
        negation = { "/pets/item[not(name)]/@id", "B" },
        union_keeps_document_order = { "(/pets/item[2] | /pets/item[1])/@id", "A" },
        last_of_union = { "(//item/@id | //name)[last()]", "B" },
        following_sibling = { "/pets/item[1]/following-sibling::item/@id", "B" },
        preceding_sibling = { "/pets/item[2]/preceding-sibling::*[1]/@id", "A" },
        ancestor_nearest_first = { "//name/ancestor::*[1]/@id", "A" },
        ancestor_or_self = { "//name/ancestor-or-self::pets/item[2]/@id", "B" },
        descendant_axis = { "/descendant::name", "Rex" },
        following_axis = { "//name/following::item/@id", "B" },
        preceding_axis = { "/pets/item[2]/preceding::name", "Rex" },
        self_axis = { "//*[self::name]", "Rex" },
        parent_axis = { "//name/parent::item/@id", "A" },
    )]
    fn test_core_expressions(expression: &str, expected: &str) {
        assert_eq!(first_in(SHORT, expression).as_deref(), Some(expected));
    }

    #[parameterized(
        contains = { "//item[contains(name, 'e')]/@id", "A" },
        starts_with = { "//item[starts-with(@id, 'B')]/@id", "B" },
        string_length = { "//name[string-length() = 3]", "Rex" },
        concat = { "//item[concat(@id, '-', name) = 'A-Rex']/@id", "A" },
        substring = { "//name[substring(., 2, 1) = 'e']", "Rex" },
        substring_before = { "//name[substring-before(., 'x') = 'Re']", "Rex" },
        substring_after = { "//name[substring-after(., 'R') = 'ex']", "Rex" },
        translate = { "//name[translate(., 'Rex', 'REX') = 'REX']", "Rex" },
        normalize_space = { "//item[normalize-space(' a  b ') = 'a b']/@id", "A" },
        local_name = { "//*[local-name() = 'name']", "Rex" },
        name = { "//*[name() = 'item'][2]/@id", "B" },
        number_and_sum = { "//item[sum(//nothing) + number('2') = position()]/@id", "B" },
        rounding = { "//item[round(1.5) = 2 and floor(2.7) = 2 and ceiling(1.2) = 2]/@id", "A" },
        string_of_number = { "//item[string(1 div 0) = 'Infinity']/@id", "A" },
        boolean_conversion = { "//item[boolean(@id) = true()]/@id", "A" },
    )]
    fn test_core_functions(expression: &str, expected: &str) {
        assert_eq!(first_in(SHORT, expression).as_deref(), Some(expected));
    }

    #[test]
    fn test_node_type_tests() {
        let xml = "<r><!--note--><?target data?>text</r>";
        assert_eq!(first_in(xml, "/r/comment()").as_deref(), Some("note"));
        assert_eq!(
            first_in(xml, "/r/processing-instruction('target')").as_deref(),
            Some("data")
        );
        assert_eq!(first_in(xml, "/r/processing-instruction('other')"), None);
        assert_eq!(first_in(xml, "/r/node()[last()]").as_deref(), Some("text"));
    }

    #[test]
    fn test_select_returns_document_order() {
        let document = Document::parse(PETS).unwrap();
        let path = CompiledPath::compile("//name/text()").unwrap();
        let names: Vec<String> = path
            .select(&document)
            .unwrap()
            .iter()
            .map(NodeMatch::text)
            .collect();
        assert_eq!(names, vec!["Meatball", "Noodle"]);
    }

    #[test]
    fn test_attributes_follow_their_element() {
        let document = Document::parse(r#"<r><a x="1" y="2"/><b z="3"/></r>"#).unwrap();
        let path = CompiledPath::compile("//@z | //b | //@y | //a | //@x").unwrap();
        let order: Vec<String> = path
            .select(&document)
            .unwrap()
            .iter()
            .map(|m| m.local_name())
            .collect();
        assert_eq!(order, vec!["a", "x", "y", "b", "z"]);
    }

    #[test]
    fn test_root_path() {
        let document = Document::parse("<a>x</a>").unwrap();
        let root = CompiledPath::compile("/")
            .unwrap()
            .select_first(&document)
            .unwrap();
        assert_eq!(root.map(|m| m.text()).as_deref(), Some("x"));
    }

    #[test]
    fn test_prefixed_names_resolve_namespaces() {
        let xml = r#"<p:a xmlns:p="urn:p" xmlns:same="urn:p"><p:b>1</p:b></p:a>"#;
        assert_eq!(first_in(xml, "/p:a/p:b/text()").as_deref(), Some("1"));
        assert_eq!(first_in(xml, "/same:a/same:b/text()").as_deref(), Some("1"));
        assert_eq!(first_in(xml, "/p:*/p:*").as_deref(), Some("1"));
        assert_eq!(first_in(xml, "/a/b").as_deref(), Some("1"));
        assert_eq!(
            first_in(xml, "//*[namespace-uri() = 'urn:p' and local-name() = 'b']").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_prefix_bound_to_other_namespace_does_not_match() {
        let other = r#"<q:a xmlns:q="urn:other">1</q:a>"#;
        assert_eq!(first_in(other, "/p:a"), None);
        assert_eq!(first_in(other, "/q:a").as_deref(), Some("1"));

        let rebound = r#"<r xmlns:p="urn:p"><p:a xmlns:p="urn:q">2</p:a></r>"#;
        assert_eq!(first_in(rebound, "//p:a").as_deref(), Some("2"));
        assert_eq!(
            first_in(rebound, "//p:a[namespace-uri() = 'urn:q']").as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_prefixed_attributes() {
        let xml = r#"<r xmlns:x="urn:x"><e x:id="ns" id="plain"/></r>"#;
        assert_eq!(first_in(xml, "//e/@id").as_deref(), Some("plain"));
        assert_eq!(first_in(xml, "//e/@x:id").as_deref(), Some("ns"));
        assert_eq!(first_in(xml, "//e/@y:id"), None);
    }

    #[parameterized(
        count = { "count(//item)" },
        literal = { "'text'" },
        comparison = { "/pets/item = 'x'" },
        union_of_number = { "1 | //item" },
    )]
    fn test_non_node_set_results_are_errors(expression: &str) {
        let document = Document::parse(SHORT).unwrap();
        assert_eq!(
            XPathEvaluator.evaluate(expression, &document),
            Err(PathError::NotANodeSet)
        );
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(CompiledPath::compile("   "), Err(PathError::Empty));
        assert_eq!(CompiledPath::compile("/pets/"), Err(PathError::UnexpectedEnd));
        assert_eq!(
            CompiledPath::compile("/pets/item/count()"),
            Err(PathError::UnknownNodeTest("count".to_string()))
        );
        assert!(matches!(
            CompiledPath::compile("/pets/[id]"),
            Err(PathError::UnexpectedChar { found: '[', .. })
        ));
        assert!(matches!(
            CompiledPath::compile("/pets/item[]"),
            Err(PathError::UnexpectedChar { found: ']', .. })
        ));
        assert!(matches!(
            CompiledPath::compile("/pets/item[@id='x]"),
            Err(PathError::UnterminatedLiteral { .. })
        ));
        assert_eq!(CompiledPath::compile("child::"), Err(PathError::UnexpectedEnd));
        assert_eq!(
            CompiledPath::compile("/pets/item[1"),
            Err(PathError::UnexpectedEnd)
        );
        assert_eq!(
            CompiledPath::compile("/pets/item[shout(@id)]"),
            Err(PathError::UnknownFunction("shout".to_string()))
        );
        assert_eq!(
            CompiledPath::compile("/pets/item[last(1)]"),
            Err(PathError::ArgumentCount {
                function: "last".to_string(),
                found: 1
            })
        );
    }
}
