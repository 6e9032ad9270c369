//! Expression evaluation over a `roxmltree` document
//!
//! Node-sets are kept in document order without duplicates. Predicates see
//! proximity positions, which run backwards on reverse axes.

use super::syntax::{Arithmetic, Axis, Comparison, Expr, Function, NodeTest, PathStart, Step};
use super::NodeMatch;
use crate::document::error::PathError;
use roxmltree::{Document, Node};
use std::iter;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Result of evaluating an expression.
#[derive(Debug, Clone)]
pub(super) enum XValue<'a, 'input: 'a> {
    NodeSet(Vec<NodeMatch<'a, 'input>>),
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl<'a, 'input: 'a> XValue<'a, 'input> {
    fn boolean(&self) -> bool {
        match self {
            XValue::NodeSet(nodes) => !nodes.is_empty(),
            XValue::Boolean(b) => *b,
            XValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XValue::Text(s) => !s.is_empty(),
        }
    }

    fn number(&self) -> f64 {
        match self {
            XValue::NodeSet(_) => parse_number(&self.string()),
            XValue::Boolean(b) => f64::from(u8::from(*b)),
            XValue::Number(n) => *n,
            XValue::Text(s) => parse_number(s),
        }
    }

    fn string(&self) -> String {
        match self {
            XValue::NodeSet(nodes) => nodes.first().map(NodeMatch::text).unwrap_or_default(),
            XValue::Boolean(b) => b.to_string(),
            XValue::Number(n) => format_number(*n),
            XValue::Text(s) => s.clone(),
        }
    }
}

/// XPath string to number: optional minus, digits with at most one point.
/// Anything else, including exponents and a leading `+`, is NaN.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if well_formed {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else if (-0.5..0.0).contains(&n) {
        -0.0
    } else {
        (n + 0.5).floor()
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn normalize(nodes: &mut Vec<NodeMatch<'_, '_>>) {
    nodes.sort_by_key(NodeMatch::order_key);
    nodes.dedup_by_key(|n| n.order_key());
}

#[derive(Debug, Clone)]
struct Context<'a, 'input: 'a> {
    node: NodeMatch<'a, 'input>,
    position: usize,
    size: usize,
}

/// Evaluates `expr` with the document node as context.
pub(super) fn evaluate<'a, 'input>(
    expr: &Expr,
    document: &'a Document<'input>,
) -> Result<XValue<'a, 'input>, PathError> {
    let context = Context {
        node: NodeMatch::Node(document.root()),
        position: 1,
        size: 1,
    };
    Engine { document }.eval(expr, &context)
}

struct Engine<'a, 'input: 'a> {
    document: &'a Document<'input>,
}

impl<'a, 'input: 'a> Engine<'a, 'input> {
    fn eval(
        &self,
        expr: &Expr,
        ctx: &Context<'a, 'input>,
    ) -> Result<XValue<'a, 'input>, PathError> {
        Ok(match expr {
            Expr::Or(left, right) => {
                XValue::Boolean(self.eval(left, ctx)?.boolean() || self.eval(right, ctx)?.boolean())
            }
            Expr::And(left, right) => {
                XValue::Boolean(self.eval(left, ctx)?.boolean() && self.eval(right, ctx)?.boolean())
            }
            Expr::Compare(op, left, right) => {
                XValue::Boolean(compare(*op, self.eval(left, ctx)?, self.eval(right, ctx)?))
            }
            Expr::Arithmetic(op, left, right) => XValue::Number(
                op.apply(self.eval(left, ctx)?.number(), self.eval(right, ctx)?.number()),
            ),
            Expr::Negate(inner) => XValue::Number(-self.eval(inner, ctx)?.number()),
            Expr::Union(left, right) => {
                let mut nodes = self.node_set(left, ctx)?;
                nodes.extend(self.node_set(right, ctx)?);
                normalize(&mut nodes);
                XValue::NodeSet(nodes)
            }
            Expr::Literal(value) => XValue::Text(value.clone()),
            Expr::Number(value) => XValue::Number(*value),
            Expr::Call(function, args) => self.call(*function, args, ctx)?,
            Expr::Filter {
                primary,
                predicates,
            } => {
                let nodes = self.node_set(primary, ctx)?;
                XValue::NodeSet(self.filter(nodes, predicates)?)
            }
            Expr::Path { start, steps } => {
                let mut current = match start {
                    PathStart::Root => vec![NodeMatch::Node(self.document.root())],
                    PathStart::Context => vec![ctx.node.clone()],
                    PathStart::Filter(filter) => self.node_set(filter, ctx)?,
                };
                for step in steps {
                    let mut next = Vec::new();
                    for item in &current {
                        next.extend(self.step(step, item)?);
                    }
                    normalize(&mut next);
                    current = next;
                    if current.is_empty() {
                        break;
                    }
                }
                XValue::NodeSet(current)
            }
        })
    }

    fn node_set(
        &self,
        expr: &Expr,
        ctx: &Context<'a, 'input>,
    ) -> Result<Vec<NodeMatch<'a, 'input>>, PathError> {
        match self.eval(expr, ctx)? {
            XValue::NodeSet(nodes) => Ok(nodes),
            _ => Err(PathError::NotANodeSet),
        }
    }

    fn step(
        &self,
        step: &Step,
        item: &NodeMatch<'a, 'input>,
    ) -> Result<Vec<NodeMatch<'a, 'input>>, PathError> {
        let candidates = self
            .axis(step.axis, item)
            .into_iter()
            .filter(|candidate| matches_test(&step.test, step.axis, candidate))
            .collect();
        self.filter(candidates, &step.predicates)
    }

    /// Applies predicates in turn. A number predicate keeps the node at that
    /// position; anything else is converted to a boolean.
    fn filter(
        &self,
        mut nodes: Vec<NodeMatch<'a, 'input>>,
        predicates: &[Expr],
    ) -> Result<Vec<NodeMatch<'a, 'input>>, PathError> {
        for predicate in predicates {
            let size = nodes.len();
            let mut kept = Vec::with_capacity(size);
            for (index, node) in nodes.into_iter().enumerate() {
                let ctx = Context {
                    node,
                    position: index + 1,
                    size,
                };
                let keep = match self.eval(predicate, &ctx)? {
                    XValue::Number(n) => n == ctx.position as f64,
                    other => other.boolean(),
                };
                if keep {
                    kept.push(ctx.node);
                }
            }
            nodes = kept;
        }
        Ok(nodes)
    }

    /// Nodes on `axis` from `item`, in proximity order: document order on
    /// forward axes, nearest first on ancestor and preceding axes.
    fn axis(&self, axis: Axis, item: &NodeMatch<'a, 'input>) -> Vec<NodeMatch<'a, 'input>> {
        match (axis, item) {
            (Axis::SelfAxis, _) => vec![item.clone()],
            (Axis::Child, NodeMatch::Node(node)) => collect_nodes(node.children()),
            (Axis::Descendant, NodeMatch::Node(node)) => collect_nodes(node.descendants().skip(1)),
            (Axis::DescendantOrSelf, NodeMatch::Node(node)) => collect_nodes(node.descendants()),
            (Axis::DescendantOrSelf, NodeMatch::Attribute { .. }) => vec![item.clone()],
            (Axis::Parent, NodeMatch::Node(node)) => collect_nodes(node.parent().into_iter()),
            (Axis::Parent, NodeMatch::Attribute { owner, .. }) => vec![NodeMatch::Node(*owner)],
            (Axis::Ancestor, NodeMatch::Node(node)) => collect_nodes(node.ancestors().skip(1)),
            (Axis::Ancestor, NodeMatch::Attribute { owner, .. }) => collect_nodes(owner.ancestors()),
            (Axis::AncestorOrSelf, NodeMatch::Node(node)) => collect_nodes(node.ancestors()),
            (Axis::AncestorOrSelf, NodeMatch::Attribute { owner, .. }) => iter::once(item.clone())
                .chain(owner.ancestors().map(NodeMatch::Node))
                .collect(),
            (Axis::FollowingSibling, NodeMatch::Node(node)) => {
                collect_nodes(node.next_siblings().skip(1))
            }
            (Axis::PrecedingSibling, NodeMatch::Node(node)) => {
                collect_nodes(node.prev_siblings().skip(1))
            }
            (Axis::Following, _) => {
                let after = match item {
                    NodeMatch::Node(node) => node
                        .descendants()
                        .last()
                        .map_or(node.id(), |last| last.id())
                        .get_usize(),
                    NodeMatch::Attribute { owner, .. } => owner.id().get_usize(),
                };
                collect_nodes(
                    self.document
                        .root()
                        .descendants()
                        .filter(|n| n.id().get_usize() > after),
                )
            }
            (Axis::Preceding, _) => {
                let anchor = match item {
                    NodeMatch::Node(node) => *node,
                    NodeMatch::Attribute { owner, .. } => *owner,
                };
                let ancestors: Vec<usize> = anchor.ancestors().map(|n| n.id().get_usize()).collect();
                let before = anchor.id().get_usize();
                let mut preceding = collect_nodes(self.document.root().descendants().filter(|n| {
                    let id = n.id().get_usize();
                    id < before && !ancestors.contains(&id)
                }));
                preceding.reverse();
                preceding
            }
            (Axis::Attribute, NodeMatch::Node(node)) if node.is_element() => {
                (0..node.attributes().count())
                    .map(|position| NodeMatch::Attribute {
                        owner: *node,
                        position,
                    })
                    .collect()
            }
            // Attributes have no children or siblings; namespace nodes are not modelled.
            _ => Vec::new(),
        }
    }

    fn call(
        &self,
        function: Function,
        args: &[Expr],
        ctx: &Context<'a, 'input>,
    ) -> Result<XValue<'a, 'input>, PathError> {
        let string_arg = |index: usize| -> Result<String, PathError> {
            Ok(self.eval(&args[index], ctx)?.string())
        };
        let number_arg = |index: usize| -> Result<f64, PathError> {
            Ok(self.eval(&args[index], ctx)?.number())
        };
        let string_or_context = || -> Result<String, PathError> {
            match args.first() {
                Some(arg) => Ok(self.eval(arg, ctx)?.string()),
                None => Ok(ctx.node.text()),
            }
        };
        let node_or_context = || -> Result<Option<NodeMatch<'a, 'input>>, PathError> {
            match args.first() {
                Some(arg) => Ok(self.node_set(arg, ctx)?.into_iter().next()),
                None => Ok(Some(ctx.node.clone())),
            }
        };

        Ok(match function {
            Function::Last => XValue::Number(ctx.size as f64),
            Function::Position => XValue::Number(ctx.position as f64),
            Function::Count => XValue::Number(self.node_set(&args[0], ctx)?.len() as f64),
            Function::Id => {
                let ids: Vec<String> = match self.eval(&args[0], ctx)? {
                    XValue::NodeSet(nodes) => nodes
                        .iter()
                        .flat_map(|n| split_tokens(&n.text()))
                        .collect(),
                    other => split_tokens(&other.string()),
                };
                XValue::NodeSet(
                    self.document
                        .root()
                        .descendants()
                        .filter(|n| {
                            n.attribute((XML_NAMESPACE, "id"))
                                .map_or(false, |id| ids.iter().any(|wanted| wanted == id))
                        })
                        .map(NodeMatch::Node)
                        .collect(),
                )
            }
            Function::LocalName => XValue::Text(
                node_or_context()?
                    .map(|n| n.local_name())
                    .unwrap_or_default(),
            ),
            Function::NamespaceUri => XValue::Text(
                node_or_context()?
                    .and_then(|n| n.namespace_uri())
                    .unwrap_or_default(),
            ),
            Function::Name => XValue::Text(
                node_or_context()?
                    .map(|n| n.qualified_name())
                    .unwrap_or_default(),
            ),
            Function::String => XValue::Text(string_or_context()?),
            Function::Concat => {
                let mut joined = String::new();
                for arg in args {
                    joined.push_str(&self.eval(arg, ctx)?.string());
                }
                XValue::Text(joined)
            }
            Function::StartsWith => XValue::Boolean(string_arg(0)?.starts_with(&string_arg(1)?)),
            Function::Contains => XValue::Boolean(string_arg(0)?.contains(&string_arg(1)?)),
            Function::SubstringBefore => {
                let (haystack, needle) = (string_arg(0)?, string_arg(1)?);
                XValue::Text(
                    haystack
                        .find(&needle)
                        .map(|at| haystack[..at].to_string())
                        .unwrap_or_default(),
                )
            }
            Function::SubstringAfter => {
                let (haystack, needle) = (string_arg(0)?, string_arg(1)?);
                XValue::Text(
                    haystack
                        .find(&needle)
                        .map(|at| haystack[at + needle.len()..].to_string())
                        .unwrap_or_default(),
                )
            }
            Function::Substring => {
                let text = string_arg(0)?;
                let start = round_half_up(number_arg(1)?);
                let end = if args.len() > 2 {
                    start + round_half_up(number_arg(2)?)
                } else {
                    f64::INFINITY
                };
                XValue::Text(
                    text.chars()
                        .enumerate()
                        .filter(|(index, _)| {
                            let position = (index + 1) as f64;
                            position >= start && position < end
                        })
                        .map(|(_, c)| c)
                        .collect(),
                )
            }
            Function::StringLength => {
                XValue::Number(string_or_context()?.chars().count() as f64)
            }
            Function::NormalizeSpace => XValue::Text(
                string_or_context()?
                    .split(is_space)
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Function::Translate => {
                let (text, from, to) = (string_arg(0)?, string_arg(1)?, string_arg(2)?);
                let to: Vec<char> = to.chars().collect();
                XValue::Text(
                    text.chars()
                        .filter_map(|c| match from.chars().position(|f| f == c) {
                            Some(index) => to.get(index).copied(),
                            None => Some(c),
                        })
                        .collect(),
                )
            }
            Function::Boolean => XValue::Boolean(self.eval(&args[0], ctx)?.boolean()),
            Function::Not => XValue::Boolean(!self.eval(&args[0], ctx)?.boolean()),
            Function::True => XValue::Boolean(true),
            Function::False => XValue::Boolean(false),
            Function::Lang => {
                let wanted = string_arg(0)?.to_lowercase();
                let anchor = match &ctx.node {
                    NodeMatch::Node(node) => *node,
                    NodeMatch::Attribute { owner, .. } => *owner,
                };
                let declared = anchor
                    .ancestors()
                    .find_map(|n| n.attribute((XML_NAMESPACE, "lang")))
                    .map(str::to_lowercase);
                XValue::Boolean(declared.map_or(false, |lang| {
                    lang == wanted || lang.starts_with(&format!("{}-", wanted))
                }))
            }
            Function::Number => XValue::Number(match args.first() {
                Some(arg) => self.eval(arg, ctx)?.number(),
                None => parse_number(&ctx.node.text()),
            }),
            Function::Sum => XValue::Number(
                self.node_set(&args[0], ctx)?
                    .iter()
                    .map(|n| parse_number(&n.text()))
                    .sum(),
            ),
            Function::Floor => XValue::Number(number_arg(0)?.floor()),
            Function::Ceiling => XValue::Number(number_arg(0)?.ceil()),
            Function::Round => XValue::Number(round_half_up(number_arg(0)?)),
        })
    }
}

fn collect_nodes<'a, 'input: 'a>(
    nodes: impl Iterator<Item = Node<'a, 'input>>,
) -> Vec<NodeMatch<'a, 'input>> {
    nodes.map(NodeMatch::Node).collect()
}

fn split_tokens(text: &str) -> Vec<String> {
    text.split(is_space)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn matches_test(test: &NodeTest, axis: Axis, candidate: &NodeMatch<'_, '_>) -> bool {
    match (test, candidate) {
        (NodeTest::Node, _) => true,
        (NodeTest::Text, NodeMatch::Node(node)) => node.is_text(),
        (NodeTest::Comment, NodeMatch::Node(node)) => node.is_comment(),
        (NodeTest::ProcessingInstruction(target), NodeMatch::Node(node)) => {
            node.pi().map_or(false, |pi| {
                target.as_deref().map_or(true, |wanted| wanted == pi.target)
            })
        }
        (NodeTest::Name { prefix, local }, NodeMatch::Attribute { owner, .. })
            if axis == Axis::Attribute =>
        {
            let Some(attribute) = candidate.attribute() else {
                return false;
            };
            let namespace_matches = match prefix {
                Some(prefix) => owner
                    .lookup_namespace_uri(Some(prefix))
                    .map_or(false, |uri| attribute.namespace() == Some(uri)),
                None => local.is_none() || attribute.namespace().is_none(),
            };
            namespace_matches && local.as_deref().map_or(true, |name| name == attribute.name())
        }
        (NodeTest::Name { prefix, local }, NodeMatch::Node(node))
            if axis != Axis::Attribute && node.is_element() =>
        {
            let tag = node.tag_name();
            let namespace_matches = match prefix {
                Some(prefix) => node
                    .lookup_namespace_uri(Some(prefix))
                    .map_or(false, |uri| tag.namespace() == Some(uri)),
                None => true,
            };
            namespace_matches && local.as_deref().map_or(true, |name| name == tag.name())
        }
        _ => false,
    }
}

/// Three-way comparison rules of XPath 1.0: node-sets compare existentially
/// through their string values, except against booleans.
fn compare(op: Comparison, left: XValue<'_, '_>, right: XValue<'_, '_>) -> bool {
    match (left, right) {
        (XValue::NodeSet(left), XValue::NodeSet(right)) => {
            let right: Vec<String> = right.iter().map(NodeMatch::text).collect();
            left.iter().any(|l| {
                let l = l.text();
                right.iter().any(|r| {
                    compare_scalar(op, &XValue::Text(l.clone()), &XValue::Text(r.clone()))
                })
            })
        }
        (XValue::NodeSet(nodes), b @ XValue::Boolean(_)) => {
            compare_scalar(op, &XValue::Boolean(!nodes.is_empty()), &b)
        }
        (b @ XValue::Boolean(_), XValue::NodeSet(nodes)) => {
            compare_scalar(op, &b, &XValue::Boolean(!nodes.is_empty()))
        }
        (XValue::NodeSet(nodes), other) => nodes
            .iter()
            .any(|n| compare_scalar(op, &XValue::Text(n.text()), &other)),
        (other, XValue::NodeSet(nodes)) => nodes
            .iter()
            .any(|n| compare_scalar(op, &other, &XValue::Text(n.text()))),
        (left, right) => compare_scalar(op, &left, &right),
    }
}

fn compare_scalar(op: Comparison, left: &XValue<'_, '_>, right: &XValue<'_, '_>) -> bool {
    let either = |kind: fn(&XValue<'_, '_>) -> bool| kind(left) || kind(right);

    match op {
        Comparison::Eq | Comparison::NotEq => {
            let equal = if either(|v| matches!(v, XValue::Boolean(_))) {
                left.boolean() == right.boolean()
            } else if either(|v| matches!(v, XValue::Number(_))) {
                left.number() == right.number()
            } else {
                left.string() == right.string()
            };
            equal == (op == Comparison::Eq)
        }
        Comparison::Lt => left.number() < right.number(),
        Comparison::Le => left.number() <= right.number(),
        Comparison::Gt => left.number() > right.number(),
        Comparison::Ge => left.number() >= right.number(),
    }
}
