/*!
# Path Evaluator

Interprets a [`PathProgram`] against a [`Node`] from the on-demand reader.

The walk is depth-first over pairs of (context node, remaining selectors).
It keeps its own work stack instead of recursing, so nesting depth costs heap
rather than call stack, and wildcard and recursive-descent expansions are
pulled from lazy child iterators one node at a time. Matches are handed to
the consumer in document order the moment they are found; a consumer error
or a reader error stops the walk immediately, and matches already delivered
stay delivered.
*/
use crate::path::{PathProgram, Selector};
use crate::reader::{Children, JsonError, JsonType, Node};

/// One unit of pending work.
enum Frame<'a> {
    /// Apply `program[pos..]` to `node`.
    Apply { node: Node<'a>, pos: usize },
    /// Apply `program[pos..]` to every remaining child, in order.
    EachChild { children: Children<'a>, pos: usize },
    /// Apply `program[pos..]` to `node` and then to each of its descendants
    /// in pre-order.
    Descend { node: Node<'a>, pos: usize },
    /// Continue a pre-order walk over the remaining children.
    DescendChildren { children: Children<'a>, pos: usize },
}

/// Runs `program` against `root`, calling `consumer` once per match.
///
/// Returns the number of matches delivered. Zero matches is a success.
///
/// # Errors
///
/// Returns the consumer's error verbatim as soon as it reports one, or a
/// [`JsonError`] (converted into `E`) when the reader meets malformed input
/// on the way.
///
/// # Examples
///
/// ```
/// use jsonsift::path::{compile, evaluate};
/// use jsonsift::reader::{Document, JsonError};
///
/// let doc = Document::parse(br#"{"a": [1, 2, 3]}"#).unwrap();
/// let program = compile("$.a[*]").unwrap();
/// let mut seen = Vec::new();
/// let count = evaluate(&program, doc.root(), |node| {
///     seen.push(node.to_json_string()?);
///     Ok::<(), JsonError>(())
/// })
/// .unwrap();
/// assert_eq!(count, 3);
/// assert_eq!(seen, ["1", "2", "3"]);
/// ```
pub fn evaluate<'a, E, F>(
    program: &PathProgram,
    root: Node<'a>,
    mut consumer: F,
) -> Result<usize, E>
where
    E: From<JsonError>,
    F: FnMut(Node<'a>) -> Result<(), E>,
{
    let selectors = program.selectors();
    let mut matches = 0;

    // The root selector only anchors the walk
    let start = usize::from(selectors.first() == Some(&Selector::Root));
    let mut stack = vec![Frame::Apply { node: root, pos: start }];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Apply { node, pos } => {
                let Some(selector) = selectors.get(pos) else {
                    consumer(node)?;
                    matches += 1;
                    continue;
                };
                let next = pos + 1;
                match selector {
                    Selector::Root => {
                        stack.push(Frame::Apply { node, pos: next });
                    }
                    Selector::ChildByName(name) => {
                        if let Some(child) = node.get_field(name)? {
                            stack.push(Frame::Apply { node: child, pos: next });
                        }
                    }
                    Selector::ChildByIndex(index) => {
                        if let Some(child) = node.get_index(*index)? {
                            stack.push(Frame::Apply { node: child, pos: next });
                        }
                    }
                    Selector::ChildByNameOrIndex { name, index } => {
                        let child = match node.kind()? {
                            JsonType::Array => match index {
                                Some(index) => node.get_index(*index)?,
                                None => None,
                            },
                            JsonType::Object => node.get_field(name)?,
                            _ => None,
                        };
                        if let Some(child) = child {
                            stack.push(Frame::Apply { node: child, pos: next });
                        }
                    }
                    Selector::Wildcard => {
                        stack.push(Frame::EachChild {
                            children: node.children()?,
                            pos: next,
                        });
                    }
                    Selector::RecursiveDescent => {
                        stack.push(Frame::Descend { node, pos: next });
                    }
                }
            }
            Frame::EachChild { mut children, pos } => {
                if let Some(child) = children.next() {
                    let child = child?;
                    // Siblings resume only after this child's matches
                    stack.push(Frame::EachChild { children, pos });
                    stack.push(Frame::Apply { node: child, pos });
                }
            }
            Frame::Descend { node, pos } => {
                stack.push(Frame::DescendChildren {
                    children: node.children()?,
                    pos,
                });
                stack.push(Frame::Apply { node, pos });
            }
            Frame::DescendChildren { mut children, pos } => {
                if let Some(child) = children.next() {
                    let child = child?;
                    stack.push(Frame::DescendChildren { children, pos });
                    stack.push(Frame::Descend { node: child, pos });
                }
            }
        }
    }

    log::trace!("`{program}` produced {matches} match(es)");

    Ok(matches)
}
