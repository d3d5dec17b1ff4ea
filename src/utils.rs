//! Rendering helpers for the `jsift` binary.

use anyhow::Context as _;
use colored::Colorize;
use std::io::{self, ErrorKind, Write};

use crate::reader::{Elements, Fields, JsonType, Node};

// ==============================================================================
// Colorized JSON Output
// ==============================================================================

/// Write a single matched node as colorized JSON followed by a newline.
/// Silently returns `Ok(())` on broken pipe so that piping to tools like
/// `less` or `head` exits cleanly.
///
/// # Errors
///
/// Returns an error if the node is malformed or writing to `writer` fails.
pub fn write_colored_match<W: Write>(
    writer: &mut W,
    node: Node<'_>,
    pretty: bool,
) -> anyhow::Result<()> {
    let result = write_colored_json(writer, node, pretty)
        .and_then(|()| writeln!(writer).map_err(anyhow::Error::from));

    match result {
        Ok(()) => Ok(()),
        Err(err)
            if err
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == ErrorKind::BrokenPipe) =>
        {
            Ok(())
        }
        Err(err) => Err(err).context("write colorized JSON to stdout"),
    }
}

/// Write a line of plain text, treating a broken pipe as success.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails for any other reason.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> anyhow::Result<()> {
    match writeln!(writer, "{line}") {
        Err(err) if err.kind() != ErrorKind::BrokenPipe => {
            Err(err).context("write to stdout")
        }
        _ => Ok(()),
    }
}

/// Pending work while rendering a node.
enum Render<'a> {
    Value { node: Node<'a>, indent: usize },
    Elements { elements: Elements<'a>, indent: usize, first: bool },
    Fields { fields: Fields<'a>, indent: usize, first: bool },
}

/// Write a JSON node with syntax highlighting. Strings and numbers are
/// written as they appear in the source. Nesting is tracked on an explicit
/// stack.
fn write_colored_json<W: Write>(
    writer: &mut W,
    node: Node<'_>,
    pretty: bool,
) -> anyhow::Result<()> {
    let mut stack = vec![Render::Value { node, indent: 0 }];

    while let Some(step) = stack.pop() {
        match step {
            Render::Value { node, indent } => match node.kind()? {
                JsonType::Null => write!(writer, "{}", "null".red().dimmed())?,
                JsonType::Bool => {
                    write!(writer, "{}", node.as_bool()?.to_string().yellow().bold())?;
                }
                JsonType::Number => {
                    write!(writer, "{}", node.to_json_string()?.yellow())?;
                }
                JsonType::String => {
                    write!(writer, "{}", node.to_json_string()?.green())?;
                }
                JsonType::Array => {
                    write!(writer, "[")?;
                    stack.push(Render::Elements {
                        elements: node.elements()?,
                        indent,
                        first: true,
                    });
                }
                JsonType::Object => {
                    write!(writer, "{{")?;
                    stack.push(Render::Fields {
                        fields: node.fields()?,
                        indent,
                        first: true,
                    });
                }
            },
            Render::Elements { mut elements, indent, first } => {
                if let Some(item) = elements.next() {
                    let item = item?;
                    open_entry(writer, indent, first, pretty)?;
                    stack.push(Render::Elements { elements, indent, first: false });
                    stack.push(Render::Value { node: item, indent: indent + 2 });
                } else {
                    close_container(writer, indent, first, pretty, "]")?;
                }
            }
            Render::Fields { mut fields, indent, first } => {
                if let Some(field) = fields.next() {
                    let (key, value) = field?;
                    open_entry(writer, indent, first, pretty)?;
                    // Re-serialize to get proper JSON escaping and quoting
                    let quoted_key = serde_json::to_string(key.as_str()?.as_ref())?;
                    write!(writer, "{}", quoted_key.cyan())?;
                    if pretty {
                        write!(writer, ": ")?;
                    } else {
                        write!(writer, ":")?;
                    }
                    stack.push(Render::Fields { fields, indent, first: false });
                    stack.push(Render::Value { node: value, indent: indent + 2 });
                } else {
                    close_container(writer, indent, first, pretty, "}")?;
                }
            }
        }
    }
    Ok(())
}

/// Separator and indentation before an array element or object field.
fn open_entry<W: Write>(
    writer: &mut W,
    indent: usize,
    first: bool,
    pretty: bool,
) -> io::Result<()> {
    if !first {
        write!(writer, ",")?;
    }
    if pretty {
        writeln!(writer)?;
        write!(writer, "{:width$}", "", width = indent + 2)?;
    }
    Ok(())
}

/// Closing bracket, on its own line when the container had entries.
fn close_container<W: Write>(
    writer: &mut W,
    indent: usize,
    empty: bool,
    pretty: bool,
    bracket: &str,
) -> io::Result<()> {
    if pretty && !empty {
        writeln!(writer)?;
        write!(writer, "{:width$}", "", width = indent)?;
    }
    write!(writer, "{bracket}")
}
