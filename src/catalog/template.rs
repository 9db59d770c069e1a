//! Job template rendering
//!
//! Job templates are mustache-style text producing a scheduler job spec.
//! Supported tags:
//! - `{{a.b}}` value at a dotted path, strings JSON-escaped
//! - `{{{a.b}}}` value at a dotted path, inserted raw
//! - `{{#a.b}}...{{/a.b}}` block rendered when the value is truthy
//! - `{{^a.b}}...{{/a.b}}` block rendered when the value is falsy or missing
//! - `{{! comment}}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::ResolvedOptions;
use crate::error::{self, Result};

/// Unrendered job template text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobTemplate(String);

/// Cluster addresses and credentials exposed to templates under `cluster.*`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterContext {
    pub marathon: String,
    pub mesos: String,
    pub zookeeper: String,
    pub principal: Option<String>,
    pub secret: Option<String>,
}

impl ClusterContext {
    fn to_value(&self) -> Value {
        let mut cluster = Map::new();
        cluster.insert("marathon".into(), Value::String(self.marathon.clone()));
        cluster.insert("mesos".into(), Value::String(self.mesos.clone()));
        cluster.insert("zookeeper".into(), Value::String(self.zookeeper.clone()));
        if let Some(principal) = &self.principal {
            cluster.insert("principal".into(), Value::String(principal.clone()));
        }
        if let Some(secret) = &self.secret {
            cluster.insert("secret".into(), Value::String(secret.clone()));
        }
        Value::Object(cluster)
    }
}

/// Build the rendering context: `cluster.*` built-ins, then options
/// (dotted names nested into objects) on top.
pub fn build_context(options: &ResolvedOptions, cluster: &ClusterContext) -> Value {
    let mut root = Map::new();
    root.insert("cluster".into(), cluster.to_value());

    for (name, value) in options {
        insert_path(&mut root, name, value.clone());
    }

    Value::Object(root)
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut parts: Vec<&str> = path.split('.').collect();
    let Some(leaf) = parts.pop() else {
        return;
    };

    let mut current = root;
    for part in parts {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(leaf.to_string(), value);
}

#[derive(Debug)]
enum Node {
    Text(String),
    Var { path: String, raw: bool },
    Section {
        path: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

fn parse(source: &str) -> std::result::Result<Vec<Node>, String> {
    // (path, inverted, nodes collected so far for the enclosing level)
    let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut nodes = Vec::new();
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            nodes.push(Node::Text(rest[..start].to_string()));
        }
        let after = &rest[start..];

        let (tag, raw, consumed) = if let Some(inner) = after.strip_prefix("{{{") {
            let end = inner
                .find("}}}")
                .ok_or_else(|| "unclosed '{{{' tag".to_string())?;
            (inner[..end].trim(), true, 3 + end + 3)
        } else {
            let inner = &after[2..];
            let end = inner
                .find("}}")
                .ok_or_else(|| "unclosed '{{' tag".to_string())?;
            (inner[..end].trim(), false, 2 + end + 2)
        };
        rest = &after[consumed..];

        if raw {
            nodes.push(Node::Var {
                path: tag.to_string(),
                raw: true,
            });
            continue;
        }

        match tag.chars().next() {
            Some('!') => {}
            Some(sigil @ ('#' | '^')) => {
                let path = tag[1..].trim().to_string();
                stack.push((path, sigil == '^', std::mem::take(&mut nodes)));
            }
            Some('/') => {
                let closing = tag[1..].trim();
                let (path, inverted, outer) = stack
                    .pop()
                    .ok_or_else(|| format!("unexpected closing tag '{closing}'"))?;
                if path != closing {
                    return Err(format!(
                        "section '{path}' closed by '{closing}'"
                    ));
                }
                let children = std::mem::replace(&mut nodes, outer);
                nodes.push(Node::Section {
                    path,
                    inverted,
                    children,
                });
            }
            Some('&') => nodes.push(Node::Var {
                path: tag[1..].trim().to_string(),
                raw: true,
            }),
            Some(_) => nodes.push(Node::Var {
                path: tag.to_string(),
                raw: false,
            }),
            None => return Err("empty tag".to_string()),
        }
    }

    if !rest.is_empty() {
        nodes.push(Node::Text(rest.to_string()));
    }
    if let Some((path, _, _)) = stack.pop() {
        return Err(format!("unclosed section '{path}'"));
    }
    Ok(nodes)
}

fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    if path == "." {
        return Some(context);
    }
    path.split('.')
        .try_fold(context, |value, part| value.as_object()?.get(part))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn write_value(out: &mut String, value: Option<&Value>, raw: bool) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if raw => out.push_str(s),
        Some(Value::String(s)) => {
            let quoted = Value::String(s.clone()).to_string();
            out.push_str(&quoted[1..quoted.len() - 1]);
        }
        Some(other) => out.push_str(&other.to_string()),
    }
}

fn render_nodes(nodes: &[Node], context: &Value, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var { path, raw } => write_value(out, lookup(context, path), *raw),
            Node::Section {
                path,
                inverted,
                children,
            } => {
                if is_truthy(lookup(context, path)) != *inverted {
                    render_nodes(children, context, out);
                }
            }
        }
    }
}

impl JobTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the template text against `context`
    pub fn render(&self, package: &str, context: &Value) -> Result<String> {
        let nodes = parse(&self.0).map_err(|reason| error::request::render_failed(package, reason))?;
        let mut out = String::with_capacity(self.0.len());
        render_nodes(&nodes, context, &mut out);
        Ok(out)
    }

    /// Render and parse the result into a job spec object.
    ///
    /// The output must be a JSON object; a missing `id` defaults to
    /// `/<package>`.
    pub fn render_job(&self, package: &str, context: &Value) -> Result<Map<String, Value>> {
        let rendered = self.render(package, context)?;
        let value: Value = serde_json::from_str(&rendered).map_err(|e| {
            error::request::render_failed(package, format!("rendered job is not valid JSON: {e}"))
        })?;

        let Value::Object(mut job) = value else {
            return Err(error::request::render_failed(
                package,
                "rendered job is not a JSON object",
            ));
        };

        if !job.get("id").is_some_and(|id| id.as_str().is_some_and(|s| !s.is_empty())) {
            job.insert("id".into(), Value::String(format!("/{package}")));
        }
        Ok(job)
    }
}
