//! Run-scoped store of values produced by upstream nodes.
//!
//! Values are addressed by selectors: `[node_id, variable_name]`, optionally
//! followed by attribute names that index into objects or file metadata.
//! The pool only grows or overwrites during a run; nothing is removed.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{File, Segment, Variable};

/// Node id under which system variables live.
pub const SYSTEM_VARIABLE_NODE_ID: &str = "sys";

/// Matches `{{#node.var#}}` and `{{#node.var.attr#}}` reference tokens.
static VARIABLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{#([a-zA-Z0-9_]{1,50}(?:\.[a-zA-Z0-9_]{1,30}){1,10})#\}\}")
        .expect("variable token pattern is valid")
});

// ---------------------------------------------------------------------------
// System variables
// ---------------------------------------------------------------------------

/// Run-wide values exposed to every node under the `sys` node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SystemVariables {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

impl SystemVariables {
    pub fn empty() -> Self {
        Self::default()
    }

    fn into_variables(self) -> Vec<Variable> {
        let mut vars = Vec::new();
        let strings = [
            ("user_id", self.user_id),
            ("app_id", self.app_id),
            ("workflow_id", self.workflow_id),
            ("workflow_run_id", self.workflow_run_id),
            ("query", self.query),
            ("conversation_id", self.conversation_id),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                vars.push(Variable::new(name, Segment::String(value)));
            }
        }
        vars.push(Variable::file_array("files", self.files));
        vars
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Result of a typed pool lookup.
///
/// Consumers that need files switch on this instead of inspecting the
/// shape of an arbitrary segment.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableLookup {
    Absent,
    Scalar(Segment),
    File(File),
    FileArray(Vec<File>),
}

/// Errors from writing into the pool.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VariablePoolError {
    #[error("selector must have at least 2 elements, got {len}")]
    SelectorTooShort { len: usize },
}

// ---------------------------------------------------------------------------
// VariablePool
// ---------------------------------------------------------------------------

type NodeVariables = HashMap<String, Segment>;

/// Shared, typed store for one workflow run.
///
/// Interior locking lets concurrently running nodes populate the pool
/// through a shared `Arc<VariablePool>`. Visibility of an upstream node's
/// writes before a downstream read is the scheduler's job.
#[derive(Debug, Default)]
pub struct VariablePool {
    variables: RwLock<HashMap<String, NodeVariables>>,
    user_inputs: BTreeMap<String, Value>,
}

impl VariablePool {
    /// Create a pool seeded with system variables and the run's user inputs.
    pub fn new(system_variables: SystemVariables, user_inputs: BTreeMap<String, Value>) -> Self {
        let pool = Self {
            variables: RwLock::new(HashMap::new()),
            user_inputs,
        };
        {
            let mut guard = pool.variables.write();
            let sys = guard
                .entry(SYSTEM_VARIABLE_NODE_ID.to_string())
                .or_default();
            for var in system_variables.into_variables() {
                sys.insert(var.name, var.value);
            }
        }
        pool
    }

    /// Inputs the run was started with.
    pub fn user_inputs(&self) -> &BTreeMap<String, Value> {
        &self.user_inputs
    }

    /// Bind `variable` at `selector`. Only the first two selector elements
    /// are used; a later write to the same path replaces the earlier one.
    pub fn add<S: AsRef<str>>(
        &self,
        selector: &[S],
        variable: Variable,
    ) -> Result<(), VariablePoolError> {
        if selector.len() < 2 {
            return Err(VariablePoolError::SelectorTooShort {
                len: selector.len(),
            });
        }
        let node_id = selector[0].as_ref().to_string();
        let name = selector[1].as_ref().to_string();
        self.variables
            .write()
            .entry(node_id)
            .or_default()
            .insert(name, variable.value);
        Ok(())
    }

    /// Resolve a selector to a segment.
    ///
    /// Extra selector elements index into object fields or file attributes.
    /// Returns `None` if any step is missing.
    pub fn get<S: AsRef<str>>(&self, selector: &[S]) -> Option<Segment> {
        if selector.len() < 2 {
            return None;
        }
        let guard = self.variables.read();
        let segment = guard
            .get(selector[0].as_ref())?
            .get(selector[1].as_ref())?
            .clone();
        drop(guard);

        let mut current = segment;
        for attr in &selector[2..] {
            current = descend(&current, attr.as_ref())?;
        }
        Some(current)
    }

    /// Typed lookup used by consumers that expect files.
    pub fn lookup<S: AsRef<str>>(&self, selector: &[S]) -> VariableLookup {
        match self.get(selector) {
            None => VariableLookup::Absent,
            Some(Segment::File(file)) => VariableLookup::File(file),
            Some(Segment::ArrayFile(files)) => VariableLookup::FileArray(files),
            Some(other) => VariableLookup::Scalar(other),
        }
    }

    /// Substitute every `{{#node.var#}}` token in `template` with the text
    /// form of the referenced segment. Tokens that do not resolve are kept
    /// verbatim.
    pub fn render_template(&self, template: &str) -> String {
        VARIABLE_TOKEN
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let path: Vec<&str> = caps[1].split('.').collect();
                match self.get(path.as_slice()) {
                    Some(segment) => segment.text(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Selectors referenced by `template`, in order of appearance.
    pub fn template_selectors(template: &str) -> Vec<Vec<String>> {
        VARIABLE_TOKEN
            .captures_iter(template)
            .map(|caps| caps[1].split('.').map(str::to_string).collect())
            .collect()
    }
}

fn descend(segment: &Segment, attr: &str) -> Option<Segment> {
    match segment {
        Segment::Object(map) => map.get(attr).cloned().map(Segment::from),
        Segment::File(file) => file.attribute(attr).map(Segment::from),
        _ => None,
    }
}
