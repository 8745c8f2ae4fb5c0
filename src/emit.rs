//! Recursive JSON → GML generator.
//!
//! Walks a [`DsValue`] tree depth-first and emits one GML statement per
//! scalar assignment and one creation/linking pair per nested container.
//! Nested maps and lists get deterministic anonymous names from two
//! call-scoped counters, so the same document always produces the same
//! text and two concurrent calls can never collide.
//!
//! The thin `generate` wrapper keeps the live-editor contract: any
//! failure, including a half-typed document, comes back as an empty
//! string rather than an error the caller has to handle.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::{DsValue, GenError};

/// GML variable that receives the root map.
pub const ROOT_MAP_NAME: &str = "_converted_ds";

const SUB_MAP_PREFIX: &str = "_sub_ds";
const SUB_LIST_PREFIX: &str = "_sub_list";

const BANNER: &str = "/* Code generated automatically from JSON using\n   easy-ds */\n";

/// Convert raw JSON text to GML, absorbing every failure into an empty
/// string. This is the sole error channel of the conversion contract.
pub fn generate(json_text: &str) -> String {
    try_generate(json_text).unwrap_or_default()
}

pub fn try_generate(json_text: &str) -> Result<String, GenError> {
    try_generate_named(json_text, ROOT_MAP_NAME)
}

pub fn try_generate_named(json_text: &str, root_name: &str) -> Result<String, GenError> {
    let parsed: serde_json::Value = serde_json::from_str(json_text)?;
    try_generate_value(&parsed, root_name)
}

/// Same pipeline, starting from an already-parsed document.
pub fn try_generate_value(
    value: &serde_json::Value,
    root_name: &str,
) -> Result<String, GenError> {
    let root = DsValue::from_json(value)?;
    let mut emitter = Emitter::with_root_name(root_name);
    emitter.emit_document(&root)?;
    Ok(emitter.into_string())
}

/// Accumulates output text plus the two anonymous-name counters for one
/// generation call. Counters are allocated pre-order, never reused within
/// a call, and die with the emitter; there is no cross-call state.
pub struct Emitter {
    out: String,
    next_sub_map: u32,
    next_sub_list: u32,
    root_name: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self::with_root_name(ROOT_MAP_NAME)
    }

    pub fn with_root_name(root_name: &str) -> Self {
        Emitter {
            out: String::new(),
            next_sub_map: 0,
            next_sub_list: 0,
            root_name: root_name.to_string(),
        }
    }

    /// Emit the banner, the root map creation, and every statement for
    /// the document body. The root must be an object.
    pub fn emit_document(&mut self, root: &DsValue) -> Result<(), GenError> {
        let DsValue::Object(fields) = root else {
            return Err(GenError::NonObjectRoot(root.kind()));
        };
        self.out.push_str(BANNER);
        self.out
            .push_str(&format!("{} = ds_map_create();\n", self.root_name));
        let root_name = self.root_name.clone();
        self.emit_object(fields, &root_name);
        Ok(())
    }

    /// Finish the call: collapse blank-line runs and hand back the text.
    pub fn into_string(self) -> String {
        collapse_blank_runs(&self.out)
    }

    fn emit_object(&mut self, fields: &[(String, DsValue)], map_var: &str) {
        for (key, value) in fields {
            self.emit_property(key, value, map_var);
        }
    }

    fn emit_property(&mut self, key: &str, value: &DsValue, map_var: &str) {
        match value {
            DsValue::String(s) => {
                self.out
                    .push_str(&format!("{map_var}[? \"{key}\"] = \"{s}\";\n"));
            }
            DsValue::Number(n) => {
                self.out
                    .push_str(&format!("{map_var}[? \"{key}\"] = {n};\n"));
            }
            DsValue::Array(items) => {
                let list_var = self.next_list_name();
                self.out
                    .push_str(&format!("\n//Create a DS list for the {key} property\n"));
                self.out
                    .push_str(&format!("{list_var} = ds_list_create();\n"));
                self.emit_array(items, &list_var, key);
                self.out.push_str(&format!(
                    "\n//Add sub list for the {key} property to the {map_var} map\n"
                ));
                // ds_map_add_list carries no terminating semicolon in the
                // target statement grammar.
                self.out.push_str(&format!(
                    "ds_map_add_list({map_var}, \"{key}\", {list_var})\n"
                ));
            }
            DsValue::Object(fields) => {
                let sub_var = self.next_map_name();
                self.out
                    .push_str(&format!("\n//Create a DS map for the {key} property\n"));
                self.out
                    .push_str(&format!("{sub_var} = ds_map_create();\n"));
                self.emit_object(fields, &sub_var);
                self.out.push_str(&format!(
                    "\n//Add sub map for the {key} property to the {map_var} map\n"
                ));
                self.out.push_str(&format!(
                    "ds_map_add_map({map_var}, \"{key}\", {sub_var});\n\n"
                ));
            }
        }
    }

    /// Positional assignments into a list. Unlike map entries, a list
    /// slot holding a nested container also needs a slot-kind marking
    /// statement, because the runtime cannot infer the slot's content
    /// kind from the assignment alone.
    fn emit_array(&mut self, items: &[DsValue], list_var: &str, key: &str) {
        for (index, item) in items.iter().enumerate() {
            match item {
                DsValue::String(s) => {
                    self.out
                        .push_str(&format!("{list_var}[| {index}] = \"{s}\";\n"));
                }
                DsValue::Number(n) => {
                    self.out
                        .push_str(&format!("{list_var}[| {index}] = {n};\n"));
                }
                DsValue::Array(nested) => {
                    let sub_var = self.next_list_name();
                    self.out.push_str(&format!(
                        "\n//Create a DS list for index {index} of the {key} array\n"
                    ));
                    self.out
                        .push_str(&format!("{sub_var} = ds_list_create();\n"));
                    self.emit_array(nested, &sub_var, key);
                    self.out
                        .push_str(&format!("\n//Add sub list to the {list_var} list\n"));
                    self.out
                        .push_str(&format!("{list_var}[| {index}] = {sub_var};\n"));
                    self.out
                        .push_str(&format!("ds_list_mark_as_list({list_var}, {index});\n"));
                }
                DsValue::Object(fields) => {
                    let sub_var = self.next_map_name();
                    self.out.push_str(&format!(
                        "\n//Create a DS map for index {index} of the {key} array\n"
                    ));
                    self.out
                        .push_str(&format!("{sub_var} = ds_map_create();\n"));
                    self.emit_object(fields, &sub_var);
                    self.out
                        .push_str(&format!("\n//Add sub map to the {list_var} list\n"));
                    self.out
                        .push_str(&format!("{list_var}[| {index}] = {sub_var};\n"));
                    self.out.push_str(&format!(
                        "ds_list_mark_as_map({list_var}, {index});\n\n"
                    ));
                }
            }
        }
    }

    fn next_map_name(&mut self) -> String {
        let n = self.next_sub_map;
        self.next_sub_map += 1;
        format!("{SUB_MAP_PREFIX}{n}")
    }

    fn next_list_name(&mut self) -> String {
        let n = self.next_sub_list;
        self.next_sub_list += 1;
        format!("{SUB_LIST_PREFIX}{n}")
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Textual tidy-up only: never more than one blank line between
/// statements.
fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}
