//! Comparison of the content models (content type schemas) of two environments.
//!
//! Types are matched by id, fields by field id. Common fields are compared on a
//! normalised definition (see [`field_definition`]) so that keys the API fills in
//! for one side only do not show up as differences.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::SpaceRef;
use crate::contract::{ApiError, ContentType, ManagementApi};
use crate::report::{write_csv, write_json, ReportError};

pub const REPORT_FILE: &str = "content_model_differences.csv";
pub const REPORT_HEADERS: [&str; 8] = [
    "Difference Type",
    "Content Type",
    "Field",
    "Property",
    "Space 1 Value",
    "Space 2 Value",
    "Space 1 ID",
    "Space 2 ID",
];

const MISSING_CONTENT_TYPE: &str = "Missing Content Type";
const MISSING_FIELD: &str = "Missing Field";
const FIELD_DEFINITION: &str = "Field Definition";
const PRESENT: &str = "Present";
const MISSING: &str = "Missing";

pub type FieldDefinition = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDifferences {
    pub missing_in_space1: Vec<String>,
    pub missing_in_space2: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionDifference {
    pub space1: FieldDefinition,
    pub space2: FieldDefinition,
}

impl DefinitionDifference {
    /// Properties whose values differ, in key order.
    pub fn changed_properties(&self) -> Vec<&str> {
        let keys: BTreeSet<&str> = self
            .space1
            .keys()
            .chain(self.space2.keys())
            .map(String::as_str)
            .collect();
        keys.into_iter()
            .filter(|key| self.space1.get(*key) != self.space2.get(*key))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDifferences {
    /// Content type ids only space 2 has.
    pub missing_in_space1: Vec<String>,
    /// Content type ids only space 1 has.
    pub missing_in_space2: Vec<String>,
    pub field_differences: BTreeMap<String, FieldDifferences>,
    /// content type id → field id → both definitions.
    pub definition_differences: BTreeMap<String, BTreeMap<String, DefinitionDifference>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifferenceSummary {
    pub missing_types_space1: usize,
    pub missing_types_space2: usize,
    pub types_with_field_differences: usize,
    pub types_with_definition_differences: usize,
    pub total_missing_fields_space1: usize,
    pub total_missing_fields_space2: usize,
    pub total_definition_differences: usize,
}

impl DifferenceSummary {
    pub fn total(&self) -> usize {
        self.missing_types_space1
            + self.missing_types_space2
            + self.types_with_field_differences
            + self.types_with_definition_differences
    }
}

/// One CSV row. Field order matches [`REPORT_HEADERS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferenceRow {
    pub difference_type: String,
    pub content_type: String,
    pub field: String,
    pub property: String,
    pub space1_value: String,
    pub space2_value: String,
    pub space1_id: String,
    pub space2_id: String,
}

/// Normalised, comparable view of one field of a content type.
pub fn field_definition(field: &Map<String, Value>) -> FieldDefinition {
    let mut definition = FieldDefinition::new();
    let field_type = field.get("type").cloned().unwrap_or(Value::Null);
    definition.insert("type".to_string(), field_type.clone());
    for flag in ["required", "localized", "disabled", "omitted"] {
        let value = field.get(flag).cloned().unwrap_or(Value::Bool(false));
        definition.insert(flag.to_string(), value);
    }
    if let Some(name) = field.get("name").filter(|n| n.as_str().is_some_and(|s| !s.is_empty())) {
        definition.insert("name".to_string(), name.clone());
    }
    match field_type.as_str() {
        Some("Link") => {
            let link_type = field.get("linkType").cloned().unwrap_or(Value::Null);
            definition.insert("linkType".to_string(), link_type);
        }
        Some("Array") => {
            if let Some(items) = field.get("items") {
                definition.insert("items".to_string(), items.clone());
            }
        }
        _ => {}
    }
    if let Some(validations) = field
        .get("validations")
        .filter(|v| v.as_array().is_some_and(|a| !a.is_empty()))
    {
        definition.insert("validations".to_string(), validations.clone());
    }
    definition
}

fn fields_by_id(content_type: &ContentType) -> BTreeMap<&str, &Map<String, Value>> {
    content_type
        .fields
        .iter()
        .filter_map(|field| field.get("id").and_then(Value::as_str).map(|id| (id, field)))
        .collect()
}

pub fn compare_models(model1: &[ContentType], model2: &[ContentType]) -> ModelDifferences {
    let types1: BTreeMap<&str, &ContentType> = model1.iter().map(|ct| (ct.id(), ct)).collect();
    let types2: BTreeMap<&str, &ContentType> = model2.iter().map(|ct| (ct.id(), ct)).collect();
    let mut differences = ModelDifferences {
        missing_in_space1: only_in(&types2, &types1),
        missing_in_space2: only_in(&types1, &types2),
        ..ModelDifferences::default()
    };

    for (type_id, ct1) in &types1 {
        let Some(ct2) = types2.get(type_id) else {
            continue;
        };
        let fields1 = fields_by_id(ct1);
        let fields2 = fields_by_id(ct2);

        let field_diff = FieldDifferences {
            missing_in_space1: only_in(&fields2, &fields1),
            missing_in_space2: only_in(&fields1, &fields2),
        };
        if !field_diff.missing_in_space1.is_empty() || !field_diff.missing_in_space2.is_empty() {
            differences
                .field_differences
                .insert(type_id.to_string(), field_diff);
        }

        for (field_id, field1) in &fields1 {
            let Some(field2) = fields2.get(field_id) else {
                continue;
            };
            let def1 = field_definition(field1);
            let def2 = field_definition(field2);
            if def1 != def2 {
                differences
                    .definition_differences
                    .entry(type_id.to_string())
                    .or_default()
                    .insert(
                        field_id.to_string(),
                        DefinitionDifference {
                            space1: def1,
                            space2: def2,
                        },
                    );
            }
        }
    }

    info!(
        missing_in_space1 = differences.missing_in_space1.len(),
        missing_in_space2 = differences.missing_in_space2.len(),
        types_with_field_differences = differences.field_differences.len(),
        types_with_definition_differences = differences.definition_differences.len(),
        "Compared content models"
    );
    differences
}

/// Keys of `left` absent from `right`, sorted.
fn only_in<V, W>(left: &BTreeMap<&str, V>, right: &BTreeMap<&str, W>) -> Vec<String> {
    left.keys()
        .filter(|key| !right.contains_key(*key))
        .map(|key| key.to_string())
        .collect()
}

impl ModelDifferences {
    pub fn summary(&self) -> DifferenceSummary {
        DifferenceSummary {
            missing_types_space1: self.missing_in_space1.len(),
            missing_types_space2: self.missing_in_space2.len(),
            types_with_field_differences: self.field_differences.len(),
            types_with_definition_differences: self.definition_differences.len(),
            total_missing_fields_space1: self
                .field_differences
                .values()
                .map(|d| d.missing_in_space1.len())
                .sum(),
            total_missing_fields_space2: self
                .field_differences
                .values()
                .map(|d| d.missing_in_space2.len())
                .sum(),
            total_definition_differences: self
                .definition_differences
                .values()
                .map(BTreeMap::len)
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary().total() == 0
    }

    /// Flatten into report rows: missing types, then missing fields, then changed properties.
    pub fn rows(&self, space1: &SpaceRef, space2: &SpaceRef) -> Vec<DifferenceRow> {
        let row = |kind: &str, content_type: &str, field: &str, property: &str, v1: String, v2: String| {
            DifferenceRow {
                difference_type: kind.to_string(),
                content_type: content_type.to_string(),
                field: field.to_string(),
                property: property.to_string(),
                space1_value: v1,
                space2_value: v2,
                space1_id: space1.space_id.clone(),
                space2_id: space2.space_id.clone(),
            }
        };
        let mut rows = Vec::new();

        for ct in &self.missing_in_space1 {
            rows.push(row(MISSING_CONTENT_TYPE, ct.as_str(), "", "", MISSING.into(), PRESENT.into()));
        }
        for ct in &self.missing_in_space2 {
            rows.push(row(MISSING_CONTENT_TYPE, ct.as_str(), "", "", PRESENT.into(), MISSING.into()));
        }
        for (type_id, diff) in &self.field_differences {
            for field in &diff.missing_in_space1 {
                rows.push(row(MISSING_FIELD, type_id.as_str(), field.as_str(), "", MISSING.into(), PRESENT.into()));
            }
            for field in &diff.missing_in_space2 {
                rows.push(row(MISSING_FIELD, type_id.as_str(), field.as_str(), "", PRESENT.into(), MISSING.into()));
            }
        }
        for (type_id, fields) in &self.definition_differences {
            for (field_id, diff) in fields {
                for property in diff.changed_properties() {
                    rows.push(row(
                        FIELD_DEFINITION,
                        type_id.as_str(),
                        field_id.as_str(),
                        property,
                        render_value(diff.space1.get(property)),
                        render_value(diff.space2.get(property)),
                    ));
                }
            }
        }
        rows
    }
}

/// Strings as-is, containers as JSON, other scalars via their JSON text, absence as "".
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn snapshot_file_name(space: &SpaceRef) -> String {
    format!("content_model_{}_{}.json", space.space_id, space.environment_id)
}

/// Save a model as pretty JSON, sorted by content type name.
pub fn save_snapshot(
    dir: &Path,
    space: &SpaceRef,
    model: &[ContentType],
) -> Result<PathBuf, ReportError> {
    let mut sorted: Vec<&ContentType> = model.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    write_json(dir, &snapshot_file_name(space), &sorted)
}

/// Fetch the content types of one environment and save its snapshot.
pub async fn fetch_content_model<M>(
    api: &M,
    space: &SpaceRef,
    output_dir: &Path,
) -> Result<Vec<ContentType>, ApiError>
where
    M: ManagementApi + ?Sized,
{
    let model = api.content_types().await.map_err(|e| {
        error!(space = %space, error = %e, "Failed to fetch content model");
        e
    })?;
    info!(space = %space, count = model.len(), "Fetched content model");
    save_snapshot(output_dir, space, &model)?;
    Ok(model)
}

pub fn write_report(dir: &Path, rows: &[DifferenceRow]) -> Result<PathBuf, ReportError> {
    write_csv(dir, REPORT_FILE, &REPORT_HEADERS, rows)
}
