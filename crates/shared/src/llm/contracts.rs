use std::sync::LazyLock;

use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde_json::Value;

use crate::models::SimulationResponse;

pub const JSON_MIME_TYPE: &str = "application/json";

static SIMULATION_RESPONSE_SCHEMA: LazyLock<Value> =
    LazyLock::new(inline_schema_for::<SimulationResponse>);

/// JSON schema of [`SimulationResponse`], with subschemas inlined so it can
/// be sent to the provider as a structured-output constraint.
pub fn simulation_response_schema() -> &'static Value {
    &SIMULATION_RESPONSE_SCHEMA
}

fn inline_schema_for<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();

    // RootSchema is plain data with string keys; serializing it cannot fail.
    serde_json::to_value(generator.into_root_schema_for::<T>())
        .expect("derived json schema serializes to a json value")
}
