/// Macro to generate a JSON schema from a type
#[macro_export]
macro_rules! schema_from_type {
    ($type:ty) => {{
        #[allow(clippy::panic)]
        fn input_schema() -> rmcp::model::JsonObject {
            match serde_json::to_value(schemars::schema_for!($type)) {
                Ok(serde_json::Value::Object(schema)) => schema,
                _ => panic!("Failed to generate schema for {}", stringify!($type)),
            }
        }
        input_schema()
    }};
}
