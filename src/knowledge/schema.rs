//! Strict response schema for the extraction service
//!
//! The schema mirrors [`ExtractionBundle`](crate::knowledge::ExtractionBundle)
//! exactly: six top-level category arrays plus a source object, every field
//! required, nullability expressed per field. A response that does not parse
//! against this shape is rejected outright.

use serde_json::{json, Value};

fn string() -> Value {
    json!({ "type": "string" })
}

fn nullable_string() -> Value {
    json!({ "type": ["string", "null"] })
}

fn nullable_integer() -> Value {
    json!({ "type": ["integer", "null"] })
}

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Builds the JSON schema for one extraction response
pub fn bundle_schema() -> Value {
    let source = object(
        json!({
            "url": string(),
            "title": string(),
            "scraped_at": string(),
        }),
        &["url", "title", "scraped_at"],
    );

    let variation = object(
        json!({
            "name": string(),
            "moves": string(),
        }),
        &["name", "moves"],
    );

    let opening = object(
        json!({
            "name": string(),
            "eco": nullable_string(),
            "side": nullable_string(),
            "overview": nullable_string(),
            "main_line": nullable_string(),
            "variations": array_of(variation),
            "ideas": string_array(),
            "traps": string_array(),
            "model_games": string_array(),
            "tags": string_array(),
        }),
        &[
            "name", "eco", "side", "overview", "main_line", "variations", "ideas", "traps",
            "model_games", "tags",
        ],
    );

    let middlegame = object(
        json!({
            "name": string(),
            "overview": nullable_string(),
            "key_ideas": string_array(),
            "plans": string_array(),
            "examples": string_array(),
            "tags": string_array(),
        }),
        &["name", "overview", "key_ideas", "plans", "examples", "tags"],
    );

    let endgame = object(
        json!({
            "name": string(),
            "technique": nullable_string(),
            "key_positions": string_array(),
            "steps": string_array(),
            "tags": string_array(),
        }),
        &["name", "technique", "key_positions", "steps", "tags"],
    );

    let tactics = object(
        json!({
            "name": string(),
            "description": nullable_string(),
            "recognition": string_array(),
            "examples": string_array(),
            "tags": string_array(),
        }),
        &["name", "description", "recognition", "examples", "tags"],
    );

    let game = object(
        json!({
            "title": nullable_string(),
            "white": string(),
            "black": string(),
            "year": nullable_integer(),
            "event": nullable_string(),
            "result": nullable_string(),
            "summary": nullable_string(),
            "moves": nullable_string(),
            "lessons": string_array(),
            "tags": string_array(),
        }),
        &[
            "title", "white", "black", "year", "event", "result", "summary", "moves", "lessons",
            "tags",
        ],
    );

    let principle = object(
        json!({
            "name": string(),
            "statement": nullable_string(),
            "rationale": nullable_string(),
            "examples": string_array(),
            "exceptions": string_array(),
            "tags": string_array(),
        }),
        &["name", "statement", "rationale", "examples", "exceptions", "tags"],
    );

    object(
        json!({
            "source": source,
            "opening": array_of(opening),
            "middlegame": array_of(middlegame),
            "endgame": array_of(endgame),
            "tactics": array_of(tactics),
            "games": array_of(game),
            "principles": array_of(principle),
        }),
        &[
            "source",
            "opening",
            "middlegame",
            "endgame",
            "tactics",
            "games",
            "principles",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_all_six_categories() {
        let schema = bundle_schema();
        let properties = schema["properties"].as_object().unwrap();

        for key in ["opening", "middlegame", "endgame", "tactics", "games", "principles"] {
            assert!(properties.contains_key(key), "missing array: {}", key);
            assert_eq!(properties[key]["type"], "array");
        }
        assert!(properties.contains_key("source"));
    }

    #[test]
    fn test_schema_is_closed() {
        let schema = bundle_schema();
        assert_eq!(schema["additionalProperties"], false);

        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 7);
    }

    #[test]
    fn test_nullable_meta_fields() {
        let schema = bundle_schema();
        let game = &schema["properties"]["games"]["items"]["properties"];
        assert_eq!(game["year"]["type"], serde_json::json!(["integer", "null"]));
        assert_eq!(game["event"]["type"], serde_json::json!(["string", "null"]));
    }
}
