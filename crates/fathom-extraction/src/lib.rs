//! Extraction Strategy: pulls structured records from HTML (CSS or
//! XPath schema-based), or delegates to an external LLM-backed
//! collaborator through the same narrow contract.

pub mod chunking;
mod css_runner;
pub mod schema;
mod xpath_runner;

pub use schema::{ExtractionSchema, FieldSchema, FieldType, SelectorKind, Transform};

use async_trait::async_trait;
use fathom_types::error::Result;
use serde_json::Value;

/// Shared contract for every extraction strategy, schema-based or
/// LLM-backed. `sections` are the (possibly chunked) content pieces
/// already selected by the caller.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    async fn run(&self, url: &str, sections: &[String]) -> Result<Vec<Value>>;
}

/// Schema-based extractor dispatching to the CSS or XPath runner
/// according to the schema's declared dialect.
pub struct SchemaExtractor {
    schema: ExtractionSchema,
}

impl SchemaExtractor {
    pub fn new(schema: ExtractionSchema) -> Self {
        SchemaExtractor { schema }
    }
}

#[async_trait]
impl ExtractionStrategy for SchemaExtractor {
    async fn run(&self, _url: &str, sections: &[String]) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        for section in sections {
            let extracted = match self.schema.base_selector_kind {
                schema::SelectorKind::Css => css_runner::extract(section, &self.schema),
                schema::SelectorKind::XPath => xpath_runner::extract(section, &self.schema),
            };
            records.extend(extracted);
        }
        Ok(records)
    }
}

/// Marker contract for an external LLM-backed extractor. The wire
/// protocol to the model is out of scope here; the core only ever
/// calls `run` through [`ExtractionStrategy`] the same way it calls a
/// schema-based extractor.
pub trait LlmExtractionContract: ExtractionStrategy {}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{FieldType, SelectorKind};

    #[tokio::test]
    async fn schema_extractor_runs_over_each_section() {
        let schema = ExtractionSchema::new("items", ".item", SelectorKind::Css)
            .with_field(FieldSchema::new("title", ".title", FieldType::Text));
        let extractor = SchemaExtractor::new(schema);
        let sections = vec![
            r#"<div class="item"><span class="title">A</span></div>"#.to_string(),
            r#"<div class="item"><span class="title">B</span></div>"#.to_string(),
        ];
        let records = extractor.run("https://example.com", &sections).await.unwrap();
        assert_eq!(records.len(), 2);
    }
}
