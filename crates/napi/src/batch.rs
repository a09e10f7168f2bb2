//! Parallel rendering of many templates.

use crate::resolve_variables;
use crate::types::{RenderConfig, RenderResult};
use napi_derive::napi;
use rayon::prelude::*;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single template to render in a batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Caller-chosen identifier echoed back in the result.
    pub id: String,
    /// Template source with optional frontmatter.
    pub template: String,
    /// YAML string or object of explicit variables.
    pub variables: Option<JsonValue>,
}

/// Result for a single template in a batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Render output (present on success).
    pub result: Option<RenderResult>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchStats {
    /// Total number of inputs.
    pub total: u32,
    /// Number of successfully rendered inputs.
    pub succeeded: u32,
    /// Number of failed inputs.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<u32>,
    /// Whether to continue processing after an error. Defaults to true.
    pub continue_on_error: Option<bool>,
    /// Render options applied to every input.
    pub render_options: Option<RenderConfig>,
}

/// Results and statistics for a whole batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchProcessingResult {
    /// Individual results, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Renders many templates, in parallel unless `continueOnError` is false.
#[napi]
pub fn render_batch(
    inputs: Vec<BatchInput>,
    options: Option<BatchOptions>,
) -> napi::Result<BatchProcessingResult> {
    let start = Instant::now();
    let opts = options.unwrap_or_default();
    let continue_on_error = opts.continue_on_error.unwrap_or(true);
    let render_options = opts.render_options.unwrap_or_default().to_core()?;

    let pool = match opts.max_threads {
        Some(max_threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads as usize)
            .build()
            .ok(),
        None => None,
    };

    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        let rendered = resolve_variables(input.variables).and_then(|source| {
            mdtmpl_core::render(&input.template, source, &render_options)
                .map_err(|err| err.to_string())
        });
        match rendered {
            Ok(result) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: Some(result.into()),
                    error: None,
                }
            }
            Err(message) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::debug!("batch entry {} failed: {message}", input.id);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(message),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        match pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
            None => inputs.into_par_iter().map(process_input).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    Ok(BatchProcessingResult {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(id: &str, template: &str, variables: Option<JsonValue>) -> BatchInput {
        BatchInput {
            id: id.to_string(),
            template: template.to_string(),
            variables,
        }
    }

    #[test]
    fn renders_all_inputs_in_order() {
        let inputs = vec![
            input("a", "Hello {{name}}", Some(json!({ "name": "Alice" }))),
            input("b", "---\nengine: liquid\n---\nHi {{ name }}", Some(json!("name: Bob"))),
            input("c", "No variables", None),
        ];

        let output = render_batch(inputs, None).unwrap();

        let ids: Vec<_> = output.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(output.stats.total, 3);
        assert_eq!(output.stats.succeeded, 3);
        assert_eq!(output.stats.failed, 0);
        let second = output.results[1].result.as_ref().unwrap();
        assert_eq!(second.raw, "Hi Bob");
        assert_eq!(second.engine, "liquid");
    }

    #[test]
    fn bounded_thread_pool_keeps_input_order() {
        let inputs: Vec<_> = (0..8)
            .map(|n| input(&n.to_string(), "Item {{n}}", Some(json!({ "n": n }))))
            .collect();
        let options = BatchOptions {
            max_threads: Some(2),
            ..BatchOptions::default()
        };

        let output = render_batch(inputs, Some(options)).unwrap();

        assert_eq!(output.stats.succeeded, 8);
        for (n, entry) in output.results.iter().enumerate() {
            assert_eq!(entry.id, n.to_string());
            assert_eq!(entry.result.as_ref().unwrap().raw, format!("Item {n}"));
        }
    }

    #[test]
    fn collects_errors_per_input() {
        let inputs = vec![
            input("ok", "Hello", None),
            input("bad", "---\nengine: liquid\n", None),
        ];

        let output = render_batch(inputs, None).unwrap();

        assert_eq!(output.stats.succeeded, 1);
        assert_eq!(output.stats.failed, 1);
        assert!(output.results[1].error.is_some());
        assert!(output.results[1].result.is_none());
    }

    #[test]
    fn stops_after_first_error_when_requested() {
        let inputs = vec![
            input("bad", "{{#each}}", Some(json!([1, 2]))),
            input("never", "Hello", None),
        ];
        let options = BatchOptions {
            continue_on_error: Some(false),
            ..BatchOptions::default()
        };

        let output = render_batch(inputs, Some(options)).unwrap();

        assert_eq!(output.results.len(), 1);
        assert_eq!(output.stats.failed, 1);
        assert_eq!(output.stats.total, 2);
    }
}
