use crate::config::{CteScan, DetectorOptions};
use crate::detector::WriteDetector;
use wasm_bindgen::prelude::*;

/// Returns the verdict as JSON; throws when the input cannot be classified.
#[wasm_bindgen]
pub fn analyze_sql_wasm(input: &str, cte_scan: &str) -> Result<String, JsError> {
    let options = DetectorOptions {
        cte_scan: CteScan::from_name(cte_scan),
        ..DetectorOptions::default()
    };

    let analysis = WriteDetector::with_options(options).analyze(input)?;
    Ok(serde_json::to_string(&analysis)?)
}
