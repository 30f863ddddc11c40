//! WebAssembly bindings for apngify.
//!
//! A single function is exported: the browser hands over the file bytes and
//! their MIME type and gets the APNG back.
//!
//! # Building
//!
//! ```bash
//! rustup target add wasm32-unknown-unknown
//! cargo install wasm-bindgen-cli
//!
//! cargo build --lib --target wasm32-unknown-unknown --release --no-default-features --features wasm
//!
//! wasm-bindgen --target web --out-dir web/pkg --out-name apngify \
//!   target/wasm32-unknown-unknown/release/apngify.wasm
//! ```
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { convertToApng } from 'apngify';
//!
//! await init();
//!
//! const file = input.files[0];
//! const data = new Uint8Array(await file.arrayBuffer());
//! const apng = convertToApng(data, file.type, 5 * 1024 * 1024);
//! const blob = new Blob([apng], { type: 'image/png' });
//! ```

use wasm_bindgen::prelude::*;

use crate::convert::convert;
use crate::format::ImageFormat;

/// Largest integer a JS number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert an image to a single-frame APNG no larger than `budget` bytes.
///
/// # Arguments
///
/// * `data` - Input file bytes as Uint8Array
/// * `mime` - MIME type of the input (e.g. `File.type`)
/// * `budget` - Maximum output size in bytes
///
/// # Returns
///
/// APNG file bytes as Uint8Array.
#[wasm_bindgen(js_name = "convertToApng")]
pub fn convert_to_apng(data: &[u8], mime: &str, budget: f64) -> Result<Vec<u8>, JsError> {
    let budget = budget_from_f64(budget).map_err(|e| JsError::new(&e))?;
    let format = ImageFormat::from_mime(mime).map_err(|e| JsError::new(&e.to_string()))?;
    convert(data, format, budget).map_err(|e| JsError::new(&e.to_string()))
}

fn budget_from_f64(budget: f64) -> Result<u64, String> {
    if budget.is_finite() && budget >= 0.0 && budget.fract() == 0.0 && budget <= MAX_SAFE_INTEGER
    {
        Ok(budget as u64)
    } else {
        Err(format!(
            "Invalid budget: {budget}. Expected a non-negative integer"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_from_f64() {
        assert_eq!(budget_from_f64(5_242_880.0), Ok(5_242_880));
        assert_eq!(budget_from_f64(0.0), Ok(0));
        assert!(budget_from_f64(-1.0).is_err());
        assert!(budget_from_f64(1.5).is_err());
        assert!(budget_from_f64(f64::NAN).is_err());
        assert!(budget_from_f64(f64::INFINITY).is_err());
    }
}

// JsError can only be constructed on wasm32 targets.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;

    #[test]
    fn test_unsupported_mime() {
        assert!(convert_to_apng(&[0u8; 16], "audio/mpeg", 1024.0).is_err());
    }

    #[test]
    fn test_corrupt_jpeg() {
        assert!(convert_to_apng(&[0xFF, 0xD8, 0x00], "image/jpeg", 1024.0).is_err());
    }
}
