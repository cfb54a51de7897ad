//! Ice chart label classification.

use crate::error::{Result, RouteError};
use crate::models::TerrainClass;

/// Resolve a chart label such as `" thin ICE "` to its terrain class.
///
/// Labels are trimmed and title-cased before lookup. Unknown labels are an
/// error: a silently defaulted class would corrupt the cost surface.
pub fn classify(label: &str) -> Result<TerrainClass> {
    let normalized = title_case(label.trim());
    match normalized.as_str() {
        "Water" => Ok(TerrainClass::Water),
        "Thin Ice" => Ok(TerrainClass::ThinIce),
        "Medium Ice" => Ok(TerrainClass::MediumIce),
        "Thick Ice" => Ok(TerrainClass::ThickIce),
        "Land" => Ok(TerrainClass::Land),
        _ => Err(RouteError::UnmappedClass(label.to_string())),
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
