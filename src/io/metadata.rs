//! Tile metadata sidecars.
//!
//! Sidecars are JSON objects with `archive`, `instrument`, `observatory`,
//! `resolution`, `xcoords`, `ycoords`, `date` and `time` keys. The text labels are
//! optional; everything else is required.

use crate::coords::EarthRect;
use crate::error::{CompositeError, Result};
use crate::tile::{TileMeta, OBS_DATE_FORMAT};
use chrono::NaiveDateTime;
use serde_json::Value;

/// Shown in place of empty metadata values.
pub const NO_INFORMATION: &str = "<No information available>";

/// Decode a metadata record from a parsed JSON sidecar.
pub fn parse_metadata(value: &Value) -> Result<TileMeta> {
    let object = value.as_object().ok_or(CompositeError::TypeMismatch {
        field: "metadata",
        expected: "object",
    })?;

    let resolution = object
        .get("resolution")
        .ok_or_else(|| missing("resolution"))
        .and_then(|v| integer(v, "resolution"))?;
    let resolution = u32::try_from(resolution)
        .ok()
        .filter(|&r| r > 0)
        .ok_or_else(|| CompositeError::invalid("resolution", resolution, "must be a positive integer"))?;

    let x = coords(object.get("xcoords"), "xcoords")?;
    let y = coords(object.get("ycoords"), "ycoords")?;

    let date = text(object.get("date"), "date")?;
    let time = text(object.get("time"), "time")?;
    if date.is_empty() || time.is_empty() {
        return Err(missing("date/time"));
    }
    let stamp = format!("{} {}", date, time);
    let obs_date = NaiveDateTime::parse_from_str(&stamp, OBS_DATE_FORMAT).map_err(|e| {
        CompositeError::invalid("date/time", &stamp, format!("expected YYYY-MM-DD HH:MM:SS: {}", e))
    })?;

    Ok(TileMeta::new(resolution, EarthRect::new(x, y), obs_date)
        .archive(text(object.get("archive"), "archive")?)
        .instrument(text(object.get("instrument"), "instrument")?)
        .observatory(text(object.get("observatory"), "observatory")?))
}

/// Metadata as ordered `(key, value)` pairs for display.
///
/// Empty text labels are replaced with [`NO_INFORMATION`].
pub fn describe(meta: &TileMeta) -> Vec<(&'static str, String)> {
    fn label(s: &str) -> String {
        if s.is_empty() {
            NO_INFORMATION.to_string()
        } else {
            s.to_string()
        }
    }

    vec![
        ("archive", label(&meta.archive)),
        ("instrument", label(&meta.instrument)),
        ("observatory", label(&meta.observatory)),
        ("resolution", meta.resolution.to_string()),
        ("xcoords", format!("{:?}", meta.extent.x.as_tuple())),
        ("ycoords", format!("{:?}", meta.extent.y.as_tuple())),
        ("obs_date", meta.obs_date_string()),
    ]
}

fn missing(field: &'static str) -> CompositeError {
    CompositeError::invalid(field, "<missing>", "required metadata key")
}

/// Missing text keys read as empty.
fn text<'a>(value: Option<&'a Value>, field: &'static str) -> Result<&'a str> {
    match value {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CompositeError::TypeMismatch {
            field,
            expected: "string",
        }),
    }
}

/// Whole numbers, also when written as floats.
fn integer(value: &Value, field: &'static str) -> Result<i64> {
    let mismatch = || CompositeError::TypeMismatch {
        field,
        expected: "integer",
    };

    let Value::Number(number) = value else {
        return Err(mismatch());
    };
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(mismatch()),
    }
}

fn coords(value: Option<&Value>, field: &'static str) -> Result<(i64, i64)> {
    let items = value
        .ok_or_else(|| missing(field))?
        .as_array()
        .ok_or(CompositeError::TypeMismatch {
            field,
            expected: "array of two integers",
        })?;

    match items.as_slice() {
        [min, max] => Ok((integer(min, field)?, integer(max, field)?)),
        _ => Err(CompositeError::invalid(
            field,
            items.len(),
            "expected exactly two coordinates",
        )),
    }
}
