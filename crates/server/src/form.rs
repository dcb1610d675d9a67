//! Web form adapter
//!
//! The only place where predictor inputs are addressed by raw form field
//! names. Blank or absent fields fall back to [`DEFAULT_VALUES`].

use predictor_lib::{columns, CompositeInput, OptimalComposite, PropertyPrediction};
use serde::Serialize;

/// Values used when a form field is left blank
pub const DEFAULT_VALUES: [(&str, f64); 11] = [
    (columns::PATCH_ANGLE, 0.0),
    (columns::PATCH_STEP, 4.0),
    (columns::PATCH_DENSITY, 57.0),
    (columns::MATRIX_FILLER_RATIO, 1.85714285714285),
    (columns::DENSITY, 2030.0),
    (columns::ELASTIC_MODULUS, 738.736842105263),
    (columns::HARDENER_AMOUNT, 30.0),
    (columns::EPOXY_GROUP_CONTENT, 22.2678571428571),
    (columns::FLASH_POINT, 100.0),
    (columns::SURFACE_DENSITY, 210.0),
    (columns::RESIN_CONSUMPTION, 220.0),
];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormError {
    #[error("Invalid value for '{field}': '{value}' is not a number")]
    InvalidNumber { field: String, value: String },
}

pub fn default_value(field: &str) -> Option<f64> {
    DEFAULT_VALUES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, v)| *v)
}

/// Read the first occurrence of a field, substituting its default when blank
fn field_value(fields: &[(String, String)], name: &str) -> Result<f64, FormError> {
    let raw = fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty());
    match raw {
        Some(v) => v.parse::<f64>().map_err(|_| FormError::InvalidNumber {
            field: name.to_string(),
            value: v.to_string(),
        }),
        // Every column in INPUT_FIELDS has an entry in DEFAULT_VALUES
        None => Ok(default_value(name).unwrap_or_default()),
    }
}

pub fn parse_form(fields: &[(String, String)]) -> Result<CompositeInput, FormError> {
    let value = |name| field_value(fields, name);
    Ok(CompositeInput {
        patch_angle_deg: value(columns::PATCH_ANGLE)?,
        patch_step: value(columns::PATCH_STEP)?,
        patch_density: value(columns::PATCH_DENSITY)?,
        matrix_filler_ratio: value(columns::MATRIX_FILLER_RATIO)?,
        density_kg_m3: value(columns::DENSITY)?,
        elastic_modulus_gpa: value(columns::ELASTIC_MODULUS)?,
        hardener_amount_pct: value(columns::HARDENER_AMOUNT)?,
        epoxy_group_content_pct: value(columns::EPOXY_GROUP_CONTENT)?,
        flash_point_c: value(columns::FLASH_POINT)?,
        surface_density_g_m2: value(columns::SURFACE_DENSITY)?,
        resin_consumption_g_m2: value(columns::RESIN_CONSUMPTION)?,
    })
}

/// JSON body returned by `POST /predict`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Success {
        properties: PropertyPrediction,
        ratio: f64,
        success: bool,
    },
    Failure {
        error: String,
        success: bool,
    },
}

impl PredictResponse {
    /// Properties rounded to 2 decimals, ratio to 4
    pub fn success(result: &OptimalComposite) -> Self {
        PredictResponse::Success {
            properties: PropertyPrediction {
                elastic_modulus: round_to(result.properties.elastic_modulus, 2),
                tensile_strength: round_to(result.properties.tensile_strength, 2),
            },
            ratio: round_to(result.ratio.matrix_filler_ratio, 4),
            success: true,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        PredictResponse::Failure {
            error: error.into(),
            success: false,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Input page with every field pre-filled from the default table
pub fn render_index() -> String {
    let mut inputs = String::new();
    for (name, default) in DEFAULT_VALUES {
        inputs.push_str(&format!(
            "      <label>{name}<input type=\"text\" name=\"{name}\" value=\"{default}\"></label>\n"
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
  <meta charset="utf-8">
  <title>Прогноз свойств композита</title>
  <style>
    body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }}
    label {{ display: flex; justify-content: space-between; margin: 0.3rem 0; }}
    input {{ width: 10rem; margin-left: 1rem; }}
    #result {{ margin-top: 1rem; white-space: pre-wrap; }}
  </style>
</head>
<body>
  <h1>Прогноз свойств композита</h1>
  <form id="predict-form">
{inputs}      <button type="submit">Рассчитать</button>
  </form>
  <div id="result"></div>
  <script>
    document.getElementById('predict-form').addEventListener('submit', async (e) => {{
      e.preventDefault();
      const body = new URLSearchParams(new FormData(e.target));
      const res = await fetch('/predict', {{ method: 'POST', body }});
      const data = await res.json();
      const out = document.getElementById('result');
      if (data.success) {{
        const lines = Object.entries(data.properties).map(([k, v]) => k + ': ' + v);
        lines.push('Соотношение матрица-наполнитель: ' + data.ratio);
        out.textContent = lines.join('\n');
      }} else {{
        out.textContent = 'Ошибка: ' + data.error;
      }}
    }});
  </script>
</body>
</html>
"#
    )
}
