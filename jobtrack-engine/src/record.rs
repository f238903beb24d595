//! Composite order records and the coercion boundary
//!
//! Raw source records are untyped JSON objects. Nothing past this module
//! reads them directly except for display: every value used for filtering or
//! sorting is coerced here into a display string, with missing values
//! replaced by the `"N/A"` sentinel.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use jobtrack_common::NOT_AVAILABLE;

/// One record as returned by a data source
pub type RawSourceRecord = serde_json::Map<String, Value>;

/// Primary-source field holding the product image path
pub const IMAGE_FIELD: &str = "mainimagepath";

/// Coerce an optional raw value into its display string.
///
/// Missing, null and blank strings become `"N/A"`; numbers and booleans use
/// their textual form; arrays and objects become compact JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// A value counts as present when it is non-blank and not the sentinel
pub fn is_present(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != NOT_AVAILABLE
}

/// Named scalar fields extracted from the order header for fast filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub final_delivery_date: String,
    pub po_number: String,
    pub buyer: String,
    pub unit: String,
    pub style_id: String,
    pub quantity: String,
    pub u46: String,
    pub style_no: String,
    pub our_delivery_date: String,
    pub po_date: String,
    pub merchandiser: String,
    pub reference: String,
}

impl OrderSummary {
    /// Canonical names accepted by [`OrderSummary::get`]
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "final_delivery_date",
        "po_number",
        "buyer",
        "unit",
        "style_id",
        "quantity",
        "u46",
        "style_no",
        "our_delivery_date",
        "po_date",
        "merchandiser",
        "reference",
    ];

    pub fn from_fields(fields: &IndexMap<String, String>) -> Self {
        let pick = |key: &str| {
            fields
                .get(key)
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        // Older order headers only carry the yearly delivery column
        let final_delivery_date = match fields.get("finaldelvdate") {
            Some(value) if is_present(value) => value.clone(),
            _ => pick("final_year_delivery1"),
        };

        Self {
            final_delivery_date,
            po_number: pick("pono"),
            buyer: pick("buyer_sh"),
            unit: pick("punit_sh"),
            style_id: pick("styleid"),
            quantity: pick("quantity"),
            u46: pick("u46"),
            style_no: pick("styleno"),
            our_delivery_date: pick("ourdeldate"),
            po_date: pick("date"),
            merchandiser: pick("merch"),
            reference: pick("reference"),
        }
    }

    /// Look up a summary field by canonical name
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "final_delivery_date" => &self.final_delivery_date,
            "po_number" => &self.po_number,
            "buyer" => &self.buyer,
            "unit" => &self.unit,
            "style_id" => &self.style_id,
            "quantity" => &self.quantity,
            "u46" => &self.u46,
            "style_no" => &self.style_no,
            "our_delivery_date" => &self.our_delivery_date,
            "po_date" => &self.po_date,
            "merchandiser" => &self.merchandiser,
            "reference" => &self.reference,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// The merged, per-job entity
///
/// Built once per fetch cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeOrderRecord {
    /// Canonical job identifier; never empty and never `"N/A"`
    pub job_id: String,
    /// Every primary-source field as a display string, in source order
    pub primary_fields: IndexMap<String, String>,
    /// First matching record per linked source, in registration order
    pub linked_reports: IndexMap<String, Option<RawSourceRecord>>,
    /// Image path from the primary source, when it is a non-blank string
    pub image: Option<String>,
    pub summary: OrderSummary,
}

impl CompositeOrderRecord {
    /// Value of a named field: summary names first, then raw primary field
    /// names. Unknown fields read as `"N/A"`.
    pub fn field(&self, name: &str) -> &str {
        self.summary
            .get(name)
            .or_else(|| self.primary_fields.get(name).map(String::as_str))
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().map_or(false, is_present)
    }

    /// Linked reports that were found, with their source names
    pub fn present_reports(&self) -> impl Iterator<Item = (&str, &RawSourceRecord)> {
        self.linked_reports
            .iter()
            .filter_map(|(name, report)| report.as_ref().map(|r| (name.as_str(), r)))
    }

    pub fn has_linked_reports(&self) -> bool {
        self.present_reports().next().is_some()
    }
}
