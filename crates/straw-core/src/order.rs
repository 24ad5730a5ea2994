//! Read-only order summary derived from a configuration

use crate::config::{Configuration, StrawColor};

/// One labelled specification line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

/// Order volume figure, already formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFigure {
    pub label: &'static str,
    pub value: String,
}

/// Everything the summary window and the PDF show
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub color: StrawColor,
    /// Straw type, end type, dimensions, color, wrapper
    pub specifications: Vec<SummaryRow>,
    pub notes: Option<String>,
    pub volume: Vec<VolumeFigure>,
    pub total_qty: u64,
    /// Date line for exported documents, e.g. `2024-05-17`
    pub generated_on: Option<String>,
}

impl OrderSummary {
    pub fn from_config(config: &Configuration) -> Self {
        let specifications = vec![
            SummaryRow {
                label: "Straw Type",
                value: config.straw_type.display_name().to_string(),
            },
            SummaryRow {
                label: "End Type",
                value: config.end_type.display_name().to_string(),
            },
            SummaryRow {
                label: "Dimensions",
                value: format!("{}mm x {}mm", config.length_mm, config.diameter_mm),
            },
            SummaryRow {
                label: "Color",
                value: config.color.to_hex(),
            },
            SummaryRow {
                label: "Wrapper",
                value: config.wrapper_type.display_name().to_string(),
            },
        ];

        let volume = [
            ("Master Cartons", config.num_master_cartons),
            ("Inner Boxes / Ctn", config.inner_boxes_per_carton),
            ("Qty / Inner Box", config.qty_per_inner_box),
        ]
        .into_iter()
        .map(|(label, value)| VolumeFigure {
            label,
            value: format_thousands(u64::from(value.unwrap_or(0))),
        })
        .collect();

        let notes = Some(config.comments.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Self {
            color: config.color,
            specifications,
            notes,
            volume,
            total_qty: config.total_qty(),
            generated_on: None,
        }
    }

    /// Attach the date line
    pub fn with_generated_on(mut self, date: impl Into<String>) -> Self {
        self.generated_on = Some(date.into());
        self
    }

    pub fn total_formatted(&self) -> String {
        format_thousands(self.total_qty)
    }
}

/// Group digits in threes with commas: `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO date (`YYYY-MM-DD`, UTC) for seconds since the Unix epoch
pub fn iso_date_from_unix(secs: u64) -> String {
    // Civil-from-days over the proleptic Gregorian calendar
    let days = (secs / 86_400) as i64;
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!("{:04}-{:02}-{:02}", year, month, day)
}
