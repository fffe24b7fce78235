//! Flat CSV view of the IMEI + sale join used by the reports page.

use anyhow::Result;
use chrono::NaiveDate;
use csv::Writer;

use crate::dto::imei::ImeiWithSale;

pub const CSV_HEADERS: [&str; 15] = [
    "IMEI",
    "Purchase Name",
    "Purchase Amount",
    "Purchase Date",
    "Brand",
    "Model",
    "Color",
    "RAM",
    "Storage",
    "Sold Name",
    "Sold Amount",
    "Sold Date",
    "Store",
    "Profit",
    "Created At",
];

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// One 15-column row. Profit is only filled in when the sale amount is positive.
pub fn csv_row(item: &ImeiWithSale) -> [String; 15] {
    let record = &item.record;
    let sold = item.sold.as_ref();
    let sold_amount = sold.map(|s| s.sold_amount).unwrap_or(0);
    let profit = if sold_amount > 0 {
        (sold_amount - record.amount).to_string()
    } else {
        String::new()
    };

    [
        record.imei.clone(),
        record.purchase.clone(),
        record.amount.to_string(),
        date_cell(record.date),
        record.brand.clone(),
        record.model.clone(),
        record.color.clone(),
        record.ram.clone(),
        record.storage.clone(),
        sold.map(|s| s.sold_name.clone()).unwrap_or_default(),
        sold.map(|s| s.sold_amount.to_string()).unwrap_or_default(),
        date_cell(sold.and_then(|s| s.sold_date)),
        sold.map(|s| s.store.clone()).unwrap_or_default(),
        profit,
        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

pub fn to_csv(items: &[ImeiWithSale]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for item in items {
        writer.write_record(csv_row(item))?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
