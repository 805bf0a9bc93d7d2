use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use std::collections::HashMap;
use uuid::Uuid;

use super::stats::{monthly_contributions, YearStats};
use super::ReportsError;
use crate::prestations::Service;
use crate::urssaf::{compute_contributions, ActivityType};

const EURO_FORMAT: &str = "#,##0.00 \"€\"";

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x1E40AF))
        .set_background_color(Color::RGB(0xDBEAFE))
        .set_align(FormatAlign::Center)
}

fn write_header(sheet: &mut Worksheet, titles: &[&str]) -> Result<(), ReportsError> {
    let format = header_format();
    for (col, title) in titles.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &format)
            .map_err(export_error)?;
    }
    Ok(())
}

fn export_error(e: rust_xlsxwriter::XlsxError) -> ReportsError {
    ReportsError::Export(e.to_string())
}

/// Summary, monthly and services sheets for one year.
pub fn build_stats_workbook(
    stats: &YearStats,
    activity: ActivityType,
    services: &[Service],
    client_names: &HashMap<Uuid, String>,
) -> Result<Vec<u8>, ReportsError> {
    let mut workbook = Workbook::new();
    let euro = Format::new().set_num_format(EURO_FORMAT);
    let bold_euro = Format::new().set_bold().set_num_format(EURO_FORMAT);
    let label = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Synthèse").map_err(export_error)?;
        let year_result = compute_contributions(stats.revenue_total, activity);

        let rows: [(&str, f64, bool); 5] = [
            ("Chiffre d'affaires", year_result.revenue, true),
            ("Taux URSSAF", year_result.rate_percent(), false),
            ("Cotisations estimées", year_result.contributions, true),
            ("Revenu net estimé", year_result.net_revenue, true),
            ("Clients", stats.clients_count as f64, false),
        ];

        sheet
            .write_string_with_format(0, 0, format!("Année {}", stats.year), &label)
            .map_err(export_error)?;
        sheet
            .write_string(0, 1, activity.label())
            .map_err(export_error)?;

        for (i, (title, value, money)) in rows.iter().enumerate() {
            let row = i as u32 + 2;
            sheet
                .write_string_with_format(row, 0, *title, &label)
                .map_err(export_error)?;
            if *money {
                sheet
                    .write_number_with_format(row, 1, *value, &bold_euro)
                    .map_err(export_error)?;
            } else {
                sheet.write_number(row, 1, *value).map_err(export_error)?;
            }
        }

        let mut row = rows.len() as u32 + 3;
        for totals in &stats.services_by_status {
            sheet
                .write_string(row, 0, format!("Prestations {}", totals.status))
                .map_err(export_error)?;
            sheet
                .write_number(row, 1, totals.count as f64)
                .map_err(export_error)?;
            sheet
                .write_number_with_format(row, 2, totals.amount, &euro)
                .map_err(export_error)?;
            row += 1;
        }

        sheet.set_column_width(0, 28).map_err(export_error)?;
        sheet.set_column_width(1, 36).map_err(export_error)?;
        sheet.set_column_width(2, 16).map_err(export_error)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Mensuel").map_err(export_error)?;
        write_header(sheet, &["Mois", "Chiffre d'affaires", "Cotisations", "Net"])?;

        let months = monthly_contributions(&stats.monthly, activity);
        for (i, m) in months.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, &m.label).map_err(export_error)?;
            sheet
                .write_number_with_format(row, 1, m.revenue, &euro)
                .map_err(export_error)?;
            sheet
                .write_number_with_format(row, 2, m.contributions, &euro)
                .map_err(export_error)?;
            sheet
                .write_number_with_format(row, 3, m.net_revenue, &euro)
                .map_err(export_error)?;
        }

        let total_row = months.len() as u32 + 1;
        sheet
            .write_string_with_format(total_row, 0, "Total", &label)
            .map_err(export_error)?;
        let sum = |f: fn(&super::stats::MonthlyContribution) -> f64| months.iter().map(f).sum::<f64>();
        sheet
            .write_number_with_format(total_row, 1, sum(|m| m.revenue), &bold_euro)
            .map_err(export_error)?;
        sheet
            .write_number_with_format(total_row, 2, sum(|m| m.contributions), &bold_euro)
            .map_err(export_error)?;
        sheet
            .write_number_with_format(total_row, 3, sum(|m| m.net_revenue), &bold_euro)
            .map_err(export_error)?;

        sheet.set_column_width(0, 18).map_err(export_error)?;
        for col in 1..=3 {
            sheet.set_column_width(col, 18).map_err(export_error)?;
        }
        sheet.set_freeze_panes(1, 0).map_err(export_error)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Prestations").map_err(export_error)?;
        write_header(
            sheet,
            &["Date", "Client", "Description", "Quantité", "Unité", "Tarif", "Montant", "Statut"],
        )?;

        for (i, s) in services.iter().enumerate() {
            let row = i as u32 + 1;
            let client = client_names
                .get(&s.client_id)
                .map(String::as_str)
                .unwrap_or("");
            sheet
                .write_string(row, 0, s.date.format("%d/%m/%Y").to_string())
                .map_err(export_error)?;
            sheet.write_string(row, 1, client).map_err(export_error)?;
            sheet.write_string(row, 2, &s.description).map_err(export_error)?;
            sheet.write_number(row, 3, s.hours).map_err(export_error)?;
            sheet.write_string(row, 4, &s.unit_suffix).map_err(export_error)?;
            sheet
                .write_number_with_format(row, 5, s.hourly_rate, &euro)
                .map_err(export_error)?;
            sheet
                .write_number_with_format(row, 6, s.amount(), &euro)
                .map_err(export_error)?;
            sheet
                .write_string(row, 7, s.status.to_string())
                .map_err(export_error)?;
        }

        sheet.set_column_width(1, 24).map_err(export_error)?;
        sheet.set_column_width(2, 40).map_err(export_error)?;
        sheet.set_freeze_panes(1, 0).map_err(export_error)?;
    }

    workbook.save_to_buffer().map_err(export_error)
}
