use chrono::NaiveDate;

use crate::core::config::CompanyConfig;
use crate::core::shared::utils::{escape_html, format_euros};
use crate::urssaf::handlers::{RevenueSource, UrssafSummary};

/// Printable revenue and contribution statement for one declaration period.
pub fn render_attestation_html(
    summary: &UrssafSummary,
    company: &CompanyConfig,
    issued_on: NaiveDate,
) -> String {
    let result = &summary.result;

    let months_html: String = summary
        .months
        .iter()
        .map(|m| {
            format!(
                r#"<tr><td>{}</td><td class="right">{}</td></tr>"#,
                escape_html(&m.label),
                format_euros(m.revenue)
            )
        })
        .collect();

    let breakdown = if months_html.is_empty() {
        String::new()
    } else {
        format!(
            r#"<table>
        <thead><tr><th>Mois</th><th class="right">Chiffre d'affaires</th></tr></thead>
        <tbody>{months_html}</tbody>
    </table>"#
        )
    };

    let source_note = match summary.revenue_source {
        RevenueSource::Services => "Chiffre d'affaires calculé à partir des prestations enregistrées.",
        RevenueSource::Override => "Chiffre d'affaires déclaré manuellement.",
    };

    let siret = company
        .siret
        .as_deref()
        .map(|s| format!("<div>SIRET : {}</div>", escape_html(s)))
        .unwrap_or_default();
    let address = company
        .address
        .as_deref()
        .map(|a| format!("<div>{}</div>", escape_html(a)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <title>Attestation {label}</title>
    <style>
        body {{ font-family: 'Helvetica Neue', Arial, sans-serif; margin: 0; padding: 40px; color: #333; }}
        h1 {{ font-size: 24px; color: #2563eb; }}
        .company {{ font-size: 14px; line-height: 1.6; margin-bottom: 32px; }}
        table {{ width: 100%; border-collapse: collapse; margin: 24px 0; }}
        th, td {{ padding: 10px 12px; border-bottom: 1px solid #e5e7eb; text-align: left; }}
        th {{ background: #f9fafb; font-size: 13px; text-transform: uppercase; color: #6b7280; }}
        .right {{ text-align: right; }}
        .total td {{ font-weight: bold; }}
        .note {{ font-size: 12px; color: #6b7280; }}
    </style>
</head>
<body>
    <div class="company">
        <strong>{company_name}</strong>
        {siret}
        {address}
    </div>
    <h1>Attestation de chiffre d'affaires : {label}</h1>
    <p>Activité : {activity}</p>
    {breakdown}
    <table>
        <tbody>
            <tr><td>Chiffre d'affaires</td><td class="right">{revenue}</td></tr>
            <tr><td>Taux de cotisation</td><td class="right">{rate:.1} %</td></tr>
            <tr><td>Cotisations sociales estimées</td><td class="right">{contributions}</td></tr>
            <tr class="total"><td>Revenu net estimé</td><td class="right">{net}</td></tr>
        </tbody>
    </table>
    <p class="note">{source_note}</p>
    <p class="note">Établie le {issued}.</p>
</body>
</html>"#,
        label = escape_html(&summary.label),
        company_name = escape_html(&company.name),
        activity = escape_html(&summary.activity_label),
        revenue = format_euros(result.revenue),
        rate = result.rate_percent(),
        contributions = format_euros(result.contributions),
        net = format_euros(result.net_revenue),
        issued = issued_on.format("%d/%m/%Y"),
    )
}
