use super::service::InvoiceDocument;
use super::types::InvoiceStatus;
use crate::core::config::CompanyConfig;
use crate::core::shared::utils::{escape_html, format_euros};

pub fn render_invoice_html(doc: &InvoiceDocument, company: &CompanyConfig) -> String {
    let invoice = &doc.invoice;
    let client = &doc.client;

    let lines_html: String = doc
        .services
        .iter()
        .map(|s| {
            format!(
                r#"<tr>
                        <td>{}</td>
                        <td>{}</td>
                        <td class="right">{}</td>
                        <td class="right">{}</td>
                        <td class="right">{}</td>
                    </tr>"#,
                s.date.format("%d/%m/%Y"),
                escape_html(&s.description),
                escape_html(&s.quantity_label()),
                format_euros(s.hourly_rate),
                format_euros(s.amount())
            )
        })
        .collect();

    let client_address: String = client
        .address_lines()
        .iter()
        .map(|l| format!("<div>{}</div>", escape_html(l)))
        .collect();

    let status_class = match invoice.status {
        InvoiceStatus::Paid => "status-paid",
        InvoiceStatus::Sent => "status-sent",
        InvoiceStatus::Draft => "status-draft",
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <title>Facture {number}</title>
    <style>
        body {{ font-family: 'Helvetica Neue', Arial, sans-serif; margin: 0; padding: 40px; color: #333; }}
        .header {{ display: flex; justify-content: space-between; margin-bottom: 40px; }}
        .company-name {{ font-size: 24px; font-weight: bold; margin-bottom: 8px; }}
        .company-info {{ font-size: 14px; line-height: 1.6; }}
        .invoice-info {{ text-align: right; }}
        .invoice-number {{ font-size: 28px; font-weight: bold; color: #2563eb; }}
        .invoice-date {{ font-size: 14px; color: #666; margin-top: 8px; }}
        .status {{ display: inline-block; padding: 4px 12px; border-radius: 4px; font-size: 12px; font-weight: bold; text-transform: uppercase; }}
        .status-paid {{ background: #dcfce7; color: #166534; }}
        .status-sent {{ background: #dbeafe; color: #1e40af; }}
        .status-draft {{ background: #f3f4f6; color: #6b7280; }}
        .customer-section {{ margin-bottom: 40px; padding: 20px; background: #f9fafb; border-radius: 8px; }}
        .customer-section h3 {{ margin: 0 0 12px 0; font-size: 12px; text-transform: uppercase; color: #666; }}
        .customer-name {{ font-size: 18px; font-weight: bold; }}
        table {{ width: 100%; border-collapse: collapse; margin-bottom: 20px; }}
        th {{ background: #f3f4f6; padding: 12px; text-align: left; font-size: 12px; text-transform: uppercase; color: #666; }}
        td {{ padding: 12px; border-bottom: 1px solid #e5e7eb; }}
        .right {{ text-align: right; }}
        .totals table {{ width: 340px; margin-left: auto; }}
        .totals td {{ padding: 8px 0; }}
        .totals .total-row {{ font-size: 18px; font-weight: bold; border-top: 2px solid #333; }}
        .urssaf td {{ color: #666; }}
        .notes {{ margin-top: 40px; padding: 20px; background: #fffbeb; border-radius: 8px; font-size: 14px; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 1px solid #e5e7eb; font-size: 12px; color: #666; text-align: center; }}
    </style>
</head>
<body>
    <div class="header">
        <div class="company-info">
            <div class="company-name">{company_name}</div>
            {company_address}
            {company_siret}
        </div>
        <div class="invoice-info">
            <div class="invoice-number">Facture {number}</div>
            <div class="invoice-date">Date : {issue_date}</div>
            <div class="invoice-date">Échéance : {due_date}</div>
            <div style="margin-top: 12px;"><span class="status {status_class}">{status_label}</span></div>
        </div>
    </div>

    <div class="customer-section">
        <h3>Facturé à</h3>
        <div class="customer-name">{client_name}</div>
        {client_address}
        {client_siret}
    </div>

    <table>
        <thead>
            <tr>
                <th>Date</th>
                <th>Prestation</th>
                <th class="right">Quantité</th>
                <th class="right">Prix unitaire</th>
                <th class="right">Montant</th>
            </tr>
        </thead>
        <tbody>
            {lines_html}
        </tbody>
    </table>

    <div class="totals">
        <table>
            <tr class="total-row">
                <td>Total</td>
                <td class="right">{subtotal}</td>
            </tr>
            <tr class="urssaf">
                <td>Cotisations URSSAF estimées ({rate:.1} %)</td>
                <td class="right">{deduction}</td>
            </tr>
            <tr class="urssaf">
                <td>Net estimé</td>
                <td class="right">{net}</td>
            </tr>
        </table>
    </div>

    {notes}

    <div class="footer">TVA non applicable, art. 293 B du CGI</div>
</body>
</html>"#,
        number = escape_html(&invoice.number),
        company_name = escape_html(&company.name),
        company_address = company
            .address
            .as_deref()
            .map(|a| format!("<div>{}</div>", escape_html(a)))
            .unwrap_or_default(),
        company_siret = company
            .siret
            .as_deref()
            .map(|s| format!("<div>SIRET : {}</div>", escape_html(s)))
            .unwrap_or_default(),
        issue_date = invoice.issue_date.format("%d/%m/%Y"),
        due_date = invoice.due_date.format("%d/%m/%Y"),
        status_class = status_class,
        status_label = invoice.status.label(),
        client_name = escape_html(client.display_name()),
        client_address = client_address,
        client_siret = client
            .siret
            .as_deref()
            .map(|s| format!("<div>SIRET : {}</div>", escape_html(s)))
            .unwrap_or_default(),
        lines_html = lines_html,
        subtotal = format_euros(invoice.subtotal),
        rate = invoice.urssaf_rate * 100.0,
        deduction = format_euros(invoice.urssaf_deduction),
        net = format_euros(invoice.net_amount),
        notes = invoice
            .notes
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| format!(
                r#"<div class="notes"><strong>Notes :</strong><br>{}</div>"#,
                escape_html(n)
            ))
            .unwrap_or_default(),
    )
}
