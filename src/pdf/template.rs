//! The printable invoice document, shared by the HTML view and the PDF renderer.

use crate::invoicing::storage::{DbClient, DbSettings, InvoiceDocument};
use crate::invoicing::totals::{format_total, invoice_currency, invoice_total, line_total};
use crate::shared::utils::html_escape;

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(html_escape).unwrap_or_default()
}

fn address_block(name: Option<&str>, lines: [&Option<String>; 6], tax: &Option<String>) -> String {
    let mut out = Vec::new();
    if let Some(name) = name {
        out.push(format!("<strong>{}</strong>", html_escape(name)));
    }
    out.extend(lines.into_iter().flatten().map(|v| html_escape(v)));
    if let Some(tax) = tax {
        out.push(format!("Tax no. {}", html_escape(tax)));
    }
    out.join("<br>")
}

fn company_block(settings: &DbSettings) -> String {
    address_block(
        settings.company_name.as_deref(),
        [
            &settings.address_line1,
            &settings.state_or_province,
            &settings.postal_code,
            &settings.country,
            &settings.email_address,
            &settings.phone_number,
        ],
        &settings.tax_number,
    )
}

fn client_block(client: Option<&DbClient>) -> String {
    match client {
        Some(c) => address_block(
            Some(c.display_name()),
            [
                &c.address_line1,
                &c.state_or_province,
                &c.postal_code,
                &c.country,
                &c.email_address,
                &c.phone_number,
            ],
            &c.tax_number,
        ),
        None => "<em>No client selected</em>".to_string(),
    }
}

pub fn render_invoice_html(doc: &InvoiceDocument) -> String {
    let invoice = &doc.invoice;
    let currency = invoice_currency(&doc.products).unwrap_or_default();

    let rows: String = doc
        .products
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{} {}</td><td class=\"num\">{} {}</td></tr>",
                opt(&p.title),
                opt(&p.description),
                html_escape(&p.quantity.normalized().to_string()),
                html_escape(&p.currency),
                format_total(&p.price),
                html_escape(&p.currency),
                format_total(&line_total(p)),
            )
        })
        .collect();

    let banks: String = doc
        .bank_details
        .iter()
        .map(|b| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&b.bank_name),
                html_escape(&b.account_name),
                html_escape(&b.account_number),
                html_escape(&b.currency),
            )
        })
        .collect();
    let bank_section = if banks.is_empty() {
        String::new()
    } else {
        format!(
            r#"<h3>Payment details</h3>
    <table>
        <thead><tr><th>Bank</th><th>Account name</th><th>Account number</th><th>Currency</th></tr></thead>
        <tbody>{banks}</tbody>
    </table>"#
        )
    };

    let due = invoice
        .due_date
        .map(|d| d.format("%d %B %Y").to_string())
        .unwrap_or_else(|| "-".to_string());
    let notes = invoice
        .notes
        .as_deref()
        .map(|n| format!("<h3>Notes</h3><p>{}</p>", html_escape(n)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{number}</title>
    <style>
        body {{ font-family: Helvetica, Arial, sans-serif; color: #222; margin: 40px; font-size: 13px; }}
        .top {{ display: flex; justify-content: space-between; }}
        .top > div {{ width: 48%; }}
        h1 {{ font-size: 28px; margin: 0 0 8px; }}
        h3 {{ margin: 24px 0 8px; font-size: 14px; }}
        table {{ width: 100%; border-collapse: collapse; margin-top: 16px; }}
        th, td {{ border-bottom: 1px solid #ddd; padding: 8px 6px; text-align: left; }}
        th {{ background: #f4f4f4; }}
        .num {{ text-align: right; }}
        .total td {{ font-weight: bold; border-top: 2px solid #222; }}
        .meta td {{ border: none; padding: 2px 6px 2px 0; }}
    </style>
</head>
<body>
    <div class="top">
        <div>{company}</div>
        <div>
            <h1>Invoice</h1>
            <table class="meta">
                <tr><td>Number</td><td>{number}</td></tr>
                <tr><td>Title</td><td>{title}</td></tr>
                <tr><td>Due date</td><td>{due}</td></tr>
                <tr><td>Terms</td><td>{terms}</td></tr>
                <tr><td>Status</td><td>{status}</td></tr>
            </table>
        </div>
    </div>
    <h3>Bill to</h3>
    <p>{client}</p>
    <table>
        <thead><tr><th>Item</th><th>Description</th><th class="num">Qty</th><th class="num">Price</th><th class="num">Amount</th></tr></thead>
        <tbody>{rows}</tbody>
        <tfoot><tr class="total"><td colspan="4">Total</td><td class="num">{currency} {total}</td></tr></tfoot>
    </table>
    {bank_section}
    {notes}
</body>
</html>"#,
        number = html_escape(&invoice.number),
        title = opt(&invoice.title),
        terms = html_escape(&invoice.payment_terms),
        status = invoice.status(),
        company = company_block(&doc.settings),
        client = client_block(doc.client.as_ref()),
        currency = html_escape(currency),
        total = format_total(&invoice_total(&doc.products)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoicing::storage::{DbBankDetail, DbInvoice, DbProduct};
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn document() -> InvoiceDocument {
        let now = Utc::now();
        let company_id = Uuid::new_v4();
        let invoice = DbInvoice {
            id: Uuid::new_v4(),
            company_id,
            title: Some("Website <redesign>".into()),
            number: "INV-4f2a".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            payment_terms: "14 days".into(),
            status: "CURRENT".into(),
            notes: Some("Thanks!".into()),
            client_id: None,
            unique_id: "a1b2c3d4e5f6".into(),
            slug: "inv-4f2a-a1b2c3d4e5f6".into(),
            created_at: now,
            updated_at: now,
        };
        let product = |title: &str, qty: &str, price: &str| DbProduct {
            id: Uuid::new_v4(),
            invoice_id: invoice.id,
            title: Some(title.into()),
            description: None,
            quantity: BigDecimal::from_str(qty).expect("qty"),
            price: BigDecimal::from_str(price).expect("price"),
            currency: "USD".into(),
            unique_id: "000000000000".into(),
            slug: "p-000000000000".into(),
            created_at: now,
            updated_at: now,
        };
        let settings = DbSettings {
            id: Uuid::new_v4(),
            company_id,
            company_name: Some("Acme & Sons".into()),
            address_line1: Some("1 Marina".into()),
            country: Some("NG".into()),
            state_or_province: None,
            postal_code: None,
            phone_number: None,
            email_address: None,
            tax_number: Some("TX-1".into()),
            unique_id: "111111111111".into(),
            slug: "acme-sons-111111111111".into(),
            created_at: now,
            updated_at: now,
        };
        InvoiceDocument {
            products: vec![product("Design", "2", "150.00"), product("Hosting", "1", "20.5")],
            bank_details: vec![DbBankDetail {
                id: Uuid::new_v4(),
                settings_id: settings.id,
                bank_name: "First Bank".into(),
                account_name: "Acme".into(),
                account_number: "0123456789".into(),
                currency: "USD".into(),
                created_at: now,
            }],
            invoice,
            client: None,
            settings,
        }
    }

    #[test]
    fn test_document_contains_totals_and_parties() {
        let html = render_invoice_html(&document());
        assert!(html.contains("INV-4f2a"));
        assert!(html.contains("USD 320.50"));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(html.contains("Website &lt;redesign&gt;"));
        assert!(html.contains("No client selected"));
        assert!(html.contains("0123456789"));
        assert!(html.contains("01 February 2025"));
    }

    #[test]
    fn test_bank_section_omitted_without_accounts() {
        let mut doc = document();
        doc.bank_details.clear();
        assert!(!render_invoice_html(&doc).contains("Payment details"));
    }
}
