//! HTML fragments for the invoicing pages. Callers wrap them with
//! [`crate::web::layout::page`].

use crate::shared::utils::html_escape;

use super::storage::{DbBankDetail, DbClient, DbInvoice, DbProduct, DbSettings, InvoiceSummary};
use super::totals::{format_total, invoice_currency, invoice_total, line_total};
use super::types::{Currency, InvoiceStatus, PaymentTerms};

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(html_escape).unwrap_or_default()
}

fn input(label: &str, name: &str, value: &Option<String>, kind: &str) -> String {
    format!(
        r#"<label for="{name}">{label}</label>
                <input id="{name}" name="{name}" type="{kind}" value="{}">"#,
        opt(value)
    )
}

fn select<I>(label: &str, name: &str, options: I, selected: &str) -> String
where
    I: IntoIterator<Item = (&'static str, &'static str)>,
{
    let options: String = options
        .into_iter()
        .map(|(value, text)| {
            let sel = if value == selected { " selected" } else { "" };
            format!(r#"<option value="{value}"{sel}>{text}</option>"#)
        })
        .collect();
    format!(
        r#"<label for="{name}">{label}</label>
                <select id="{name}" name="{name}">{options}</select>"#
    )
}

fn currency_select(selected: &str) -> String {
    select(
        "Currency",
        "currency",
        Currency::ALL.map(|c| (c.code(), c.label())),
        selected,
    )
}

pub fn dashboard(clients: i64, invoices: i64, paid: i64) -> String {
    format!(
        r#"<div class="header"><h1>Dashboard</h1>
            <a class="btn btn-primary" href="/invoices/create">+ New invoice</a></div>
        <div class="stats">
            <div class="card"><div class="stat-value">{clients}</div><div class="stat-label">Clients</div></div>
            <div class="card"><div class="stat-value">{invoices}</div><div class="stat-label">Invoices</div></div>
            <div class="card"><div class="stat-value">{paid}</div><div class="stat-label">Paid invoices</div></div>
        </div>"#
    )
}

/// Client fields shared by the create and edit forms.
fn client_fields(client: Option<&DbClient>) -> String {
    let get = |f: fn(&DbClient) -> &Option<String>| client.map(f).cloned().unwrap_or_default();
    [
        input("Client name", "client_name", &get(|c| &c.client_name), "text"),
        input("Address", "address_line1", &get(|c| &c.address_line1), "text"),
        input("Country (ISO code)", "country", &get(|c| &c.country), "text"),
        input("State or province", "state_or_province", &get(|c| &c.state_or_province), "text"),
        input("Postal code", "postal_code", &get(|c| &c.postal_code), "text"),
        input("Phone number", "phone_number", &get(|c| &c.phone_number), "tel"),
        input("Email address", "email_address", &get(|c| &c.email_address), "email"),
        input("Tax number", "tax_number", &get(|c| &c.tax_number), "text"),
    ]
    .join("\n                ")
}

pub fn clients_page(clients: &[DbClient]) -> String {
    let rows: String = clients
        .iter()
        .map(|c| {
            format!(
                r#"<tr><td>{name}</td><td>{email}</td><td>{phone}</td><td>{country}</td>
                <td><a href="/clients/{slug}/edit">Edit</a>
                <form class="inline" method="post" action="/clients/{slug}/delete">
                    <button class="btn btn-link" type="submit">Delete</button></form></td></tr>"#,
                name = html_escape(c.display_name()),
                email = opt(&c.email_address),
                phone = opt(&c.phone_number),
                country = opt(&c.country),
                slug = html_escape(&c.slug),
            )
        })
        .collect();
    let table = if clients.is_empty() {
        r#"<div class="empty-state">No clients yet</div>"#.to_string()
    } else {
        format!(
            "<table><thead><tr><th>Name</th><th>Email</th><th>Phone</th><th>Country</th><th></th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };
    format!(
        r#"<div class="header"><h1>Clients</h1></div>
        <div class="card">{table}</div>
        <div class="card">
            <h2>Add client</h2>
            <form class="stacked" method="post" action="/clients">
                {fields}
                <button class="btn btn-primary" type="submit">Save client</button>
            </form>
        </div>"#,
        fields = client_fields(None),
    )
}

pub fn client_edit_page(client: &DbClient) -> String {
    format!(
        r#"<div class="header"><h1>Edit {name}</h1></div>
        <div class="card">
            <form class="stacked" method="post" action="/clients/{slug}/edit">
                {fields}
                <button class="btn btn-primary" type="submit">Update client</button>
            </form>
        </div>"#,
        name = html_escape(client.display_name()),
        slug = html_escape(&client.slug),
        fields = client_fields(Some(client)),
    )
}

pub fn invoices_page(summaries: &[InvoiceSummary]) -> String {
    let rows: String = summaries
        .iter()
        .map(|s| {
            let inv = &s.invoice;
            let currency = invoice_currency(&s.products).unwrap_or_default();
            format!(
                r#"<tr><td><a href="/invoices/create-build/{slug}">{number}</a></td><td>{title}</td><td>{client}</td>
                <td>{due}</td><td><span class="status">{status}</span></td><td>{currency} {total}</td>
                <td><a href="/invoices/view-pdf/{slug}">View</a> ·
                <a href="/invoices/view-document/{slug}">PDF</a> ·
                <a href="/invoices/email-document/{slug}">Email</a> ·
                <a href="/invoices/delete/{slug}">Delete</a></td></tr>"#,
                slug = html_escape(&inv.slug),
                number = html_escape(&inv.number),
                title = opt(&inv.title),
                client = s
                    .client
                    .as_ref()
                    .map(|c| html_escape(c.display_name()))
                    .unwrap_or_default(),
                due = inv.due_date.map(|d| d.to_string()).unwrap_or_default(),
                status = inv.status(),
                currency = html_escape(currency),
                total = format_total(&invoice_total(&s.products)),
            )
        })
        .collect();
    let table = if summaries.is_empty() {
        r#"<div class="empty-state">No invoices yet</div>"#.to_string()
    } else {
        format!(
            "<table><thead><tr><th>Number</th><th>Title</th><th>Client</th><th>Due</th><th>Status</th><th>Total</th><th></th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };
    format!(
        r#"<div class="header"><h1>Invoices</h1>
            <a class="btn btn-primary" href="/invoices/create">+ New invoice</a></div>
        <div class="card">{table}</div>"#
    )
}

pub fn products_page(rows: &[(DbProduct, DbInvoice)]) -> String {
    let body: String = rows
        .iter()
        .map(|(p, inv)| {
            format!(
                r#"<tr><td>{title}</td><td>{description}</td><td>{qty}</td><td>{currency} {price}</td>
                <td><a href="/invoices/create-build/{slug}">{number}</a></td></tr>"#,
                title = opt(&p.title),
                description = opt(&p.description),
                qty = p.quantity.normalized(),
                currency = html_escape(&p.currency),
                price = format_total(&p.price),
                slug = html_escape(&inv.slug),
                number = html_escape(&inv.number),
            )
        })
        .collect();
    let table = if rows.is_empty() {
        r#"<div class="empty-state">No products yet</div>"#.to_string()
    } else {
        format!(
            "<table><thead><tr><th>Title</th><th>Description</th><th>Qty</th><th>Price</th><th>Invoice</th></tr></thead><tbody>{body}</tbody></table>"
        )
    };
    format!(r#"<div class="header"><h1>Products</h1></div><div class="card">{table}</div>"#)
}

pub fn build_invoice_page(
    invoice: &DbInvoice,
    products: &[DbProduct],
    clients: &[DbClient],
    current_client: Option<&DbClient>,
) -> String {
    let slug = html_escape(&invoice.slug);
    let currency = invoice_currency(products).unwrap_or_default();

    let product_rows: String = products
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td><td>{} {}</td></tr>",
                opt(&p.title),
                opt(&p.description),
                p.quantity.normalized(),
                html_escape(&p.currency),
                format_total(&p.price),
                html_escape(&p.currency),
                format_total(&line_total(p)),
            )
        })
        .collect();

    let client_options: String = clients
        .iter()
        .map(|c| {
            let sel = if Some(c.id) == invoice.client_id { " selected" } else { "" };
            format!(
                r#"<option value="{}"{sel}>{}</option>"#,
                html_escape(&c.slug),
                html_escape(c.display_name())
            )
        })
        .collect();

    let terms = select(
        "Payment terms",
        "payment_terms",
        PaymentTerms::ALL.map(|t| (t.as_str(), t.as_str())),
        &invoice.payment_terms,
    );
    let status = select(
        "Status",
        "status",
        InvoiceStatus::ALL.map(|s| (s.as_str(), s.as_str())),
        &invoice.status,
    );
    let due = invoice.due_date.map(|d| d.to_string());

    format!(
        r#"<div class="header"><h1>Invoice {number}</h1>
            <div>
                <a class="btn btn-primary" href="/invoices/view-pdf/{slug}">View</a>
                <a class="btn btn-primary" href="/invoices/view-document/{slug}">Download PDF</a>
                <a class="btn btn-primary" href="/invoices/email-document/{slug}">Email client</a>
            </div></div>
        <div class="card">
            <h2>Client: {client}</h2>
            <form class="stacked" method="post" action="/invoices/create-build/{slug}/client">
                <label for="client">Select client</label>
                <select id="client" name="client"><option value="">-</option>{client_options}</select>
                <button class="btn btn-primary" type="submit">Attach client</button>
            </form>
        </div>
        <div class="card">
            <h2>Line items</h2>
            <table><thead><tr><th>Title</th><th>Description</th><th>Qty</th><th>Price</th><th>Amount</th></tr></thead>
            <tbody>{product_rows}</tbody>
            <tfoot><tr><th colspan="4">Total</th><th>{currency} {total}</th></tr></tfoot></table>
            <form class="stacked" method="post" action="/invoices/create-build/{slug}/products">
                {title}
                <label for="description">Description</label>
                <textarea id="description" name="description" rows="2"></textarea>
                <label for="quantity">Quantity</label>
                <input id="quantity" name="quantity" type="number" step="any" min="0" required>
                <label for="price">Price</label>
                <input id="price" name="price" type="number" step="0.01" min="0" required>
                {currency_select}
                <button class="btn btn-primary" type="submit">Add product</button>
            </form>
        </div>
        <div class="card">
            <h2>Details</h2>
            <form class="stacked" method="post" action="/invoices/create-build/{slug}/details">
                {invoice_title}
                {due_input}
                {terms}
                {status}
                <label for="notes">Notes</label>
                <textarea id="notes" name="notes" rows="3">{notes}</textarea>
                <button class="btn btn-primary" type="submit">Save details</button>
            </form>
        </div>"#,
        number = html_escape(&invoice.number),
        client = current_client
            .map(|c| html_escape(c.display_name()))
            .unwrap_or_else(|| "none".to_string()),
        currency = html_escape(currency),
        total = format_total(&invoice_total(products)),
        title = input("Title", "title", &None, "text"),
        currency_select = currency_select(Currency::default().code()),
        invoice_title = input("Title", "title", &invoice.title, "text"),
        due_input = input("Due date (blank: from payment terms)", "due_date", &due, "date"),
        notes = opt(&invoice.notes),
    )
}

pub fn delete_invoice_page(invoice: &DbInvoice) -> String {
    format!(
        r#"<div class="card">
            <h2>Delete invoice {number}?</h2>
            <p style="margin-bottom: 16px">The invoice and all of its line items will be removed.</p>
            <form class="inline" method="post" action="/invoices/delete/{slug}">
                <button class="btn btn-danger" type="submit">Delete</button>
            </form>
            <a class="btn btn-link" href="/invoices">Cancel</a>
        </div>"#,
        number = html_escape(&invoice.number),
        slug = html_escape(&invoice.slug),
    )
}

pub fn settings_page(settings: &DbSettings, banks: &[DbBankDetail]) -> String {
    let detail = |label: &str, value: &Option<String>| {
        format!("<tr><th>{label}</th><td>{}</td></tr>", opt(value))
    };
    let rows = [
        detail("Company name", &settings.company_name),
        detail("Address", &settings.address_line1),
        detail("State or province", &settings.state_or_province),
        detail("Postal code", &settings.postal_code),
        detail("Country", &settings.country),
        detail("Phone", &settings.phone_number),
        detail("Email", &settings.email_address),
        detail("Tax number", &settings.tax_number),
    ]
    .concat();
    let bank_rows: String = banks
        .iter()
        .map(|b| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&b.bank_name),
                html_escape(&b.account_name),
                html_escape(&b.account_number),
                html_escape(&b.currency)
            )
        })
        .collect();
    format!(
        r#"<div class="header"><h1>Company settings</h1>
            <a class="btn btn-primary" href="/company/settings/edit">Edit</a></div>
        <div class="card"><table>{rows}</table></div>
        <div class="card">
            <h2>Bank accounts</h2>
            <table><thead><tr><th>Bank</th><th>Account name</th><th>Account number</th><th>Currency</th></tr></thead>
            <tbody>{bank_rows}</tbody></table>
            <form class="stacked" method="post" action="/company/settings/bank-accounts">
                {bank}
                {account_name}
                {account_number}
                {currency}
                <button class="btn btn-primary" type="submit">Add bank account</button>
            </form>
        </div>"#,
        bank = input("Bank name", "bank_name", &None, "text"),
        account_name = input("Account name", "account_name", &None, "text"),
        account_number = input("Account number", "account_number", &None, "text"),
        currency = currency_select(Currency::default().code()),
    )
}

pub fn settings_edit_page(settings: Option<&DbSettings>) -> String {
    let get = |f: fn(&DbSettings) -> &Option<String>| settings.map(f).cloned().unwrap_or_default();
    let fields = [
        input("Company name", "company_name", &get(|s| &s.company_name), "text"),
        input("Address", "address_line1", &get(|s| &s.address_line1), "text"),
        input("Country (ISO code)", "country", &get(|s| &s.country), "text"),
        input("State or province", "state_or_province", &get(|s| &s.state_or_province), "text"),
        input("Postal code", "postal_code", &get(|s| &s.postal_code), "text"),
        input("Phone number", "phone_number", &get(|s| &s.phone_number), "tel"),
        input("Email address", "email_address", &get(|s| &s.email_address), "email"),
        input("Tax number", "tax_number", &get(|s| &s.tax_number), "text"),
    ]
    .join("\n                ");
    let heading = if settings.is_some() {
        "Edit company settings"
    } else {
        "Create company settings"
    };
    format!(
        r#"<div class="header"><h1>{heading}</h1></div>
        <div class="card">
            <form class="stacked" method="post" action="/company/settings/edit">
                {fields}
                <button class="btn btn-primary" type="submit">Save</button>
            </form>
        </div>"#
    )
}
