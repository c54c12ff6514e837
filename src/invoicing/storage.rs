use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::shared::schema::{bank_details, clients, invoices, products, settings};
use crate::core::shared::utils::{build_slug, unique_suffix};

use super::error::InvoicingError;
use super::forms::{BankDetailInput, InvoiceDetails, PartyDetails, ProductInput};
use super::types::InvoiceStatus;

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = clients)]
#[diesel(treat_none_as_null = true)]
pub struct DbClient {
    pub id: Uuid,
    pub company_id: Uuid,
    pub client_name: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub tax_number: Option<String>,
    pub unique_id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbClient {
    pub fn display_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or("Unnamed client")
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = invoices)]
pub struct DbInvoice {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: Option<String>,
    pub number: String,
    pub due_date: Option<NaiveDate>,
    pub payment_terms: String,
    pub status: String,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
    pub unique_id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbInvoice {
    pub fn status(&self) -> InvoiceStatus {
        self.status.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = products)]
pub struct DbProduct {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: BigDecimal,
    pub price: BigDecimal,
    pub currency: String,
    pub unique_id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = settings)]
#[diesel(treat_none_as_null = true)]
pub struct DbSettings {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub tax_number: Option<String>,
    pub unique_id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = bank_details)]
pub struct DbBankDetail {
    pub id: Uuid,
    pub settings_id: Uuid,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// An invoice with everything the list pages show next to it.
#[derive(Debug, Clone)]
pub struct InvoiceSummary {
    pub invoice: DbInvoice,
    pub client: Option<DbClient>,
    pub products: Vec<DbProduct>,
}

/// Everything needed to render an invoice document.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub invoice: DbInvoice,
    pub client: Option<DbClient>,
    pub products: Vec<DbProduct>,
    pub settings: DbSettings,
    pub bank_details: Vec<DbBankDetail>,
}

/// `INV-` followed by the second group of a fresh v4 UUID.
pub fn new_invoice_number() -> String {
    let id = Uuid::new_v4().to_string();
    let group = id.split('-').nth(1).unwrap_or_default();
    format!("INV-{group}")
}

// ----- clients -----

pub fn list_clients(conn: &mut PgConnection, company_id: Uuid) -> QueryResult<Vec<DbClient>> {
    clients::table
        .filter(clients::company_id.eq(company_id))
        .order(clients::created_at.desc())
        .load(conn)
}

pub fn count_clients(conn: &mut PgConnection, company_id: Uuid) -> QueryResult<i64> {
    clients::table
        .filter(clients::company_id.eq(company_id))
        .count()
        .get_result(conn)
}

pub fn find_client_by_slug(
    conn: &mut PgConnection,
    company_id: Uuid,
    slug: &str,
) -> QueryResult<DbClient> {
    clients::table
        .filter(clients::company_id.eq(company_id))
        .filter(clients::slug.eq(slug))
        .first(conn)
}

pub fn insert_client(
    conn: &mut PgConnection,
    company_id: Uuid,
    details: PartyDetails,
) -> QueryResult<DbClient> {
    let now = Utc::now();
    let unique_id = unique_suffix();
    let client = DbClient {
        id: Uuid::new_v4(),
        company_id,
        slug: build_slug(details.name.as_deref(), &unique_id),
        client_name: details.name,
        address_line1: details.address_line1,
        country: details.country,
        state_or_province: details.state_or_province,
        postal_code: details.postal_code,
        phone_number: details.phone_number,
        email_address: details.email_address,
        tax_number: details.tax_number,
        unique_id,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(clients::table)
        .values(&client)
        .execute(conn)?;

    Ok(client)
}

pub fn update_client(
    conn: &mut PgConnection,
    existing: &DbClient,
    details: PartyDetails,
) -> QueryResult<DbClient> {
    let client = DbClient {
        slug: build_slug(details.name.as_deref(), &existing.unique_id),
        client_name: details.name,
        address_line1: details.address_line1,
        country: details.country,
        state_or_province: details.state_or_province,
        postal_code: details.postal_code,
        phone_number: details.phone_number,
        email_address: details.email_address,
        tax_number: details.tax_number,
        updated_at: Utc::now(),
        ..existing.clone()
    };

    diesel::update(clients::table.find(existing.id))
        .set(&client)
        .execute(conn)?;

    Ok(client)
}

/// Deletes a client; its invoices are kept with the client reference cleared.
pub fn delete_client(conn: &mut PgConnection, company_id: Uuid, slug: &str) -> QueryResult<()> {
    conn.transaction(|conn| {
        let client = find_client_by_slug(conn, company_id, slug)?;

        diesel::update(invoices::table.filter(invoices::client_id.eq(client.id)))
            .set((
                invoices::client_id.eq(None::<Uuid>),
                invoices::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        diesel::delete(clients::table.find(client.id)).execute(conn)?;
        Ok(())
    })
}

// ----- invoices -----

pub fn create_blank_invoice(conn: &mut PgConnection, company_id: Uuid) -> QueryResult<DbInvoice> {
    let now = Utc::now();
    let number = new_invoice_number();
    let unique_id = unique_suffix();
    let invoice = DbInvoice {
        id: Uuid::new_v4(),
        company_id,
        title: None,
        slug: build_slug(Some(&number), &unique_id),
        number,
        due_date: None,
        payment_terms: super::types::PaymentTerms::default().to_string(),
        status: InvoiceStatus::default().to_string(),
        notes: None,
        client_id: None,
        unique_id,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(invoices::table)
        .values(&invoice)
        .execute(conn)?;

    Ok(invoice)
}

pub fn find_invoice_by_slug(
    conn: &mut PgConnection,
    company_id: Uuid,
    slug: &str,
) -> QueryResult<DbInvoice> {
    invoices::table
        .filter(invoices::company_id.eq(company_id))
        .filter(invoices::slug.eq(slug))
        .first(conn)
}

pub fn count_invoices(
    conn: &mut PgConnection,
    company_id: Uuid,
    status: Option<InvoiceStatus>,
) -> QueryResult<i64> {
    let mut query = invoices::table
        .filter(invoices::company_id.eq(company_id))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(invoices::status.eq(status.as_str()));
    }
    query.count().get_result(conn)
}

/// Every invoice of the tenant, newest first, with its client and products.
pub fn list_invoice_summaries(
    conn: &mut PgConnection,
    company_id: Uuid,
) -> QueryResult<Vec<InvoiceSummary>> {
    let rows: Vec<DbInvoice> = invoices::table
        .filter(invoices::company_id.eq(company_id))
        .order(invoices::created_at.desc())
        .load(conn)?;

    let invoice_ids: Vec<Uuid> = rows.iter().map(|i| i.id).collect();
    let client_ids: Vec<Uuid> = rows.iter().filter_map(|i| i.client_id).collect();

    let mut products_by_invoice: HashMap<Uuid, Vec<DbProduct>> = HashMap::new();
    let product_rows: Vec<DbProduct> = products::table
        .filter(products::invoice_id.eq_any(invoice_ids))
        .order(products::created_at.asc())
        .load(conn)?;
    for product in product_rows {
        products_by_invoice
            .entry(product.invoice_id)
            .or_default()
            .push(product);
    }

    let clients_by_id: HashMap<Uuid, DbClient> = clients::table
        .filter(clients::id.eq_any(client_ids))
        .load::<DbClient>(conn)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(rows
        .into_iter()
        .map(|invoice| InvoiceSummary {
            client: invoice.client_id.and_then(|id| clients_by_id.get(&id).cloned()),
            products: products_by_invoice.remove(&invoice.id).unwrap_or_default(),
            invoice,
        })
        .collect())
}

pub fn update_invoice_details(
    conn: &mut PgConnection,
    existing: &DbInvoice,
    details: InvoiceDetails,
) -> QueryResult<DbInvoice> {
    let now = Utc::now();
    let slug = build_slug(Some(&existing.number), &existing.unique_id);

    diesel::update(invoices::table.find(existing.id))
        .set((
            invoices::title.eq(&details.title),
            invoices::due_date.eq(Some(details.due_date)),
            invoices::payment_terms.eq(details.payment_terms.as_str()),
            invoices::status.eq(details.status.as_str()),
            invoices::notes.eq(&details.notes),
            invoices::slug.eq(&slug),
            invoices::updated_at.eq(now),
        ))
        .execute(conn)?;

    Ok(DbInvoice {
        title: details.title,
        due_date: Some(details.due_date),
        payment_terms: details.payment_terms.to_string(),
        status: details.status.to_string(),
        notes: details.notes,
        slug,
        updated_at: now,
        ..existing.clone()
    })
}

pub fn attach_client(
    conn: &mut PgConnection,
    invoice: &DbInvoice,
    client: &DbClient,
) -> QueryResult<()> {
    diesel::update(invoices::table.find(invoice.id))
        .set((
            invoices::client_id.eq(Some(client.id)),
            invoices::slug.eq(build_slug(Some(&invoice.number), &invoice.unique_id)),
            invoices::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn set_invoice_status(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    status: InvoiceStatus,
) -> QueryResult<()> {
    diesel::update(invoices::table.find(invoice_id))
        .set((
            invoices::status.eq(status.as_str()),
            invoices::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Deletes an invoice together with its line items.
pub fn delete_invoice(conn: &mut PgConnection, company_id: Uuid, slug: &str) -> QueryResult<()> {
    conn.transaction(|conn| {
        let invoice = find_invoice_by_slug(conn, company_id, slug)?;
        diesel::delete(products::table.filter(products::invoice_id.eq(invoice.id))).execute(conn)?;
        diesel::delete(invoices::table.find(invoice.id)).execute(conn)?;
        Ok(())
    })
}

// ----- products -----

pub fn insert_product(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    input: ProductInput,
) -> QueryResult<DbProduct> {
    let now = Utc::now();
    let unique_id = unique_suffix();
    let product = DbProduct {
        id: Uuid::new_v4(),
        invoice_id,
        slug: build_slug(input.title.as_deref(), &unique_id),
        title: input.title,
        description: input.description,
        quantity: input.quantity,
        price: input.price,
        currency: input.currency.to_string(),
        unique_id,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(products::table)
        .values(&product)
        .execute(conn)?;

    Ok(product)
}

pub fn products_for_invoice(
    conn: &mut PgConnection,
    invoice_id: Uuid,
) -> QueryResult<Vec<DbProduct>> {
    products::table
        .filter(products::invoice_id.eq(invoice_id))
        .order(products::created_at.asc())
        .load(conn)
}

/// All line items of the tenant paired with their invoice.
pub fn list_tenant_products(
    conn: &mut PgConnection,
    company_id: Uuid,
) -> QueryResult<Vec<(DbProduct, DbInvoice)>> {
    products::table
        .inner_join(invoices::table)
        .filter(invoices::company_id.eq(company_id))
        .order(products::created_at.desc())
        .select((products::all_columns, invoices::all_columns))
        .load(conn)
}

// ----- settings -----

/// The tenant's default settings row: the oldest one.
pub fn first_settings(conn: &mut PgConnection, company_id: Uuid) -> QueryResult<Option<DbSettings>> {
    settings::table
        .filter(settings::company_id.eq(company_id))
        .order(settings::created_at.asc())
        .first(conn)
        .optional()
}

pub fn insert_settings(
    conn: &mut PgConnection,
    company_id: Uuid,
    details: PartyDetails,
) -> QueryResult<DbSettings> {
    let now = Utc::now();
    let unique_id = unique_suffix();
    let row = DbSettings {
        id: Uuid::new_v4(),
        company_id,
        slug: build_slug(details.name.as_deref(), &unique_id),
        company_name: details.name,
        address_line1: details.address_line1,
        country: details.country,
        state_or_province: details.state_or_province,
        postal_code: details.postal_code,
        phone_number: details.phone_number,
        email_address: details.email_address,
        tax_number: details.tax_number,
        unique_id,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(settings::table)
        .values(&row)
        .execute(conn)?;

    Ok(row)
}

pub fn update_settings(
    conn: &mut PgConnection,
    existing: &DbSettings,
    details: PartyDetails,
) -> QueryResult<DbSettings> {
    let row = DbSettings {
        slug: build_slug(details.name.as_deref(), &existing.unique_id),
        company_name: details.name,
        address_line1: details.address_line1,
        country: details.country,
        state_or_province: details.state_or_province,
        postal_code: details.postal_code,
        phone_number: details.phone_number,
        email_address: details.email_address,
        tax_number: details.tax_number,
        updated_at: Utc::now(),
        ..existing.clone()
    };

    diesel::update(settings::table.find(existing.id))
        .set(&row)
        .execute(conn)?;

    Ok(row)
}

/// Settings named after the invoice's client when such a row exists,
/// otherwise the tenant's default settings.
pub fn settings_for_invoice(
    conn: &mut PgConnection,
    invoice: &DbInvoice,
    client: Option<&DbClient>,
) -> QueryResult<Option<DbSettings>> {
    if let Some(name) = client.and_then(|c| c.client_name.as_deref()) {
        let matched: Option<DbSettings> = settings::table
            .filter(settings::company_id.eq(invoice.company_id))
            .filter(settings::company_name.eq(name))
            .order(settings::created_at.asc())
            .first(conn)
            .optional()?;
        if matched.is_some() {
            return Ok(matched);
        }
    }
    first_settings(conn, invoice.company_id)
}

pub fn bank_details_for(
    conn: &mut PgConnection,
    settings_id: Uuid,
) -> QueryResult<Vec<DbBankDetail>> {
    bank_details::table
        .filter(bank_details::settings_id.eq(settings_id))
        .order(bank_details::created_at.asc())
        .load(conn)
}

pub fn insert_bank_detail(
    conn: &mut PgConnection,
    settings_id: Uuid,
    input: BankDetailInput,
) -> QueryResult<DbBankDetail> {
    let row = DbBankDetail {
        id: Uuid::new_v4(),
        settings_id,
        bank_name: input.bank_name,
        account_name: input.account_name,
        account_number: input.account_number,
        currency: input.currency.to_string(),
        created_at: Utc::now(),
    };

    diesel::insert_into(bank_details::table)
        .values(&row)
        .execute(conn)?;

    Ok(row)
}

/// Loads an invoice with its client, products and resolved company settings.
pub fn load_invoice_document(
    conn: &mut PgConnection,
    company_id: Uuid,
    slug: &str,
) -> Result<InvoiceDocument, InvoicingError> {
    let invoice = find_invoice_by_slug(conn, company_id, slug)
        .optional()?
        .ok_or_else(|| InvoicingError::NotFound(format!("Invoice {slug}")))?;

    let client = match invoice.client_id {
        Some(id) => clients::table.find(id).first::<DbClient>(conn).optional()?,
        None => None,
    };

    let settings =
        settings_for_invoice(conn, &invoice, client.as_ref())?.ok_or(InvoicingError::SettingsMissing)?;
    let products = products_for_invoice(conn, invoice.id)?;
    let bank_details = bank_details_for(conn, settings.id)?;

    Ok(InvoiceDocument {
        invoice,
        client,
        products,
        settings,
        bank_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_shape() {
        let number = new_invoice_number();
        assert!(number.starts_with("INV-"));
        let group = &number[4..];
        assert_eq!(group.len(), 4);
        assert!(group.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unknown_status_reads_as_current() {
        let now = Utc::now();
        let invoice = DbInvoice {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: None,
            number: "INV-0000".into(),
            due_date: None,
            payment_terms: "14 days".into(),
            status: "ARCHIVED".into(),
            notes: None,
            client_id: None,
            unique_id: "000000000000".into(),
            slug: "inv-0000-000000000000".into(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(invoice.status(), InvoiceStatus::Current);
    }
}
