#[cfg(test)]
mod db_integration_tests {
    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use diesel::r2d2::{ConnectionManager, PooledConnection};
    use invoiceserver::core::shared::schema::{companies, company_user_roles, invoices, users};
    use invoiceserver::core::shared::utils::{create_conn, run_migrations};
    use invoiceserver::invoicing::forms::{PartyDetails, ProductInput};
    use invoiceserver::invoicing::storage::{
        attach_client, create_blank_invoice, delete_client, delete_invoice, find_invoice_by_slug,
        insert_client, insert_product, insert_settings, load_invoice_document,
        products_for_invoice,
    };
    use invoiceserver::invoicing::totals::{format_total, invoice_total};
    use invoiceserver::invoicing::{Currency, InvoicingError};
    use invoiceserver::main_module::{bootstrap_tenant, InitOptions};
    use std::collections::HashSet;
    use std::str::FromStr;
    use uuid::Uuid;

    type Conn = PooledConnection<ConnectionManager<PgConnection>>;

    /// A connection inside a transaction that is never committed, or `None`
    /// when no test database is configured.
    fn test_conn() -> Option<Conn> {
        let url = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("Skipping test - TEST_DATABASE_URL not set");
                return None;
            }
        };
        let pool = match create_conn(&url) {
            Ok(pool) => pool,
            Err(e) => {
                println!("Skipping test - cannot connect to database: {e}");
                return None;
            }
        };
        run_migrations(&pool).expect("migrations");
        let mut conn = pool.get().expect("connection");
        conn.begin_test_transaction().expect("test transaction");
        Some(conn)
    }

    fn options() -> InitOptions {
        let tag = Uuid::new_v4().simple().to_string();
        InitOptions {
            admin_email: format!("admin-{tag}@example.com"),
            admin_password: "Sup3rSecretPass".to_string(),
            company_name: format!("Test Company {tag}"),
        }
    }

    fn tenant(conn: &mut Conn) -> Uuid {
        bootstrap_tenant(conn, &options()).expect("bootstrap").company.id
    }

    fn party(name: &str, email: Option<&str>) -> PartyDetails {
        PartyDetails {
            name: Some(name.to_string()),
            address_line1: Some("1 Marina Road".to_string()),
            country: Some("NG".to_string()),
            state_or_province: Some("Lagos".to_string()),
            postal_code: None,
            phone_number: None,
            email_address: email.map(str::to_string),
            tax_number: None,
        }
    }

    fn line(title: &str, quantity: &str, price: &str) -> ProductInput {
        ProductInput {
            title: Some(title.to_string()),
            description: None,
            quantity: BigDecimal::from_str(quantity).unwrap(),
            price: BigDecimal::from_str(price).unwrap(),
            currency: Currency::Usd,
        }
    }

    #[test]
    fn test_slugs_are_unique_for_same_names() {
        let Some(mut conn) = test_conn() else { return };
        let company = tenant(&mut conn);

        let mut slugs = HashSet::new();
        for _ in 0..5 {
            let client = insert_client(&mut conn, company, party("Acme Ltd", None)).unwrap();
            assert!(client.slug.starts_with("acme-ltd-"));
            assert!(slugs.insert(client.slug));

            let invoice = create_blank_invoice(&mut conn, company).unwrap();
            assert!(!invoice.slug.is_empty());
            assert!(slugs.insert(invoice.slug));
        }

        let unnamed = insert_client(&mut conn, company, PartyDetails::default()).unwrap();
        assert!(!unnamed.slug.is_empty());
    }

    #[test]
    fn test_invoice_document_totals() {
        let Some(mut conn) = test_conn() else { return };
        let company = tenant(&mut conn);

        let invoice = create_blank_invoice(&mut conn, company).unwrap();
        let missing = load_invoice_document(&mut conn, company, &invoice.slug);
        assert!(matches!(missing, Err(InvoicingError::SettingsMissing)));

        insert_settings(&mut conn, company, party("My Studio", None)).unwrap();
        insert_product(&mut conn, invoice.id, line("Design", "2", "100.12")).unwrap();
        insert_product(&mut conn, invoice.id, line("Hosting", "1", "110.00")).unwrap();

        let doc = load_invoice_document(&mut conn, company, &invoice.slug).unwrap();
        assert_eq!(doc.products.len(), 2);
        assert_eq!(format_total(&invoice_total(&doc.products)), "310.24");
        assert_eq!(doc.settings.company_name.as_deref(), Some("My Studio"));
    }

    #[test]
    fn test_deleting_invoice_removes_products() {
        let Some(mut conn) = test_conn() else { return };
        let company = tenant(&mut conn);

        let invoice = create_blank_invoice(&mut conn, company).unwrap();
        insert_product(&mut conn, invoice.id, line("Design", "1", "50")).unwrap();
        insert_product(&mut conn, invoice.id, line("Support", "3", "10")).unwrap();

        delete_invoice(&mut conn, company, &invoice.slug).unwrap();

        assert!(products_for_invoice(&mut conn, invoice.id).unwrap().is_empty());
        assert!(find_invoice_by_slug(&mut conn, company, &invoice.slug)
            .optional()
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_deleting_client_keeps_invoices() {
        let Some(mut conn) = test_conn() else { return };
        let company = tenant(&mut conn);

        let client = insert_client(&mut conn, company, party("Globex", Some("ap@globex.test"))).unwrap();
        let invoice = create_blank_invoice(&mut conn, company).unwrap();
        attach_client(&mut conn, &invoice, &client).unwrap();

        delete_client(&mut conn, company, &client.slug).unwrap();

        let client_id: Option<Uuid> = invoices::table
            .find(invoice.id)
            .select(invoices::client_id)
            .first(&mut conn)
            .unwrap();
        assert_eq!(client_id, None);
    }

    #[test]
    fn test_tenants_do_not_see_each_other() {
        let Some(mut conn) = test_conn() else { return };
        let first = tenant(&mut conn);
        let second = tenant(&mut conn);

        let invoice = create_blank_invoice(&mut conn, first).unwrap();
        assert!(find_invoice_by_slug(&mut conn, second, &invoice.slug)
            .optional()
            .unwrap()
            .is_none());
        assert!(delete_invoice(&mut conn, second, &invoice.slug).is_err());
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let Some(mut conn) = test_conn() else { return };
        let options = options();

        let first = bootstrap_tenant(&mut conn, &options).unwrap();
        let second = bootstrap_tenant(&mut conn, &options).unwrap();

        assert!(first.company_created);
        assert!(first.role_created);
        assert!(!second.user_created);
        assert!(!second.company_created);
        assert!(!second.role_created);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.company.id, second.company.id);

        let user_count: i64 = users::table
            .filter(users::email.eq(&options.admin_email))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert!(user_count <= 1);
        let company_count: i64 = companies::table
            .filter(companies::name.eq(&options.company_name))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(company_count, 1);
        let role_count: i64 = company_user_roles::table
            .filter(company_user_roles::company_id.eq(first.company.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(role_count, 1);
    }

    #[test]
    fn test_settings_named_after_client_win() {
        let Some(mut conn) = test_conn() else { return };
        let company = tenant(&mut conn);

        insert_settings(&mut conn, company, party("My Studio", None)).unwrap();
        insert_settings(&mut conn, company, party("Globex", Some("billing@globex.test"))).unwrap();

        let invoice = create_blank_invoice(&mut conn, company).unwrap();
        let doc = load_invoice_document(&mut conn, company, &invoice.slug).unwrap();
        assert_eq!(doc.settings.company_name.as_deref(), Some("My Studio"));

        let client = insert_client(&mut conn, company, party("Globex", Some("ap@globex.test"))).unwrap();
        attach_client(&mut conn, &invoice, &client).unwrap();

        let doc = load_invoice_document(&mut conn, company, &invoice.slug).unwrap();
        assert_eq!(doc.settings.company_name.as_deref(), Some("Globex"));
        assert_eq!(doc.client.map(|c| c.id), Some(client.id));
    }
}
