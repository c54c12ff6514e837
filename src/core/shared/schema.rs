diesel::table! {
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        is_superuser -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    companies (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        website -> Nullable<Varchar>,
        description -> Nullable<Text>,
        country -> Nullable<Varchar>,
        tax_number -> Nullable<Varchar>,
        subscription_plan -> Varchar,
        subscription_status -> Varchar,
        is_active -> Bool,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    company_user_roles (id) {
        id -> Uuid,
        user_id -> Uuid,
        company_id -> Uuid,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    clients (id) {
        id -> Uuid,
        company_id -> Uuid,
        client_name -> Nullable<Varchar>,
        address_line1 -> Nullable<Varchar>,
        country -> Nullable<Varchar>,
        state_or_province -> Nullable<Varchar>,
        postal_code -> Nullable<Varchar>,
        phone_number -> Nullable<Varchar>,
        email_address -> Nullable<Varchar>,
        tax_number -> Nullable<Varchar>,
        unique_id -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    invoices (id) {
        id -> Uuid,
        company_id -> Uuid,
        title -> Nullable<Varchar>,
        number -> Varchar,
        due_date -> Nullable<Date>,
        payment_terms -> Varchar,
        status -> Varchar,
        notes -> Nullable<Text>,
        client_id -> Nullable<Uuid>,
        unique_id -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        invoice_id -> Uuid,
        title -> Nullable<Varchar>,
        description -> Nullable<Text>,
        quantity -> Numeric,
        price -> Numeric,
        currency -> Varchar,
        unique_id -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    settings (id) {
        id -> Uuid,
        company_id -> Uuid,
        company_name -> Nullable<Varchar>,
        address_line1 -> Nullable<Varchar>,
        country -> Nullable<Varchar>,
        state_or_province -> Nullable<Varchar>,
        postal_code -> Nullable<Varchar>,
        phone_number -> Nullable<Varchar>,
        email_address -> Nullable<Varchar>,
        tax_number -> Nullable<Varchar>,
        unique_id -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    bank_details (id) {
        id -> Uuid,
        settings_id -> Uuid,
        bank_name -> Varchar,
        account_name -> Varchar,
        account_number -> Varchar,
        currency -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(companies -> users (owner_id));
diesel::joinable!(company_user_roles -> users (user_id));
diesel::joinable!(company_user_roles -> companies (company_id));
diesel::joinable!(clients -> companies (company_id));
diesel::joinable!(invoices -> companies (company_id));
diesel::joinable!(invoices -> clients (client_id));
diesel::joinable!(products -> invoices (invoice_id));
diesel::joinable!(settings -> companies (company_id));
diesel::joinable!(bank_details -> settings (settings_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    companies,
    company_user_roles,
    clients,
    invoices,
    products,
    settings,
    bank_details,
);
