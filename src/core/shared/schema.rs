diesel::table! {
    users (id) {
        id -> Uuid,
        email -> Text,
        display_name -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    clients (id) {
        id -> Uuid,
        name -> Text,
        email -> Nullable<Text>,
        phone -> Nullable<Text>,
        company -> Nullable<Text>,
        address_line1 -> Nullable<Text>,
        postal_code -> Nullable<Text>,
        city -> Nullable<Text>,
        country -> Nullable<Text>,
        siret -> Nullable<Text>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    articles (id) {
        id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        default_rate -> Float8,
        pricing_type -> Text,
        category -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    services (id) {
        id -> Uuid,
        client_id -> Uuid,
        date -> Date,
        hours -> Float8,
        hourly_rate -> Float8,
        description -> Text,
        status -> Text,
        pricing_type -> Nullable<Text>,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    invoices (id) {
        id -> Uuid,
        number -> Text,
        client_id -> Uuid,
        activity_type -> Text,
        service_ids -> Array<Uuid>,
        subtotal -> Float8,
        urssaf_rate -> Float8,
        urssaf_deduction -> Float8,
        net_amount -> Float8,
        status -> Text,
        issue_date -> Date,
        due_date -> Date,
        notes -> Nullable<Text>,
        sent_at -> Nullable<Timestamptz>,
        paid_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        sender_id -> Uuid,
        recipient_id -> Nullable<Uuid>,
        subject -> Text,
        content -> Text,
        folder -> Text,
        is_read -> Bool,
        is_starred -> Bool,
        is_archived -> Bool,
        is_spam -> Bool,
        deleted_by_users -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(services -> clients (client_id));
diesel::joinable!(invoices -> clients (client_id));

diesel::allow_tables_to_appear_in_same_query!(users, clients, articles, services, invoices, messages);
