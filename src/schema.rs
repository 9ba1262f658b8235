diesel::table! {
    slots (id) {
        id -> Int4,
        date -> Date,
        #[max_length = 5]
        time -> Varchar,
        capacity -> Int4,
        booked -> Int4,
    }
}

diesel::table! {
    reservations (id) {
        id -> Int4,
        full_name -> Text,
        phone -> Text,
        email -> Text,
        appointment_date -> Date,
        #[max_length = 5]
        appointment_time -> Varchar,
        slot_id -> Int4,
        confirmed -> Bool,
        checked_in -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(slots, reservations);
