table! {
    coupons (id) {
        id -> Int4,
        code -> Varchar,
        discount_amount -> Float8,
        expiry_date -> Date,
        is_third_party -> Bool,
        max_uses -> Int4,
        current_uses -> Int4,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    user_coupons (id) {
        id -> Int4,
        user_id -> Int4,
        coupon_id -> Int4,
        assigned_at -> Timestamp,
        is_used -> Bool,
    }
}

table! {
    users (id) {
        id -> Int4,
        email -> Varchar,
        name -> Varchar,
        subscription_tier -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

joinable!(user_coupons -> coupons (coupon_id));
joinable!(user_coupons -> users (user_id));

allow_tables_to_appear_in_same_query!(coupons, user_coupons, users);
