//! Diesel table definitions for the single-file kbar store.
//!
//! Column names and the all-or-nothing null convention on the eight
//! stem-branch columns are load-bearing: a row either has every label column
//! populated or none, and a partially populated row counts as "needs
//! computation".

#![allow(missing_docs)]

diesel::table! {
    kbar_data (id) {
        id -> Nullable<Integer>,
        symbol -> Text,
        exchange -> Text,
        period -> Text,
        ts -> Text,
        open -> Double,
        high -> Double,
        low -> Double,
        close -> Double,
        volume -> Double,
        amount -> Double,
        year_gan -> Nullable<Text>,
        year_zhi -> Nullable<Text>,
        month_gan -> Nullable<Text>,
        month_zhi -> Nullable<Text>,
        day_gan -> Nullable<Text>,
        day_zhi -> Nullable<Text>,
        hour_gan -> Nullable<Text>,
        hour_zhi -> Nullable<Text>,
    }
}

diesel::table! {
    stock_meta (symbol) {
        symbol -> Text,
        name -> Text,
        exchange -> Text,
        list_date -> Text,
        year_gan -> Nullable<Text>,
        year_zhi -> Nullable<Text>,
        month_gan -> Nullable<Text>,
        month_zhi -> Nullable<Text>,
        day_gan -> Nullable<Text>,
        day_zhi -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(kbar_data, stock_meta);
