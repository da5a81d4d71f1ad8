use diesel::prelude::*;
use ganzhi_calendar::datetime_ganzhi;
use kbar_ganzhi::schema::stock_meta::dsl as sm;
use kbar_ganzhi::{Error, stock_meta::listing_date_ganzhi};

mod common;

#[test]
fn unknown_symbol_is_an_error() {
    let (_db, mut conn) = common::setup_db();
    match listing_date_ganzhi(&mut conn, "999999.SZ") {
        Err(Error::UnknownSymbol(symbol)) => assert_eq!(symbol, "999999.SZ"),
        other => panic!("expected UnknownSymbol, got {other:?}"),
    }
}

#[test]
fn first_lookup_computes_and_persists_labels() {
    let (_db, mut conn) = common::setup_db();
    common::seed_stock_meta(&mut conn, "000001.SZ", "PAB", "SZSE", "19910403");

    let info = listing_date_ganzhi(&mut conn, "000001.SZ").expect("lookup");
    let expected = datetime_ganzhi("19910403").unwrap();
    assert_eq!(info.year, expected.year.to_string());
    assert_eq!(info.month, expected.month.to_string());
    assert_eq!(info.day, expected.day.to_string());

    // the row was filled in place
    let (year_gan, day_zhi): (Option<String>, Option<String>) = sm::stock_meta
        .find("000001.SZ")
        .select((sm::year_gan, sm::day_zhi))
        .first(&mut conn)
        .unwrap();
    assert_eq!(year_gan.as_deref(), Some(expected.year.gan_symbol()));
    assert_eq!(day_zhi.as_deref(), Some(expected.day.zhi_symbol()));
}

#[test]
fn second_lookup_is_served_from_the_cache() {
    let (_db, mut conn) = common::setup_db();
    common::seed_stock_meta(&mut conn, "000002.SZ", "Vanke", "SZSE", "19910129");

    let first = listing_date_ganzhi(&mut conn, "000002.SZ").expect("first");

    // poison the list_date; a cached read must not recompute from it
    diesel::update(sm::stock_meta.find("000002.SZ"))
        .set(sm::list_date.eq("garbage"))
        .execute(&mut conn)
        .unwrap();

    let second = listing_date_ganzhi(&mut conn, "000002.SZ").expect("second");
    assert_eq!(first.year, second.year);
    assert_eq!(first.month, second.month);
    assert_eq!(first.day, second.day);
}

#[test]
fn unparseable_list_date_surfaces_as_parse_error() {
    let (_db, mut conn) = common::setup_db();
    common::seed_stock_meta(&mut conn, "000003.SZ", "Test", "SZSE", "not-a-date");

    match listing_date_ganzhi(&mut conn, "000003.SZ") {
        Err(Error::Parse { .. }) => {}
        other => panic!("expected Parse, got {other:?}"),
    }
}
