use super::*;

fn make_record() -> ProductRecord {
    ProductRecord {
        name: "Logitech M185 Wireless Mouse".to_string(),
        price: "$14.99".to_string(),
        location: "United States".to_string(),
        product_url: "https://www.amazon.com/dp/B004YAVF8I".to_string(),
        image_url: String::new(),
        image_data: None,
        availability: Availability::InStock,
        rating: NO_RATING.to_string(),
        description: NO_DESCRIPTION.to_string(),
        domain: "www.amazon.com".to_string(),
        region: "us-en".to_string(),
        search_title: "Logitech M185 - Amazon.com".to_string(),
        search_snippet: "Buy the Logitech M185".to_string(),
        search_region: "us-en".to_string(),
        search_source: "engine".to_string(),
    }
}

#[test]
fn availability_labels_round_trip_through_from_str() {
    for availability in [
        Availability::InStock,
        Availability::OutOfStock,
        Availability::LimitedStock,
        Availability::Unknown,
    ] {
        assert_eq!(availability.label().parse::<Availability>(), Ok(availability));
    }
}

#[test]
fn availability_from_str_rejects_unknown_label() {
    assert!("Backordered".parse::<Availability>().is_err());
}

#[test]
fn availability_serializes_as_label() {
    let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
    assert_eq!(json, "\"Out of Stock\"");
}

#[test]
fn availability_defaults_to_unknown() {
    assert_eq!(Availability::default(), Availability::Unknown);
}

#[test]
fn has_name_and_price_reflect_sentinels() {
    let mut record = make_record();
    assert!(record.has_name());
    assert!(record.has_price());
    assert!(!record.has_rating());

    record.name = PRODUCT_NAME_NOT_FOUND.to_string();
    record.price = PRICE_NOT_FOUND.to_string();
    assert!(!record.has_name());
    assert!(!record.has_price());
}

#[test]
fn record_json_round_trip_keeps_sentinels() {
    let record = make_record();
    let json = serde_json::to_string(&record).unwrap();
    let back: ProductRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
    assert_eq!(back.rating, NO_RATING);
}
