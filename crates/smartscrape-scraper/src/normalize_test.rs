use super::*;

// -----------------------------------------------------------------------
// extract_price
// -----------------------------------------------------------------------

#[test]
fn price_every_supported_format_returns_the_exact_substring() {
    let formats = [
        "$24.99",
        "USD 24.99",
        "24.99 USD",
        "€19,99",
        "EUR 15.00",
        "15.00 EUR",
        "£9.99",
        "GBP 9.99",
        "₹1,499",
        "INR 1,499.00",
        "Rs. 1,499",
        "¥3,980",
        "JPY 3980",
        "₽ 2,500",
        "R$ 45.90",
        "₩39,000",
        "25 dollars",
        "120 euros",
        "1,299 kr",
        "49 zł",
        "150 lei",
    ];
    for format in formats {
        let text = format!("Great deal today:   {format}   while supplies last");
        assert_eq!(extract_price(&text), format, "format {format}");
    }
}

#[test]
fn price_dollar_sign_preempts_later_patterns() {
    assert_eq!(extract_price("Price: $12.50 or 15 euros"), "$12.50");
}

#[test]
fn price_label_is_not_part_of_the_match() {
    assert_eq!(extract_price("Price: €12"), "€12");
    assert_eq!(extract_price("Price:£7.50 incl. VAT"), "£7.50");
}

#[test]
fn price_real_is_not_truncated_to_dollar() {
    assert_eq!(extract_price("Apenas R$ 199,00"), "R$ 199,00");
}

#[test]
fn price_collapses_whitespace_inside_match() {
    assert_eq!(extract_price("$\n   1,299.00"), "$ 1,299.00");
}

#[test]
fn price_ignores_bare_numbers() {
    assert_eq!(extract_price("Model 2024, 3 buttons"), PRICE_NOT_FOUND);
}

#[test]
fn price_empty_text_returns_sentinel() {
    assert_eq!(extract_price(""), PRICE_NOT_FOUND);
}

#[test]
fn price_rupee_prefix_needs_word_boundary() {
    assert_eq!(extract_price("ours 500 units"), PRICE_NOT_FOUND);
}

// -----------------------------------------------------------------------
// classify_availability
// -----------------------------------------------------------------------

#[test]
fn availability_in_stock() {
    assert_eq!(
        classify_availability("Ships today, in stock now"),
        Availability::InStock
    );
}

#[test]
fn availability_sold_out() {
    assert_eq!(
        classify_availability("Currently sold out"),
        Availability::OutOfStock
    );
}

#[test]
fn availability_empty_is_unknown() {
    assert_eq!(classify_availability(""), Availability::Unknown);
}

#[test]
fn availability_unavailable_is_not_available() {
    assert_eq!(
        classify_availability("This item is currently unavailable"),
        Availability::OutOfStock
    );
}

#[test]
fn availability_limited() {
    assert_eq!(
        classify_availability("Hurry, only a FEW LEFT"),
        Availability::LimitedStock
    );
}

#[test]
fn availability_in_stock_wins_over_out_of_stock() {
    assert_eq!(
        classify_availability("Black: Out of stock. White: In Stock."),
        Availability::InStock
    );
}

// -----------------------------------------------------------------------
// extract_rating
// -----------------------------------------------------------------------

#[test]
fn rating_out_of_form() {
    assert_eq!(extract_rating("4.5 out of 5 stars"), "4.5/5");
}

#[test]
fn rating_slash_form() {
    assert_eq!(extract_rating("Rated 9/10 by critics"), "9/10");
}

#[test]
fn rating_missing_scale_returns_sentinel() {
    assert_eq!(extract_rating("4.5 stars"), NO_RATING);
}

#[test]
fn rating_empty_returns_sentinel() {
    assert_eq!(extract_rating(""), NO_RATING);
}

// -----------------------------------------------------------------------
// collapse_whitespace
// -----------------------------------------------------------------------

#[test]
fn collapse_whitespace_trims_and_joins() {
    assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
}
