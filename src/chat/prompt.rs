use crate::catalog::CatalogSnapshot;
use crate::config::ChatConfig;
use std::fmt::Write;

/// Renders the fixed instruction block for the given shop.
pub fn policy_preamble(shop_name: &str) -> String {
    format!(
        r#"You are the {shop} Assistant, the virtual assistant of an online electronics store.

YOUR ROLE:
- You assist customers and administrators with information about products, categories and prices.
- You recommend products based on the customer's needs and budget.
- You help administrators understand the catalog and how products are performing.

WHAT YOU CAN DO:
- Describe products in the store (name, category, price, features).
- Compare products within the same category.
- Recommend products by budget, need or preference.
- Explain features and specifications of electronic products.
- Answer questions about purchasing, availability and product categories.

IMPORTANT LIMITS:
- You ONLY answer questions about the electronics store, its products and related services.
- You REFUSE every question unrelated to the store, such as politics, news, health or personal finance.
- When a question is off-topic, politely explain that you only help with the store and its products.
- AVOID speculating about products or prices that are not in the data below.
- DO NOT make claims about products that the available data does not support.

STORE INFORMATION:
- Name: {shop}
- Type: electronics and accessories store
- App features: admin dashboard, product management, login

HOW TO RESPOND:
1. Always check whether the question is about the electronics store.
2. If it is off-topic, decline politely and steer back to the store.
3. Use the latest product data to give accurate answers.
4. Be polite, informative and focused on the user's needs.
5. When possible, offer several options or recommendations."#,
        shop = shop_name
    )
}

/// Formats the integer part of `value` with `separator` between groups of
/// three digits. The fractional part is truncated.
pub fn format_thousands(value: f64, separator: char) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }

    let first_group = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    out.push_str(&digits[..first_group.min(digits.len())]);

    let mut idx = first_group;
    while idx < digits.len() {
        out.push(separator);
        out.push_str(&digits[idx..idx + 3]);
        idx += 3;
    }

    out
}

/// Human-readable catalog summary embedded in the prompt.
pub fn render_snapshot(snapshot: &CatalogSnapshot, config: &ChatConfig) -> String {
    let price = |value: f64| {
        format!(
            "{}{}",
            config.currency_prefix,
            format_thousands(value, config.thousands_separator)
        )
    };

    let mut out = String::new();
    let _ = writeln!(out, "Total products: {}", snapshot.total_items());
    let _ = writeln!(out, "Total categories: {}", snapshot.categories.len());
    let _ = writeln!(
        out,
        "Price range: {} - {}\n",
        price(snapshot.price_range.min),
        price(snapshot.price_range.max)
    );

    out.push_str("Products per category:\n");
    for category in &snapshot.categories {
        let _ = writeln!(out, "- {}: {} products", category, snapshot.count_for(category));
    }
    out.push('\n');

    let samples = &snapshot.products[..snapshot.products.len().min(config.max_sample_products)];
    out.push_str("Sample products:\n");
    for product in samples {
        let _ = writeln!(
            out,
            "- {} (Category: {}, Price: {})",
            product.name,
            product.category,
            price(product.price)
        );
    }

    if (samples.len() as u64) < snapshot.total_items() {
        let _ = write!(
            out,
            "\n(Showing {} of {} products)",
            samples.len(),
            snapshot.total_items()
        );
    }

    out
}

/// Builds the full prompt. The user message is appended verbatim.
pub fn assemble_prompt(policy: &str, snapshot: &CatalogSnapshot, config: &ChatConfig, message: &str) -> String {
    format!(
        "{}\n\nCURRENT DATA:\n{}\n\nUser question: {}",
        policy,
        render_snapshot(snapshot, config),
        message
    )
}
