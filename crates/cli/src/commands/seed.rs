//! Seed the catalog with a sample medicine inventory.
//!
//! Inserts through the same store layer the server uses, so seeded rows get
//! the same defaults (image, stock, prescription flag) as API-created ones.

use rust_decimal::dec;
use secrecy::SecretString;
use tracing::info;

use quickmeds_core::Price;
use quickmeds_server::db::{self, Store};
use quickmeds_server::models::NewProduct;

/// Seed sample products. With `clear`, all existing products are deleted
/// first; order history is left alone and dangling references read as null
/// expanded products.
pub async fn run(clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("QUICKMEDS_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "QUICKMEDS_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    let store = db::PgStore::new(pool);

    if clear {
        let deleted = sqlx::query("DELETE FROM products")
            .execute(store.pool())
            .await?
            .rows_affected();
        info!(deleted, "Cleared existing products");
    }

    let catalog = sample_catalog()?;
    let count = catalog.len();
    for product in catalog {
        let created = store.create_product(product).await?;
        info!(id = %created.id, name = %created.name, "Seeded product");
    }

    info!("Seeding complete! {count} products inserted");
    Ok(())
}

fn sample_catalog() -> Result<Vec<NewProduct>, quickmeds_core::PriceError> {
    let entry = |name: &str,
                 category: &str,
                 price: Price,
                 description: &str,
                 stock: i32,
                 requires_prescription: bool| NewProduct {
        name: name.to_owned(),
        category: category.to_owned(),
        price,
        description: description.to_owned(),
        image: None,
        stock: Some(stock),
        requires_prescription: Some(requires_prescription),
    };

    Ok(vec![
        entry(
            "Paracetamol 500mg",
            "Pain Relief",
            Price::new(dec!(25.00))?,
            "Fast-acting pain and fever relief tablets.",
            120,
            false,
        ),
        entry(
            "Ibuprofen 400mg",
            "Pain Relief",
            Price::new(dec!(40.00))?,
            "Anti-inflammatory relief for aches and swelling.",
            80,
            false,
        ),
        entry(
            "Cough Syrup",
            "Cold & Flu",
            Price::new(dec!(80.00))?,
            "Soothing relief for dry and chesty coughs.",
            45,
            false,
        ),
        entry(
            "Cetirizine 10mg",
            "Allergy",
            Price::new(dec!(30.00))?,
            "Once-daily antihistamine for hay fever and hives.",
            60,
            false,
        ),
        entry(
            "Amoxicillin 250mg",
            "Antibiotics",
            Price::new(dec!(95.00))?,
            "Broad-spectrum antibiotic capsules for bacterial infections.",
            30,
            true,
        ),
        entry(
            "Vitamin C 1000mg",
            "Supplements",
            Price::new(dec!(55.00))?,
            "Daily immune support with effervescent vitamin C.",
            150,
            false,
        ),
        entry(
            "Insulin Glargine",
            "Diabetes",
            Price::new(dec!(450.00))?,
            "Long-acting insulin injection for blood sugar control.",
            20,
            true,
        ),
        entry(
            "ORS Rehydration Salts",
            "Digestive Health",
            Price::new(dec!(18.50))?,
            "Oral rehydration salts for fluid and electrolyte replacement.",
            200,
            false,
        ),
    ])
}
